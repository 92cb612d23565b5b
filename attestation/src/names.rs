// Licensed under the Apache-2.0 license

//! Display names for the keymaster enumerations carried in authorization
//! lists. Unknown values never fail; they render as "Unknown".

use bitflags::bitflags;

pub const KM_ALGORITHM_RSA: i32 = 1;
pub const KM_ALGORITHM_EC: i32 = 3;

pub const KM_EC_CURVE_P224: i32 = 0;
pub const KM_EC_CURVE_P256: i32 = 1;
pub const KM_EC_CURVE_P384: i32 = 2;
pub const KM_EC_CURVE_P521: i32 = 3;

pub const KM_PAD_NONE: i32 = 1;
pub const KM_PAD_RSA_OAEP: i32 = 2;
pub const KM_PAD_RSA_PSS: i32 = 3;
pub const KM_PAD_RSA_PKCS1_1_5_ENCRYPT: i32 = 4;
pub const KM_PAD_RSA_PKCS1_1_5_SIGN: i32 = 5;

pub const KM_DIGEST_NONE: i32 = 0;
pub const KM_DIGEST_MD5: i32 = 1;
pub const KM_DIGEST_SHA1: i32 = 2;
pub const KM_DIGEST_SHA_2_224: i32 = 3;
pub const KM_DIGEST_SHA_2_256: i32 = 4;
pub const KM_DIGEST_SHA_2_384: i32 = 5;
pub const KM_DIGEST_SHA_2_512: i32 = 6;

pub const KM_ORIGIN_GENERATED: i32 = 0;
pub const KM_ORIGIN_IMPORTED: i32 = 2;
pub const KM_ORIGIN_UNKNOWN: i32 = 3;

pub const KM_PURPOSE_ENCRYPT: i32 = 0;
pub const KM_PURPOSE_DECRYPT: i32 = 1;
pub const KM_PURPOSE_SIGN: i32 = 2;
pub const KM_PURPOSE_VERIFY: i32 = 3;

const UNKNOWN: &str = "Unknown";

bitflags! {
    /// Authenticators accepted for a key, from `KM_TAG_USER_AUTH_TYPE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HwAuthenticatorType: u32 {
        const PASSWORD = 1 << 0;
        const FINGERPRINT = 1 << 1;
    }
}

pub fn algorithm_to_string(algorithm: i32) -> &'static str {
    match algorithm {
        KM_ALGORITHM_RSA => "RSA",
        KM_ALGORITHM_EC => "ECDSA",
        _ => UNKNOWN,
    }
}

pub fn padding_mode_to_string(padding_mode: i32) -> &'static str {
    match padding_mode {
        KM_PAD_NONE => "NONE",
        KM_PAD_RSA_OAEP => "OAEP",
        KM_PAD_RSA_PSS => "PSS",
        KM_PAD_RSA_PKCS1_1_5_ENCRYPT => "PKCS1 ENCRYPT",
        KM_PAD_RSA_PKCS1_1_5_SIGN => "PKCS1 SIGN",
        _ => UNKNOWN,
    }
}

pub fn digest_to_string(digest: i32) -> &'static str {
    match digest {
        KM_DIGEST_NONE => "NONE",
        KM_DIGEST_MD5 => "MD5",
        KM_DIGEST_SHA1 => "SHA1",
        KM_DIGEST_SHA_2_224 => "SHA224",
        KM_DIGEST_SHA_2_256 => "SHA256",
        KM_DIGEST_SHA_2_384 => "SHA384",
        KM_DIGEST_SHA_2_512 => "SHA512",
        _ => UNKNOWN,
    }
}

pub fn purpose_to_string(purpose: i32) -> &'static str {
    match purpose {
        KM_PURPOSE_ENCRYPT => "ENCRYPT",
        KM_PURPOSE_DECRYPT => "DECRYPT",
        KM_PURPOSE_SIGN => "SIGN",
        KM_PURPOSE_VERIFY => "VERIFY",
        _ => UNKNOWN,
    }
}

pub fn ec_curve_to_string(ec_curve: i32) -> &'static str {
    match ec_curve {
        KM_EC_CURVE_P224 => "secp224r1",
        KM_EC_CURVE_P256 => "secp256r1",
        KM_EC_CURVE_P384 => "secp384r1",
        KM_EC_CURVE_P521 => "secp521r1",
        _ => "unknown",
    }
}

pub fn origin_to_string(origin: i32) -> &'static str {
    match origin {
        KM_ORIGIN_GENERATED => "Generated",
        KM_ORIGIN_IMPORTED => "Imported",
        KM_ORIGIN_UNKNOWN => "Unknown (KM0)",
        _ => UNKNOWN,
    }
}

/// Lists the authenticators set in `user_auth_type`, fingerprint first.
pub fn user_auth_type_to_string(user_auth_type: i32) -> String {
    let flags = HwAuthenticatorType::from_bits_truncate(user_auth_type as u32);
    let mut types = Vec::new();
    if flags.contains(HwAuthenticatorType::FINGERPRINT) {
        types.push("Fingerprint");
    }
    if flags.contains(HwAuthenticatorType::PASSWORD) {
        types.push("Password");
    }
    join_strings(types)
}

/// Renders a collection as `[a, b, c]`.
pub fn join_strings<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: Vec<S> = items.into_iter().collect();
    let joined: Vec<&str> = joined.iter().map(AsRef::as_ref).collect();
    format!("[{}]", joined.join(", "))
}
