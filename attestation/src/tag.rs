// Licensed under the Apache-2.0 license

//! Keymaster authorization tags understood by the authorization list walker.

use core::fmt;

/// Strips the [`TagType`] bits from a keymaster tag value.
pub const KEYMASTER_TAG_TYPE_MASK: u32 = 0x0FFF_FFFF;

/// The value shape of a keymaster tag, stored in its top four bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TagType {
    Enum = 1 << 28,
    EnumRep = 2 << 28,
    Uint = 3 << 28,
    Ulong = 5 << 28,
    Date = 6 << 28,
    Bool = 7 << 28,
    Bytes = 9 << 28,
}

impl TagType {
    pub const fn from_tag_value(value: u32) -> Option<Self> {
        match value & !KEYMASTER_TAG_TYPE_MASK {
            v if v == TagType::Enum as u32 => Some(TagType::Enum),
            v if v == TagType::EnumRep as u32 => Some(TagType::EnumRep),
            v if v == TagType::Uint as u32 => Some(TagType::Uint),
            v if v == TagType::Ulong as u32 => Some(TagType::Ulong),
            v if v == TagType::Date as u32 => Some(TagType::Date),
            v if v == TagType::Bool as u32 => Some(TagType::Bool),
            v if v == TagType::Bytes as u32 => Some(TagType::Bytes),
            _ => None,
        }
    }
}

/// A keymaster tag, valued as it is defined by keymaster: type bits included.
///
/// The attestation extension carries the masked value as the context-specific
/// tag number of each authorization list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum KeymasterTag {
    Purpose = TagType::EnumRep as u32 | 1,
    Algorithm = TagType::Enum as u32 | 2,
    KeySize = TagType::Uint as u32 | 3,
    Digest = TagType::EnumRep as u32 | 5,
    Padding = TagType::EnumRep as u32 | 6,
    EcCurve = TagType::Enum as u32 | 10,
    RsaPublicExponent = TagType::Ulong as u32 | 200,
    ActiveDateTime = TagType::Date as u32 | 400,
    OriginationExpireDateTime = TagType::Date as u32 | 401,
    UsageExpireDateTime = TagType::Date as u32 | 402,
    NoAuthRequired = TagType::Bool as u32 | 503,
    UserAuthType = TagType::Enum as u32 | 504,
    AuthTimeout = TagType::Uint as u32 | 505,
    AllowWhileOnBody = TagType::Bool as u32 | 506,
    TrustedUserPresenceRequired = TagType::Bool as u32 | 507,
    TrustedConfirmationRequired = TagType::Bool as u32 | 508,
    AllApplications = TagType::Bool as u32 | 600,
    ApplicationId = TagType::Bytes as u32 | 601,
    CreationDateTime = TagType::Date as u32 | 701,
    Origin = TagType::Enum as u32 | 702,
    RollbackResistant = TagType::Bool as u32 | 703,
    RootOfTrust = TagType::Bytes as u32 | 704,
    OsVersion = TagType::Uint as u32 | 705,
    OsPatchLevel = TagType::Uint as u32 | 706,
    AttestationApplicationId = TagType::Bytes as u32 | 709,
    AttestationIdBrand = TagType::Bytes as u32 | 710,
    AttestationIdDevice = TagType::Bytes as u32 | 711,
    AttestationIdProduct = TagType::Bytes as u32 | 712,
    AttestationIdSerial = TagType::Bytes as u32 | 713,
    AttestationIdImei = TagType::Bytes as u32 | 714,
    AttestationIdMeid = TagType::Bytes as u32 | 715,
    AttestationIdManufacturer = TagType::Bytes as u32 | 716,
    AttestationIdModel = TagType::Bytes as u32 | 717,
    VendorPatchLevel = TagType::Uint as u32 | 718,
    BootPatchLevel = TagType::Uint as u32 | 719,
}

impl KeymasterTag {
    pub const ALL: [KeymasterTag; 35] = [
        KeymasterTag::Purpose,
        KeymasterTag::Algorithm,
        KeymasterTag::KeySize,
        KeymasterTag::Digest,
        KeymasterTag::Padding,
        KeymasterTag::EcCurve,
        KeymasterTag::RsaPublicExponent,
        KeymasterTag::ActiveDateTime,
        KeymasterTag::OriginationExpireDateTime,
        KeymasterTag::UsageExpireDateTime,
        KeymasterTag::NoAuthRequired,
        KeymasterTag::UserAuthType,
        KeymasterTag::AuthTimeout,
        KeymasterTag::AllowWhileOnBody,
        KeymasterTag::TrustedUserPresenceRequired,
        KeymasterTag::TrustedConfirmationRequired,
        KeymasterTag::AllApplications,
        KeymasterTag::ApplicationId,
        KeymasterTag::CreationDateTime,
        KeymasterTag::Origin,
        KeymasterTag::RollbackResistant,
        KeymasterTag::RootOfTrust,
        KeymasterTag::OsVersion,
        KeymasterTag::OsPatchLevel,
        KeymasterTag::AttestationApplicationId,
        KeymasterTag::AttestationIdBrand,
        KeymasterTag::AttestationIdDevice,
        KeymasterTag::AttestationIdProduct,
        KeymasterTag::AttestationIdSerial,
        KeymasterTag::AttestationIdImei,
        KeymasterTag::AttestationIdMeid,
        KeymasterTag::AttestationIdManufacturer,
        KeymasterTag::AttestationIdModel,
        KeymasterTag::VendorPatchLevel,
        KeymasterTag::BootPatchLevel,
    ];

    /// The full tag value, type bits included.
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// The tag number as it appears on the wire.
    pub const fn number(self) -> u32 {
        self.value() & KEYMASTER_TAG_TYPE_MASK
    }

    pub const fn tag_type(self) -> TagType {
        match TagType::from_tag_value(self.value()) {
            Some(tag_type) => tag_type,
            // Every variant is declared with one of the type bits above
            None => TagType::Bytes,
        }
    }

    /// Looks up a tag by its wire number. Type bits, if any, are ignored.
    pub fn from_number(number: u32) -> Option<Self> {
        let number = number & KEYMASTER_TAG_TYPE_MASK;
        Self::ALL.into_iter().find(|tag| tag.number() == number)
    }

    /// The keymaster name of the tag, e.g. `KM_TAG_PURPOSE`.
    pub const fn name(self) -> &'static str {
        match self {
            KeymasterTag::Purpose => "KM_TAG_PURPOSE",
            KeymasterTag::Algorithm => "KM_TAG_ALGORITHM",
            KeymasterTag::KeySize => "KM_TAG_KEY_SIZE",
            KeymasterTag::Digest => "KM_TAG_DIGEST",
            KeymasterTag::Padding => "KM_TAG_PADDING",
            KeymasterTag::EcCurve => "KM_TAG_EC_CURVE",
            KeymasterTag::RsaPublicExponent => "KM_TAG_RSA_PUBLIC_EXPONENT",
            KeymasterTag::ActiveDateTime => "KM_TAG_ACTIVE_DATETIME",
            KeymasterTag::OriginationExpireDateTime => "KM_TAG_ORIGINATION_EXPIRE_DATETIME",
            KeymasterTag::UsageExpireDateTime => "KM_TAG_USAGE_EXPIRE_DATETIME",
            KeymasterTag::NoAuthRequired => "KM_TAG_NO_AUTH_REQUIRED",
            KeymasterTag::UserAuthType => "KM_TAG_USER_AUTH_TYPE",
            KeymasterTag::AuthTimeout => "KM_TAG_AUTH_TIMEOUT",
            KeymasterTag::AllowWhileOnBody => "KM_TAG_ALLOW_WHILE_ON_BODY",
            KeymasterTag::TrustedUserPresenceRequired => "KM_TAG_TRUSTED_USER_PRESENCE_REQUIRED",
            KeymasterTag::TrustedConfirmationRequired => "KM_TAG_TRUSTED_CONFIRMATION_REQUIRED",
            KeymasterTag::AllApplications => "KM_TAG_ALL_APPLICATIONS",
            KeymasterTag::ApplicationId => "KM_TAG_APPLICATION_ID",
            KeymasterTag::CreationDateTime => "KM_TAG_CREATION_DATETIME",
            KeymasterTag::Origin => "KM_TAG_ORIGIN",
            KeymasterTag::RollbackResistant => "KM_TAG_ROLLBACK_RESISTANT",
            KeymasterTag::RootOfTrust => "KM_TAG_ROOT_OF_TRUST",
            KeymasterTag::OsVersion => "KM_TAG_OS_VERSION",
            KeymasterTag::OsPatchLevel => "KM_TAG_OS_PATCHLEVEL",
            KeymasterTag::AttestationApplicationId => "KM_TAG_ATTESTATION_APPLICATION_ID",
            KeymasterTag::AttestationIdBrand => "KM_TAG_ATTESTATION_ID_BRAND",
            KeymasterTag::AttestationIdDevice => "KM_TAG_ATTESTATION_ID_DEVICE",
            KeymasterTag::AttestationIdProduct => "KM_TAG_ATTESTATION_ID_PRODUCT",
            KeymasterTag::AttestationIdSerial => "KM_TAG_ATTESTATION_ID_SERIAL",
            KeymasterTag::AttestationIdImei => "KM_TAG_ATTESTATION_ID_IMEI",
            KeymasterTag::AttestationIdMeid => "KM_TAG_ATTESTATION_ID_MEID",
            KeymasterTag::AttestationIdManufacturer => "KM_TAG_ATTESTATION_ID_MANUFACTURER",
            KeymasterTag::AttestationIdModel => "KM_TAG_ATTESTATION_ID_MODEL",
            KeymasterTag::VendorPatchLevel => "KM_TAG_VENDOR_PATCHLEVEL",
            KeymasterTag::BootPatchLevel => "KM_TAG_BOOT_PATCHLEVEL",
        }
    }
}

impl fmt::Display for KeymasterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_numbers_are_unique() {
        let numbers: BTreeSet<u32> = KeymasterTag::ALL.iter().map(|t| t.number()).collect();
        assert_eq!(numbers.len(), KeymasterTag::ALL.len());
    }

    #[test]
    fn test_from_number() {
        for tag in KeymasterTag::ALL {
            assert_eq!(KeymasterTag::from_number(tag.number()), Some(tag));
            assert_eq!(KeymasterTag::from_number(tag.value()), Some(tag));
        }
        assert_eq!(KeymasterTag::from_number(999), None);
        assert_eq!(KeymasterTag::from_number(0), None);
    }

    #[test]
    fn test_values() {
        assert_eq!(KeymasterTag::Purpose.value(), 0x2000_0001);
        assert_eq!(KeymasterTag::AttestationApplicationId.number(), 709);
        assert_eq!(KeymasterTag::AttestationApplicationId.value(), 0x9000_02C5);
        assert_eq!(KeymasterTag::RsaPublicExponent.tag_type(), TagType::Ulong);
        assert_eq!(KeymasterTag::NoAuthRequired.tag_type(), TagType::Bool);
        assert_eq!(TagType::from_tag_value(0x4000_0001), None);
    }
}
