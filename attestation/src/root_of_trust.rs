// Licensed under the Apache-2.0 license

use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::asn1::decode::{bool_from, bytes_from, element_at, integer_from, sequence_from};
use crate::asn1::Asn1Value;
use crate::error::{in_field, Result};

const VERIFIED_BOOT_KEY_INDEX: usize = 0;
const DEVICE_LOCKED_INDEX: usize = 1;
const VERIFIED_BOOT_STATE_INDEX: usize = 2;
const VERIFIED_BOOT_HASH_INDEX: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedBootState {
    Verified,
    SelfSigned,
    Unverified,
    Failed,
    Unknown(i32),
}

impl From<i32> for VerifiedBootState {
    fn from(value: i32) -> Self {
        match value {
            0 => VerifiedBootState::Verified,
            1 => VerifiedBootState::SelfSigned,
            2 => VerifiedBootState::Unverified,
            3 => VerifiedBootState::Failed,
            other => VerifiedBootState::Unknown(other),
        }
    }
}

impl fmt::Display for VerifiedBootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerifiedBootState::Verified => "Verified",
            VerifiedBootState::SelfSigned => "Self-signed",
            VerifiedBootState::Unverified => "Unverified",
            VerifiedBootState::Failed => "Failed",
            VerifiedBootState::Unknown(_) => "Unknown",
        })
    }
}

/// The boot state reported by the secure environment, `KM_TAG_ROOT_OF_TRUST`.
///
/// ```text
/// RootOfTrust ::= SEQUENCE {
///     verifiedBootKey    OCTET STRING,
///     deviceLocked       BOOLEAN,
///     verifiedBootState  VerifiedBootState,
///     verifiedBootHash   OCTET STRING OPTIONAL,
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOfTrust {
    verified_boot_key: Vec<u8>,
    device_locked: bool,
    verified_boot_state: VerifiedBootState,
    verified_boot_hash: Option<Vec<u8>>,
}

impl RootOfTrust {
    const STRUCTURE: &'static str = "RootOfTrust";

    pub fn from_asn1(node: &Asn1Value) -> Result<Self> {
        let items = sequence_from(node).map_err(in_field(Self::STRUCTURE))?;

        let verified_boot_key =
            bytes_from(element_at(items, VERIFIED_BOOT_KEY_INDEX, Self::STRUCTURE)?)
                .map_err(in_field("verified boot key"))?;
        let device_locked = bool_from(element_at(items, DEVICE_LOCKED_INDEX, Self::STRUCTURE)?)
            .map_err(in_field("device locked"))?;
        let verified_boot_state: VerifiedBootState =
            integer_from(element_at(items, VERIFIED_BOOT_STATE_INDEX, Self::STRUCTURE)?)
                .map_err(in_field("verified boot state"))?
                .into();
        let verified_boot_hash = items
            .get(VERIFIED_BOOT_HASH_INDEX)
            .map(bytes_from)
            .transpose()
            .map_err(in_field("verified boot hash"))?;

        Ok(Self {
            verified_boot_key,
            device_locked,
            verified_boot_state,
            verified_boot_hash,
        })
    }

    pub fn verified_boot_key(&self) -> &[u8] {
        &self.verified_boot_key
    }

    pub fn is_device_locked(&self) -> bool {
        self.device_locked
    }

    pub fn verified_boot_state(&self) -> VerifiedBootState {
        self.verified_boot_state
    }

    /// Only present from keymaster 4 onwards.
    pub fn verified_boot_hash(&self) -> Option<&[u8]> {
        self.verified_boot_hash.as_deref()
    }
}

impl fmt::Display for RootOfTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\nVerified boot Key: {}\nDevice locked: {}\nVerified boot state: {}",
            STANDARD.encode(&self.verified_boot_key),
            self.device_locked,
            self.verified_boot_state
        )?;
        if let Some(hash) = &self.verified_boot_hash {
            write!(f, "\nVerified boot hash: {}", STANDARD.encode(hash))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::{parse_single, Asn1Kind, DerWriter};
    use crate::error::AttestationError;

    fn root_of_trust(f: impl FnOnce(&mut DerWriter)) -> Result<RootOfTrust> {
        let mut w = DerWriter::new();
        w.encode_sequence(f);
        RootOfTrust::from_asn1(&parse_single(&w.finish()).unwrap())
    }

    #[test]
    fn test_decode() {
        let rot = root_of_trust(|w| {
            w.encode_octet_string(&[0xAB; 32]);
            w.encode_bool(true);
            w.encode_enumerated(0);
        })
        .unwrap();
        assert_eq!(rot.verified_boot_key(), &[0xAB; 32]);
        assert!(rot.is_device_locked());
        assert_eq!(rot.verified_boot_state(), VerifiedBootState::Verified);
        assert_eq!(rot.verified_boot_hash(), None);
    }

    #[test]
    fn test_decode_with_boot_hash() {
        let rot = root_of_trust(|w| {
            w.encode_octet_string(&[0x01]);
            w.encode_bool(false);
            w.encode_enumerated(2);
            w.encode_octet_string(&[0x02, 0x03]);
        })
        .unwrap();
        assert_eq!(rot.verified_boot_state(), VerifiedBootState::Unverified);
        assert_eq!(rot.verified_boot_hash(), Some(&[0x02, 0x03][..]));
    }

    #[test]
    fn test_missing_field() {
        let err = root_of_trust(|w| {
            w.encode_octet_string(&[0x01]);
            w.encode_bool(false);
        })
        .unwrap_err();
        assert_eq!(err, AttestationError::missing_element("RootOfTrust", 2));
    }

    #[test]
    fn test_wrong_field_type() {
        let err = root_of_trust(|w| {
            w.encode_octet_string(&[0x01]);
            w.encode_integer(1);
            w.encode_enumerated(0);
        })
        .unwrap_err();
        assert_eq!(
            err.root_cause(),
            &AttestationError::expected(Asn1Kind::Boolean, Asn1Kind::Integer)
        );
        assert!(err.to_string().starts_with("failed to parse device locked"));
    }

    #[test]
    fn test_display() {
        let rot = root_of_trust(|w| {
            w.encode_octet_string(b"key");
            w.encode_bool(true);
            w.encode_enumerated(7);
        })
        .unwrap();
        assert_eq!(
            rot.to_string(),
            "\nVerified boot Key: a2V5\nDevice locked: true\nVerified boot state: Unknown"
        );
    }
}
