// Licensed under the Apache-2.0 license

use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::info;
use platform::Platform;

use crate::asn1::decode::{bytes_from, element_at, integer_from, sequence_from_bytes};
use crate::authorization_list::AuthorizationList;
use crate::error::{in_field, AttestationError, Result};

/// OID of the Android key attestation extension.
pub const KEY_DESCRIPTION_OID: &str = "1.3.6.1.4.1.11129.2.1.17";

/// DER contents octets of [`KEY_DESCRIPTION_OID`].
pub const KEY_DESCRIPTION_OID_BYTES: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xD6, 0x79, 0x02, 0x01, 0x11];

const ATTESTATION_VERSION_INDEX: usize = 0;
const ATTESTATION_SECURITY_LEVEL_INDEX: usize = 1;
const KEYMASTER_VERSION_INDEX: usize = 2;
const KEYMASTER_SECURITY_LEVEL_INDEX: usize = 3;
const ATTESTATION_CHALLENGE_INDEX: usize = 4;
const UNIQUE_ID_INDEX: usize = 5;
const SW_ENFORCED_INDEX: usize = 6;
const TEE_ENFORCED_INDEX: usize = 7;

const STRUCTURE: &str = "KeyDescription";

/// Where an attestation or key is enforced.
///
/// Values outside the known levels are kept rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    Software,
    TrustedEnvironment,
    Unknown(i32),
}

impl SecurityLevel {
    pub const KM_SECURITY_LEVEL_SOFTWARE: i32 = 0;
    pub const KM_SECURITY_LEVEL_TRUSTED_ENVIRONMENT: i32 = 1;

    pub fn value(self) -> i32 {
        match self {
            SecurityLevel::Software => Self::KM_SECURITY_LEVEL_SOFTWARE,
            SecurityLevel::TrustedEnvironment => Self::KM_SECURITY_LEVEL_TRUSTED_ENVIRONMENT,
            SecurityLevel::Unknown(value) => value,
        }
    }
}

impl From<i32> for SecurityLevel {
    fn from(value: i32) -> Self {
        match value {
            Self::KM_SECURITY_LEVEL_SOFTWARE => SecurityLevel::Software,
            Self::KM_SECURITY_LEVEL_TRUSTED_ENVIRONMENT => SecurityLevel::TrustedEnvironment,
            other => SecurityLevel::Unknown(other),
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SecurityLevel::Software => "Software",
            SecurityLevel::TrustedEnvironment => "TEE",
            SecurityLevel::Unknown(_) => "Unknown",
        })
    }
}

/// A decoded key attestation extension.
///
/// ```text
/// KeyDescription ::= SEQUENCE {
///     attestationVersion         INTEGER,
///     attestationSecurityLevel   SecurityLevel,
///     keymasterVersion           INTEGER,
///     keymasterSecurityLevel     SecurityLevel,
///     attestationChallenge       OCTET STRING,
///     uniqueId                   OCTET STRING,
///     softwareEnforced           AuthorizationList,
///     teeEnforced                AuthorizationList,
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    attestation_version: i32,
    attestation_security_level: SecurityLevel,
    keymaster_version: i32,
    keymaster_security_level: SecurityLevel,
    attestation_challenge: Vec<u8>,
    unique_id: Vec<u8>,
    software_enforced: AuthorizationList,
    tee_enforced: AuthorizationList,
}

impl Attestation {
    /// Looks up the attestation extension through `platform` and decodes it.
    pub fn from_platform(platform: &mut impl Platform) -> Result<Self> {
        match platform.get_extension_value(KEY_DESCRIPTION_OID)? {
            Some(value) => Self::from_extension_value(&value),
            None => Err(AttestationError::MissingExtension(KEY_DESCRIPTION_OID)),
        }
    }

    /// Decodes an extension value as returned by
    /// [`Platform::get_extension_value`]: an OCTET STRING wrapping the DER
    /// encoded KeyDescription.
    pub fn from_extension_value(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(AttestationError::MissingExtension(KEY_DESCRIPTION_OID));
        }
        let seq = sequence_from_bytes(bytes)?;
        let field = |index| element_at(&seq, index, STRUCTURE);

        let attestation_version =
            integer_from(field(ATTESTATION_VERSION_INDEX)?).map_err(in_field("attestation version"))?;
        let attestation_security_level: SecurityLevel =
            integer_from(field(ATTESTATION_SECURITY_LEVEL_INDEX)?)
                .map_err(in_field("attestation security level"))?
                .into();
        let keymaster_version =
            integer_from(field(KEYMASTER_VERSION_INDEX)?).map_err(in_field("keymaster version"))?;
        let keymaster_security_level: SecurityLevel =
            integer_from(field(KEYMASTER_SECURITY_LEVEL_INDEX)?)
                .map_err(in_field("keymaster security level"))?
                .into();
        let attestation_challenge = bytes_from(field(ATTESTATION_CHALLENGE_INDEX)?)
            .map_err(in_field("attestation challenge"))?;
        let unique_id = bytes_from(field(UNIQUE_ID_INDEX)?).map_err(in_field("unique id"))?;
        let software_enforced = AuthorizationList::from_asn1(field(SW_ENFORCED_INDEX)?)
            .map_err(in_field("software enforced authorization list"))?;
        let tee_enforced = AuthorizationList::from_asn1(field(TEE_ENFORCED_INDEX)?)
            .map_err(in_field("TEE enforced authorization list"))?;

        info!(
            "Parsed attestation version {attestation_version} ({attestation_security_level}), \
             keymaster version {keymaster_version} ({keymaster_security_level})"
        );

        Ok(Self {
            attestation_version,
            attestation_security_level,
            keymaster_version,
            keymaster_security_level,
            attestation_challenge,
            unique_id,
            software_enforced,
            tee_enforced,
        })
    }

    pub fn attestation_version(&self) -> i32 {
        self.attestation_version
    }

    pub fn attestation_security_level(&self) -> SecurityLevel {
        self.attestation_security_level
    }

    pub fn keymaster_version(&self) -> i32 {
        self.keymaster_version
    }

    pub fn keymaster_security_level(&self) -> SecurityLevel {
        self.keymaster_security_level
    }

    pub fn attestation_challenge(&self) -> &[u8] {
        &self.attestation_challenge
    }

    /// `None` when the attesting environment reported an empty unique id.
    pub fn unique_id(&self) -> Option<&[u8]> {
        (!self.unique_id.is_empty()).then_some(self.unique_id.as_slice())
    }

    pub fn software_enforced(&self) -> &AuthorizationList {
        &self.software_enforced
    }

    pub fn tee_enforced(&self) -> &AuthorizationList {
        &self.tee_enforced
    }
}

impl fmt::Display for Attestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attest version: {}", self.attestation_version)?;
        write!(f, "\nAttest security: {}", self.attestation_security_level)?;
        write!(f, "\nKM version: {}", self.keymaster_version)?;
        write!(f, "\nKM security: {}", self.keymaster_security_level)?;

        if self.attestation_challenge.is_ascii() {
            write!(
                f,
                "\nChallenge: [{}]",
                String::from_utf8_lossy(&self.attestation_challenge)
            )?;
        } else {
            write!(
                f,
                "\nChallenge (base64): [{}]",
                STANDARD.encode(&self.attestation_challenge)
            )?;
        }
        if let Some(unique_id) = self.unique_id() {
            write!(f, "\nUnique ID (base64): [{}]", STANDARD.encode(unique_id))?;
        }

        write!(f, "\n-- SW enforced --{}", self.software_enforced)?;
        write!(f, "\n-- TEE enforced --{}", self.tee_enforced)
    }
}
