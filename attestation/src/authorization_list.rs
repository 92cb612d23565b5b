/*++

Licensed under the Apache-2.0 license.

Abstract:

    Decodes a keymaster AuthorizationList: a SEQUENCE of explicitly tagged
    entries whose tag numbers are keymaster tags.

--*/

use core::fmt;
use std::collections::BTreeSet;

use log::debug;

use crate::application_id::AttestationApplicationId;
use crate::asn1::decode::{
    bytes_from, date_from, encodable_from_bytes, int_set_from, integer_from, long_from,
    sequence_from, utf8_string_from,
};
use crate::asn1::{parse_single, Asn1Kind, Asn1Value};
use crate::error::{in_field, AttestationError, Result};
use crate::names::{
    self, join_strings, KM_PAD_NONE, KM_PAD_RSA_OAEP, KM_PAD_RSA_PKCS1_1_5_ENCRYPT,
    KM_PAD_RSA_PKCS1_1_5_SIGN, KM_PAD_RSA_PSS,
};
use crate::root_of_trust::RootOfTrust;
use crate::tag::{KeymasterTag, KEYMASTER_TAG_TYPE_MASK};
use crate::timestamp::Timestamp;

/// The properties of an attested key, as enforced at one security level.
///
/// Every field starts out absent (or false, for flags) and is filled in only
/// by the tags present in the encoding. Repeated tags overwrite earlier ones.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthorizationList {
    purposes: Option<BTreeSet<i32>>,
    algorithm: Option<i32>,
    key_size: Option<i32>,
    digests: Option<BTreeSet<i32>>,
    padding_modes: Option<BTreeSet<i32>>,
    ec_curve: Option<i32>,
    rsa_public_exponent: Option<i64>,
    active_date_time: Option<Timestamp>,
    origination_expire_date_time: Option<Timestamp>,
    usage_expire_date_time: Option<Timestamp>,
    no_auth_required: bool,
    user_auth_type: Option<i32>,
    auth_timeout: Option<i32>,
    allow_while_on_body: bool,
    all_applications: bool,
    application_id: Option<Vec<u8>>,
    creation_date_time: Option<Timestamp>,
    origin: Option<i32>,
    rollback_resistant: bool,
    root_of_trust: Option<RootOfTrust>,
    os_version: Option<i32>,
    os_patch_level: Option<i32>,
    vendor_patch_level: Option<i32>,
    boot_patch_level: Option<i32>,
    attestation_application_id: Option<AttestationApplicationId>,
    brand: Option<String>,
    device: Option<String>,
    product: Option<String>,
    serial_number: Option<String>,
    imei: Option<String>,
    meid: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    user_presence_required: bool,
    confirmation_required: bool,
}

impl AuthorizationList {
    /// Decodes a DER encoded AuthorizationList SEQUENCE.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        Self::from_asn1(&parse_single(bytes)?)
    }

    /// Walks the tagged entries of `node`, which must be a SEQUENCE.
    ///
    /// Fails on the first entry that is not a tagged object, carries a tag
    /// outside the known keymaster tags, or holds a value of the wrong shape.
    pub fn from_asn1(node: &Asn1Value) -> Result<Self> {
        let entries = sequence_from(node)?;

        let mut list = Self::default();
        for entry in entries {
            let Asn1Value::Tagged { number, inner } = entry else {
                return Err(AttestationError::expected(
                    Asn1Kind::TaggedObject,
                    entry.kind(),
                ));
            };
            let tag = KeymasterTag::from_number(*number)
                .ok_or(AttestationError::UnknownTag(number & KEYMASTER_TAG_TYPE_MASK))?;

            debug!("Parsing tag [{number}] {tag}, value: {}", inner.kind());
            list.apply(tag, inner).map_err(in_field(tag.name()))?;
        }

        Ok(list)
    }

    fn apply(&mut self, tag: KeymasterTag, value: &Asn1Value) -> Result<()> {
        match tag {
            KeymasterTag::Purpose => self.purposes = Some(int_set_from(value)?),
            KeymasterTag::Algorithm => self.algorithm = Some(integer_from(value)?),
            KeymasterTag::KeySize => {
                let key_size = integer_from(value)?;
                debug!("Found KEY SIZE, value: {key_size}");
                self.key_size = Some(key_size);
            }
            KeymasterTag::Digest => self.digests = Some(int_set_from(value)?),
            KeymasterTag::Padding => self.padding_modes = Some(int_set_from(value)?),
            KeymasterTag::EcCurve => self.ec_curve = Some(integer_from(value)?),
            KeymasterTag::RsaPublicExponent => self.rsa_public_exponent = Some(long_from(value)?),
            KeymasterTag::ActiveDateTime => self.active_date_time = Some(date_from(value)?),
            KeymasterTag::OriginationExpireDateTime => {
                self.origination_expire_date_time = Some(date_from(value)?)
            }
            KeymasterTag::UsageExpireDateTime => {
                self.usage_expire_date_time = Some(date_from(value)?)
            }
            KeymasterTag::NoAuthRequired => self.no_auth_required = true,
            KeymasterTag::UserAuthType => self.user_auth_type = Some(integer_from(value)?),
            KeymasterTag::AuthTimeout => self.auth_timeout = Some(integer_from(value)?),
            KeymasterTag::AllowWhileOnBody => self.allow_while_on_body = true,
            KeymasterTag::TrustedUserPresenceRequired => self.user_presence_required = true,
            KeymasterTag::TrustedConfirmationRequired => self.confirmation_required = true,
            KeymasterTag::AllApplications => self.all_applications = true,
            KeymasterTag::ApplicationId => self.application_id = Some(bytes_from(value)?),
            KeymasterTag::CreationDateTime => self.creation_date_time = Some(date_from(value)?),
            KeymasterTag::Origin => self.origin = Some(integer_from(value)?),
            KeymasterTag::RollbackResistant => self.rollback_resistant = true,
            KeymasterTag::RootOfTrust => self.root_of_trust = Some(RootOfTrust::from_asn1(value)?),
            KeymasterTag::OsVersion => self.os_version = Some(integer_from(value)?),
            KeymasterTag::OsPatchLevel => self.os_patch_level = Some(integer_from(value)?),
            KeymasterTag::AttestationApplicationId => {
                // An OCTET STRING holding the DER encoding
                let encoded = bytes_from(value)?;
                let id = AttestationApplicationId::from_asn1(&encodable_from_bytes(&encoded)?)?;
                self.attestation_application_id = Some(id);
            }
            KeymasterTag::AttestationIdBrand => self.brand = Some(utf8_string_from(value)?),
            KeymasterTag::AttestationIdDevice => self.device = Some(utf8_string_from(value)?),
            KeymasterTag::AttestationIdProduct => self.product = Some(utf8_string_from(value)?),
            KeymasterTag::AttestationIdSerial => {
                self.serial_number = Some(utf8_string_from(value)?)
            }
            KeymasterTag::AttestationIdImei => self.imei = Some(utf8_string_from(value)?),
            KeymasterTag::AttestationIdMeid => self.meid = Some(utf8_string_from(value)?),
            KeymasterTag::AttestationIdManufacturer => {
                self.manufacturer = Some(utf8_string_from(value)?)
            }
            KeymasterTag::AttestationIdModel => self.model = Some(utf8_string_from(value)?),
            KeymasterTag::VendorPatchLevel => self.vendor_patch_level = Some(integer_from(value)?),
            KeymasterTag::BootPatchLevel => self.boot_patch_level = Some(integer_from(value)?),
        }
        Ok(())
    }

    /// `None` when the tag was absent; an empty SET is still `Some`.
    pub fn purposes(&self) -> Option<&BTreeSet<i32>> {
        self.purposes.as_ref()
    }

    pub fn algorithm(&self) -> Option<i32> {
        self.algorithm
    }

    pub fn key_size(&self) -> Option<i32> {
        self.key_size
    }

    pub fn digests(&self) -> Option<&BTreeSet<i32>> {
        self.digests.as_ref()
    }

    pub fn padding_modes(&self) -> Option<&BTreeSet<i32>> {
        self.padding_modes.as_ref()
    }

    /// Maps the padding modes to the names Android's `KeyProperties` uses.
    pub fn padding_modes_as_strings(&self) -> Result<Vec<&'static str>> {
        self.padding_modes
            .iter()
            .flatten()
            .map(|&mode| match mode {
                KM_PAD_NONE => Ok("NoPadding"),
                KM_PAD_RSA_OAEP => Ok("OAEPPadding"),
                KM_PAD_RSA_PKCS1_1_5_ENCRYPT => Ok("PKCS1Padding"),
                KM_PAD_RSA_PKCS1_1_5_SIGN => Ok("PKCS1"),
                KM_PAD_RSA_PSS => Ok("PSS"),
                other => Err(AttestationError::InvalidPaddingMode(other)),
            })
            .collect()
    }

    pub fn ec_curve(&self) -> Option<i32> {
        self.ec_curve
    }

    /// The curve name, or `"NULL"` when no curve was attested.
    pub fn ec_curve_as_string(&self) -> &'static str {
        self.ec_curve.map_or("NULL", names::ec_curve_to_string)
    }

    pub fn rsa_public_exponent(&self) -> Option<i64> {
        self.rsa_public_exponent
    }

    pub fn active_date_time(&self) -> Option<Timestamp> {
        self.active_date_time
    }

    pub fn origination_expire_date_time(&self) -> Option<Timestamp> {
        self.origination_expire_date_time
    }

    pub fn usage_expire_date_time(&self) -> Option<Timestamp> {
        self.usage_expire_date_time
    }

    pub fn is_no_auth_required(&self) -> bool {
        self.no_auth_required
    }

    pub fn user_auth_type(&self) -> Option<i32> {
        self.user_auth_type
    }

    pub fn auth_timeout(&self) -> Option<i32> {
        self.auth_timeout
    }

    pub fn is_allow_while_on_body(&self) -> bool {
        self.allow_while_on_body
    }

    pub fn is_all_applications(&self) -> bool {
        self.all_applications
    }

    pub fn application_id(&self) -> Option<&[u8]> {
        self.application_id.as_deref()
    }

    pub fn creation_date_time(&self) -> Option<Timestamp> {
        self.creation_date_time
    }

    pub fn origin(&self) -> Option<i32> {
        self.origin
    }

    pub fn is_rollback_resistant(&self) -> bool {
        self.rollback_resistant
    }

    pub fn root_of_trust(&self) -> Option<&RootOfTrust> {
        self.root_of_trust.as_ref()
    }

    pub fn os_version(&self) -> Option<i32> {
        self.os_version
    }

    pub fn os_patch_level(&self) -> Option<i32> {
        self.os_patch_level
    }

    pub fn vendor_patch_level(&self) -> Option<i32> {
        self.vendor_patch_level
    }

    pub fn boot_patch_level(&self) -> Option<i32> {
        self.boot_patch_level
    }

    pub fn attestation_application_id(&self) -> Option<&AttestationApplicationId> {
        self.attestation_application_id.as_ref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn product(&self) -> Option<&str> {
        self.product.as_deref()
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub fn imei(&self) -> Option<&str> {
        self.imei.as_deref()
    }

    pub fn meid(&self) -> Option<&str> {
        self.meid.as_deref()
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn is_user_presence_required(&self) -> bool {
        self.user_presence_required
    }

    pub fn is_confirmation_required(&self) -> bool {
        self.confirmation_required
    }
}

fn non_empty(set: &Option<BTreeSet<i32>>) -> Option<&BTreeSet<i32>> {
    set.as_ref().filter(|set| !set.is_empty())
}

/// One line per present field, each starting with a newline.
impl fmt::Display for AuthorizationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(algorithm) = self.algorithm {
            write!(f, "\nAlgorithm: {}", names::algorithm_to_string(algorithm))?;
        }
        if let Some(key_size) = self.key_size {
            write!(f, "\nKeySize: {key_size}")?;
        }
        if let Some(purposes) = non_empty(&self.purposes) {
            let purposes = purposes.iter().map(|&p| names::purpose_to_string(p));
            write!(f, "\nPurposes: {}", join_strings(purposes))?;
        }
        if let Some(digests) = non_empty(&self.digests) {
            let digests = digests.iter().map(|&d| names::digest_to_string(d));
            write!(f, "\nDigests: {}", join_strings(digests))?;
        }
        if let Some(modes) = non_empty(&self.padding_modes) {
            let modes = modes.iter().map(|&p| names::padding_mode_to_string(p));
            write!(f, "\nPadding modes: {}", join_strings(modes))?;
        }
        if self.ec_curve.is_some() {
            write!(f, "\nEC Curve: {}", self.ec_curve_as_string())?;
        }
        if let Some(exponent) = self.rsa_public_exponent {
            write!(f, "\nRSA exponent: {exponent}")?;
        }
        if let Some(time) = self.active_date_time {
            write!(f, "\nActive: {time}")?;
        }
        if let Some(time) = self.origination_expire_date_time {
            write!(f, "\nOrigination expire: {time}")?;
        }
        if let Some(time) = self.usage_expire_date_time {
            write!(f, "\nUsage expire: {time}")?;
        }
        if let (false, Some(auth_type)) = (self.no_auth_required, self.user_auth_type) {
            write!(
                f,
                "\nAuth types: {}",
                names::user_auth_type_to_string(auth_type)
            )?;
            if let Some(timeout) = self.auth_timeout {
                write!(f, "\nAuth timeout: {timeout}")?;
            }
        }
        if let Some(application_id) = &self.application_id {
            write!(
                f,
                "\nApplication ID: {}",
                String::from_utf8_lossy(application_id)
            )?;
        }
        if let Some(time) = self.creation_date_time {
            write!(f, "\nCreated: {time}")?;
        }
        if let Some(origin) = self.origin {
            write!(f, "\nOrigin: {}", names::origin_to_string(origin))?;
        }
        if self.rollback_resistant {
            f.write_str("\nRollback resistant: true")?;
        }
        if let Some(root_of_trust) = &self.root_of_trust {
            write!(f, "\nRoot of Trust:\n{root_of_trust}")?;
        }
        if let Some(version) = self.os_version {
            write!(f, "\nOS Version: {version}")?;
        }
        if let Some(level) = self.os_patch_level {
            write!(f, "\nOS Patchlevel: {level}")?;
        }
        if let Some(level) = self.vendor_patch_level {
            write!(f, "\nVendor Patchlevel: {level}")?;
        }
        if let Some(level) = self.boot_patch_level {
            write!(f, "\nBoot Patchlevel: {level}")?;
        }
        if let Some(id) = &self.attestation_application_id {
            write!(f, "\nAttestation Application Id:{id}")?;
        }
        if self.user_presence_required {
            f.write_str("\nUser presence required")?;
        }
        if self.confirmation_required {
            f.write_str("\nConfirmation required")?;
        }

        let ids = [
            ("Brand", &self.brand),
            ("Device type", &self.device),
            ("Product", &self.product),
            ("Serial", &self.serial_number),
            ("IMEI", &self.imei),
            ("MEID", &self.meid),
            ("Manufacturer", &self.manufacturer),
            ("Model", &self.model),
        ];
        for (label, value) in ids {
            if let Some(value) = value {
                write!(f, "\n{label}: {value}")?;
            }
        }
        Ok(())
    }
}
