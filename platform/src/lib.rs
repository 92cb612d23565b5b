/*++
Licensed under the Apache-2.0 license.
Abstract:
    Generic trait definition of the certificate platform attestation records
    are read from.
--*/

use thiserror::Error;

#[cfg(feature = "rustcrypto")]
pub mod default;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum PlatformError {
    #[error("failed to decode certificate: {0}")]
    CertificateDecodeError(String),
    #[error("invalid object identifier {0:?}")]
    InvalidOidError(String),
    #[error("failed to encode extension value: {0}")]
    ExtensionEncodeError(String),
}

pub trait Platform {
    /// Retrieves the value of the certificate extension identified by `oid`.
    ///
    /// Like `X509Certificate.getExtensionValue`, the returned bytes are the
    /// DER encoding of the extension's `extnValue` OCTET STRING, wrapper
    /// included. Returns `Ok(None)` when the certificate has no such
    /// extension.
    ///
    /// # Arguments
    ///
    /// * `oid` - Dotted decimal object identifier, e.g. `1.3.6.1.4.1.11129.2.1.17`.
    fn get_extension_value(&mut self, oid: &str) -> Result<Option<Vec<u8>>, PlatformError>;
}

/// A platform that already holds one extension value, for hosts that have
/// extracted it from a certificate themselves.
#[derive(Debug, Clone)]
pub struct FixedExtension {
    oid: String,
    value: Vec<u8>,
}

impl FixedExtension {
    /// `value` must be the DER encoded OCTET STRING, as returned by
    /// [`Platform::get_extension_value`].
    pub fn new(oid: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
        }
    }
}

impl Platform for FixedExtension {
    fn get_extension_value(&mut self, oid: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        if oid == self.oid {
            Ok(Some(self.value.clone()))
        } else {
            log::debug!("No fixed extension for OID {oid}");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_extension() {
        let mut platform = FixedExtension::new("1.2.3", vec![0x04, 0x00]);
        assert_eq!(
            platform.get_extension_value("1.2.3"),
            Ok(Some(vec![0x04, 0x00]))
        );
        assert_eq!(platform.get_extension_value("1.2.4"), Ok(None));
    }
}
