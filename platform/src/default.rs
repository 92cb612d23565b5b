// Licensed under the Apache-2.0 license

use crate::{Platform, PlatformError};
use log::debug;
use x509_cert::{
    certificate::Certificate,
    der::{asn1::ObjectIdentifier, Decode, DecodePem, Encode},
};

/// Reads extensions out of one parsed X.509 certificate.
pub struct CertificatePlatform {
    cert: Certificate,
}

impl CertificatePlatform {
    pub fn new(cert: Certificate) -> Self {
        Self { cert }
    }

    pub fn from_der(der: &[u8]) -> Result<Self, PlatformError> {
        Certificate::from_der(der)
            .map(Self::new)
            .map_err(|e| PlatformError::CertificateDecodeError(e.to_string()))
    }

    /// Parses the first certificate of a PEM document.
    pub fn from_pem(pem: &[u8]) -> Result<Self, PlatformError> {
        Certificate::from_pem(pem)
            .map(Self::new)
            .map_err(|e| PlatformError::CertificateDecodeError(e.to_string()))
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }
}

impl Platform for CertificatePlatform {
    fn get_extension_value(&mut self, oid: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        let oid =
            ObjectIdentifier::new(oid).map_err(|_| PlatformError::InvalidOidError(oid.into()))?;

        let Some(extensions) = &self.cert.tbs_certificate.extensions else {
            debug!("Certificate has no extensions");
            return Ok(None);
        };

        extensions
            .iter()
            .find(|ext| ext.extn_id == oid)
            .map(|ext| {
                ext.extn_value
                    .to_der()
                    .map_err(|e| PlatformError::ExtensionEncodeError(e.to_string()))
            })
            .transpose()
    }
}
