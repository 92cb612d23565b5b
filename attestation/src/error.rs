// Licensed under the Apache-2.0 license

use crate::asn1::{reader::DerError, Asn1Kind};
use platform::PlatformError;
use thiserror::Error;

/// Every way decoding an attestation can fail.
///
/// All variants are terminal: the first failure at any nesting depth aborts the
/// parse. Failures inside a named field are wrapped in [`AttestationError::Field`]
/// so the caller can tell which tag or position was being decoded; use
/// [`AttestationError::root_cause`] to match on the underlying variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttestationError {
    #[error("did not find extension with OID {0}")]
    MissingExtension(&'static str),

    #[error("{expected} expected, {found} found")]
    ExpectedType { expected: Asn1Kind, found: Asn1Kind },

    #[error("INTEGER out of bounds")]
    OutOfRange,

    #[error("octet string is not valid UTF-8: {0}")]
    Encoding(#[from] core::str::Utf8Error),

    #[error("unknown tag {0} found")]
    UnknownTag(u32),

    #[error("malformed {structure}: {reason}")]
    MalformedStructure {
        structure: &'static str,
        reason: String,
    },

    #[error("invalid DER: {0}")]
    Der(#[from] DerError),

    #[error("invalid padding mode {0}")]
    InvalidPaddingMode(i32),

    #[error("certificate platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("failed to parse {field}: {source}")]
    Field {
        field: &'static str,
        source: Box<AttestationError>,
    },
}

impl AttestationError {
    pub(crate) fn expected(expected: Asn1Kind, found: Asn1Kind) -> Self {
        Self::ExpectedType { expected, found }
    }

    pub(crate) fn missing_element(structure: &'static str, index: usize) -> Self {
        Self::MalformedStructure {
            structure,
            reason: format!("no element at index {index}"),
        }
    }

    /// Returns the innermost error, skipping any [`AttestationError::Field`]
    /// context wrappers.
    pub fn root_cause(&self) -> &AttestationError {
        let mut err = self;
        while let Self::Field { source, .. } = err {
            err = source;
        }
        err
    }
}

/// Attaches the name of the field being decoded to an error.
pub(crate) fn in_field(field: &'static str) -> impl FnOnce(AttestationError) -> AttestationError {
    move |source| AttestationError::Field {
        field,
        source: Box::new(source),
    }
}

pub type Result<T> = core::result::Result<T, AttestationError>;
