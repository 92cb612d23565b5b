// Licensed under the Apache-2.0 license

//! Minimal ASN.1 DER support for key attestation records
//!
//! The attestation extension uses explicit context-specific tags whose numbers
//! are keymaster tag values (e.g. 709), well past the single-byte tag form.
//! This module provides a small owned value tree, a reader that builds it from
//! the `asn1` crate's DER TLVs and a writer for producing DER fixtures.

pub mod decode;
pub mod reader;
pub mod writer;

use core::fmt;

pub use reader::{parse_single, DerError};
pub use writer::DerWriter;

/// The class bits of an identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    pub(crate) const fn from_bits(byte: u8) -> Self {
        match byte >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }
}

/// A decoded identifier: class, constructed bit and tag number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub const BOOLEAN: u32 = 0x01;
    pub const INTEGER: u32 = 0x02;
    pub const BIT_STRING: u32 = 0x03;
    pub const OCTET_STRING: u32 = 0x04;
    pub const NULL: u32 = 0x05;
    pub const OID: u32 = 0x06;
    pub const ENUMERATED: u32 = 0x0A;
    pub const UTC_TIME: u32 = 0x17;
    pub const SEQUENCE: u32 = 0x10;
    pub const SET: u32 = 0x11;

    pub const fn universal(number: u32, constructed: bool) -> Self {
        Self {
            class: TagClass::Universal,
            constructed,
            number,
        }
    }
}

/// One decoded ASN.1 value.
///
/// Children are owned by value; the tree mirrors the nesting of the encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asn1Value {
    Boolean(bool),
    /// Big-endian two's complement contents, never empty.
    Integer(Vec<u8>),
    /// Big-endian two's complement contents, never empty.
    Enumerated(Vec<u8>),
    OctetString(Vec<u8>),
    Null,
    Sequence(Vec<Asn1Value>),
    Set(Vec<Asn1Value>),
    /// An explicitly tagged context-specific value.
    Tagged { number: u32, inner: Box<Asn1Value> },
    /// Anything the attestation schema never uses, kept as raw contents.
    Other { tag: Tag, contents: Vec<u8> },
}

impl Asn1Value {
    pub fn kind(&self) -> Asn1Kind {
        match self {
            Asn1Value::Boolean(_) => Asn1Kind::Boolean,
            Asn1Value::Integer(_) => Asn1Kind::Integer,
            Asn1Value::Enumerated(_) => Asn1Kind::Enumerated,
            Asn1Value::OctetString(_) => Asn1Kind::OctetString,
            Asn1Value::Null => Asn1Kind::Null,
            Asn1Value::Sequence(_) => Asn1Kind::Sequence,
            Asn1Value::Set(_) => Asn1Kind::Set,
            Asn1Value::Tagged { .. } => Asn1Kind::TaggedObject,
            Asn1Value::Other { tag, .. } => Asn1Kind::Other(*tag),
        }
    }
}

/// The shape of an [`Asn1Value`], used in type mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asn1Kind {
    Boolean,
    Integer,
    Enumerated,
    OctetString,
    Null,
    Sequence,
    Set,
    TaggedObject,
    Other(Tag),
}

impl fmt::Display for Asn1Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asn1Kind::Boolean => f.write_str("BOOLEAN"),
            Asn1Kind::Integer => f.write_str("INTEGER"),
            Asn1Kind::Enumerated => f.write_str("ENUMERATED"),
            Asn1Kind::OctetString => f.write_str("OCTET STRING"),
            Asn1Kind::Null => f.write_str("NULL"),
            Asn1Kind::Sequence => f.write_str("SEQUENCE"),
            Asn1Kind::Set => f.write_str("SET"),
            Asn1Kind::TaggedObject => f.write_str("tagged object"),
            Asn1Kind::Other(tag) => write!(f, "{:?} tag {}", tag.class, tag.number),
        }
    }
}
