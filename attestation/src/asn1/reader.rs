// Licensed under the Apache-2.0 license

//! DER decoding into an owned [`Asn1Value`] tree
//!
//! Framing and content checks come from the `asn1` crate's TLV parser, which
//! enforces DER: minimal tags and lengths, canonical BOOLEAN and INTEGER
//! contents and no trailing data. This module only classifies each TLV and
//! recurses into constructed values.

use crate::asn1::{Asn1Value, Tag, TagClass};
use asn1::{BigInt, Null, ParseError, ParseErrorKind, Tlv};
use log::trace;
use thiserror::Error;

/// Deepest nesting of constructed values the reader accepts.
pub const MAX_DEPTH: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerError {
    /// The input is not valid DER.
    #[error("{0}")]
    Invalid(String),
    #[error("values nested deeper than {}", MAX_DEPTH)]
    TooDeep,
}

impl From<ParseError> for DerError {
    fn from(e: ParseError) -> Self {
        DerError::Invalid(e.to_string())
    }
}

/// Reads the identifier octets of a TLV the parser has already validated.
fn identifier(tlv: &Tlv<'_>) -> Tag {
    let header = tlv.full_data();
    let first = header.first().copied().unwrap_or_default();

    let mut number = u32::from(first & 0x1F);
    if number == 0x1F {
        // High-tag-number form, e.g. keymaster tag 709
        number = 0;
        for byte in header.iter().skip(1) {
            number = (number << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                break;
            }
        }
    }

    Tag {
        class: TagClass::from_bits(first),
        constructed: first & 0x20 != 0,
        number,
    }
}

fn read_value(tlv: Tlv<'_>, depth: usize) -> Result<Asn1Value, DerError> {
    if depth > MAX_DEPTH {
        return Err(DerError::TooDeep);
    }

    let tag = identifier(&tlv);
    let contents = tlv.data();
    trace!(
        "DER value at depth {depth}: {:?} [{}] constructed={} len={}",
        tag.class,
        tag.number,
        tag.constructed,
        contents.len()
    );

    let value = match (tag.class, tag.constructed, tag.number) {
        (TagClass::Universal, false, Tag::BOOLEAN) => Asn1Value::Boolean(tlv.parse::<bool>()?),
        (TagClass::Universal, false, Tag::INTEGER) => {
            Asn1Value::Integer(tlv.parse::<BigInt<'_>>()?.as_bytes().to_vec())
        }
        (TagClass::Universal, false, Tag::ENUMERATED) => {
            // Same minimal two's complement rules as INTEGER
            let value = BigInt::new(contents)
                .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidValue))?;
            Asn1Value::Enumerated(value.as_bytes().to_vec())
        }
        (TagClass::Universal, false, Tag::OCTET_STRING) => {
            Asn1Value::OctetString(tlv.parse::<&[u8]>()?.to_vec())
        }
        (TagClass::Universal, false, Tag::NULL) => {
            tlv.parse::<Null>()?;
            Asn1Value::Null
        }
        (TagClass::Universal, true, Tag::SEQUENCE) => {
            Asn1Value::Sequence(read_children(contents, depth + 1)?)
        }
        (TagClass::Universal, true, Tag::SET) => {
            Asn1Value::Set(read_children(contents, depth + 1)?)
        }
        (TagClass::ContextSpecific, true, number) => {
            let inner = asn1::parse_single::<Tlv<'_>>(contents)?;
            Asn1Value::Tagged {
                number,
                inner: Box::new(read_value(inner, depth + 1)?),
            }
        }
        _ => Asn1Value::Other {
            tag,
            contents: contents.to_vec(),
        },
    };

    Ok(value)
}

fn read_children(contents: &[u8], depth: usize) -> Result<Vec<Asn1Value>, DerError> {
    let tlvs = asn1::parse(contents, |p| {
        let mut tlvs = Vec::new();
        while !p.is_empty() {
            tlvs.push(p.read_element::<Tlv<'_>>()?);
        }
        Ok::<_, ParseError>(tlvs)
    })?;
    tlvs.into_iter().map(|tlv| read_value(tlv, depth)).collect()
}

/// Parses `data` as exactly one DER value. Trailing bytes are an error.
pub fn parse_single(data: &[u8]) -> Result<Asn1Value, DerError> {
    let tlv = asn1::parse_single::<Tlv<'_>>(data)?;
    read_value(tlv, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::OctetString;
    use der::Encode;

    fn rejection(data: &[u8]) -> String {
        match parse_single(data).unwrap_err() {
            DerError::Invalid(msg) => msg,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_primitives() {
        assert_eq!(
            parse_single(&[0x01, 0x01, 0xFF]).unwrap(),
            Asn1Value::Boolean(true)
        );
        assert_eq!(
            parse_single(&[0x01, 0x01, 0x00]).unwrap(),
            Asn1Value::Boolean(false)
        );
        assert_eq!(
            parse_single(&[0x02, 0x02, 0x00, 0x80]).unwrap(),
            Asn1Value::Integer(vec![0x00, 0x80])
        );
        assert_eq!(
            parse_single(&[0x02, 0x01, 0xFF]).unwrap(),
            Asn1Value::Integer(vec![0xFF])
        );
        assert_eq!(
            parse_single(&[0x0A, 0x01, 0x03]).unwrap(),
            Asn1Value::Enumerated(vec![0x03])
        );
        assert_eq!(parse_single(&[0x05, 0x00]).unwrap(), Asn1Value::Null);
    }

    #[test]
    fn test_der_crate_encodings() {
        let octets = OctetString::new(vec![0xAA; 200]).unwrap().to_der().unwrap();
        assert_eq!(
            parse_single(&octets).unwrap(),
            Asn1Value::OctetString(vec![0xAA; 200])
        );

        let seq = vec![1u32, 2u32, 3u32].to_der().unwrap();
        assert_eq!(
            parse_single(&seq).unwrap(),
            Asn1Value::Sequence(vec![
                Asn1Value::Integer(vec![1]),
                Asn1Value::Integer(vec![2]),
                Asn1Value::Integer(vec![3]),
            ])
        );
    }

    #[test]
    fn test_high_tag_number() {
        // [709] EXPLICIT NULL
        let data = [0xBF, 0x85, 0x45, 0x02, 0x05, 0x00];
        assert_eq!(
            parse_single(&data).unwrap(),
            Asn1Value::Tagged {
                number: 709,
                inner: Box::new(Asn1Value::Null),
            }
        );

        // [31] is the smallest number that needs the long form
        let data = [0xBF, 0x1F, 0x03, 0x02, 0x01, 0x07];
        assert_eq!(
            parse_single(&data).unwrap(),
            Asn1Value::Tagged {
                number: 31,
                inner: Box::new(Asn1Value::Integer(vec![0x07])),
            }
        );
    }

    #[test]
    fn test_explicit_tag_must_wrap_one_value() {
        assert_eq!(rejection(&[0xA1, 0x00]), "ASN.1 parsing error: short data");
        assert_eq!(
            rejection(&[0xA1, 0x04, 0x05, 0x00, 0x05, 0x00]),
            "ASN.1 parsing error: extra data"
        );
    }

    #[test]
    fn test_framing_errors() {
        assert_eq!(rejection(&[]), "ASN.1 parsing error: short data");
        assert_eq!(
            rejection(&[0x04, 0x05, 0x00]),
            "ASN.1 parsing error: short data"
        );
        assert_eq!(
            rejection(&[0x30, 0x80, 0x00, 0x00]),
            "ASN.1 parsing error: invalid length"
        );
        assert_eq!(
            rejection(&[0x04, 0x85, 0, 0, 0, 0, 1]),
            "ASN.1 parsing error: invalid length"
        );
        assert_eq!(
            rejection(&[0x05, 0x00, 0x05, 0x00]),
            "ASN.1 parsing error: extra data"
        );
        assert_eq!(
            rejection(&[0xBF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F, 0x00]),
            "ASN.1 parsing error: invalid tag"
        );
        // SEQUENCE { OCTET STRING claiming 4 bytes but holding 1 }
        assert_eq!(
            rejection(&[0x30, 0x03, 0x04, 0x04, 0xAA]),
            "ASN.1 parsing error: short data"
        );
    }

    #[test]
    fn test_rejects_non_canonical_encodings() {
        // [2] in the long form
        assert_eq!(
            rejection(&[0x30, 0x06, 0xBF, 0x02, 0x03, 0x02, 0x01, 0x03]),
            "ASN.1 parsing error: invalid tag"
        );
        // Length 1 in the long form
        assert_eq!(
            rejection(&[0x04, 0x81, 0x01, 0xAA]),
            "ASN.1 parsing error: invalid length"
        );
        // BOOLEAN TRUE must be 0xFF
        assert_eq!(
            rejection(&[0x01, 0x01, 0x01]),
            "ASN.1 parsing error: invalid value"
        );
        assert_eq!(
            rejection(&[0x01, 0x02, 0x00, 0x00]),
            "ASN.1 parsing error: invalid value"
        );
        // Redundant leading zero and empty contents
        assert_eq!(
            rejection(&[0x02, 0x02, 0x00, 0x01]),
            "ASN.1 parsing error: invalid value"
        );
        assert_eq!(rejection(&[0x02, 0x00]), "ASN.1 parsing error: invalid value");
        assert_eq!(
            rejection(&[0x0A, 0x02, 0xFF, 0x80]),
            "ASN.1 parsing error: invalid value"
        );
        assert_eq!(
            rejection(&[0x05, 0x01, 0x00]),
            "ASN.1 parsing error: invalid value"
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut data = vec![0x05, 0x00];
        for _ in 0..=MAX_DEPTH {
            let mut wrapped = vec![0x30, data.len() as u8];
            wrapped.extend_from_slice(&data);
            data = wrapped;
        }
        assert_eq!(parse_single(&data), Err(DerError::TooDeep));
    }

    #[test]
    fn test_unused_types_kept_raw() {
        // UTF8String "hi"
        let value = parse_single(&[0x0C, 0x02, b'h', b'i']).unwrap();
        assert_eq!(
            value,
            Asn1Value::Other {
                tag: Tag::universal(0x0C, false),
                contents: b"hi".to_vec(),
            }
        );
    }
}
