// Licensed under the Apache-2.0 license

//! Conversions from decoded [`Asn1Value`] nodes to the semantic values stored
//! in attestation records.
//!
//! Every function fails with [`AttestationError::ExpectedType`] when handed a
//! node of the wrong shape; none of them fall back to a default.

use std::collections::BTreeSet;

use crate::asn1::{parse_single, Asn1Kind, Asn1Value};
use crate::error::{AttestationError, Result};
use crate::timestamp::Timestamp;

/// Reads big-endian two's complement contents as a non-negative value no
/// larger than `max`.
fn non_negative(contents: &[u8], max: u64) -> Result<u64> {
    let Some(&first) = contents.first() else {
        return Err(AttestationError::OutOfRange);
    };
    if first & 0x80 != 0 {
        return Err(AttestationError::OutOfRange);
    }

    let significant: &[u8] = match contents.iter().position(|&b| b != 0) {
        Some(start) => &contents[start..],
        None => &[],
    };
    if significant.len() > core::mem::size_of::<u64>() {
        return Err(AttestationError::OutOfRange);
    }

    let value = significant
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    if value > max {
        return Err(AttestationError::OutOfRange);
    }
    Ok(value)
}

/// Accepts an INTEGER or ENUMERATED in `0..=i32::MAX`.
pub fn integer_from(node: &Asn1Value) -> Result<i32> {
    match node {
        Asn1Value::Integer(contents) | Asn1Value::Enumerated(contents) => {
            let value = non_negative(contents, i32::MAX as u64)?;
            i32::try_from(value).map_err(|_| AttestationError::OutOfRange)
        }
        other => Err(AttestationError::expected(Asn1Kind::Integer, other.kind())),
    }
}

/// Accepts an INTEGER in `0..=i64::MAX`.
pub fn long_from(node: &Asn1Value) -> Result<i64> {
    match node {
        Asn1Value::Integer(contents) => {
            let value = non_negative(contents, i64::MAX as u64)?;
            i64::try_from(value).map_err(|_| AttestationError::OutOfRange)
        }
        other => Err(AttestationError::expected(Asn1Kind::Integer, other.kind())),
    }
}

pub fn bytes_from(node: &Asn1Value) -> Result<Vec<u8>> {
    match node {
        Asn1Value::OctetString(bytes) => Ok(bytes.clone()),
        other => Err(AttestationError::expected(
            Asn1Kind::OctetString,
            other.kind(),
        )),
    }
}

/// Attestation ID strings are carried as OCTET STRINGs holding UTF-8.
pub fn utf8_string_from(node: &Asn1Value) -> Result<String> {
    match node {
        Asn1Value::OctetString(bytes) => Ok(core::str::from_utf8(bytes)?.to_owned()),
        other => Err(AttestationError::expected(
            Asn1Kind::OctetString,
            other.kind(),
        )),
    }
}

/// Milliseconds since the Unix epoch.
pub fn date_from(node: &Asn1Value) -> Result<Timestamp> {
    long_from(node).map(Timestamp::from_millis)
}

pub fn bool_from(node: &Asn1Value) -> Result<bool> {
    match node {
        Asn1Value::Boolean(value) => Ok(*value),
        other => Err(AttestationError::expected(Asn1Kind::Boolean, other.kind())),
    }
}

/// Collects a SET of INTEGER or ENUMERATED values. Repeated values collapse.
pub fn int_set_from(node: &Asn1Value) -> Result<BTreeSet<i32>> {
    set_from(node)?.iter().map(integer_from).collect()
}

pub fn sequence_from(node: &Asn1Value) -> Result<&[Asn1Value]> {
    match node {
        Asn1Value::Sequence(items) => Ok(items),
        other => Err(AttestationError::expected(Asn1Kind::Sequence, other.kind())),
    }
}

pub fn set_from(node: &Asn1Value) -> Result<&[Asn1Value]> {
    match node {
        Asn1Value::Set(items) => Ok(items),
        other => Err(AttestationError::expected(Asn1Kind::Set, other.kind())),
    }
}

/// Parses `bytes` as an OCTET STRING whose contents are a DER SEQUENCE and
/// returns the elements of that inner SEQUENCE.
///
/// This is the shape of an X.509 extension value as returned by certificate
/// APIs: the extension's own OCTET STRING wrapper is still in place. Bytes
/// left over after either level are rejected, not ignored.
pub fn sequence_from_bytes(bytes: &[u8]) -> Result<Vec<Asn1Value>> {
    let inner = match parse_single(bytes)? {
        Asn1Value::OctetString(inner) => inner,
        other => {
            return Err(AttestationError::expected(
                Asn1Kind::OctetString,
                other.kind(),
            ))
        }
    };

    match parse_single(&inner)? {
        Asn1Value::Sequence(items) => Ok(items),
        other => Err(AttestationError::expected(Asn1Kind::Sequence, other.kind())),
    }
}

/// Parses `bytes` as exactly one DER value; trailing bytes are an error.
pub fn encodable_from_bytes(bytes: &[u8]) -> Result<Asn1Value> {
    Ok(parse_single(bytes)?)
}

/// Fetches a positional element of a fixed-shape SEQUENCE.
pub(crate) fn element_at<'a>(
    items: &'a [Asn1Value],
    index: usize,
    structure: &'static str,
) -> Result<&'a Asn1Value> {
    items
        .get(index)
        .ok_or_else(|| AttestationError::missing_element(structure, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::{DerError, DerWriter};

    fn encode(f: impl FnOnce(&mut DerWriter)) -> Asn1Value {
        let mut w = DerWriter::new();
        f(&mut w);
        parse_single(&w.finish()).unwrap()
    }

    #[test]
    fn test_integer_from_bounds() {
        for n in [0u64, 1, 127, 128, 0xFFFF, i32::MAX as u64] {
            let node = encode(|w| {
                w.encode_integer(n);
            });
            assert_eq!(integer_from(&node).unwrap() as u64, n);
        }

        let too_big = encode(|w| {
            w.encode_integer(i32::MAX as u64 + 1);
        });
        assert_eq!(integer_from(&too_big), Err(AttestationError::OutOfRange));

        // -1
        let negative = encode(|w| {
            w.encode_primitive(DerWriter::INTEGER_TAG, &[0xFF]);
        });
        assert_eq!(integer_from(&negative), Err(AttestationError::OutOfRange));
    }

    #[test]
    fn test_integer_from_accepts_enumerated() {
        let node = encode(|w| {
            w.encode_enumerated(2);
        });
        assert_eq!(integer_from(&node).unwrap(), 2);
        assert_eq!(
            long_from(&node),
            Err(AttestationError::expected(
                Asn1Kind::Integer,
                Asn1Kind::Enumerated
            ))
        );
    }

    #[test]
    fn test_long_from_bounds() {
        let node = encode(|w| {
            w.encode_integer(i64::MAX as u64);
        });
        assert_eq!(long_from(&node).unwrap(), i64::MAX);

        let node = encode(|w| {
            w.encode_integer(u64::MAX);
        });
        assert_eq!(long_from(&node), Err(AttestationError::OutOfRange));

        // Redundant leading zeros still fit
        let node = Asn1Value::Integer(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01]);
        assert_eq!(long_from(&node).unwrap(), 1);

        let node = Asn1Value::Integer(vec![0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(long_from(&node), Err(AttestationError::OutOfRange));
    }

    #[test]
    fn test_strings() {
        let node = encode(|w| {
            w.encode_octet_string(b"google");
        });
        assert_eq!(bytes_from(&node).unwrap(), b"google".to_vec());
        assert_eq!(utf8_string_from(&node).unwrap(), "google");

        let bad = Asn1Value::OctetString(vec![0xC3, 0x28]);
        assert!(matches!(
            utf8_string_from(&bad),
            Err(AttestationError::Encoding(_))
        ));

        assert_eq!(
            bytes_from(&Asn1Value::Null),
            Err(AttestationError::expected(
                Asn1Kind::OctetString,
                Asn1Kind::Null
            ))
        );
    }

    #[test]
    fn test_date_and_bool() {
        let node = encode(|w| {
            w.encode_integer(1_500_000_000_000);
        });
        assert_eq!(
            date_from(&node).unwrap(),
            Timestamp::from_millis(1_500_000_000_000)
        );

        assert!(bool_from(&Asn1Value::Boolean(true)).unwrap());
        assert_eq!(
            bool_from(&Asn1Value::Integer(vec![1])),
            Err(AttestationError::expected(
                Asn1Kind::Boolean,
                Asn1Kind::Integer
            ))
        );
    }

    #[test]
    fn test_int_set_collapses_duplicates() {
        let node = encode(|w| {
            w.encode_set(|w| {
                w.encode_integer(3);
                w.encode_integer(2);
                w.encode_integer(3);
            });
        });
        assert_eq!(int_set_from(&node).unwrap(), BTreeSet::from([2, 3]));

        let node = encode(|w| {
            w.encode_sequence(|w| {
                w.encode_integer(3);
            });
        });
        assert_eq!(
            int_set_from(&node),
            Err(AttestationError::expected(Asn1Kind::Set, Asn1Kind::Sequence))
        );
    }

    #[test]
    fn test_sequence_from_bytes_unwraps_octet_string() {
        let mut w = DerWriter::new();
        w.encode_octet_string_with(|w| {
            w.encode_sequence(|w| {
                w.encode_integer(3);
                w.encode_null();
            });
        });
        let items = sequence_from_bytes(&w.finish()).unwrap();
        assert_eq!(items, vec![Asn1Value::Integer(vec![3]), Asn1Value::Null]);

        // A bare SEQUENCE is missing the extension wrapper
        let mut w = DerWriter::new();
        w.encode_sequence(|_| {});
        assert_eq!(
            sequence_from_bytes(&w.finish()),
            Err(AttestationError::expected(
                Asn1Kind::OctetString,
                Asn1Kind::Sequence
            ))
        );

        // OCTET STRING wrapping something other than a SEQUENCE
        let mut w = DerWriter::new();
        w.encode_octet_string_with(|w| {
            w.encode_set(|_| {});
        });
        assert_eq!(
            sequence_from_bytes(&w.finish()),
            Err(AttestationError::expected(
                Asn1Kind::Sequence,
                Asn1Kind::Set
            ))
        );

        // OCTET STRING wrapping bytes that are not DER at all
        let mut w = DerWriter::new();
        w.encode_octet_string(&[0x30, 0x05]);
        assert_eq!(
            sequence_from_bytes(&w.finish()),
            Err(AttestationError::Der(DerError::Invalid(
                "ASN.1 parsing error: short data".into()
            )))
        );
    }

    #[test]
    fn test_encodable_from_bytes() {
        let mut w = DerWriter::new();
        w.encode_set(|w| {
            w.encode_null();
        });
        assert_eq!(
            encodable_from_bytes(&w.finish()).unwrap(),
            Asn1Value::Set(vec![Asn1Value::Null])
        );
        assert_eq!(
            encodable_from_bytes(&[0x05, 0x00, 0x00]),
            Err(AttestationError::Der(DerError::Invalid(
                "ASN.1 parsing error: extra data".into()
            )))
        );
    }

    #[test]
    fn test_element_at() {
        let items = [Asn1Value::Null];
        assert_eq!(element_at(&items, 0, "RootOfTrust").unwrap(), &Asn1Value::Null);
        assert_eq!(
            element_at(&items, 1, "RootOfTrust"),
            Err(AttestationError::missing_element("RootOfTrust", 1))
        );
    }
}
