// Licensed under the Apache-2.0 license

//! DER encoding routines for building attestation extensions
//!
//! Used by the tools to emit sample extensions and by tests to build fixtures.
//! Constructed values are written through closures so lengths never need to be
//! computed up front.

/// Writes DER values into a growable buffer.
#[derive(Default)]
pub struct DerWriter {
    buf: Vec<u8>,
}

impl DerWriter {
    pub const BOOL_TAG: u8 = 0x1;
    pub const INTEGER_TAG: u8 = 0x2;
    pub const BIT_STRING_TAG: u8 = 0x3;
    pub const OCTET_STRING_TAG: u8 = 0x4;
    pub const NULL_TAG: u8 = 0x5;
    pub const OID_TAG: u8 = 0x6;
    pub const ENUMERATED_TAG: u8 = 0xA;
    pub const UTC_TIME_TAG: u8 = 0x17;
    pub const SEQUENCE_TAG: u8 = 0x30;
    pub const SET_OF_TAG: u8 = 0x31;

    // Constants for setting tag bits
    const CONTEXT_SPECIFIC: u8 = 0x80; // Used for Implicit/Explicit tags
    const CONSTRUCTED: u8 = 0x20; // SET{OF} and SEQUENCE{OF} have this bit set
    const HIGH_TAG_NUMBER: u8 = 0x1F;

    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the writer, returning everything written so far
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Calculate the number of bytes the ASN.1 size field will be
    fn get_size_width(size: usize) -> usize {
        if size <= 127 {
            1
        } else {
            let significant = (usize::BITS - size.leading_zeros()).div_ceil(8) as usize;
            1 + significant
        }
    }

    /// Calculate the number of content bytes of an unsigned big-endian
    /// integer once leading zeros are stripped and a sign byte is added
    fn get_integer_bytes_size(integer: &[u8]) -> usize {
        let mut len = integer.len();
        for (i, &byte) in integer.iter().enumerate() {
            if byte == 0 && i != integer.len() - 1 {
                len -= 1;
            } else if (byte & 0x80) != 0 {
                len += 1;
                break;
            } else {
                break;
            }
        }
        len
    }

    fn encode_byte(&mut self, byte: u8) -> usize {
        self.buf.push(byte);
        1
    }

    fn encode_bytes(&mut self, bytes: &[u8]) -> usize {
        self.buf.extend_from_slice(bytes);
        bytes.len()
    }

    /// DER-encodes the tag field of an ASN.1 type
    fn encode_tag_field(&mut self, tag: u8) -> usize {
        self.encode_byte(tag)
    }

    /// DER-encodes an identifier whose number may need the high-tag-number form
    fn encode_numbered_tag_field(&mut self, leading: u8, number: u32) -> usize {
        if number < u32::from(Self::HIGH_TAG_NUMBER) {
            // PANIC FREE: number < 31
            return self.encode_byte(leading | number as u8);
        }

        let mut bytes_written = self.encode_byte(leading | Self::HIGH_TAG_NUMBER);
        let groups = (u32::BITS - number.leading_zeros()).div_ceil(7);
        for i in (0..groups).rev() {
            let mut byte = ((number >> (i * 7)) & 0x7F) as u8;
            if i != 0 {
                byte |= 0x80;
            }
            bytes_written += self.encode_byte(byte);
        }
        bytes_written
    }

    /// DER-encodes the size field of an ASN.1 type
    fn encode_size_field(&mut self, size: usize) -> usize {
        let size_width = Self::get_size_width(size);

        if size_width == 1 {
            self.encode_byte(size as u8);
        } else {
            let rem = size_width - 1;
            self.encode_byte(0x80 | rem as u8);

            for i in (0..rem).rev() {
                self.encode_byte((size >> (i * 8)) as u8);
            }
        }

        size_width
    }

    /// DER-encodes a primitive value with raw `contents`
    pub fn encode_primitive(&mut self, tag: u8, contents: &[u8]) -> usize {
        let mut bytes_written = self.encode_tag_field(tag);
        bytes_written += self.encode_size_field(contents.len());
        bytes_written += self.encode_bytes(contents);
        bytes_written
    }

    fn encode_integer_like(&mut self, tag: u8, integer: &[u8]) -> usize {
        let integer = if integer.is_empty() { &[0u8][..] } else { integer };
        let mut bytes_written = self.encode_tag_field(tag);

        let size = Self::get_integer_bytes_size(integer);
        bytes_written += self.encode_size_field(size);

        // Compute where to start reading from integer (strips leading zeros)
        let integer_offset = integer.len().saturating_sub(size);

        // If size got larger it is because a null byte needs to be prepended
        if size > integer.len() {
            bytes_written += self.encode_byte(0);
        }

        bytes_written += self.encode_bytes(&integer[integer_offset..]);
        bytes_written
    }

    /// DER-encodes a big-endian unsigned integer buffer as an ASN.1 INTEGER
    pub fn encode_integer_bytes(&mut self, integer: &[u8]) -> usize {
        self.encode_integer_like(Self::INTEGER_TAG, integer)
    }

    /// DER-encodes `integer` as an ASN.1 INTEGER
    pub fn encode_integer(&mut self, integer: u64) -> usize {
        self.encode_integer_bytes(&integer.to_be_bytes())
    }

    /// DER-encodes `value` as an ASN.1 ENUMERATED
    pub fn encode_enumerated(&mut self, value: u64) -> usize {
        self.encode_integer_like(Self::ENUMERATED_TAG, &value.to_be_bytes())
    }

    pub fn encode_bool(&mut self, value: bool) -> usize {
        self.encode_primitive(Self::BOOL_TAG, &[if value { 0xFF } else { 0x00 }])
    }

    pub fn encode_null(&mut self) -> usize {
        self.encode_primitive(Self::NULL_TAG, &[])
    }

    pub fn encode_octet_string(&mut self, bytes: &[u8]) -> usize {
        self.encode_primitive(Self::OCTET_STRING_TAG, bytes)
    }

    /// DER-encodes `oid` (already in content form) as an ASN.1 ObjectIdentifier
    pub fn encode_oid(&mut self, oid: &[u8]) -> usize {
        self.encode_primitive(Self::OID_TAG, oid)
    }

    /// DER-encodes `bytes` as a BIT STRING with no unused bits
    pub fn encode_bit_string(&mut self, bytes: &[u8]) -> usize {
        let mut bytes_written = self.encode_tag_field(Self::BIT_STRING_TAG);
        bytes_written += self.encode_size_field(bytes.len() + 1);
        bytes_written += self.encode_byte(0);
        bytes_written += self.encode_bytes(bytes);
        bytes_written
    }

    /// DER-encodes a UTCTime such as `b"250101000000Z"`
    pub fn encode_utc_time(&mut self, time: &[u8]) -> usize {
        self.encode_primitive(Self::UTC_TIME_TAG, time)
    }

    fn encode_constructed(&mut self, tag_bytes: &[u8], f: impl FnOnce(&mut DerWriter)) -> usize {
        let mut inner = DerWriter::new();
        f(&mut inner);

        let mut bytes_written = self.encode_bytes(tag_bytes);
        bytes_written += self.encode_size_field(inner.len());
        bytes_written += self.encode_bytes(&inner.buf);
        bytes_written
    }

    /// DER-encodes a SEQUENCE whose elements are written by `f`
    pub fn encode_sequence(&mut self, f: impl FnOnce(&mut DerWriter)) -> usize {
        self.encode_constructed(&[Self::SEQUENCE_TAG], f)
    }

    /// DER-encodes a SET whose elements are written by `f`
    ///
    /// Elements are written in the order given; DER requires the caller to
    /// supply them sorted by encoding.
    pub fn encode_set(&mut self, f: impl FnOnce(&mut DerWriter)) -> usize {
        self.encode_constructed(&[Self::SET_OF_TAG], f)
    }

    /// DER-encodes an OCTET STRING whose contents are the DER written by `f`
    pub fn encode_octet_string_with(&mut self, f: impl FnOnce(&mut DerWriter)) -> usize {
        self.encode_constructed(&[Self::OCTET_STRING_TAG], f)
    }

    /// DER-encodes `[number] EXPLICIT` around the value written by `f`
    pub fn encode_explicit(&mut self, number: u32, f: impl FnOnce(&mut DerWriter)) -> usize {
        let mut tag = DerWriter::new();
        tag.encode_numbered_tag_field(Self::CONTEXT_SPECIFIC | Self::CONSTRUCTED, number);
        self.encode_constructed(&tag.buf, f)
    }
}
