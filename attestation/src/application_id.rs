// Licensed under the Apache-2.0 license

//! `KM_TAG_ATTESTATION_APPLICATION_ID`: the packages and signing certificates
//! of the app that requested the attestation.
//!
//! Both lists are kept sorted so that two ids compare equal exactly when they
//! name the same packages and digests.

use core::cmp::Ordering;
use core::fmt;

use crate::asn1::decode::{
    bytes_from, element_at, long_from, sequence_from, set_from, utf8_string_from,
};
use crate::asn1::Asn1Value;
use crate::error::{in_field, Result};

const PACKAGE_INFOS_INDEX: usize = 0;
const SIGNATURE_DIGESTS_INDEX: usize = 1;

const PACKAGE_NAME_INDEX: usize = 0;
const VERSION_INDEX: usize = 1;

/// One package sharing the attesting app's uid.
#[derive(Debug, Clone)]
pub struct AttestationPackageInfo {
    package_name: String,
    version: i64,
}

impl AttestationPackageInfo {
    const STRUCTURE: &'static str = "AttestationPackageInfo";

    pub fn new(package_name: impl Into<String>, version: i64) -> Self {
        Self {
            package_name: package_name.into(),
            version,
        }
    }

    pub fn from_asn1(node: &Asn1Value) -> Result<Self> {
        let items = sequence_from(node).map_err(in_field(Self::STRUCTURE))?;
        let package_name =
            utf8_string_from(element_at(items, PACKAGE_NAME_INDEX, Self::STRUCTURE)?)
                .map_err(in_field("package name"))?;
        let version = long_from(element_at(items, VERSION_INDEX, Self::STRUCTURE)?)
            .map_err(in_field("package version"))?;
        Ok(Self {
            package_name,
            version,
        })
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn version(&self) -> i64 {
        self.version
    }
}

/// Names order by UTF-16 code unit, the way Android sorts package names,
/// then by version.
impl Ord for AttestationPackageInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.package_name
            .encode_utf16()
            .cmp(other.package_name.encode_utf16())
            .then(self.version.cmp(&other.version))
    }
}

impl PartialOrd for AttestationPackageInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AttestationPackageInfo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttestationPackageInfo {}

impl fmt::Display for AttestationPackageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Package name: {}\nVersion: {}",
            self.package_name, self.version
        )
    }
}

/// Orders digests by length, then bytewise as signed values.
fn compare_digests(a: &[u8], b: &[u8]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().map(|&x| x as i8).cmp(b.iter().map(|&x| x as i8)))
}

#[derive(Debug, Clone)]
pub struct AttestationApplicationId {
    package_infos: Vec<AttestationPackageInfo>,
    signature_digests: Vec<Vec<u8>>,
}

impl AttestationApplicationId {
    const STRUCTURE: &'static str = "AttestationApplicationId";

    pub fn new(
        mut package_infos: Vec<AttestationPackageInfo>,
        mut signature_digests: Vec<Vec<u8>>,
    ) -> Self {
        package_infos.sort();
        signature_digests.sort_by(|a, b| compare_digests(a, b));
        Self {
            package_infos,
            signature_digests,
        }
    }

    /// Decodes
    ///
    /// ```text
    /// AttestationApplicationId ::= SEQUENCE {
    ///     packageInfos      SET OF AttestationPackageInfo,
    ///     signatureDigests  SET OF OCTET STRING,
    /// }
    /// ```
    pub fn from_asn1(node: &Asn1Value) -> Result<Self> {
        let items = sequence_from(node).map_err(in_field(Self::STRUCTURE))?;

        let package_infos = set_from(element_at(items, PACKAGE_INFOS_INDEX, Self::STRUCTURE)?)
            .map_err(in_field("package infos"))?
            .iter()
            .map(AttestationPackageInfo::from_asn1)
            .collect::<Result<Vec<_>>>()?;

        let signature_digests =
            set_from(element_at(items, SIGNATURE_DIGESTS_INDEX, Self::STRUCTURE)?)
                .map_err(in_field("signature digests"))?
                .iter()
                .map(bytes_from)
                .collect::<Result<Vec<_>>>()
                .map_err(in_field("signature digest"))?;

        Ok(Self::new(package_infos, signature_digests))
    }

    /// Sorted by package name, then version.
    pub fn package_infos(&self) -> &[AttestationPackageInfo] {
        &self.package_infos
    }

    /// Sorted by length, then contents.
    pub fn signature_digests(&self) -> &[Vec<u8>] {
        &self.signature_digests
    }
}

impl Ord for AttestationApplicationId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.package_infos
            .len()
            .cmp(&other.package_infos.len())
            .then_with(|| self.package_infos.iter().cmp(other.package_infos.iter()))
            .then_with(|| {
                self.signature_digests
                    .len()
                    .cmp(&other.signature_digests.len())
            })
            .then_with(|| {
                self.signature_digests
                    .iter()
                    .zip(other.signature_digests.iter())
                    .map(|(a, b)| compare_digests(a, b))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

impl PartialOrd for AttestationApplicationId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AttestationApplicationId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttestationApplicationId {}

impl fmt::Display for AttestationApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AttestationApplicationId:")?;
        let infos = self.package_infos.len();
        for (i, info) in self.package_infos.iter().enumerate() {
            write!(f, "\n### Package info {}/{infos} ###\n{info}", i + 1)?;
        }
        let sigs = self.signature_digests.len();
        for (i, sig) in self.signature_digests.iter().enumerate() {
            write!(f, "\nSignature digest {}/{sigs}:", i + 1)?;
            for b in sig {
                write!(f, " {b:02X}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::{parse_single, Asn1Kind, DerWriter};
    use crate::error::AttestationError;

    fn package(w: &mut DerWriter, name: &str, version: u64) {
        w.encode_sequence(|w| {
            w.encode_octet_string(name.as_bytes());
            w.encode_integer(version);
        });
    }

    #[test]
    fn test_package_info_ordering() {
        let a = AttestationPackageInfo::new("com.foo", 3);
        let b = AttestationPackageInfo::new("com.foo", 4);
        let c = AttestationPackageInfo::new("com.bar", 9);
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a, AttestationPackageInfo::new("com.foo", 3));
        assert_ne!(a, b);
    }

    #[test]
    fn test_package_info_orders_by_utf16_units() {
        // U+1F600 is a surrogate pair starting 0xD83D, below U+FF61, although
        // its UTF-8 encoding sorts after
        let emoji = AttestationPackageInfo::new("\u{1F600}", 1);
        let halfwidth = AttestationPackageInfo::new("\u{FF61}", 1);
        assert!("\u{1F600}" > "\u{FF61}");
        assert!(emoji < halfwidth);
    }

    #[test]
    fn test_package_info_decode() {
        let mut w = DerWriter::new();
        package(&mut w, "com.afwsamples.testdpc", 9001);
        let info = AttestationPackageInfo::from_asn1(&parse_single(&w.finish()).unwrap()).unwrap();
        assert_eq!(info.package_name(), "com.afwsamples.testdpc");
        assert_eq!(info.version(), 9001);
        assert_eq!(
            info.to_string(),
            "Package name: com.afwsamples.testdpc\nVersion: 9001"
        );

        let err = AttestationPackageInfo::from_asn1(&Asn1Value::Set(vec![])).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &AttestationError::expected(Asn1Kind::Sequence, Asn1Kind::Set)
        );
    }

    #[test]
    fn test_application_id_sorts_on_decode() {
        let mut w = DerWriter::new();
        w.encode_sequence(|w| {
            w.encode_set(|w| {
                package(w, "com.zed", 1);
                package(w, "com.abc", 2);
            });
            w.encode_set(|w| {
                w.encode_octet_string(&[0x80, 0x00]);
                w.encode_octet_string(&[0x7F]);
                w.encode_octet_string(&[0x01, 0x00]);
            });
        });
        let id = AttestationApplicationId::from_asn1(&parse_single(&w.finish()).unwrap()).unwrap();

        let names: Vec<&str> = id.package_infos().iter().map(|p| p.package_name()).collect();
        assert_eq!(names, ["com.abc", "com.zed"]);
        // Shorter first; 0x80 is negative as a signed byte
        assert_eq!(
            id.signature_digests(),
            &[vec![0x7F], vec![0x80, 0x00], vec![0x01, 0x00]]
        );
    }

    #[test]
    fn test_application_id_equality_ignores_input_order() {
        let a = AttestationApplicationId::new(
            vec![
                AttestationPackageInfo::new("b", 1),
                AttestationPackageInfo::new("a", 1),
            ],
            vec![vec![2], vec![1]],
        );
        let b = AttestationApplicationId::new(
            vec![
                AttestationPackageInfo::new("a", 1),
                AttestationPackageInfo::new("b", 1),
            ],
            vec![vec![1], vec![2]],
        );
        assert_eq!(a, b);

        let fewer = AttestationApplicationId::new(vec![AttestationPackageInfo::new("z", 9)], vec![]);
        assert!(fewer < a);
    }

    #[test]
    fn test_application_id_rejects_bad_digest() {
        let mut w = DerWriter::new();
        w.encode_sequence(|w| {
            w.encode_set(|_| {});
            w.encode_set(|w| {
                w.encode_integer(1);
            });
        });
        let err =
            AttestationApplicationId::from_asn1(&parse_single(&w.finish()).unwrap()).unwrap_err();
        assert_eq!(
            err.root_cause(),
            &AttestationError::expected(Asn1Kind::OctetString, Asn1Kind::Integer)
        );
    }

    #[test]
    fn test_display() {
        let id = AttestationApplicationId::new(
            vec![AttestationPackageInfo::new("com.foo", 3)],
            vec![vec![0xDE, 0xAD]],
        );
        assert_eq!(
            id.to_string(),
            "AttestationApplicationId:\n### Package info 1/1 ###\nPackage name: com.foo\nVersion: 3\nSignature digest 1/1: DE AD"
        );
    }
}
