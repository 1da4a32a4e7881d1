//! Principal Kind Value Object
//!
//! The four disjoint principal variants. An id belongs to exactly one
//! variant; the identity index (`principal_index` table) enforces this and
//! resolves id → kind in O(1).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum PrincipalKind {
    Student = 0,
    Company = 1,
    Alumni = 2,
    Tpo = 3,
}

impl PrincipalKind {
    /// Reference resolution order for identifiers without an index entry.
    /// Resolution through the identity index does not depend on it, but any
    /// fallback scan must use this exact sequence.
    pub const LOOKUP_ORDER: [PrincipalKind; 4] = [
        PrincipalKind::Student,
        PrincipalKind::Company,
        PrincipalKind::Alumni,
        PrincipalKind::Tpo,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            PrincipalKind::Student => "student",
            PrincipalKind::Company => "company",
            PrincipalKind::Alumni => "alumni",
            PrincipalKind::Tpo => "tpo",
        }
    }

    /// Company and Alumni accounts need TPO verification before they may
    /// pass a verified gate; Student and TPO accounts are verified by
    /// construction.
    #[inline]
    pub const fn requires_verification(&self) -> bool {
        matches!(self, PrincipalKind::Company | PrincipalKind::Alumni)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(PrincipalKind::Student),
            1 => Some(PrincipalKind::Company),
            2 => Some(PrincipalKind::Alumni),
            3 => Some(PrincipalKind::Tpo),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "student" => Some(PrincipalKind::Student),
            "company" => Some(PrincipalKind::Company),
            "alumni" => Some(PrincipalKind::Alumni),
            "tpo" => Some(PrincipalKind::Tpo),
            _ => None,
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for kind in PrincipalKind::LOOKUP_ORDER {
            assert_eq!(PrincipalKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(PrincipalKind::from_id(99), None);
    }

    #[test]
    fn test_code_roundtrip() {
        for kind in PrincipalKind::LOOKUP_ORDER {
            assert_eq!(PrincipalKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(PrincipalKind::from_code("admin"), None);
    }

    #[test]
    fn test_lookup_order_is_fixed() {
        assert_eq!(
            PrincipalKind::LOOKUP_ORDER,
            [
                PrincipalKind::Student,
                PrincipalKind::Company,
                PrincipalKind::Alumni,
                PrincipalKind::Tpo,
            ]
        );
    }

    #[test]
    fn test_requires_verification() {
        assert!(!PrincipalKind::Student.requires_verification());
        assert!(PrincipalKind::Company.requires_verification());
        assert!(PrincipalKind::Alumni.requires_verification());
        assert!(!PrincipalKind::Tpo.requires_verification());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&PrincipalKind::Tpo).unwrap();
        assert_eq!(json, r#""tpo""#);
        let kind: PrincipalKind = serde_json::from_str(r#""company""#).unwrap();
        assert_eq!(kind, PrincipalKind::Company);
    }
}
