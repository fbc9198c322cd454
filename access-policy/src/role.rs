//! Role codes and role sets.
//!
//! A role set is stored on the ledger as the string of its role codes
//! (`"MCA"`), but membership is a set test, never a substring search.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors raised when parsing role codes or policy strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Not one of M, C, A, S, P
    #[error("{0} is not a valid permission. Valid permissions are M, C, A, S, and P")]
    InvalidRoleCode(String),

    /// A policy string or table could not be parsed
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

/// Role a user holds within one collection.
///
/// Ordered by privilege, highest first. The order is not a per-operation
/// hierarchy: each policy category lists its roles explicitly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum RoleCode {
    #[serde(rename = "M")]
    Manager,
    #[serde(rename = "C")]
    Curator,
    #[serde(rename = "A")]
    Assistant,
    #[serde(rename = "S")]
    Student,
    #[serde(rename = "P")]
    #[default]
    Public,
}

impl RoleCode {
    /// All roles in privilege order (highest first).
    pub const ALL: [RoleCode; 5] = [
        Self::Manager,
        Self::Curator,
        Self::Assistant,
        Self::Student,
        Self::Public,
    ];

    /// Single-character ledger code.
    pub fn as_char(&self) -> char {
        match self {
            Self::Manager => 'M',
            Self::Curator => 'C',
            Self::Assistant => 'A',
            Self::Student => 'S',
            Self::Public => 'P',
        }
    }

    /// Parse a single role character.
    pub fn from_char(code: char) -> Option<Self> {
        match code {
            'M' => Some(Self::Manager),
            'C' => Some(Self::Curator),
            'A' => Some(Self::Assistant),
            'S' => Some(Self::Student),
            'P' => Some(Self::Public),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Curator => "Curator",
            Self::Assistant => "Assistant",
            Self::Student => "Student",
            Self::Public => "Public",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for RoleCode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_char(c).ok_or_else(|| PolicyError::InvalidRoleCode(s.to_string()))
            }
            _ => Err(PolicyError::InvalidRoleCode(s.to_string())),
        }
    }
}

/// A set of role codes authorized for one policy category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleSet(u8);

impl RoleSet {
    /// The empty set: nobody may perform the action.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every role, including `P`.
    pub fn all() -> Self {
        RoleCode::ALL.into_iter().collect()
    }

    /// Parse a policy string such as `"MCA"`.
    ///
    /// Duplicate codes are accepted; any character outside `MCASP` is rejected.
    pub fn parse(codes: &str) -> Result<Self, PolicyError> {
        codes
            .chars()
            .map(|c| {
                RoleCode::from_char(c).ok_or_else(|| {
                    PolicyError::InvalidPolicy(format!(
                        "'{c}' in \"{codes}\" is not a role code"
                    ))
                })
            })
            .collect()
    }

    pub fn contains(&self, role: RoleCode) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn insert(&mut self, role: RoleCode) {
        self.0 |= role.bit();
    }

    pub fn with(mut self, role: RoleCode) -> Self {
        self.insert(role);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Roles in privilege order.
    pub fn iter(&self) -> impl Iterator<Item = RoleCode> + '_ {
        RoleCode::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl FromIterator<RoleCode> for RoleSet {
    fn from_iter<I: IntoIterator<Item = RoleCode>>(iter: I) -> Self {
        let mut set = Self::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for role in self.iter() {
            write!(f, "{}", role.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for RoleSet {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoleSet {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoleSet> for String {
    fn from(set: RoleSet) -> Self {
        set.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_role_is_public() {
        assert_eq!(RoleCode::default(), RoleCode::Public);
    }

    #[test]
    fn test_parse_and_membership() {
        let set = RoleSet::parse("MCA").unwrap();
        assert!(set.contains(RoleCode::Manager));
        assert!(set.contains(RoleCode::Curator));
        assert!(set.contains(RoleCode::Assistant));
        assert!(!set.contains(RoleCode::Student));
        assert!(!set.contains(RoleCode::Public));
    }

    #[test]
    fn test_canonical_order() {
        let set = RoleSet::parse("PAM").unwrap();
        assert_eq!(set.to_string(), "MAP");
        assert_eq!(RoleSet::all().to_string(), "MCASP");
    }

    #[test]
    fn test_empty_string_is_empty_set() {
        let set = RoleSet::parse("").unwrap();
        assert!(set.is_empty());
        assert!(RoleCode::ALL.iter().all(|r| !set.contains(*r)));
    }

    #[test]
    fn test_rejects_unknown_codes() {
        assert!(matches!(
            RoleSet::parse("MX"),
            Err(PolicyError::InvalidPolicy(_))
        ));
        assert!(matches!(
            "Q".parse::<RoleCode>(),
            Err(PolicyError::InvalidRoleCode(_))
        ));
        assert!("MC".parse::<RoleCode>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let set = RoleSet::parse("MC").unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"MC\"");
        let back: RoleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);

        assert_eq!(serde_json::to_string(&RoleCode::Student).unwrap(), "\"S\"");
        assert!(serde_json::from_str::<RoleSet>("\"MZ\"").is_err());
    }
}
