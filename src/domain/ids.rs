//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through an export run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Form identifier newtype wrapper
///
/// Identifies the form whose submissions are exported. Checkpoints are keyed
/// by this value.
///
/// # Examples
///
/// ```
/// use formcast::domain::ids::FormId;
/// use std::str::FromStr;
///
/// let form_id = FormId::from_str("household_survey").unwrap();
/// assert_eq!(form_id.as_str(), "household_survey");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(String);

impl FormId {
    /// Creates a new FormId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(FormId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Form ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the form ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FormId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FormId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Submission instance identifier
///
/// Usually of the form `uuid:<uuid>`. Used as the KEY of main rows and as the
/// prefix of every repeat row key.
///
/// # Examples
///
/// ```
/// use formcast::domain::ids::InstanceId;
/// use std::str::FromStr;
///
/// let id = InstanceId::from_str("uuid:0a1b2c3d").unwrap();
/// assert_eq!(id.sanitized(), "uuid_0a1b2c3d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    /// Creates a new InstanceId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Instance ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the instance ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a variant safe to embed in a file name
    ///
    /// Every character outside `[A-Za-z0-9_-]` becomes `_`.
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_id_valid() {
        let id = FormId::new("household_survey").unwrap();
        assert_eq!(id.as_str(), "household_survey");
        assert_eq!(id.to_string(), "household_survey");
    }

    #[test]
    fn test_form_id_empty() {
        assert!(FormId::new("").is_err());
        assert!(FormId::new("   ").is_err());
    }

    #[test]
    fn test_instance_id_empty() {
        assert!(InstanceId::from_str("").is_err());
    }

    #[test]
    fn test_instance_id_sanitized() {
        let id = InstanceId::new("uuid:39f3dd36-161e-45cb-a1a4-395831d253a7").unwrap();
        assert_eq!(id.sanitized(), "uuid_39f3dd36-161e-45cb-a1a4-395831d253a7");

        let odd = InstanceId::new("a/b c.d").unwrap();
        assert_eq!(odd.sanitized(), "a_b_c_d");
    }

    #[test]
    fn test_instance_id_serde_transparent() {
        let id = InstanceId::new("uuid:1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"uuid:1\"");
    }
}
