// ABOUTME: Validated Elastic Beanstalk names: application, environment, version label.
// ABOUTME: Enforces the provider's length and character rules before any remote call.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{kind} exceeds maximum length of {max} characters")]
    TooLong { kind: &'static str, max: usize },

    #[error("{kind} must be at least {min} characters")]
    TooShort { kind: &'static str, min: usize },

    #[error("{0} cannot start or end with a hyphen")]
    EdgeHyphen(&'static str),

    #[error("invalid character in {kind}: '{ch}'")]
    InvalidChar { kind: &'static str, ch: char },
}

/// Name of an Elastic Beanstalk application (1-100 characters, no slash).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationName(String);

impl ApplicationName {
    const KIND: &'static str = "application name";

    pub fn new(value: &str) -> Result<Self, NameError> {
        let value = value.trim();
        check_length(Self::KIND, value, 1, 100)?;
        if let Some(ch) = value.chars().find(|c| *c == '/' || c.is_control()) {
            return Err(NameError::InvalidChar {
                kind: Self::KIND,
                ch,
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of an Elastic Beanstalk environment.
///
/// The provider requires 4-40 characters of ASCII letters, digits and
/// hyphens, not starting or ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    const KIND: &'static str = "environment name";

    pub fn new(value: &str) -> Result<Self, NameError> {
        let value = value.trim();
        check_length(Self::KIND, value, 4, 40)?;

        if value.starts_with('-') || value.ends_with('-') {
            return Err(NameError::EdgeHyphen(Self::KIND));
        }

        for ch in value.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '-' {
                return Err(NameError::InvalidChar {
                    kind: Self::KIND,
                    ch,
                });
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Label of an application version, usually the commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionLabel(String);

impl VersionLabel {
    const KIND: &'static str = "version label";

    pub fn new(value: &str) -> Result<Self, NameError> {
        let value = value.trim();
        check_length(Self::KIND, value, 1, 100)?;
        if let Some(ch) = value
            .chars()
            .find(|c| *c == '/' || c.is_whitespace() || c.is_control())
        {
            return Err(NameError::InvalidChar {
                kind: Self::KIND,
                ch,
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the deployment archive for this label.
    pub fn archive_name(&self) -> String {
        format!("deploy-{}.zip", self.0)
    }
}

fn check_length(kind: &'static str, value: &str, min: usize, max: usize) -> Result<(), NameError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(NameError::Empty(kind));
    }
    if len < min {
        return Err(NameError::TooShort { kind, min });
    }
    if len > max {
        return Err(NameError::TooLong { kind, max });
    }
    Ok(())
}

macro_rules! display_as_inner {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

display_as_inner!(ApplicationName, EnvironmentName, VersionLabel);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_name_uses_label() {
        let label = VersionLabel::new("abc123").unwrap();
        assert_eq!(label.archive_name(), "deploy-abc123.zip");
    }

    #[test]
    fn names_are_trimmed() {
        let app = ApplicationName::new("  demo ").unwrap();
        assert_eq!(app.as_str(), "demo");
    }
}
