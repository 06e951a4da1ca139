//! Tool name validation rules

use std::fmt;

/// Maximum length for a tool name
pub const MAX_NAME_LENGTH: usize = 128;

/// Error type for tool name validation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    /// The name is empty
    Empty,
    /// The name contains whitespace
    ContainsWhitespace,
    /// The name contains characters outside `[A-Za-z0-9_.-]`
    InvalidCharacters,
    /// The name exceeds the maximum length
    TooLong { length: usize, max: usize },
}

impl fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Tool name cannot be empty"),
            Self::ContainsWhitespace => write!(f, "Tool name cannot contain whitespace"),
            Self::InvalidCharacters => write!(
                f,
                "Tool name can only contain alphanumeric characters, hyphens, underscores, and dots"
            ),
            Self::TooLong { length, max } => {
                write!(f, "Tool name too long ({} chars, max {})", length, max)
            }
        }
    }
}

impl std::error::Error for NameValidationError {}

/// A validated tool name.
///
/// Names follow the MCP tool naming rules: 1-128 characters drawn from
/// ASCII alphanumerics, `_`, `-` and `.`.
///
/// ```rust
/// use toolhub_core::ToolName;
///
/// assert!(ToolName::parse("fetch_news").is_ok());
/// assert!(ToolName::parse("docker.prune-v2").is_ok());
/// assert!(ToolName::parse("").is_err());
/// assert!(ToolName::parse("fetch news").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolName(String);

impl ToolName {
    /// Parse and validate a tool name
    pub fn parse(name: &str) -> Result<Self, NameValidationError> {
        if name.is_empty() {
            return Err(NameValidationError::Empty);
        }

        if name.chars().any(char::is_whitespace) {
            return Err(NameValidationError::ContainsWhitespace);
        }

        if name.len() > MAX_NAME_LENGTH {
            return Err(NameValidationError::TooLong {
                length: name.len(),
                max: MAX_NAME_LENGTH,
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(NameValidationError::InvalidCharacters);
        }

        Ok(Self(name.to_string()))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for ToolName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
