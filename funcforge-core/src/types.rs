// SPDX-License-Identifier: Apache-2.0

//! Newtype wrappers for validated identifiers.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! Identifiers validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExtractionError;

/// Content-address prefix carried by every image identifier.
pub const CONTENT_ADDRESS_PREFIX: &str = "sha256:";

/// Opaque, globally unique function identifier.
///
/// Generated once per successful load and handed back to the client;
/// the only way to obtain one otherwise is to parse a previously
/// issued identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FunctionId(String);

impl FunctionId {
    /// Generate a fresh, globally unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an identifier previously issued by [`FunctionId::generate`].
    pub fn parse(id: &str) -> Result<Self, uuid::Error> {
        let parsed = Uuid::parse_str(id)?;
        Ok(Self(parsed.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FunctionId {
    type Error = uuid::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FunctionId> for String {
    fn from(id: FunctionId) -> Self {
        id.0
    }
}

/// Content-addressed image identifier produced by the build step.
/// Must be non-empty and carry the `sha256:` content-address prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageId(String);

impl ImageId {
    /// Create a new ImageId with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ExtractionError> {
        let id = id.into();

        let Some(digest) = id.strip_prefix(CONTENT_ADDRESS_PREFIX) else {
            return Err(ExtractionError::InvalidImageId {
                value: id,
                reason: "missing sha256: content-address prefix",
            });
        };

        if digest.is_empty() {
            return Err(ExtractionError::InvalidImageId {
                value: id,
                reason: "empty digest",
            });
        }

        Ok(Self(id))
    }

    /// Get the inner string value, including the content-address prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ImageId {
    type Error = ExtractionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageId> for String {
    fn from(id: ImageId) -> Self {
        id.0
    }
}

/// Source languages the gateway can package.
///
/// Each language carries its handler-file extension convention and
/// whether its build template takes a handler substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Go,
}

impl Language {
    /// All supported languages, in detection priority order.
    pub const ALL: [Language; 2] = [Language::Python, Language::Go];

    /// Stable tag used for template lookup and image tagging.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Go => "golang",
        }
    }

    /// Map a handler-file extension to its language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Language::Python),
            "go" => Some(Language::Go),
            _ => None,
        }
    }

    /// Whether the build template takes the handler filename as a parameter.
    /// Compiled languages produce a self-contained build and use their
    /// template verbatim.
    pub fn parameterized(&self) -> bool {
        match self {
            Language::Python => true,
            Language::Go => false,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
