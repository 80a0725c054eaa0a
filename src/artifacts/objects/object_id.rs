//! Commit identifier (SHA-1 hash)
//!
//! Commit IDs are 40-character hexadecimal strings, the SHA-1 digest of the
//! commit header. They are the only content-addressed identifiers in the
//! store; branches and records use sequential integer ids.
//!
//! ## Format
//!
//! - Full: 40 hex characters (e.g., "abc123...def")
//! - Short: First 7 characters (e.g., "abc123")

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// # Arguments
    ///
    /// * `id` - 40-character hexadecimal string
    pub fn try_parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.len() != OBJECT_ID_LENGTH {
            return Err(FolioError::Validation(format!(
                "invalid object id length: {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FolioError::Validation(format!(
                "invalid object id characters: {id}"
            )));
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Hash arbitrary content into an object ID
    pub fn hash(content: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(content);

        let oid = hasher.finalize();
        Self(format!("{oid:x}"))
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(7).0.to_string()
    }
}

impl TryFrom<String> for ObjectId {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_parse(value)
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
