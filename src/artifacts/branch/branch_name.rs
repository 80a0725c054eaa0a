use crate::artifacts::branch::{BRANCH_ALIASES, INVALID_BRANCH_NAME_REGEX, MAIN_BRANCH_NAME};
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Validate a branch name using git's ref-name rules
    ///
    /// Known aliases (`trunk`, `master`) are folded onto the trunk name.
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let name = name.trim();

        if name.is_empty() {
            return Err(FolioError::Validation(
                "branch name cannot be blank".to_string(),
            ));
        }

        if let Some(canonical) = BRANCH_ALIASES.get(name) {
            return Ok(Self(canonical.to_string()));
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .map_err(|e| FolioError::Validation(format!("invalid branch name regex: {e}")))?;

        if re.is_match(name) {
            Err(FolioError::Validation(format!(
                "invalid branch name: {name}"
            )))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    pub fn main() -> Self {
        Self(MAIN_BRANCH_NAME.to_string())
    }

    pub fn is_main(&self) -> bool {
        self.0 == MAIN_BRANCH_NAME
    }
}

impl TryFrom<String> for BranchName {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_parse(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
