use crate::artifacts::branch::SLUG_REGEX;
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};

/// Record identity across branches
///
/// Lowercase ASCII words separated by single hyphens, e.g. `release-notes-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn try_parse(slug: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        let slug = slug.trim();

        if slug.is_empty() {
            return Err(FolioError::Validation("slug cannot be blank".to_string()));
        }

        let re = regex::Regex::new(SLUG_REGEX)
            .map_err(|e| FolioError::Validation(format!("invalid slug regex: {e}")))?;

        if re.is_match(slug) {
            Ok(Self(slug.to_string()))
        } else {
            Err(FolioError::Validation(format!("invalid slug: {slug}")))
        }
    }
}

impl TryFrom<String> for Slug {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_parse(value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;
    use rstest::rstest;

    #[rstest]
    #[case("hello")]
    #[case("release-notes-2")]
    #[case("  padded  ")]
    fn test_valid_slugs(#[case] slug: &str) {
        assert!(Slug::try_parse(slug).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("Hello")]
    #[case("double--hyphen")]
    #[case("-leading")]
    #[case("trailing-")]
    #[case("under_score")]
    fn test_invalid_slugs(#[case] slug: &str) {
        assert!(matches!(Slug::try_parse(slug), Err(FolioError::Validation(_))));
    }

    proptest! {
        #[test]
        fn test_hyphenated_words_are_valid(
            words in proptest::collection::vec("[a-z0-9]{1,8}", 1..5)
        ) {
            assert!(Slug::try_parse(words.join("-")).is_ok());
        }
    }
}
