//! Error taxonomy
//!
//! Every operation returns a [`FolioError`] on failure. Each variant belongs to
//! one stable [`ErrorKind`], which the orchestration layer (the CLI here) maps
//! to its own status codes. None of these failures is fatal: they are
//! expected, per-call conditions and a failed merge or commit leaves every
//! store untouched.

use thiserror::Error;

/// Stable classification of a [`FolioError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field is missing, blank or malformed
    Validation,
    /// A branch, commit or record reference does not resolve
    NotFound,
    /// A uniqueness rule or a merge would be violated
    Conflict,
    /// The operation cannot run in the current state
    Precondition,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Precondition => "precondition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FolioError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} '{name}' not found")]
    NotFound { entity: &'static str, name: String },

    #[error("a branch named '{0}' already exists")]
    NameConflict(String),

    #[error("slug '{0}' is already used by another record on this branch")]
    SlugConflict(String),

    /// The merge plan has at least one conflicted slug
    #[error("merge conflict in: {}", .0.join(", "))]
    MergeConflict(Vec<String>),

    /// The target branch already carries records in conflict state
    #[error("branch '{0}' has records in conflict state")]
    HasConflicts(String),

    #[error("no current branch is set")]
    NoCurrentBranch,

    #[error("branch '{0}' has no commits")]
    NoCommits(String),

    #[error("not permitted on the trunk: {0}")]
    ForbiddenOnTrunk(String),

    #[error("nothing to commit on branch '{0}'")]
    NoChanges(String),

    #[error("branches '{merging}' and '{into}' share no common ancestor")]
    NoCommonAncestor { merging: String, into: String },

    #[error("branch '{0}' has already been merged and is read-only")]
    BranchRetired(String),
}

impl FolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::Validation(_) => ErrorKind::Validation,
            FolioError::NotFound { .. } => ErrorKind::NotFound,
            FolioError::NameConflict(_)
            | FolioError::SlugConflict(_)
            | FolioError::MergeConflict(_)
            | FolioError::HasConflicts(_) => ErrorKind::Conflict,
            FolioError::NoCurrentBranch
            | FolioError::NoCommits(_)
            | FolioError::ForbiddenOnTrunk(_)
            | FolioError::NoChanges(_)
            | FolioError::NoCommonAncestor { .. }
            | FolioError::BranchRetired(_) => ErrorKind::Precondition,
        }
    }

    pub(crate) fn branch_not_found(name: impl ToString) -> Self {
        FolioError::NotFound {
            entity: "branch",
            name: name.to_string(),
        }
    }

    pub(crate) fn record_not_found(slug: impl ToString) -> Self {
        FolioError::NotFound {
            entity: "record",
            name: slug.to_string(),
        }
    }

    pub(crate) fn commit_not_found(oid: impl ToString) -> Self {
        FolioError::NotFound {
            entity: "commit",
            name: oid.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
