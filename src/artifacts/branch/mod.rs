//! Branch and record naming
//!
//! - `branch_name`: validated branch names and their aliases
//! - `slug`: validated record slugs (the record identity across branches)

pub mod branch_name;
pub mod slug;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const SLUG_REGEX: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";

/// Name of the trunk branch
pub const MAIN_BRANCH_NAME: &str = "main";
/// Stands for the session's current branch wherever a branch name is accepted
pub const CURRENT_BRANCH_ALIAS: &str = "@";

pub const BRANCH_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "trunk" => "main",
    "master" => "main",
};
