//! Variable classification against deny, check and keep lists.

use crate::entry::{is_exported_function, split_entry};
use crate::pattern::PatternList;

/// Characters that make a checked variable unsafe (path traversal, format strings).
const CHECKED_CHARS: &[char] = &['/', '%'];

/// Why an entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No separator or empty name.
    Malformed,
    /// Value looks like an exported shell function.
    ExportedFunction,
    /// Name matched the deny list.
    Denied,
    /// Name matched the check list and the value contains `/` or `%`.
    UnsafeValue,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Malformed => write!(f, "malformed"),
            Rejection::ExportedFunction => write!(f, "exported function"),
            Rejection::Denied => write!(f, "denied"),
            Rejection::UnsafeValue => write!(f, "unsafe value"),
        }
    }
}

/// Checks an entry against the deny and check lists.
pub fn check_entry(entry: &str, deny: &PatternList, check: &PatternList) -> Result<(), Rejection> {
    let Some((name, value)) = split_entry(entry) else {
        return Err(Rejection::Malformed);
    };
    if is_exported_function(entry) {
        return Err(Rejection::ExportedFunction);
    }
    if deny.matches_name(name) {
        return Err(Rejection::Denied);
    }
    if check.matches_name(name) && value.contains(CHECKED_CHARS) {
        return Err(Rejection::UnsafeValue);
    }
    Ok(())
}

/// Returns true if the entry may be inherited in filter mode.
pub fn classify(entry: &str, deny: &PatternList, check: &PatternList) -> bool {
    check_entry(entry, deny, check).is_ok()
}

/// Returns true if the entry is on the keep list.
///
/// The exported-function guard still applies: callers that keep an entry
/// must have rejected `NAME=()...` first, but this check repeats it so the
/// function is safe on its own.
pub fn classify_keep(entry: &str, keep: &PatternList) -> bool {
    match split_entry(entry) {
        Some((name, _)) => !is_exported_function(entry) && keep.matches_name(name),
        None => false,
    }
}
