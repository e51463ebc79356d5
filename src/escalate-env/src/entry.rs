//! Helpers for `NAME=VALUE` environment entries.

/// Separator between a variable's name and its value.
pub const SEPARATOR: char = '=';

/// Marker that bash uses for exported shell functions (`NAME=() { ...; }`).
const FUNCTION_MARKER: &str = "()";

/// Returns the name part of an entry, or the whole entry if it has no separator.
pub fn entry_name(entry: &str) -> &str {
    match entry.find(SEPARATOR) {
        Some(idx) => &entry[..idx],
        None => entry,
    }
}

/// Returns the value part of an entry, if it has a separator.
pub fn entry_value(entry: &str) -> Option<&str> {
    entry.find(SEPARATOR).map(|idx| &entry[idx + 1..])
}

/// Splits an entry into name and value.
///
/// Returns `None` for entries without a separator or with an empty name;
/// such entries are never valid environment variables.
pub fn split_entry(entry: &str) -> Option<(&str, &str)> {
    let (name, value) = entry.split_once(SEPARATOR)?;
    if name.is_empty() {
        return None;
    }
    Some((name, value))
}

/// Returns true if `entry` defines the variable `name`.
pub fn entry_has_name(entry: &str, name: &str) -> bool {
    entry
        .strip_prefix(name)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Returns the value of `entry` if it defines the variable `name`.
pub fn value_if_named<'a>(entry: &'a str, name: &str) -> Option<&'a str> {
    entry.strip_prefix(name)?.strip_prefix(SEPARATOR)
}

/// Returns true if the entry's value looks like an exported shell function.
///
/// Only the `=()` directly after the name is checked, so `F=()` and
/// `F=() { :; }` are both caught.
pub fn is_exported_function(entry: &str) -> bool {
    entry_value(entry).is_some_and(|value| value.starts_with(FUNCTION_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_entry() {
        assert_eq!(split_entry("PATH=/bin"), Some(("PATH", "/bin")));
        assert_eq!(split_entry("EMPTY="), Some(("EMPTY", "")));
        assert_eq!(split_entry("A=b=c"), Some(("A", "b=c")));
        assert_eq!(split_entry("=value"), None);
        assert_eq!(split_entry("NOSEP"), None);
    }

    #[test]
    fn test_entry_has_name_requires_separator() {
        assert!(entry_has_name("PATH=/bin", "PATH"));
        assert!(!entry_has_name("PATHEXT=.exe", "PATH"));
        assert!(!entry_has_name("PATH", "PATH"));
    }

    #[test]
    fn test_value_if_named() {
        assert_eq!(value_if_named("SUDO_PS1=# ", "SUDO_PS1"), Some("# "));
        assert_eq!(value_if_named("SUDO_PS1X=# ", "SUDO_PS1"), None);
    }

    #[test]
    fn test_exported_function_guard() {
        assert!(is_exported_function("f=() { echo pwned; }"));
        assert!(is_exported_function("f=()"));
        assert!(!is_exported_function("f= () {"));
        assert!(!is_exported_function("f=(x)"));
        assert!(!is_exported_function("NOSEP()"));
    }
}
