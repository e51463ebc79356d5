//! Variable name patterns.
//!
//! A pattern is a variable name, optionally ending in `*`. A trailing `*`
//! turns the pattern into a prefix match; otherwise only the exact name
//! matches.

use crate::entry::{SEPARATOR, entry_name};
use crate::error::{EnvError, Result};

/// Trailing marker that turns a pattern into a prefix match.
pub const WILDCARD: char = '*';

/// A single name-matching rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    /// Name or prefix, without the wildcard marker.
    stem: String,
    wildcard: bool,
}

impl Pattern {
    /// Parses a pattern such as `IFS` or `LC_*`.
    pub fn new(pattern: impl AsRef<str>) -> Result<Self> {
        let raw = pattern.as_ref();
        let (stem, wildcard) = match raw.strip_suffix(WILDCARD) {
            Some(stem) => (stem, true),
            None => (raw, false),
        };
        if (stem.is_empty() && !wildcard) || stem.contains(SEPARATOR) {
            return Err(EnvError::InvalidPattern(raw.to_string()));
        }
        Ok(Self {
            stem: stem.to_string(),
            wildcard,
        })
    }

    /// Returns true for prefix patterns.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// The name (or prefix) this pattern compares against.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Returns true if this pattern matches the variable `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        if self.wildcard {
            name.starts_with(self.stem.as_str())
        } else {
            name == self.stem
        }
    }

    /// Returns true if this pattern matches the name of `entry`.
    pub fn matches(&self, entry: &str) -> bool {
        self.matches_name(entry_name(entry))
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.wildcard {
            write!(f, "{}{}", self.stem, WILDCARD)
        } else {
            f.write_str(&self.stem)
        }
    }
}

impl std::str::FromStr for Pattern {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// An ordered collection of patterns with "any matches" semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from raw pattern strings, in declaration order.
    pub fn from_strs<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        list.extend_strs(patterns)?;
        Ok(list)
    }

    /// Appends one pattern.
    pub fn push(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    /// Parses and appends each raw pattern.
    pub fn extend_strs<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in patterns {
            self.patterns.push(Pattern::new(raw)?);
        }
        Ok(())
    }

    /// Returns true if any pattern matches the variable `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches_name(name))
    }

    /// Returns true if any pattern matches the name of `entry`.
    pub fn matches(&self, entry: &str) -> bool {
        self.matches_name(entry_name(entry))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }
}

impl<'a> IntoIterator for &'a PatternList {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

impl Extend<Pattern> for PatternList {
    fn extend<T: IntoIterator<Item = Pattern>>(&mut self, iter: T) {
        self.patterns.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern_requires_full_name() {
        let pattern = Pattern::new("IFS").unwrap();
        assert!(pattern.matches("IFS= "));
        assert!(!pattern.matches("IFSX=1"));
        assert!(!pattern.matches("IF=1"));
        assert!(!pattern.is_wildcard());
    }

    #[test]
    fn test_wildcard_pattern_matches_prefix() {
        let pattern = Pattern::new("LD_*").unwrap();
        assert!(pattern.matches("LD_PRELOAD=/tmp/x.so"));
        assert!(pattern.matches("LD_=1"));
        assert!(!pattern.matches("OLD_PWD=/"));
        assert_eq!(pattern.stem(), "LD_");
    }

    #[test]
    fn test_bare_wildcard_matches_everything() {
        let pattern = Pattern::new("*").unwrap();
        assert!(pattern.matches("ANYTHING=1"));
    }

    #[test]
    fn test_invalid_patterns_rejected() {
        assert!(Pattern::new("").is_err());
        assert!(Pattern::new("A=B").is_err());
        assert!("A=*".parse::<Pattern>().is_err());
    }

    #[test]
    fn test_display_round_trips_marker() {
        assert_eq!(Pattern::new("LC_*").unwrap().to_string(), "LC_*");
        assert_eq!(Pattern::new("TZ").unwrap().to_string(), "TZ");
    }

    #[test]
    fn test_list_any_semantics() {
        let list = PatternList::from_strs(["TZ", "LC_*"]).unwrap();
        assert!(list.matches("TZ=UTC"));
        assert!(list.matches("LC_ALL=C"));
        assert!(!list.matches("LANG=C"));
        assert_eq!(list.len(), 2);
        assert!(!PatternList::new().matches("TZ=UTC"));
    }
}
