//! Growable environment storage and the exec hand-off form.

use std::ffi::{CString, c_char};

use crate::entry::{entry_has_name, entry_name, split_entry};
use crate::error::{EnvError, Result};

/// Slots added each time the builder runs out of room.
pub const GROWTH_INCREMENT: usize = 128;

/// Accumulates `NAME=VALUE` entries.
///
/// Every entry is owned by the builder. Replacing an entry drops the old
/// string, so nothing borrowed from a source environment can alias a slot.
#[derive(Debug, Default)]
pub struct EnvironmentBuilder {
    entries: Vec<String>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, not counting the terminator.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots reserved, including the one kept for the terminator.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Returns true if some entry defines `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| entry_has_name(e, name))
    }

    /// Appends an entry.
    pub fn append(&mut self, entry: impl Into<String>) -> Result<()> {
        self.append_or_replace(entry, false)
    }

    /// Inserts an entry, overwriting the first entry with the same name.
    pub fn replace(&mut self, entry: impl Into<String>) -> Result<()> {
        self.append_or_replace(entry, true)
    }

    /// Appends `entry`, or with `replace` overwrites the first entry sharing
    /// its name in place.
    pub fn append_or_replace(&mut self, entry: impl Into<String>, replace: bool) -> Result<()> {
        let entry = entry.into();
        let name_len = match split_entry(&entry) {
            Some((name, _)) => name.len(),
            None => return Err(EnvError::MalformedEntry(entry)),
        };

        if replace {
            let name = &entry[..name_len];
            if let Some(idx) = self.entries.iter().position(|e| entry_has_name(e, name)) {
                self.entries[idx] = entry;
                return Ok(());
            }
        }

        // Keep room for the new entry plus the terminator.
        if self.entries.len() + 2 > self.entries.capacity() {
            self.entries
                .try_reserve_exact(GROWTH_INCREMENT)
                .map_err(|_| {
                    tracing::warn!(len = self.entries.len(), "environment growth failed");
                    EnvError::Allocation {
                        what: "environment",
                        requested: self.entries.len() + GROWTH_INCREMENT,
                    }
                })?;
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Finishes the build.
    ///
    /// Later entries repeating an earlier name are dropped so the first one
    /// (the one lookups would find) is the only one left.
    pub fn build(mut self) -> Environment {
        let mut seen = std::collections::HashSet::with_capacity(self.entries.len());
        self.entries.retain(|e| seen.insert(entry_name(e).to_string()));
        Environment {
            entries: self.entries,
        }
    }
}

/// A finished environment: ordered, one entry per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    entries: Vec<String>,
}

impl Environment {
    /// Looks up the value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| entry_has_name(e, name))
            .map(|e| &e[name.len() + 1..])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    /// The entries as a slice, suitable as a source for another rebuild.
    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// `(name, value)` pairs for `std::process::Command::envs`.
    pub fn to_pairs(&self) -> Vec<(&str, &str)> {
        self.entries.iter().filter_map(|e| split_entry(e)).collect()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }

    /// Converts into the NULL-terminated form passed to `execve`.
    pub fn into_exec(self) -> Result<ExecEnvironment> {
        let mut strings = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let name = entry_name(&entry).to_string();
            let c = CString::new(entry).map_err(|_| EnvError::InteriorNul { name })?;
            strings.push(c);
        }
        let mut pointers: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        pointers.push(std::ptr::null());
        Ok(ExecEnvironment { strings, pointers })
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Owned C strings plus a NULL-terminated pointer array into them.
///
/// The pointers stay valid for as long as this value lives; moving it does
/// not move the string data.
#[derive(Debug)]
pub struct ExecEnvironment {
    strings: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl ExecEnvironment {
    /// Pointer to the first element of the NULL-terminated array.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }

    /// Number of entries, not counting the terminator.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn strings(&self) -> &[CString] {
        &self.strings
    }

    /// The pointer array, terminator included.
    pub fn pointers(&self) -> &[*const c_char] {
        &self.pointers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("B=2").unwrap();
        builder.append("A=1").unwrap();
        let env = builder.build();
        assert_eq!(env.as_slice(), &["B=2".to_string(), "A=1".to_string()]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("PATH=/bin").unwrap();
        builder.append("TERM=xterm").unwrap();
        builder.replace("PATH=/usr/bin").unwrap();
        builder.replace("USER=root").unwrap();
        let env = builder.build();
        assert_eq!(
            env.as_slice(),
            &[
                "PATH=/usr/bin".to_string(),
                "TERM=xterm".to_string(),
                "USER=root".to_string()
            ]
        );
    }

    #[test]
    fn test_replace_matches_whole_name() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("PATHEXT=.exe").unwrap();
        builder.replace("PATH=/bin").unwrap();
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_growth_in_fixed_increments() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("A=1").unwrap();
        assert!(builder.capacity() >= GROWTH_INCREMENT);
        for i in 0..GROWTH_INCREMENT {
            builder.append(format!("V{i}=x")).unwrap();
        }
        assert!(builder.capacity() >= builder.len() + 1);
    }

    #[test]
    fn test_malformed_entry_refused() {
        let mut builder = EnvironmentBuilder::new();
        assert!(matches!(
            builder.append("NOSEP"),
            Err(EnvError::MalformedEntry(_))
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_build_drops_later_duplicates() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("PATH=/a").unwrap();
        builder.append("PATH=/b").unwrap();
        builder.replace("PATH=/c").unwrap();
        let env = builder.build();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("PATH"), Some("/c"));
    }

    #[test]
    fn test_exec_form_is_null_terminated() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("A=1").unwrap();
        builder.append("B=2").unwrap();
        let exec = builder.build().into_exec().unwrap();
        assert_eq!(exec.len(), 2);
        assert_eq!(exec.pointers().len(), 3);
        assert!(exec.pointers()[2].is_null());
        assert_eq!(exec.strings()[1].to_str().unwrap(), "B=2");
    }

    #[test]
    fn test_exec_form_rejects_interior_nul() {
        let mut builder = EnvironmentBuilder::new();
        builder.append("A=1\0B").unwrap();
        assert!(matches!(
            builder.build().into_exec(),
            Err(EnvError::InteriorNul { .. })
        ));
    }
}
