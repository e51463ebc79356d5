//! Building `NAME=VALUE` entries from value fragments.

use crate::entry::SEPARATOR;
use crate::error::{EnvError, Result};

/// Formats one environment entry from a name and ordered value fragments.
///
/// The required size is computed once, up front, and the entry is written
/// into a buffer of exactly that size. A write that would not fit is an
/// internal error and aborts with [`EnvError::Overflow`]; the value is never
/// truncated.
///
/// ```
/// use escalate_env::EnvVarFormatter;
///
/// let entry = EnvVarFormatter::new("SUDO_COMMAND")
///     .fragment("/bin/ls")
///     .fragment(" ")
///     .fragment("-la")
///     .finish()
///     .unwrap();
/// assert_eq!(entry, "SUDO_COMMAND=/bin/ls -la");
/// ```
#[derive(Debug, Clone)]
pub struct EnvVarFormatter<'a> {
    name: &'a str,
    fragments: Vec<&'a str>,
}

impl<'a> EnvVarFormatter<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            fragments: Vec::new(),
        }
    }

    /// Appends a value fragment.
    #[must_use]
    pub fn fragment(mut self, fragment: &'a str) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Appends several value fragments in order.
    #[must_use]
    pub fn fragments<I>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.fragments.extend(fragments);
        self
    }

    /// Bytes needed for the entry: name, separator, fragments and a trailing
    /// slot for the NUL added when the entry is turned into a C string.
    pub fn required_capacity(&self) -> Result<usize> {
        let overflow = || EnvError::Overflow {
            name: self.name.to_string(),
        };
        let base = self
            .name
            .len()
            .checked_add(SEPARATOR.len_utf8() + 1)
            .ok_or_else(overflow)?;
        self.fragments.iter().try_fold(base, |total, fragment| {
            total.checked_add(fragment.len()).ok_or_else(overflow)
        })
    }

    /// Writes the entry.
    pub fn finish(self) -> Result<String> {
        if self.name.is_empty() || self.name.contains(SEPARATOR) {
            return Err(EnvError::InvalidName(self.name.to_string()));
        }
        let capacity = self.required_capacity()?;

        let mut entry = String::new();
        entry
            .try_reserve_exact(capacity)
            .map_err(|_| EnvError::Allocation {
                what: "environment entry",
                requested: capacity,
            })?;

        // The last byte stays reserved for the C string terminator.
        let limit = capacity - 1;
        bounded_push(&mut entry, self.name, limit, self.name)?;
        let mut sep = [0u8; 4];
        bounded_push(&mut entry, SEPARATOR.encode_utf8(&mut sep), limit, self.name)?;
        for fragment in &self.fragments {
            bounded_push(&mut entry, fragment, limit, self.name)?;
        }
        Ok(entry)
    }
}

fn bounded_push(buf: &mut String, s: &str, limit: usize, name: &str) -> Result<()> {
    match buf.len().checked_add(s.len()) {
        Some(len) if len <= limit => {
            buf.push_str(s);
            Ok(())
        }
        _ => {
            tracing::warn!(name, "environment entry overflow");
            Err(EnvError::Overflow {
                name: name.to_string(),
            })
        }
    }
}

/// Formats `name=value` in one step.
pub fn format_var(name: &str, value: &str) -> Result<String> {
    EnvVarFormatter::new(name).fragment(value).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_concatenate_without_delimiter() {
        let entry = EnvVarFormatter::new("_RLD_LIST")
            .fragments(["/lib/noexec.so", ":DEFAULT"])
            .finish()
            .unwrap();
        assert_eq!(entry, "_RLD_LIST=/lib/noexec.so:DEFAULT");
    }

    #[test]
    fn test_no_fragments_yields_empty_value() {
        assert_eq!(
            EnvVarFormatter::new("DYLD_FORCE_FLAT_NAMESPACE").finish().unwrap(),
            "DYLD_FORCE_FLAT_NAMESPACE="
        );
    }

    #[test]
    fn test_capacity_is_exact() {
        let formatter = EnvVarFormatter::new("PATH").fragment("/usr/bin:/bin");
        assert_eq!(formatter.required_capacity().unwrap(), 4 + 1 + 13 + 1);
        let entry = formatter.finish().unwrap();
        assert_eq!(entry.len(), 18);
        assert!(entry.capacity() >= 19);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(matches!(
            format_var("", "x"),
            Err(EnvError::InvalidName(_))
        ));
        assert!(matches!(
            format_var("A=B", "x"),
            Err(EnvError::InvalidName(_))
        ));
    }

    #[test]
    fn test_bounded_push_refuses_to_truncate() {
        let mut buf = String::from("PATH=");
        let err = bounded_push(&mut buf, "/usr/bin", 8, "PATH").unwrap_err();
        assert!(matches!(err, EnvError::Overflow { .. }));
        assert_eq!(buf, "PATH=");
    }
}
