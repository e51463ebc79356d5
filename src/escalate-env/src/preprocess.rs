//! Early pass over the tool's own environment.
//!
//! Removes variables that fail classification and records the handful of
//! values other components need later (the caller's PATH and SHELL, a
//! password prompt override, and a previous `SUDO_USER`).

use crate::classify::check_entry;
use crate::entry::{entry_name, value_if_named};
use crate::tables::PatternTables;
use crate::{PASSWORD_PROMPT_VAR, USER_VAR};

/// Values captured from the inherited environment, whether or not the
/// entry carrying them survived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedVars {
    /// The caller's `PATH`.
    pub path: Option<String>,
    /// The caller's `SHELL`.
    pub shell: Option<String>,
    /// Password prompt override.
    pub prompt: Option<String>,
    /// `SUDO_USER` left by an outer invocation.
    pub prev_user: Option<String>,
}

impl CapturedVars {
    fn observe(&mut self, entry: &str) {
        if let Some(value) = value_if_named(entry, "PATH") {
            self.path = Some(value.to_string());
        } else if let Some(value) = value_if_named(entry, "SHELL") {
            self.shell = Some(value.to_string());
        } else if let Some(value) = value_if_named(entry, PASSWORD_PROMPT_VAR) {
            // The first prompt override wins.
            if self.prompt.is_none() {
                self.prompt = Some(value.to_string());
            }
        } else if let Some(value) = value_if_named(entry, USER_VAR) {
            self.prev_user = Some(value.to_string());
        }
    }
}

/// Result of [`clean_env`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    /// Accepted entries, in their original order.
    pub kept: Vec<String>,
    /// Rejected entries, in their original order.
    pub pruned: Vec<String>,
    pub captured: CapturedVars,
}

/// Splits `env` into accepted and pruned entries and captures side-channel
/// values.
pub fn clean_env<I, S>(env: I, tables: &PatternTables) -> Preprocessed
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Preprocessed::default();
    for entry in env {
        let entry = entry.into();
        out.captured.observe(&entry);
        match check_entry(&entry, &tables.delete, &tables.check) {
            Ok(()) => out.kept.push(entry),
            Err(reason) => {
                tracing::debug!(name = entry_name(&entry), %reason, "pruned inherited variable");
                out.pruned.push(entry);
            }
        }
    }
    if !out.pruned.is_empty() {
        tracing::debug!(
            kept = out.kept.len(),
            pruned = out.pruned.len(),
            "cleaned inherited environment"
        );
    }
    out
}

/// Reads the process environment as `NAME=VALUE` entries.
///
/// Returns the representable entries and, separately, a lossy rendering of
/// those that are not valid UTF-8.
pub fn snapshot_process_env() -> (Vec<String>, Vec<String>) {
    let mut entries = Vec::new();
    let mut unrepresentable = Vec::new();
    for (name, value) in std::env::vars_os() {
        match (name.to_str(), value.to_str()) {
            (Some(name), Some(value)) => entries.push(format!("{name}={value}")),
            _ => unrepresentable.push(format!(
                "{}={}",
                name.to_string_lossy(),
                value.to_string_lossy()
            )),
        }
    }
    (entries, unrepresentable)
}

/// Cleans the current process environment.
///
/// Entries that are not valid UTF-8 are always pruned.
pub fn clean_process_env(tables: &PatternTables) -> Preprocessed {
    let (entries, unrepresentable) = snapshot_process_env();
    let mut out = clean_env(entries, tables);
    for entry in unrepresentable {
        tracing::debug!(
            name = entry_name(&entry),
            "pruned variable that is not valid UTF-8"
        );
        out.pruned.push(entry);
    }
    out
}
