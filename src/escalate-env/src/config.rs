//! Environment policy configuration.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EnvError, Result};
use crate::platform::Platform;
use crate::policy::{EnvPolicy, ExecutionMode, Exemption};
use crate::rebuild::EnvRebuilder;
use crate::tables::{PatternTables, TableOptions};

/// Operator settings for environment handling, usually loaded from TOML.
///
/// ```toml
/// env_reset = true
/// secure_path = "/usr/sbin:/usr/bin:/sbin:/bin"
/// exempt_users = ["ops"]
/// env_keep = ["EDITOR", "LC_*"]
///
/// [tables]
/// kerberos5 = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Reset the environment instead of filtering it.
    #[serde(default = "default_env_reset")]
    pub env_reset: bool,

    /// PATH forced on users who are not exempt.
    #[serde(default)]
    pub secure_path: Option<String>,

    /// Users exempt from `secure_path`.
    #[serde(default)]
    pub exempt_users: Vec<String>,

    /// Exempt every user from `secure_path`.
    #[serde(default)]
    pub exempt_all: bool,

    /// Library preloaded in noexec mode.
    #[serde(default)]
    pub noexec_file: Option<String>,

    /// Extra deny patterns.
    #[serde(default)]
    pub env_delete: Vec<String>,

    /// Extra check patterns.
    #[serde(default)]
    pub env_check: Vec<String>,

    /// Extra keep patterns.
    #[serde(default)]
    pub env_keep: Vec<String>,

    /// Optional built-in pattern groups.
    #[serde(default)]
    pub tables: TableOptions,

    /// Loader family; detected from the build target when unset.
    #[serde(default)]
    pub platform: Option<Platform>,
}

fn default_env_reset() -> bool {
    true
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            env_reset: true,
            secure_path: None,
            exempt_users: Vec::new(),
            exempt_all: false,
            noexec_file: None,
            env_delete: Vec::new(),
            env_check: Vec::new(),
            env_keep: Vec::new(),
            tables: TableOptions::default(),
            platform: None,
        }
    }
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| EnvError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading environment configuration");
        Self::from_toml_str(&contents)
    }

    /// Checks values that would otherwise fail silently at rebuild time.
    pub fn validate(&self) -> Result<()> {
        if self.secure_path.as_deref().is_some_and(str::is_empty) {
            return Err(EnvError::Config("secure_path must not be empty".to_string()));
        }
        if let Some(file) = &self.noexec_file {
            if !Path::new(file).is_absolute() {
                return Err(EnvError::Config(format!(
                    "noexec_file must be an absolute path: {file}"
                )));
            }
        }
        Ok(())
    }

    /// The configured platform, or the build target's.
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_default()
    }

    /// Built-in tables with the configured extra patterns appended.
    pub fn pattern_tables(&self) -> Result<PatternTables> {
        let mut tables = PatternTables::defaults(self.platform(), &self.tables)?;
        tables.delete.extend_strs(&self.env_delete)?;
        tables.check.extend_strs(&self.env_check)?;
        tables.keep.extend_strs(&self.env_keep)?;
        Ok(tables)
    }

    pub fn policy(&self) -> EnvPolicy {
        let exemption = if self.exempt_all {
            Exemption::Everyone
        } else if self.exempt_users.is_empty() {
            Exemption::Nobody
        } else {
            Exemption::Users(self.exempt_users.iter().cloned().collect::<BTreeSet<_>>())
        };
        EnvPolicy {
            secure_path: self.secure_path.clone(),
            exemption,
            noexec_file: self.noexec_file.clone(),
        }
    }

    /// A rebuilder bound to the configured platform, so noexec preloading
    /// uses the same loader family as the deny tables.
    pub fn rebuilder<'a>(
        &self,
        tables: &'a PatternTables,
        policy: &'a EnvPolicy,
    ) -> EnvRebuilder<'a> {
        EnvRebuilder::new(tables, policy).with_platform(self.platform())
    }

    /// Combines `env_reset` with per-invocation flags.
    pub fn execution_mode(&self, login_shell: bool, reset_home: bool, noexec: bool) -> ExecutionMode {
        ExecutionMode {
            reset: self.env_reset,
            login_shell,
            reset_home,
            noexec,
        }
    }

    /// Builder: set env_reset.
    #[must_use]
    pub fn env_reset(mut self, env_reset: bool) -> Self {
        self.env_reset = env_reset;
        self
    }

    /// Builder: set secure path.
    #[must_use]
    pub fn secure_path(mut self, path: impl Into<String>) -> Self {
        self.secure_path = Some(path.into());
        self
    }

    /// Builder: add a keep pattern.
    #[must_use]
    pub fn keep(mut self, pattern: impl Into<String>) -> Self {
        self.env_keep.push(pattern.into());
        self
    }

    /// Builder: add a deny pattern.
    #[must_use]
    pub fn delete(mut self, pattern: impl Into<String>) -> Self {
        self.env_delete.push(pattern.into());
        self
    }
}
