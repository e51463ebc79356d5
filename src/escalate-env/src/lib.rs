#![allow(clippy::missing_errors_doc, clippy::doc_markdown)]
//! Escalate Env - environment sanitization for privilege-escalated commands.
//!
//! The inherited environment is attacker-controlled input. Before a command
//! runs with elevated rights this crate decides exactly which variables it
//! inherits:
//! - Pattern-based deny, check and keep lists
//! - Reset (allow-list) and filter (deny-list) construction modes
//! - Mandatory secure PATH, target identity and metadata variables
//! - Platform-specific noexec preloading
//! - An early pre-pass that prunes the tool's own environment
//!
//! # Flow
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │   PatternTables      │      │   process environ    │
//! │ (defaults + config)  │      └──────────┬───────────┘
//! └─────────┬────────────┘                 │ clean_env
//!           │                              ▼
//!           │                   ┌──────────────────────┐
//!           ├──────────────────▶│  kept / pruned /     │
//!           │                   │  captured values     │
//!           │                   └──────────┬───────────┘
//!           ▼                              │ + target profile
//! ┌─────────────────────────────────────────▼───────────┐
//! │ EnvRebuilder::rebuild (reset | filter, overrides)   │
//! └─────────────────────────┬───────────────────────────┘
//!                           ▼
//!                Environment ─▶ ExecEnvironment (execve)
//! ```
//!
//! # Example
//!
//! ```
//! use escalate_env::{
//!     CommandLine, EnvConfig, InvokingUser, RebuildRequest, RunAsUser, clean_env,
//! };
//!
//! let config = EnvConfig::new().secure_path("/usr/sbin:/usr/bin:/sbin:/bin");
//! let tables = config.pattern_tables().unwrap();
//! let policy = config.policy();
//!
//! let inherited = clean_env(["PATH=/home/alice/bin", "LD_PRELOAD=/tmp/x.so"], &tables);
//! let invoking = InvokingUser::new("alice", 1000, 1000, "/home/alice", "/bin/bash");
//! let run_as = RunAsUser::root();
//! let command = CommandLine::new("/usr/bin/id", ["-u"]);
//! let request = RebuildRequest {
//!     mode: config.execution_mode(false, false, false),
//!     run_as: &run_as,
//!     invoking: &invoking,
//!     command: &command,
//! };
//!
//! let env = config
//!     .rebuilder(&tables, &policy)
//!     .rebuild(&inherited.kept, None, &request)
//!     .unwrap();
//! assert_eq!(env.get("PATH"), Some("/usr/sbin:/usr/bin:/sbin:/bin"));
//! assert_eq!(env.get("SUDO_COMMAND"), Some("/usr/bin/id -u"));
//! assert!(!env.contains("LD_PRELOAD"));
//! ```


pub mod builder;
pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod format;
pub mod identity;
pub mod pattern;
pub mod platform;
pub mod policy;
pub mod preprocess;
pub mod rebuild;
pub mod tables;

pub use builder::{Environment, EnvironmentBuilder, ExecEnvironment};
pub use classify::{Rejection, check_entry, classify, classify_keep};
pub use config::EnvConfig;
pub use error::{EnvError, Result};
pub use format::{EnvVarFormatter, format_var};
pub use identity::{CommandLine, InvokingUser, RunAsUser};
pub use pattern::{Pattern, PatternList};
pub use platform::Platform;
pub use policy::{EnvPolicy, ExecutionMode, Exemption};
pub use preprocess::{CapturedVars, Preprocessed, clean_env, clean_process_env};
pub use rebuild::{EnvRebuilder, RebuildRequest};
pub use tables::{PatternTables, TableOptions};

/// Shell prompt override; its value becomes `PS1` in the new environment.
pub const PS1_OVERRIDE_VAR: &str = "SUDO_PS1";

/// Shell prompt variable set from [`PS1_OVERRIDE_VAR`].
pub const PROMPT_VAR: &str = "PS1";

/// Password prompt override captured by the pre-pass.
pub const PASSWORD_PROMPT_VAR: &str = "SUDO_PROMPT";

/// Resolved command and arguments.
pub const COMMAND_VAR: &str = "SUDO_COMMAND";

/// Invoking user's name. Also read back by the pre-pass as the previous user.
pub const USER_VAR: &str = "SUDO_USER";

/// Invoking user's numeric uid.
pub const UID_VAR: &str = "SUDO_UID";

/// Invoking user's numeric gid.
pub const GID_VAR: &str = "SUDO_GID";

/// TERM used when no source supplies one.
pub const FALLBACK_TERM: &str = "unknown";

/// SHELL used when the invoking user has no recorded shell.
pub const FALLBACK_SHELL: &str = "/bin/sh";
