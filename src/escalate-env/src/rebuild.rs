//! Environment reconstruction for the elevated command.
//!
//! Two candidate sources (the sanitized process environment and, optionally,
//! the target user's profile) are merged under the execution mode, then the
//! mandatory overrides and metadata variables are applied:
//!
//! ```text
//!  primary ─┐
//!           ├─▶ reset: keep list + identity defaults ─┐
//!  profile ─┘   filter: deny/check classification  ───┤
//!                                                     ▼
//!                secure PATH ▸ LOGNAME/USER ▸ HOME (forced)
//!                TERM ▸ PATH (only if absent)
//!                noexec preload ▸ PS1 ▸ SUDO_COMMAND ▸ SUDO_USER/UID/GID
//! ```

use bitflags::bitflags;

use crate::builder::{Environment, EnvironmentBuilder};
use crate::classify::{check_entry, classify_keep};
use crate::entry::{entry_has_name, entry_name, is_exported_function, value_if_named};
use crate::error::Result;
use crate::format::{EnvVarFormatter, format_var};
use crate::identity::{CommandLine, InvokingUser, RunAsUser};
use crate::platform::Platform;
use crate::policy::{EnvPolicy, ExecutionMode};
use crate::tables::PatternTables;
use crate::{
    COMMAND_VAR, FALLBACK_SHELL, FALLBACK_TERM, GID_VAR, PROMPT_VAR, PS1_OVERRIDE_VAR, UID_VAR,
    USER_VAR,
};

bitflags! {
    /// Variables a source already supplied, so defaults must not be added.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Supplied: u8 {
        const TERM = 1 << 0;
        const PATH = 1 << 1;
        const HOME = 1 << 2;
        const SHELL = 1 << 3;
        const LOGNAME = 1 << 4;
        const USER = 1 << 5;
    }
}

impl Supplied {
    const NAMES: [(&'static str, Supplied); 6] = [
        ("TERM", Supplied::TERM),
        ("PATH", Supplied::PATH),
        ("HOME", Supplied::HOME),
        ("SHELL", Supplied::SHELL),
        ("LOGNAME", Supplied::LOGNAME),
        ("USER", Supplied::USER),
    ];

    fn for_entry(entry: &str) -> Supplied {
        Self::NAMES
            .iter()
            .find(|(name, _)| entry_has_name(entry, name))
            .map_or(Supplied::empty(), |(_, flag)| *flag)
    }
}

/// Per-invocation inputs to a rebuild.
#[derive(Debug, Clone, Copy)]
pub struct RebuildRequest<'a> {
    pub mode: ExecutionMode,
    pub run_as: &'a RunAsUser,
    pub invoking: &'a InvokingUser,
    pub command: &'a CommandLine,
}

/// Builds the environment handed to the elevated command.
#[derive(Debug, Clone, Copy)]
pub struct EnvRebuilder<'a> {
    tables: &'a PatternTables,
    policy: &'a EnvPolicy,
    platform: Platform,
}

impl<'a> EnvRebuilder<'a> {
    /// Creates a rebuilder for the current platform.
    pub fn new(tables: &'a PatternTables, policy: &'a EnvPolicy) -> Self {
        Self {
            tables,
            policy,
            platform: Platform::current(),
        }
    }

    /// Builder: override the platform capability table.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Builds a fresh environment from `primary` and the optional `alternate`
    /// source, in that order.
    ///
    /// Any failure aborts the whole rebuild; no partial environment is
    /// returned.
    pub fn rebuild<S: AsRef<str>>(
        &self,
        primary: &[S],
        alternate: Option<&[S]>,
        request: &RebuildRequest<'_>,
    ) -> Result<Environment> {
        self.rebuild_inner(primary, alternate, request)
            .inspect_err(|e| tracing::warn!(error = %e, "environment rebuild aborted"))
    }

    fn rebuild_inner<S: AsRef<str>>(
        &self,
        primary: &[S],
        alternate: Option<&[S]>,
        request: &RebuildRequest<'_>,
    ) -> Result<Environment> {
        let mode = request.mode;
        tracing::debug!(
            reset = mode.reset,
            login_shell = mode.login_shell,
            primary = primary.len(),
            alternate = alternate.map(<[S]>::len),
            "rebuilding environment"
        );

        let sources = std::iter::once(primary)
            .chain(alternate)
            .flat_map(|source| source.iter())
            .map(AsRef::<str>::as_ref);

        let mut env = EnvironmentBuilder::new();
        let mut supplied = Supplied::empty();
        let mut ps1 = None;

        if mode.reset {
            for entry in sources {
                if is_exported_function(entry) {
                    tracing::trace!(name = entry_name(entry), "dropping exported function");
                    continue;
                }
                if let Some(value) = value_if_named(entry, PS1_OVERRIDE_VAR) {
                    ps1 = Some(value);
                }
                if classify_keep(entry, &self.tables.keep) {
                    supplied |= Supplied::for_entry(entry);
                    env.append(entry)?;
                }
            }
            self.identity_defaults(&mut env, supplied, request)?;
        } else {
            for entry in sources {
                if let Err(reason) = check_entry(entry, &self.tables.delete, &self.tables.check) {
                    tracing::trace!(name = entry_name(entry), %reason, "dropping variable");
                    continue;
                }
                if let Some(value) = value_if_named(entry, PS1_OVERRIDE_VAR) {
                    ps1 = Some(value);
                }
                supplied |= Supplied::for_entry(entry) & (Supplied::PATH | Supplied::TERM);
                env.append(entry)?;
            }
        }

        if let Some(path) = self.policy.secure_path_for(request.invoking) {
            tracing::debug!("forcing secure path");
            env.replace(format_var("PATH", path)?)?;
            supplied |= Supplied::PATH;
        }

        if mode.reset {
            if let Some(name) = request.run_as.name.as_deref() {
                env.replace(format_var("LOGNAME", name)?)?;
                env.replace(format_var("USER", name)?)?;
            }
        }

        if mode.reset || mode.reset_home {
            if let Some(home) = request.run_as.home.as_deref() {
                env.replace(format_var("HOME", home)?)?;
            }
        }

        if !supplied.contains(Supplied::TERM) {
            env.append(format_var("TERM", FALLBACK_TERM)?)?;
        }
        if !supplied.contains(Supplied::PATH) {
            env.append(format_var("PATH", self.platform.default_search_path())?)?;
        }

        if let (true, Some(library)) = (mode.noexec, self.policy.noexec_file.as_deref()) {
            for var in self.platform.noexec_preload(library) {
                tracing::debug!(name = var.name, "injecting noexec preload");
                env.replace(EnvVarFormatter::new(var.name).fragments(var.fragments).finish()?)?;
            }
        }

        if let Some(value) = ps1 {
            env.replace(format_var(PROMPT_VAR, value)?)?;
        }

        env.replace(command_entry(request.command)?)?;

        let invoking = request.invoking;
        env.replace(format_var(USER_VAR, &invoking.name)?)?;
        env.replace(format_var(UID_VAR, &invoking.uid.to_string())?)?;
        env.replace(format_var(GID_VAR, &invoking.gid.to_string())?)?;

        let env = env.build();
        tracing::debug!(len = env.len(), "environment rebuilt");
        Ok(env)
    }

    /// Fills HOME, SHELL, LOGNAME and USER in reset mode.
    ///
    /// A login shell takes them from the target user, replacing kept values.
    /// Otherwise only unsupplied ones are added, from the invoking user; an
    /// invoking user with no recorded shell gets [`FALLBACK_SHELL`].
    fn identity_defaults(
        &self,
        env: &mut EnvironmentBuilder,
        supplied: Supplied,
        request: &RebuildRequest<'_>,
    ) -> Result<()> {
        let run_as = request.run_as;
        let invoking = request.invoking;
        let own_shell = match invoking.shell.as_str() {
            "" => FALLBACK_SHELL,
            shell => shell,
        };
        let identity = [
            ("HOME", Supplied::HOME, run_as.home.as_deref(), invoking.home.as_str()),
            ("SHELL", Supplied::SHELL, run_as.shell.as_deref(), own_shell),
            ("LOGNAME", Supplied::LOGNAME, run_as.name.as_deref(), invoking.name.as_str()),
            ("USER", Supplied::USER, run_as.name.as_deref(), invoking.name.as_str()),
        ];

        for (name, flag, target, own) in identity {
            match target {
                Some(value) if request.mode.login_shell => env.replace(format_var(name, value)?)?,
                _ if !supplied.contains(flag) => env.append(format_var(name, own)?)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// `SUDO_COMMAND=<path>` or `SUDO_COMMAND=<path> <args>`.
fn command_entry(command: &CommandLine) -> Result<String> {
    let formatter = EnvVarFormatter::new(COMMAND_VAR).fragment(&command.path);
    match command.args.as_deref() {
        Some(args) => formatter.fragment(" ").fragment(args).finish(),
        None => formatter.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplied_flags_match_exact_names() {
        assert_eq!(Supplied::for_entry("PATH=/bin"), Supplied::PATH);
        assert_eq!(Supplied::for_entry("USER=alice"), Supplied::USER);
        assert_eq!(Supplied::for_entry("PATHEXT=.exe"), Supplied::empty());
        assert_eq!(Supplied::for_entry("TERMINFO=/x"), Supplied::empty());
    }

    #[test]
    fn test_command_entry() {
        assert_eq!(
            command_entry(&CommandLine::bare("/usr/bin/id")).unwrap(),
            "SUDO_COMMAND=/usr/bin/id"
        );
        assert_eq!(
            command_entry(&CommandLine::new("/bin/ls", ["-l", "/root"])).unwrap(),
            "SUDO_COMMAND=/bin/ls -l /root"
        );
    }
}
