//! Operator policy and per-invocation mode flags.

use std::collections::BTreeSet;

use crate::identity::InvokingUser;

/// How the environment for one invocation is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionMode {
    /// Start from a clean slate plus the keep list instead of filtering.
    pub reset: bool,
    /// Simulate a login: identity variables come from the target user.
    pub login_shell: bool,
    /// Set HOME to the target user's home even without `reset`.
    pub reset_home: bool,
    /// Preload the noexec library into the command.
    pub noexec: bool,
}

impl ExecutionMode {
    /// Clean-slate mode.
    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Default::default()
        }
    }

    /// Filtered pass-through mode.
    pub fn filter() -> Self {
        Self::default()
    }

    /// Builder: set login-shell simulation.
    #[must_use]
    pub fn with_login_shell(mut self, login_shell: bool) -> Self {
        self.login_shell = login_shell;
        self
    }

    /// Builder: set HOME reset.
    #[must_use]
    pub fn with_reset_home(mut self, reset_home: bool) -> Self {
        self.reset_home = reset_home;
        self
    }

    /// Builder: set noexec.
    #[must_use]
    pub fn with_noexec(mut self, noexec: bool) -> Self {
        self.noexec = noexec;
        self
    }
}

/// Which invoking users bypass the secure path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Exemption {
    /// Nobody is exempt.
    #[default]
    Nobody,
    /// Only the listed users are exempt.
    Users(BTreeSet<String>),
    /// Every user is exempt.
    Everyone,
}

impl Exemption {
    /// Returns true if `user` is exempt from the secure path.
    pub fn applies_to(&self, user: &InvokingUser) -> bool {
        match self {
            Exemption::Nobody => false,
            Exemption::Users(users) => users.contains(&user.name),
            Exemption::Everyone => true,
        }
    }
}

/// Operator-configured values consulted by the rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPolicy {
    /// PATH forced on non-exempt users.
    pub secure_path: Option<String>,
    /// Users who keep their own PATH despite `secure_path`.
    pub exemption: Exemption,
    /// Shared library preloaded in noexec mode.
    pub noexec_file: Option<String>,
}

impl EnvPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the secure path.
    #[must_use]
    pub fn with_secure_path(mut self, path: impl Into<String>) -> Self {
        self.secure_path = Some(path.into());
        self
    }

    /// Builder: set the exemption rule.
    #[must_use]
    pub fn with_exemption(mut self, exemption: Exemption) -> Self {
        self.exemption = exemption;
        self
    }

    /// Builder: set the noexec library.
    #[must_use]
    pub fn with_noexec_file(mut self, path: impl Into<String>) -> Self {
        self.noexec_file = Some(path.into());
        self
    }

    /// The secure path to force for `user`, if any.
    pub fn secure_path_for(&self, user: &InvokingUser) -> Option<&str> {
        match &self.secure_path {
            Some(path) if !self.exemption.applies_to(user) => Some(path.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> InvokingUser {
        InvokingUser::new(name, 1000, 1000, "/home/x", "/bin/bash")
    }

    #[test]
    fn test_secure_path_respects_exemption() {
        let policy = EnvPolicy::new()
            .with_secure_path("/usr/bin:/bin")
            .with_exemption(Exemption::Users(BTreeSet::from(["ops".to_string()])));
        assert_eq!(policy.secure_path_for(&user("alice")), Some("/usr/bin:/bin"));
        assert_eq!(policy.secure_path_for(&user("ops")), None);
    }

    #[test]
    fn test_no_secure_path_configured() {
        assert_eq!(EnvPolicy::new().secure_path_for(&user("alice")), None);
    }

    #[test]
    fn test_mode_builders() {
        let mode = ExecutionMode::reset().with_login_shell(true).with_noexec(true);
        assert!(mode.reset && mode.login_shell && mode.noexec);
        assert!(!mode.reset_home);
        assert!(!ExecutionMode::filter().reset);
        assert!(Exemption::Everyone.applies_to(&user("anyone")));
    }
}
