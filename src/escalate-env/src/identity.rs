//! Identities and command metadata supplied by the caller.

/// The user the command will run as.
///
/// Fields are optional because the account database may not provide them;
/// an absent field turns the step that needs it into a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunAsUser {
    pub name: Option<String>,
    pub home: Option<String>,
    pub shell: Option<String>,
    pub uid: u32,
    pub gid: u32,
}

impl RunAsUser {
    /// Creates a fully resolved target identity.
    pub fn new(
        name: impl Into<String>,
        home: impl Into<String>,
        shell: impl Into<String>,
        uid: u32,
        gid: u32,
    ) -> Self {
        Self {
            name: Some(name.into()),
            home: Some(home.into()),
            shell: Some(shell.into()),
            uid,
            gid,
        }
    }

    /// The superuser with conventional defaults.
    pub fn root() -> Self {
        Self::new("root", "/root", "/bin/sh", 0, 0)
    }
}

/// The user who invoked the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokingUser {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    /// Home directory recorded for the invoking user.
    pub home: String,
    /// Login shell recorded for the invoking user.
    pub shell: String,
}

impl InvokingUser {
    pub fn new(
        name: impl Into<String>,
        uid: u32,
        gid: u32,
        home: impl Into<String>,
        shell: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uid,
            gid,
            home: home.into(),
            shell: shell.into(),
        }
    }
}

/// The resolved command and its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    /// Fully resolved path of the command.
    pub path: String,
    /// Arguments joined with single spaces, if any were given.
    pub args: Option<String>,
}

impl CommandLine {
    /// Builds a command line, joining `args` with single spaces.
    pub fn new<I, S>(path: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = args
            .into_iter()
            .map(|a| a.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            path: path.into(),
            args: (!joined.is_empty()).then_some(joined),
        }
    }

    /// A command with no arguments.
    pub fn bare(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: None,
        }
    }
}
