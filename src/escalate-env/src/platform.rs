//! Platform capability table.
//!
//! Dynamic loaders differ in how a library is forced into a process and in
//! which variables steer them. Everything platform-specific that the
//! environment builder needs is resolved through [`Platform`].

use serde::{Deserialize, Serialize};

/// Default search path used when nothing else supplies `PATH`.
pub const DEFAULT_SEARCH_PATH: &str = "/usr/bin:/bin";

/// Dynamic-loader family of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// ELF loaders honoring `LD_PRELOAD` (Linux, BSDs, Solaris).
    Generic,
    /// macOS / Darwin dyld.
    Darwin,
    /// HP-UX.
    Hpux,
    /// AIX.
    Aix,
    /// IRIX and Tru64 runtime linker (`_RLD_LIST`).
    Irix,
}

/// One variable the noexec step must force into the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadVar<'a> {
    pub name: &'static str,
    /// Value fragments, concatenated without a delimiter.
    pub fragments: Vec<&'a str>,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        #[cfg(target_vendor = "apple")]
        {
            Platform::Darwin
        }
        #[cfg(target_os = "aix")]
        {
            Platform::Aix
        }
        #[cfg(not(any(target_vendor = "apple", target_os = "aix")))]
        {
            Platform::Generic
        }
    }

    /// Deny patterns that only make sense on this platform.
    pub fn extra_deny_patterns(self) -> &'static [&'static str] {
        match self {
            Platform::Darwin => &["DYLD_*"],
            Platform::Hpux => &["SHLIB_PATH"],
            Platform::Aix => &["LIBPATH"],
            Platform::Generic | Platform::Irix => &[],
        }
    }

    /// Default `PATH` when neither the sources nor policy supply one.
    pub fn default_search_path(self) -> &'static str {
        DEFAULT_SEARCH_PATH
    }

    /// Variables that preload `library` into the executed command.
    pub fn noexec_preload(self, library: &str) -> Vec<PreloadVar<'_>> {
        match self {
            Platform::Darwin => vec![
                PreloadVar {
                    name: "DYLD_INSERT_LIBRARIES",
                    fragments: vec![library],
                },
                PreloadVar {
                    name: "DYLD_FORCE_FLAT_NAMESPACE",
                    fragments: Vec::new(),
                },
            ],
            Platform::Irix => vec![PreloadVar {
                name: "_RLD_LIST",
                fragments: vec![library, ":DEFAULT"],
            }],
            Platform::Generic | Platform::Hpux | Platform::Aix => vec![PreloadVar {
                name: "LD_PRELOAD",
                fragments: vec![library],
            }],
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Generic => write!(f, "generic"),
            Platform::Darwin => write!(f, "darwin"),
            Platform::Hpux => write!(f, "hpux"),
            Platform::Aix => write!(f, "aix"),
            Platform::Irix => write!(f, "irix"),
        }
    }
}
