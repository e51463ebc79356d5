//! Default deny, check and keep tables.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pattern::PatternList;
use crate::platform::Platform;

/// Variables removed from the environment on every platform.
const BASE_DENY: &[&str] = &[
    "IFS",
    "CDPATH",
    "LOCALDOMAIN",
    "RES_OPTIONS",
    "HOSTALIASES",
    "NLSPATH",
    "PATH_LOCALE",
    "LD_*",
    "_RLD*",
];

/// Kerberos IV configuration overrides.
const KERBEROS4_DENY: &[&str] = &["KRB_CONF*", "KRBCONFDIR", "KRBTKFILE"];

/// Kerberos V configuration overrides.
const KERBEROS5_DENY: &[&str] = &["KRB5_CONFIG*"];

/// SecurID client configuration.
const SECURID_DENY: &[&str] = &["VAR_ACE", "USR_ACE", "DLC_ACE"];

/// Terminal databases and shell startup files.
const TRAILING_DENY: &[&str] = &[
    "TERMINFO",
    "TERMINFO_DIRS",
    "TERMPATH",
    "TERMCAP",
    "ENV",
    "BASH_ENV",
];

/// Variables removed only when their value contains `/` or `%`.
const DEFAULT_CHECK: &[&str] = &["LC_*", "LANG", "LANGUAGE"];

/// Variables preserved when the environment is reset.
const DEFAULT_KEEP: &[&str] = &["KRB5CCNAME", "PATH", "TERM", "TZ"];

/// Optional credential-related pattern groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    #[serde(default)]
    pub kerberos4: bool,
    #[serde(default)]
    pub kerberos5: bool,
    #[serde(default)]
    pub securid: bool,
}

/// The three pattern lists consulted while building an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternTables {
    /// Always removed.
    pub delete: PatternList,
    /// Removed when the value contains `/` or `%`.
    pub check: PatternList,
    /// Preserved in reset mode.
    pub keep: PatternList,
}

impl PatternTables {
    /// Builds the built-in tables for `platform`.
    pub fn defaults(platform: Platform, options: &TableOptions) -> Result<Self> {
        let mut delete = PatternList::from_strs(BASE_DENY)?;
        delete.extend_strs(platform.extra_deny_patterns())?;
        if options.kerberos4 {
            delete.extend_strs(KERBEROS4_DENY)?;
        }
        if options.kerberos5 {
            delete.extend_strs(KERBEROS5_DENY)?;
        }
        if options.securid {
            delete.extend_strs(SECURID_DENY)?;
        }
        delete.extend_strs(TRAILING_DENY)?;

        let tables = Self {
            delete,
            check: PatternList::from_strs(DEFAULT_CHECK)?,
            keep: PatternList::from_strs(DEFAULT_KEEP)?,
        };
        tracing::trace!(
            %platform,
            delete = tables.delete.len(),
            check = tables.check.len(),
            keep = tables.keep.len(),
            "built default environment tables"
        );
        Ok(tables)
    }
}
