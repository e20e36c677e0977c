//! Harness configuration: TOML file, environment overrides, defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dump_diff::NormalizeRules;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::Result;

/// File looked up in the current directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "dumpcheck.toml";

/// Full harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding repositories, working copies, dumps and logs.
    pub work_root: PathBuf,
    /// Per-command timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    /// Give every run its own empty Subversion config directory so user
    /// settings (auto-props, global ignores) cannot leak into the history.
    pub isolate_svn_config: bool,
    /// Context lines around each reported divergence.
    pub context_lines: u32,
    pub tools: ToolsConfig,
    pub candidate: CandidateConfig,
    pub normalize: NormalizeRules,
}

/// Reference tool locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub svn: PathBuf,
    pub svnadmin: PathBuf,
}

/// The dumper under test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CandidateConfig {
    pub program: PathBuf,
    /// Arguments placed before the per-run arguments and the repository URL.
    pub args: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            work_root: PathBuf::from("target/dumpcheck"),
            timeout_secs: 0,
            isolate_svn_config: true,
            context_lines: 3,
            tools: ToolsConfig::default(),
            candidate: CandidateConfig::default(),
            normalize: NormalizeRules::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            svn: PathBuf::from("svn"),
            svnadmin: PathBuf::from("svnadmin"),
        }
    }
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("rsvndump"),
            args: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `dumpcheck.toml` in the
    /// current directory is used when present, else the defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(HarnessError::io(path))?;
        toml::from_str(&text).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `DUMPCHECK_*` overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("DUMPCHECK_SVN") {
            self.tools.svn = PathBuf::from(v);
        }
        if let Some(v) = lookup("DUMPCHECK_SVNADMIN") {
            self.tools.svnadmin = PathBuf::from(v);
        }
        if let Some(v) = lookup("DUMPCHECK_CANDIDATE") {
            self.candidate.program = PathBuf::from(v);
        }
        if let Some(v) = lookup("DUMPCHECK_WORK_ROOT") {
            self.work_root = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.work_root.as_os_str().is_empty(), "work_root must not be empty"),
            (self.tools.svn.as_os_str().is_empty(), "tools.svn must not be empty"),
            (
                self.tools.svnadmin.as_os_str().is_empty(),
                "tools.svnadmin must not be empty",
            ),
            (
                self.candidate.program.as_os_str().is_empty(),
                "candidate.program must not be empty",
            ),
        ];
        for (bad, details) in checks {
            if bad {
                return Err(HarnessError::Config {
                    details: details.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
