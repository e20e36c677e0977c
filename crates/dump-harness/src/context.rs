//! Per-run context: test id, directory layout and tool configuration.
//!
//! Layout under the configured work root:
//!
//! ```text
//! repos/<id>/                 source repository
//! wc/<id>/                    working copy
//! vrepos/<id>/                verification repository
//! dumps/<id>.<role>.dump      dump artifacts
//! dumps/<id>.diff             unified diff of a mismatch
//! logs/<id>.log               transcript of every invocation
//! svn-config/<id>/            isolated Subversion config directory
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use dump_diff::{CompareOptions, Normalizer};
use dump_utils::LogSink;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::svn::SvnTools;
use crate::Result;

/// Identifier isolating one run's repositories and artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestId(String);

impl TestId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if valid {
            Ok(TestId(id))
        } else {
            Err(HarnessError::InvalidTestId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which dumper produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    /// Reference dump of the source repository.
    Reference,
    /// Candidate dump of the source repository.
    Candidate,
    /// Reference dump of the repository reloaded from the candidate dump.
    Reloaded,
}

impl ArtifactRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactRole::Reference => "reference",
            ArtifactRole::Candidate => "candidate",
            ArtifactRole::Reloaded => "reloaded",
        }
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dump written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpArtifact {
    pub role: ArtifactRole,
    pub path: PathBuf,
}

impl DumpArtifact {
    /// Size in bytes, 0 if missing.
    pub fn len(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(HarnessError::io(&self.path))
    }
}

/// Everything a run needs, passed explicitly to every component.
#[derive(Debug, Clone)]
pub struct RunContext {
    test_id: TestId,
    work_root: PathBuf,
    config: HarnessConfig,
    normalizer: Normalizer,
}

impl RunContext {
    /// Build a context; the work root is made absolute and mask patterns are
    /// compiled up front so a bad configuration fails before any run.
    pub fn new(test_id: &str, config: &HarnessConfig) -> Result<Self> {
        let test_id = TestId::new(test_id)?;
        config.validate()?;
        let work_root = if config.work_root.is_absolute() {
            config.work_root.clone()
        } else {
            std::env::current_dir()
                .map_err(HarnessError::io(&config.work_root))?
                .join(&config.work_root)
        };
        let normalizer =
            Normalizer::new(&config.normalize).map_err(|e| HarnessError::Config {
                details: e.to_string(),
            })?;
        Ok(Self {
            test_id,
            work_root,
            config: config.clone(),
            normalizer,
        })
    }

    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            context_lines: self.config.context_lines,
        }
    }

    pub fn tools(&self) -> SvnTools {
        SvnTools::new(
            &self.config.tools,
            self.config
                .isolate_svn_config
                .then(|| self.svn_config_dir()),
        )
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.work_root.join("repos").join(self.test_id.as_str())
    }

    pub fn wc_dir(&self) -> PathBuf {
        self.work_root.join("wc").join(self.test_id.as_str())
    }

    pub fn verify_repos_dir(&self) -> PathBuf {
        self.work_root.join("vrepos").join(self.test_id.as_str())
    }

    pub fn dumps_dir(&self) -> PathBuf {
        self.work_root.join("dumps")
    }

    pub fn svn_config_dir(&self) -> PathBuf {
        self.work_root.join("svn-config").join(self.test_id.as_str())
    }

    pub fn artifact(&self, role: ArtifactRole) -> DumpArtifact {
        DumpArtifact {
            role,
            path: self
                .dumps_dir()
                .join(format!("{}.{}.dump", self.test_id, role.as_str())),
        }
    }

    pub fn diff_path(&self) -> PathBuf {
        self.dumps_dir().join(format!("{}.diff", self.test_id))
    }

    pub fn log_path(&self) -> PathBuf {
        self.work_root
            .join("logs")
            .join(format!("{}.log", self.test_id))
    }

    /// Create (truncating) this run's log file.
    pub fn open_log(&self) -> Result<LogSink> {
        LogSink::create(self.log_path()).map_err(HarnessError::Log)
    }

    /// Remove everything a previous run with this id left behind and create
    /// the shared parent directories.
    pub fn reset(&self) -> Result<()> {
        self.clean()?;
        let files = [
            self.artifact(ArtifactRole::Reference).path,
            self.artifact(ArtifactRole::Candidate).path,
            self.artifact(ArtifactRole::Reloaded).path,
            self.diff_path(),
        ];
        for file in files {
            remove_file_if_exists(&file)?;
        }
        for dir in [
            self.work_root.join("repos"),
            self.work_root.join("wc"),
            self.work_root.join("vrepos"),
            self.dumps_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(HarnessError::io(&dir))?;
        }
        if self.config.isolate_svn_config {
            let dir = self.svn_config_dir();
            fs::create_dir_all(&dir).map_err(HarnessError::io(&dir))?;
        }
        Ok(())
    }

    /// Remove the repositories and working copy of a finished run, keeping
    /// dumps and the log.
    pub fn clean(&self) -> Result<()> {
        for dir in [
            self.repos_dir(),
            self.wc_dir(),
            self.verify_repos_dir(),
            self.svn_config_dir(),
        ] {
            remove_dir_if_exists(&dir)?;
        }
        Ok(())
    }
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HarnessError::Io {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

fn remove_file_if_exists(file: &Path) -> Result<()> {
    match fs::remove_file(file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HarnessError::Io {
            path: file.to_path_buf(),
            source: e,
        }),
    }
}
