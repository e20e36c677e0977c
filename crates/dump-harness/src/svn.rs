//! Invocation builders for the Subversion command-line tools.

use std::path::{Path, PathBuf};

use dump_utils::Invocation;

use crate::config::ToolsConfig;

/// `svn` and `svnadmin` as configured for one run.
#[derive(Debug, Clone)]
pub struct SvnTools {
    svn: PathBuf,
    svnadmin: PathBuf,
    config_dir: Option<PathBuf>,
}

impl SvnTools {
    pub fn new(tools: &ToolsConfig, config_dir: Option<PathBuf>) -> Self {
        Self {
            svn: tools.svn.clone(),
            svnadmin: tools.svnadmin.clone(),
            config_dir,
        }
    }

    /// `svn <subcommand> [--config-dir DIR] <rest...>` run inside `dir`.
    ///
    /// The isolated config directory goes right after the subcommand so the
    /// scenario's own arguments keep their order.
    pub fn svn(&self, args: &[&str], dir: &Path) -> Invocation {
        let mut inv = pin_env(Invocation::new(&self.svn)).working_dir(dir);
        let (subcommand, rest) = match args.split_first() {
            Some((first, rest)) => (Some(*first), rest),
            None => (None, args),
        };
        if let Some(subcommand) = subcommand {
            inv = inv.arg(subcommand);
        }
        if let Some(ref config_dir) = self.config_dir {
            inv = inv.arg("--config-dir").arg(config_dir);
        }
        inv.args(rest)
    }

    /// `svnadmin <subcommand>`; callers append the remaining arguments.
    pub fn svnadmin(&self, subcommand: &str) -> Invocation {
        pin_env(Invocation::new(&self.svnadmin)).arg(subcommand)
    }
}

/// Pin locale and timezone so tool output does not depend on the host.
pub(crate) fn pin_env(inv: Invocation) -> Invocation {
    inv.env("LC_ALL", "C").env("LANG", "C").env("TZ", "UTC")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_follows_subcommand() {
        let tools = SvnTools::new(&ToolsConfig::default(), Some(PathBuf::from("/cfg")));
        let inv = tools.svn(&["propset", "bla", "blubb", "dir1/file1"], Path::new("/wc"));
        assert_eq!(
            inv.command_string(),
            "svn propset --config-dir /cfg bla blubb dir1/file1"
        );
        assert_eq!(inv.dir(), Some(Path::new("/wc")));
    }

    #[test]
    fn no_config_dir_is_verbatim() {
        let tools = SvnTools::new(&ToolsConfig::default(), None);
        let inv = tools.svn(&["up", "--ignore-externals"], Path::new("/wc"));
        assert_eq!(inv.command_string(), "svn up --ignore-externals");
    }

    #[test]
    fn svnadmin_subcommand() {
        let tools = SvnTools::new(&ToolsConfig::default(), None);
        let inv = tools.svnadmin("dump").arg("-q").arg("/repos");
        assert_eq!(inv.command_string(), "svnadmin dump -q /repos");
    }
}
