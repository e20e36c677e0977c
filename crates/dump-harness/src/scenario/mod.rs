//! Scenario step tables.
//!
//! A scenario is an ordered table of step slots addressed by index. Steps
//! are data: each one is a list of [`Mutation`]s applied to the working copy
//! in order. New coverage is added by appending a slot; a slot that should
//! no longer run is marked [`StepSlot::Retired`] instead of being removed,
//! so every later index keeps its meaning.

mod content;
mod props;

use std::fmt;
use std::fs;
use std::path::Path;

use dump_utils::{LogSink, ProcessRunner, UtilError, WcPath};

use crate::svn::SvnTools;

pub use content::CONTENT;
pub use props::PROPS;

/// One change to the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Create a single directory (the parent must exist).
    CreateDir(&'static str),
    /// Create or truncate a file with the given contents.
    WriteFile(&'static str, &'static [u8]),
    /// Run `svn` with these arguments inside the working copy.
    Svn(&'static [&'static str]),
}

impl Mutation {
    fn apply(
        &self,
        wc: &Path,
        svn: &SvnTools,
        runner: &dyn ProcessRunner,
        log: &mut LogSink,
    ) -> dump_utils::Result<()> {
        match *self {
            Mutation::CreateDir(path) => {
                log.command(&self.to_string())?;
                fs::create_dir(WcPath::new(path).resolve(wc)?)?;
            }
            Mutation::WriteFile(path, contents) => {
                log.command(&self.to_string())?;
                fs::write(WcPath::new(path).resolve(wc)?, contents)?;
            }
            Mutation::Svn(args) => {
                if args.is_empty() {
                    return Err(UtilError::Path("empty svn mutation".into()));
                }
                runner.run(&svn.svn(args, wc), log)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreateDir(path) => write!(f, "mkdir {path}"),
            Mutation::WriteFile(path, contents) => {
                write!(f, "write {path} \"{}\"", escape(contents))
            }
            Mutation::Svn(args) => {
                f.write_str("svn")?;
                for arg in args.iter() {
                    if arg.is_empty() || arg.contains(char::is_whitespace) {
                        write!(f, " \"{arg}\"")?;
                    } else {
                        write!(f, " {arg}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// A unit of work: a short description and its mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub summary: &'static str,
    pub mutations: &'static [Mutation],
}

/// A step table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSlot {
    Active(Step),
    /// Reserved index documenting intended coverage; applies nothing.
    Retired(Step),
}

impl StepSlot {
    pub fn step(&self) -> &Step {
        match self {
            StepSlot::Active(step) | StepSlot::Retired(step) => step,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, StepSlot::Active(_))
    }
}

/// Result of asking the table for one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step's mutations were applied; more indices may follow.
    Applied,
    /// The slot is retired; nothing was applied; more indices may follow.
    Retired,
    /// No slot at this index: the scenario is exhausted.
    Done,
}

impl StepOutcome {
    pub fn has_more(self) -> bool {
        !matches!(self, StepOutcome::Done)
    }
}

/// A named, ordered step table.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    /// One-line description.
    pub info: &'static str,
    pub slots: &'static [StepSlot],
}

impl Scenario {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&StepSlot> {
        self.slots.get(index)
    }

    /// Number of slots that apply mutations.
    pub fn active_steps(&self) -> usize {
        self.slots.iter().filter(|s| s.is_active()).count()
    }

    /// The same scenario cut off after `len` slots.
    pub fn prefix(&self, len: usize) -> Scenario {
        Scenario {
            slots: &self.slots[..len.min(self.slots.len())],
            ..*self
        }
    }

    /// Apply the step at `index` to the working copy `wc`.
    ///
    /// Mutations run in order and the first failure aborts the step; the
    /// mutations already applied stay applied. An index past the end of the
    /// table returns [`StepOutcome::Done`] without touching anything.
    pub fn step(
        &self,
        index: usize,
        wc: &Path,
        svn: &SvnTools,
        runner: &dyn ProcessRunner,
        log: &mut LogSink,
    ) -> dump_utils::Result<StepOutcome> {
        let step = match self.slots.get(index) {
            None => return Ok(StepOutcome::Done),
            Some(StepSlot::Retired(step)) => {
                log.note(&format!("step {index}: retired ({})", step.summary))?;
                return Ok(StepOutcome::Retired);
            }
            Some(StepSlot::Active(step)) => step,
        };

        log.note(&format!("step {index}: {}", step.summary))?;
        for mutation in step.mutations {
            mutation.apply(wc, svn, runner, log)?;
        }
        Ok(StepOutcome::Applied)
    }
}

/// Every built-in scenario.
pub fn all() -> &'static [&'static Scenario] {
    static ALL: [&Scenario; 2] = [&PROPS, &CONTENT];
    &ALL
}

/// Find a built-in scenario by name.
pub fn lookup(name: &str) -> Option<&'static Scenario> {
    all().iter().copied().find(|s| s.name == name)
}

/// Render bytes with C-style escapes for non-printable characters.
fn escape(bytes: &[u8]) -> String {
    let mut out = String::new();
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
                c => out.push(c),
            }
        }
        for b in chunk.invalid() {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
    out
}
