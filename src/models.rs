use clap::Parser;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "HardLinker";

#[derive(Parser, Debug)]
#[command(
    name = APP_NAME,
    version,
    about = "Create hardlinks. Does not overwrite existing files.",
    long_about = None
)]
pub struct Args {
    /// Create hardlinks to files in the clipboard in the foreground window directory
    #[arg(short, long, conflicts_with_all = ["dest", "files"])]
    pub auto: bool,

    /// Directory to create the hardlinks in
    #[arg(short, long, requires = "files")]
    pub dest: Option<PathBuf>,

    /// Files to link into the destination directory
    #[arg(requires = "dest")]
    pub files: Vec<PathBuf>,

    /// Validate and report without creating any links
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Also append log lines to this file
    #[arg(long)]
    pub log: Option<PathBuf>,
}

/// Raw top-level window handle. Zero is the null handle.
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct WindowHandle(pub isize);

#[cfg_attr(not(windows), allow(dead_code))]
impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    AlreadyExists,
    DifferentVolume,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Rejection {
    pub file: PathBuf,
    pub reason: Reason,
}

impl Rejection {
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            Reason::AlreadyExists => {
                write!(f, "'{}' already exists, no links created", self.file_name())
            }
            Reason::DifferentVolume => write!(
                f,
                "'{}' is on a different volume, no links created",
                self.file_name()
            ),
        }
    }
}

/// Where link creation stopped.
#[derive(Debug)]
pub struct LinkFailure {
    pub file: PathBuf,
    pub error: io::Error,
}

/// Result of applying a validated batch. Links listed in `linked` stay in
/// place even when `failure` is set.
#[derive(Debug, Default)]
pub struct LinkReport {
    pub linked: Vec<PathBuf>,
    pub failure: Option<LinkFailure>,
    /// Highlighting the new entries failed. Never affects the links.
    pub selection_error: Option<anyhow::Error>,
}

/// What a link request ended up doing.
#[derive(Debug)]
pub enum Outcome {
    NothingToDo,
    Rejected(Vec<Rejection>),
    /// Validation passed but nothing was created; holds the would-be targets.
    DryRun(Vec<PathBuf>),
    Linked(LinkReport),
}

pub fn link_target(file: &Path, dest: &Path) -> PathBuf {
    dest.join(file.file_name().unwrap_or_default())
}
