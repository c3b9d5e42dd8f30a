use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LfdiffError {
    #[error("both inputs name the same file '{0}'; no need to compare")]
    SameInput(String),

    #[error("'-' (stdin) can only be used for one of INPUT1/INPUT2")]
    StdinUsedTwice,

    #[error("invalid splitsize '{0}': {1}")]
    BadSplitsize(String, &'static str),

    #[error("splitsize '{0}' overflows a 64-bit byte count")]
    SplitsizeOverflow(String),

    #[error("cannot open '{path}': {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open output '{path}': {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot create pipe: {0}")]
    Pipe(std::io::Error),

    #[error("cannot spawn 'diff': {0}")]
    Spawn(std::io::Error),

    #[error("feeder for input {side} failed: {source}")]
    Feeder {
        side: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed line from 'diff': {0:?}")]
    MalformedChildLine(String),

    #[error("'diff' exited abnormally with status {0}")]
    AbnormalExit(i32),

    #[error("'diff' was killed by a signal")]
    KilledBySignal,
}

pub type Result<T> = std::result::Result<T, LfdiffError>;

/// Exit codes for lfdiff.
/// 0 = success (regardless of whether the inputs differ)
/// 1 = usage error
/// 2 = i/o error
/// 3 = protocol error (malformed `diff` output, abnormal exit)
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const USAGE: i32 = 1;
    pub const IO: i32 = 2;
    pub const PROTOCOL: i32 = 3;
}

impl LfdiffError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LfdiffError::SameInput(_)
            | LfdiffError::StdinUsedTwice
            | LfdiffError::BadSplitsize(..)
            | LfdiffError::SplitsizeOverflow(_) => exit_code::USAGE,

            LfdiffError::MalformedChildLine(_)
            | LfdiffError::AbnormalExit(_)
            | LfdiffError::KilledBySignal => exit_code::PROTOCOL,

            LfdiffError::OpenInput { .. }
            | LfdiffError::OpenOutput { .. }
            | LfdiffError::Io(_)
            | LfdiffError::Pipe(_)
            | LfdiffError::Spawn(_)
            | LfdiffError::Feeder { .. } => exit_code::IO,
        }
    }
}
