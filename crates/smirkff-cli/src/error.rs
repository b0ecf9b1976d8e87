use smirkff::core::forcefield::ruleset::RuleSetError;
use smirkff::core::smirks::SmirksError;
use smirkff::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    RuleSet(#[from] RuleSetError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] SmirksError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("{failed} of {total} molecule(s) could not be parameterized")]
    BatchFailures { failed: usize, total: usize },

    #[error("{0} duplicate pattern group(s) found")]
    DuplicatePatterns(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
