//! Error types for the arena binary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("terminal I/O failed")]
    Io(#[from] std::io::Error),

    #[error("failed to load configuration")]
    Config(#[from] confy::ConfyError),
}
