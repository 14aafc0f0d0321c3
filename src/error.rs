//! Application-level error: a message plus the process exit code.
//!
//! Exit codes:
//! - `2` bad input, configuration or I/O
//! - `4` computation failure

use crate::engine::PenaltyError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<PenaltyError> for AppError {
    fn from(err: PenaltyError) -> Self {
        let exit_code = match err {
            PenaltyError::InvalidInput(_) | PenaltyError::InvalidArgument(_) => 2,
            PenaltyError::Overflow(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}
