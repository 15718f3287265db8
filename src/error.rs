//! Error types and process exit codes.

use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrimError>;

/// Errors that abort a trim run.
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("the {phase} phase failed with {status}")]
    PhaseFailed {
        phase: &'static str,
        status: ExitStatus,
    },

    #[error("found {found} keep intervals, fewer than the {required} required")]
    TooFewIntervals { found: usize, required: usize },

    #[error("--vaapi-decimate set to use the --vaapi device, but --vaapi not set")]
    MissingVaapiDevice,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrimError {
    /// Exit code reported to the shell. FFmpeg pass failures and the
    /// too-few-parts bailout keep distinct codes so callers can tell
    /// "the engine broke" from "nothing worth trimming".
    pub fn exit_code(&self) -> i32 {
        match self {
            TrimError::PhaseFailed { .. } => 3,
            TrimError::TooFewIntervals { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = TrimError::TooFewIntervals {
            found: 1,
            required: 3,
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(TrimError::FfmpegNotFound.exit_code(), 1);
        assert_eq!(TrimError::MissingVaapiDevice.exit_code(), 1);
    }
}
