//! FFmpeg process invocation with per-phase log capture.
//!
//! Every pass writes its stdout and stderr to files in the work
//! directory; the decimate pass is parsed from its stderr capture.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use tracing::{error, info};

use crate::error::{Result, TrimError};

/// Check for ffmpeg before the first pass so a missing binary fails
/// up front instead of halfway through.
pub fn locate_ffmpeg() -> Result<PathBuf> {
    which::which("ffmpeg").map_err(|_| TrimError::FfmpegNotFound)
}

/// Run one ffmpeg pass, capturing stdout and stderr to
/// `<phase>.stdout.log` / `<phase>.stderr.log` under `workdir`.
/// Returns the path of the stderr capture.
pub fn run_phase(phase: &'static str, workdir: &Path, args: &[String]) -> Result<PathBuf> {
    let stdout_log = workdir.join(format!("{phase}.stdout.log"));
    let stderr_log = workdir.join(format!("{phase}.stderr.log"));

    info!(
        "the {phase} phase is starting with `ffmpeg {}`",
        display_args(args)
    );
    info!("standard output capture: {}", stdout_log.display());
    info!("standard error capture: {}", stderr_log.display());

    let stdout = File::create(&stdout_log)
        .with_context(|| format!("creating {}", stdout_log.display()))?;
    let stderr = File::create(&stderr_log)
        .with_context(|| format!("creating {}", stderr_log.display()))?;

    let status = Command::new("ffmpeg")
        .args(args)
        .stdout(stdout)
        .stderr(stderr)
        .status()
        .context("spawning ffmpeg")?;

    if !status.success() {
        error!("the {phase} phase failed, see the captured logs for details");
        return Err(TrimError::PhaseFailed { phase, status });
    }

    Ok(stderr_log)
}

/// Render an argument list for logging, escaping embedded spaces so
/// the logged line stays copy-pasteable.
fn display_args(args: &[String]) -> String {
    args.iter()
        .map(|arg| arg.replace(' ', "\\ "))
        .collect::<Vec<_>>()
        .join(" ")
}
