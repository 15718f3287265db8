//! Trim static and duplicate segments from a video clip.
//!
//! Drives FFmpeg's mpdecimate filter over the clip, recovers the keep
//! intervals from the filter's debug log, then concatenates and
//! re-encodes only those intervals through the concat demuxer.

mod decimate;
mod error;
mod ffmpeg;
mod hwaccel;
mod playlist;
mod transcode;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use error::{Result, TrimError};
use hwaccel::HwAccel;

#[derive(Parser, Debug)]
#[command(name = "stillcut")]
#[command(about = "Trim a video(+audio) clip, based on output from the mpdecimate filter")]
#[command(version)]
struct Args {
    /// File to trim
    filepath: PathBuf,

    /// Keep the original file
    #[arg(long)]
    keep: bool,

    /// Skip trimming if fewer than SKIP parts are found
    #[arg(long, value_name = "SKIP")]
    skip: Option<usize>,

    /// Use a VA-API device for hardware accelerated transcoding
    #[arg(long, value_name = "DEVICE")]
    vaapi: Option<String>,

    /// Use VA-API for the decimate filter too; defaults to the --vaapi
    /// device when no device is given
    #[arg(long, value_name = "DEVICE", num_args = 0..=1)]
    vaapi_decimate: Option<Option<String>>,

    /// Use Apple VideoToolbox for hardware accelerated transcoding
    #[arg(long)]
    videotoolbox: bool,

    /// Use Apple VideoToolbox for the decimate filter
    #[arg(long)]
    videotoolbox_decimate: bool,

    /// Log at debug level, pass loglevel debug to all ffmpeg calls,
    /// and do not remove anything even on a successful run
    #[arg(long)]
    debug: bool,

    /// Save the output file to the current directory instead of next
    /// to the input file
    #[arg(long)]
    output_to_cwd: bool,

    /// mpdecimate vf parameters for the first pass
    #[arg(long, default_value = "mpdecimate=lo=64*4:hi=64*10")]
    vfparams: String,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(()) => {}
        Err(err @ TrimError::TooFewIntervals { .. }) => {
            warn!("{err}, avoiding re-encode");
            process::exit(err.exit_code());
        }
        Err(err) => {
            error!("{err:#}");
            process::exit(err.exit_code());
        }
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let ffmpeg_path = ffmpeg::locate_ffmpeg()?;
    debug!("using ffmpeg at {}", ffmpeg_path.display());

    let hw = HwAccel::resolve(
        args.vaapi.as_deref(),
        args.vaapi_decimate.as_ref().map(|device| device.as_deref()),
        args.videotoolbox,
        args.videotoolbox_decimate,
    )?;

    let workdir = tempfile::Builder::new()
        .prefix("stillcut.")
        .tempdir()
        .context("creating work directory")?;

    if let Err(err) = pipeline(args, &hw, workdir.path()) {
        // Leave the captured pass logs in place for inspection.
        info!("work directory kept at {}", workdir.into_path().display());
        return Err(err);
    }

    if args.debug {
        debug!("debug enabled, not removing anything");
        info!("work directory kept at {}", workdir.into_path().display());
        return Ok(());
    }

    if !args.keep {
        info!("removing the original file at {}", args.filepath.display());
        fs::remove_file(&args.filepath)
            .with_context(|| format!("removing {}", args.filepath.display()))?;
    }

    Ok(())
}

/// The three phases: decimate, filter creation, transcode.
fn pipeline(args: &Args, hw: &HwAccel, workdir: &Path) -> Result<()> {
    let decimate_log = timed("decimate", || {
        decimate::run(&args.filepath, &args.vfparams, hw, workdir)
    })?;

    let (report, playlist_path) = timed("filter creation", || {
        info!("the filter creation phase is starting");

        let report = decimate::parse_log(&decimate_log)?;
        debug!("has audio: {}", report.has_audio);

        if let Some(required) = args.skip {
            if report.intervals.len() < required {
                return Err(TrimError::TooFewIntervals {
                    found: report.intervals.len(),
                    required,
                });
            }
        }

        let path = workdir.join("playlist.ffconcat");
        info!("filter definition: {}", path.display());
        playlist::write(&path, &args.filepath, &report.intervals)?;

        Ok((report, path))
    })?;

    let output = transcode::output_path(&args.filepath, args.output_to_cwd);
    timed("transcode", || {
        transcode::run(
            &playlist_path,
            &output,
            hw,
            report.has_audio,
            args.debug,
            workdir,
        )
    })?;
    info!("wrote {}", output.display());

    Ok(())
}

/// Run one phase and report its wall-clock duration on success.
fn timed<T>(phase: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let value = f()?;
    info!("the {phase} phase took {}", format_hms(started.elapsed()));
    Ok(value)
}

fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
