//! Decimate pass: run the mpdecimate filter over the clip and recover
//! keep intervals from its debug log.
//!
//! The filter logs one keep/drop decision per frame. Consecutive kept
//! frames collapse into one interval: a `keep` while dropping opens an
//! interval, a `drop` while keeping closes it. The same log also
//! carries the stream summaries used to tell whether the clip has an
//! audio stream at all.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::ffmpeg;
use crate::hwaccel::HwAccel;

/// A stretch of the input to retain, in seconds. `end` stays `None`
/// when the log ended while still keeping frames; the playlist then
/// runs that interval to the end of the clip.
#[derive(Debug, Clone, PartialEq)]
pub struct KeepInterval {
    pub start: f64,
    pub end: Option<f64>,
}

/// What the decimate pass learned about the clip.
#[derive(Debug)]
pub struct DecimateReport {
    pub intervals: Vec<KeepInterval>,
    pub has_audio: bool,
}

static FRAME_DECISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^.* (keep|drop) pts:\d+ pts_time:(\d+(?:\.\d+)?) drop_count:-?\d+(?: keep_count:-?\d+)?$",
    )
    .unwrap()
});

static AUDIO_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[.*\])?\s*Input stream #\d+:\d+ \(audio\): \d+ packets read \(\d+ bytes\); \d+ frames decoded(?:; \d+ decode errors)? \(\d+ samples\);\s*$",
    )
    .unwrap()
});

static AUDIO_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\[.*\])?\s*Output stream #\d+:\d+ \(audio\): \d+ frames encoded \(\d+ samples\); \d+ packets muxed \(\d+ bytes\);\s*$",
    )
    .unwrap()
});

/// Run the decimate pass and return the path of its stderr capture.
pub fn run(input: &Path, vfparams: &str, hw: &HwAccel, workdir: &Path) -> Result<PathBuf> {
    let args = build_args(input, vfparams, hw);
    ffmpeg::run_phase("decimate", workdir, &args)
}

fn build_args(input: &Path, vfparams: &str, hw: &HwAccel) -> Vec<String> {
    let mut args = hw.decimate_args();
    args.extend([
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-vf".to_string(),
        vfparams.to_string(),
        // The filter only logs its per-frame decisions at debug.
        "-loglevel".to_string(),
        "debug".to_string(),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ]);
    args
}

/// Scan the captured decimate log for keep intervals and the audio
/// stream summaries.
pub fn parse_log(log_path: &Path) -> Result<DecimateReport> {
    let file = File::open(log_path)
        .with_context(|| format!("opening decimate log {}", log_path.display()))?;

    let mut scanner = LogScanner::default();
    for line in BufReader::new(file).lines() {
        let line = line.context("reading decimate log")?;
        scanner.feed(&line);
    }

    Ok(scanner.finish())
}

/// Line-at-a-time scanner over the decimate log. Starts in the
/// dropping state so the first kept frame opens the first interval.
#[derive(Default)]
struct LogScanner {
    intervals: Vec<KeepInterval>,
    keeping: bool,
    audio_in: bool,
    audio_out: bool,
}

impl LogScanner {
    fn feed(&mut self, line: &str) {
        let Some(caps) = FRAME_DECISION.captures(line) else {
            self.audio_in = self.audio_in || AUDIO_INPUT.is_match(line);
            self.audio_out = self.audio_out || AUDIO_OUTPUT.is_match(line);
            return;
        };

        let keep = &caps[1] == "keep";
        let Ok(pts_time) = caps[2].parse::<f64>() else {
            return;
        };

        if keep && !self.keeping {
            self.intervals.push(KeepInterval {
                start: pts_time,
                end: None,
            });
            self.keeping = true;
        } else if !keep && self.keeping {
            if let Some(open) = self.intervals.last_mut() {
                open.end = Some(pts_time);
                debug!("keeping times {}-{}", open.start, pts_time);
            }
            self.keeping = false;
        }
    }

    fn finish(self) -> DecimateReport {
        DecimateReport {
            intervals: self.intervals,
            // Both summaries must appear: an input-only match means the
            // stream never made it through the filter graph.
            has_audio: self.audio_in && self.audio_out,
        }
    }
}
