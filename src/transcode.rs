//! Transcode pass: concatenate the retained intervals and re-encode.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ffmpeg;
use crate::hwaccel::HwAccel;

/// Derive the output path: `<stem>.trimmed.<ext>` next to the input,
/// or under the current directory with `output_to_cwd`.
pub fn output_path(input: &Path, output_to_cwd: bool) -> PathBuf {
    let base = if output_to_cwd {
        input
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| input.to_path_buf())
    } else {
        input.to_path_buf()
    };

    match base.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            base.with_extension(format!("trimmed.{ext}"))
        }
        None => base.with_extension("trimmed"),
    }
}

/// Run the transcode pass over the playlist.
pub fn run(
    playlist: &Path,
    output: &Path,
    hw: &HwAccel,
    has_audio: bool,
    debug: bool,
    workdir: &Path,
) -> Result<()> {
    let args = build_args(playlist, output, hw, has_audio, debug);
    ffmpeg::run_phase("transcode", workdir, &args)?;
    Ok(())
}

fn build_args(
    playlist: &Path,
    output: &Path,
    hw: &HwAccel,
    has_audio: bool,
    debug: bool,
) -> Vec<String> {
    let mut args = Vec::new();

    if debug {
        args.extend(["-loglevel".to_string(), "debug".to_string()]);
    }

    args.extend(hw.transcode_args());
    args.extend([
        // The playlist lives outside the input's directory, which the
        // demuxer treats as unsafe by default.
        "-safe".to_string(),
        "0".to_string(),
        "-segment_time_metadata".to_string(),
        "1".to_string(),
        "-i".to_string(),
        playlist.to_string_lossy().into_owned(),
    ]);

    if has_audio {
        // Drop audio frames outside each segment's inpoint/outpoint
        // window; with no audio stream the filter has nothing to bind
        // to and the pass would fail.
        args.extend(["-af".to_string(), "aselect=concatdec_select".to_string()]);
    }

    args.push("-c:v".to_string());
    args.extend(hw.encoder_args());
    args.push(output.to_string_lossy().into_owned());

    args
}
