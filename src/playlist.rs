//! Concat-demuxer playlist generation.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::decimate::KeepInterval;
use crate::error::Result;

/// Render the ffconcat playlist for the retained intervals. An
/// open-ended interval gets no `outpoint` and runs to the end of the
/// clip.
pub fn render(input: &Path, intervals: &[KeepInterval]) -> String {
    let mut playlist = String::from("ffconcat version 1.0\n");

    for interval in intervals {
        playlist.push('\n');
        playlist.push_str(&format!("file '{}'\n", input.display()));
        playlist.push_str(&format!("inpoint {}\n", interval.start));
        if let Some(end) = interval.end {
            playlist.push_str(&format!("outpoint {end}\n"));
        }
    }

    playlist
}

/// Write the playlist to `path`. The demuxer resolves `file` entries
/// relative to the playlist's own location, not the working
/// directory, so the input path is made absolute first.
pub fn write(path: &Path, input: &Path, intervals: &[KeepInterval]) -> Result<()> {
    let input = input
        .canonicalize()
        .with_context(|| format!("resolving {}", input.display()))?;

    fs::write(path, render(&input, intervals))
        .with_context(|| format!("writing playlist {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_closed_intervals() {
        let intervals = vec![
            KeepInterval {
                start: 0.0,
                end: Some(1.066667),
            },
            KeepInterval {
                start: 2.133333,
                end: Some(4.2),
            },
        ];

        assert_eq!(
            render(Path::new("/videos/clip.mkv"), &intervals),
            "ffconcat version 1.0\n\
             \n\
             file '/videos/clip.mkv'\n\
             inpoint 0\n\
             outpoint 1.066667\n\
             \n\
             file '/videos/clip.mkv'\n\
             inpoint 2.133333\n\
             outpoint 4.2\n"
        );
    }

    #[test]
    fn test_render_open_tail_has_no_outpoint() {
        let intervals = vec![KeepInterval {
            start: 3.5,
            end: None,
        }];

        assert_eq!(
            render(Path::new("/videos/clip.mkv"), &intervals),
            "ffconcat version 1.0\n\
             \n\
             file '/videos/clip.mkv'\n\
             inpoint 3.5\n"
        );
    }

    #[test]
    fn test_render_no_intervals_is_header_only() {
        assert_eq!(
            render(Path::new("/videos/clip.mkv"), &[]),
            "ffconcat version 1.0\n"
        );
    }
}
