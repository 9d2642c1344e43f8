use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::PlaybackError;

#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub path: PathBuf,
    /// Length in seconds, when the container reports a frame count
    pub duration: Option<f64>,
}

impl std::fmt::Display for ClipInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.duration {
            Some(d) => write!(f, "{} ({:.1}s)", self.path.display(), d),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

fn clip_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Check that `path` is an audio file symphonia can read and pull its duration.
pub fn probe_clip<P: AsRef<Path>>(path: P) -> Result<ClipInfo, PlaybackError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(PlaybackError::ClipNotFound(clip_name(path)));
    }

    let file = File::open(path).map_err(|_| PlaybackError::ClipNotFound(clip_name(path)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| PlaybackError::Decode {
            clip: clip_name(path),
            reason: e.to_string(),
        })?;

    let duration = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .and_then(|t| {
            let frames = t.codec_params.n_frames?;
            let rate = t.codec_params.sample_rate?;
            Some(frames as f64 / rate as f64)
        });

    Ok(ClipInfo {
        path: path.to_path_buf(),
        duration,
    })
}
