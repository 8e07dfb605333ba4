//! Audio stream probing
//!
//! Duration and codec detection via Symphonia. Tag reading and writing lives
//! in `tags`; this module only looks at the stream itself.

use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Stream-level properties of an audio file
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Normalized codec name ("mp3", "flac", ...)
    pub codec: String,
    pub is_lossy: bool,
}

/// Probe duration and codec of an audio file
pub fn probe_stream(path: &Path) -> Result<StreamInfo, String> {
    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| format!("Failed to probe audio format: {}", e))?;

    let format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| "No default track found".to_string())?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100) as f64;
    let n_frames = track.codec_params.n_frames.unwrap_or(0);
    let duration = n_frames as f64 / sample_rate;

    let codec = normalize_codec(&format!("{:?}", track.codec_params.codec), path);
    let is_lossy = matches!(codec.as_str(), "mp3" | "aac" | "ogg" | "opus" | "m4a");

    Ok(StreamInfo {
        duration,
        codec,
        is_lossy,
    })
}

/// Map Symphonia's codec debug string to a short display name
fn normalize_codec(codec_str: &str, path: &Path) -> String {
    if codec_str.contains("MP3") || codec_str.contains("Mp3") {
        "mp3".to_string()
    } else if codec_str.contains("FLAC") || codec_str.contains("Flac") {
        "flac".to_string()
    } else if codec_str.contains("AAC") || codec_str.contains("Aac") || codec_str.contains("4100") {
        // CodecType(4100) is AAC
        "aac".to_string()
    } else if codec_str.contains("Vorbis") || codec_str.contains("OGG") {
        "ogg".to_string()
    } else if codec_str.contains("Opus") {
        "opus".to_string()
    } else if codec_str.contains("ALAC") || codec_str.contains("Alac") || codec_str.contains("4101")
    {
        // CodecType(4101) is ALAC
        "alac".to_string()
    } else if codec_str.contains("PCM") || codec_str.contains("Pcm") {
        // WAV or AIFF
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav")
            .to_lowercase()
    } else {
        // Fall back to the file extension
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_codec_known_names() {
        let path = Path::new("track.bin");
        assert_eq!(normalize_codec("CodecType(Mp3)", path), "mp3");
        assert_eq!(normalize_codec("CodecType(Flac)", path), "flac");
        assert_eq!(normalize_codec("CodecType(4100)", path), "aac");
        assert_eq!(normalize_codec("CodecType(Opus)", path), "opus");
    }

    #[test]
    fn test_normalize_codec_pcm_uses_extension() {
        assert_eq!(normalize_codec("CodecType(PcmS16Le)", Path::new("a.wav")), "wav");
        assert_eq!(normalize_codec("CodecType(PcmS16Le)", Path::new("a.aiff")), "aiff");
    }

    #[test]
    fn test_normalize_codec_unknown_falls_back_to_extension() {
        assert_eq!(normalize_codec("CodecType(9999)", Path::new("a.ogg")), "ogg");
        assert_eq!(normalize_codec("CodecType(9999)", Path::new("a")), "unknown");
    }

    #[test]
    fn test_probe_missing_file_is_an_error() {
        assert!(probe_stream(Path::new("/nonexistent/track.mp3")).is_err());
    }
}
