//! Folder scanning
//!
//! Turns a music folder on disk into a TrackDocument: discovers audio files,
//! probes their streams and reads their tags.

use std::path::Path;
use walkdir::WalkDir;

use crate::audio::{is_audio_file, probe_stream, read_track_tags};

use super::documents::{TrackDocument, TrackInfo};

/// Scan a folder into a track document
///
/// Files that fail to probe are skipped with a log entry rather than failing
/// the whole folder. A folder with no readable audio files is an error.
pub fn scan_music_folder(path: &Path) -> Result<TrackDocument, String> {
    if !path.is_dir() {
        return Err(format!("Not a directory: {}", path.display()));
    }

    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_audio_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    let mut tracks = Vec::new();
    for file in files {
        let stream = match probe_stream(&file) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", file, e);
                continue;
            }
        };
        // Tags are optional; an unreadable tag is an empty one
        let fields = read_track_tags(&file).unwrap_or_default();

        tracks.push(TrackInfo {
            path: file,
            title: fields.title,
            artist: fields.artist,
            album: fields.album,
            year: fields.year,
            duration: stream.duration,
            codec: stream.codec,
            is_lossy: stream.is_lossy,
        });
    }

    if tracks.is_empty() {
        return Err(format!("No audio files found in {}", path.display()));
    }

    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    log::info!("Scanned {} tracks from {:?}", tracks.len(), path);
    Ok(TrackDocument::new(title, tracks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_missing_folder_is_an_error() {
        assert!(scan_music_folder(Path::new("/nonexistent/folder")).is_err());
    }

    #[test]
    fn test_scan_empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_music_folder(dir.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("No audio files"));
    }

    #[test]
    fn test_scan_skips_non_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "not audio").unwrap();
        assert!(scan_music_folder(dir.path()).is_err());
    }
}
