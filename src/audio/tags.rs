//! Tag reading and writing
//!
//! Reads and writes the metadata fields the editor panel exposes (title,
//! artist, album, year) using lofty. Only fields that are Some are written;
//! everything else in the tag is left alone.

use std::path::Path;

use lofty::{Accessor, Probe, Tag, TagExt, TaggedFileExt};

/// Metadata fields of a single track, as read from or written to its tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
}

impl TagFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.year.is_none()
    }
}

/// Read the editable tag fields of an audio file
///
/// A file without any tag yields empty fields rather than an error.
pub fn read_track_tags(path: &Path) -> Result<TagFields, String> {
    let tagged_file = Probe::open(path)
        .map_err(|e| format!("Failed to open file: {}", e))?
        .read()
        .map_err(|e| format!("Failed to read file: {}", e))?;

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(TagFields::default());
    };

    Ok(TagFields {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
        year: tag.year().map(|y| y.to_string()),
    })
}

/// Write tag fields to an audio file
///
/// Updates the primary tag with the provided fields; only fields that are
/// Some are updated.
pub fn write_track_tags(path: &Path, fields: &TagFields) -> Result<(), String> {
    let mut tagged_file = Probe::open(path)
        .map_err(|e| format!("Failed to open file: {}", e))?
        .read()
        .map_err(|e| format!("Failed to read file: {}", e))?;

    // Get or create the primary tag
    let tag = match tagged_file.primary_tag_mut() {
        Some(tag) => tag,
        None => {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
            tagged_file
                .primary_tag_mut()
                .ok_or_else(|| "Failed to create tag".to_string())?
        }
    };

    if let Some(title) = &fields.title {
        tag.set_title(title.clone());
    }
    if let Some(artist) = &fields.artist {
        tag.set_artist(artist.clone());
    }
    if let Some(album) = &fields.album {
        tag.set_album(album.clone());
    }
    if let Some(year) = &fields.year {
        if let Ok(y) = year.parse::<u32>() {
            tag.set_year(y);
        }
    }

    tag.save_to_path(path)
        .map_err(|e| format!("Failed to save file: {}", e))?;

    log::debug!("Wrote tags to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Minimal valid PCM WAV file for tag round-trip tests
    fn write_test_wav(path: &Path) {
        let sample_rate: u32 = 8000;
        let data: Vec<u8> = vec![0; 1600]; // 0.1s of 16-bit mono silence
        let data_len = data.len() as u32;

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend_from_slice(&data);

        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(&bytes).unwrap();
    }

    #[test]
    fn test_tag_fields_is_empty() {
        assert!(TagFields::default().is_empty());
        let fields = TagFields {
            title: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_read_untagged_file_yields_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_test_wav(&path);

        let fields = read_track_tags(&path).unwrap();
        assert!(fields.title.is_none());
        assert!(fields.artist.is_none());
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_test_wav(&path);

        let fields = TagFields {
            title: Some("Test Title".to_string()),
            artist: Some("Test Artist".to_string()),
            album: Some("Test Album".to_string()),
            year: Some("2003".to_string()),
        };
        write_track_tags(&path, &fields).unwrap();

        let read_back = read_track_tags(&path).unwrap();
        assert_eq!(read_back.title.as_deref(), Some("Test Title"));
        assert_eq!(read_back.artist.as_deref(), Some("Test Artist"));
        assert_eq!(read_back.album.as_deref(), Some("Test Album"));
    }

    #[test]
    fn test_partial_write_leaves_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_test_wav(&path);

        write_track_tags(
            &path,
            &TagFields {
                title: Some("Original".to_string()),
                artist: Some("Someone".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        // Update only the artist
        write_track_tags(
            &path,
            &TagFields {
                artist: Some("Someone Else".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let fields = read_track_tags(&path).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Original"));
        assert_eq!(fields.artist.as_deref(), Some("Someone Else"));
    }

    #[test]
    fn test_non_numeric_year_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        write_test_wav(&path);

        write_track_tags(
            &path,
            &TagFields {
                year: Some("not a year".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let fields = read_track_tags(&path).unwrap();
        assert!(fields.year.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = read_track_tags(Path::new("/nonexistent/track.mp3"));
        assert!(result.is_err());
    }
}
