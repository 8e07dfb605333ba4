// Audio module - file detection, stream probing, and tag I/O

pub mod detection;
pub mod probe;
pub mod tags;

pub use detection::is_audio_file;
pub use probe::{probe_stream, StreamInfo};
pub use tags::{read_track_tags, write_track_tags, TagFields};
