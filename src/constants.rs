/*!
The `constants` module provides values needed when parsing and writing project
files.
!*/

/// The four-byte tag that opens the header chunk.
pub(crate) const HEADER_CHUNK_ID: &str = "FLhd";

/// The four-byte tag that opens the data chunk.
pub(crate) const DATA_CHUNK_ID: &str = "FLdt";

/// The header chunk length is always 6.
pub(crate) const HEADER_CHUNK_LENGTH: u32 = 6;

/// Pulses per quarter note written by the reference projects.
pub const DEFAULT_BEAT_DIV: u16 = 96;

/// The header's channel-count word is 'not really used'; reference files say 4.
pub(crate) const DEFAULT_CHANNEL_COUNT: u16 = 4;

/// Every mixer track has exactly this many effect slots.
pub const MIXER_SLOTS_PER_TRACK: u32 = 10;

/// A playlist item that has never been shifted stores this in place of a zero
/// clip start.
pub const UNSHIFTED_CLIP_START: u32 = 3_212_836_864;

/// The size of one playlist item record inside a `PlaylistData` payload.
pub(crate) const PLAYLIST_ITEM_BYTES: usize = 32;

/// Track indices run from 0 at the top of the playlist to 500.
pub(crate) const MAX_TRACK_INDEX: u32 = 500;

/// Playlist identifiers at or below this value refer to channels; higher
/// values refer to patterns, offset by `PATTERN_ID_BASE`.
pub(crate) const MAX_CHANNEL_IDENTIFIER: u16 = 20480;

/// `identifier = clip_index + PATTERN_ID_BASE` for pattern items.
pub(crate) const PATTERN_ID_BASE: u16 = 20481;

/// Default time-signature numerator used for bar:step:tick rendering.
pub(crate) const DEFAULT_PAT_LENGTH: u32 = 4;

/// Default time-signature denominator used for bar:step:tick rendering.
pub(crate) const DEFAULT_BLOCK_LENGTH: u32 = 4;
