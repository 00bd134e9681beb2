use crate::constants::{
    MAX_CHANNEL_IDENTIFIER, MAX_TRACK_INDEX, PATTERN_ID_BASE, UNSHIFTED_CLIP_START,
};
use crate::error::LibResult;
use std::convert::TryFrom;

const MUTED_BIT: u8 = 0b0010_0000;
const SELECTED_BIT: u8 = 0b1000_0000;

/// What a playlist item points at: a pattern, or a channel (an audio clip or
/// automation clip generator).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum ItemType {
    Pattern,
    Channel,
}

/// The identity used to pair items across two versions of an arrangement.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ItemKey {
    pub item_type: ItemType,
    pub clip_index: u16,
    pub start: u32,
}

/// One clip placed on the playlist. Decoded from, and encoded to, a fixed
/// 32-byte record:
///
/// ```text
/// 0..4   start (u32)
/// 4..6   unknown, preserved
/// 6..8   identifier (u16): clip_index + 20481 for patterns, clip_index otherwise
/// 8..12  length (u32)
/// 12..16 500 - track (u32)
/// 16..24 unknown, preserved; byte 19 carries the muted and selected bits
/// 24..28 clip_start (u32)
/// 28..32 clip_end (u32)
/// ```
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct PlaylistItem {
    /// Position in the playlist, in ticks.
    pub start: u32,
    /// Length of the item, in ticks.
    pub length: u32,
    /// Which track (row) the item is on; 0 is the top row, 500 the last.
    pub track: u32,
    /// Where in the source pattern or clip this item begins, in ticks.
    pub clip_start: u32,
    /// Where in the source pattern or clip this item ends, in ticks.
    pub clip_end: u32,
    pub item_type: ItemType,
    /// Index into the pattern list or the channel list, depending on type.
    pub clip_index: u16,
    /// Bytes 4..6, unknown but stable across edits.
    pub misc_4_6: [u8; 2],
    /// Bytes 16..24, which carry the muted/selected bits plus unknown flags.
    pub misc: [u8; 8],
}

impl Default for PlaylistItem {
    fn default() -> Self {
        Self {
            start: 0,
            length: 0,
            track: 0,
            clip_start: 0,
            clip_end: 0,
            item_type: ItemType::Pattern,
            clip_index: 0,
            // observed constant in every record so far
            misc_4_6: [0x00, 0x50],
            misc: [0x00, 0x00, 0x00, 0x00, 0x40, 0x64, 0x80, 0x80],
        }
    }
}

impl PlaylistItem {
    /// The muted flag is a view over bit 5 of byte 19 of the raw record.
    pub fn muted(&self) -> bool {
        self.misc[3] & MUTED_BIT != 0
    }

    pub fn set_muted(&mut self, muted: bool) {
        if muted {
            self.misc[3] |= MUTED_BIT;
        } else {
            self.misc[3] &= !MUTED_BIT;
        }
    }

    /// The selected flag is a view over bit 7 of byte 19 of the raw record.
    pub fn selected(&self) -> bool {
        self.misc[3] & SELECTED_BIT != 0
    }

    pub fn set_selected(&mut self, selected: bool) {
        if selected {
            self.misc[3] |= SELECTED_BIT;
        } else {
            self.misc[3] &= !SELECTED_BIT;
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey {
            item_type: self.item_type,
            clip_index: self.clip_index,
            start: self.start,
        }
    }

    pub(crate) fn decode(record: &[u8; 32]) -> LibResult<Self> {
        let identifier = u16::from_le_bytes([record[6], record[7]]);
        let (item_type, clip_index) = if identifier > MAX_CHANNEL_IDENTIFIER {
            (ItemType::Pattern, identifier - PATTERN_ID_BASE)
        } else {
            (ItemType::Channel, identifier)
        };
        let track_raw = u32::from_le_bytes([record[12], record[13], record[14], record[15]]);
        let track = match MAX_TRACK_INDEX.checked_sub(track_raw) {
            Some(track) => track,
            None => invalid_file_r!("playlist item track word {} exceeds {}", track_raw, MAX_TRACK_INDEX)?,
        };
        let mut misc_4_6 = [0u8; 2];
        misc_4_6.copy_from_slice(&record[4..6]);
        let mut misc = [0u8; 8];
        misc.copy_from_slice(&record[16..24]);
        Ok(Self {
            start: u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
            length: u32::from_le_bytes([record[8], record[9], record[10], record[11]]),
            track,
            clip_start: u32::from_le_bytes([record[24], record[25], record[26], record[27]]),
            clip_end: u32::from_le_bytes([record[28], record[29], record[30], record[31]]),
            item_type,
            clip_index,
            misc_4_6,
            misc,
        })
    }

    pub(crate) fn encode(&self) -> LibResult<[u8; 32]> {
        let identifier = match self.item_type {
            ItemType::Pattern => {
                match u16::try_from(u32::from(self.clip_index) + u32::from(PATTERN_ID_BASE)) {
                    Ok(identifier) => identifier,
                    Err(_) => invalid_file_r!("pattern index {} cannot be encoded", self.clip_index)?,
                }
            }
            ItemType::Channel => {
                if self.clip_index > MAX_CHANNEL_IDENTIFIER {
                    invalid_file!("channel index {} exceeds {}", self.clip_index, MAX_CHANNEL_IDENTIFIER);
                }
                self.clip_index
            }
        };
        let track_raw = match MAX_TRACK_INDEX.checked_sub(self.track) {
            Some(raw) => raw,
            None => invalid_file_r!("track index {} exceeds {}", self.track, MAX_TRACK_INDEX)?,
        };
        let mut record = [0u8; 32];
        record[0..4].copy_from_slice(&self.start.to_le_bytes());
        record[4..6].copy_from_slice(&self.misc_4_6);
        record[6..8].copy_from_slice(&identifier.to_le_bytes());
        record[8..12].copy_from_slice(&self.length.to_le_bytes());
        record[12..16].copy_from_slice(&track_raw.to_le_bytes());
        record[16..24].copy_from_slice(&self.misc);
        record[24..28].copy_from_slice(&self.clip_start.to_le_bytes());
        record[28..32].copy_from_slice(&self.clip_end.to_le_bytes());
        Ok(record)
    }
}

/// An item that has never been shifted stores a sentinel instead of a zero
/// clip start. The codec preserves the raw value; comparisons in the diff and
/// merge layers go through this.
pub fn normalize_clip_start(clip_start: u32) -> u32 {
    if clip_start == UNSHIFTED_CLIP_START {
        0
    } else {
        clip_start
    }
}
