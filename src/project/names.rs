/*!
The `names` module renders entity names and playlist positions for display.
Playlist items may reference pattern indices beyond the pattern list ("ghost"
patterns); those get a synthetic name rather than an error.
!*/

use crate::constants::{DEFAULT_BLOCK_LENGTH, DEFAULT_PAT_LENGTH};
use crate::file::{ItemType, PlaylistItem};
use crate::project::Project;

/// The display name of a pattern by zero-based index.
pub fn pattern_name(project: &Project, index: usize) -> String {
    match project.patterns.get(index) {
        None => format!("Pattern {} (ghost)", index + 1),
        Some(pattern) => match &pattern.name {
            Some(name) => name.to_string(),
            None => format!("Pattern {}", index + 1),
        },
    }
}

/// The display name of a channel by index.
pub fn channel_name(project: &Project, index: usize) -> String {
    match project.channels.get(index).and_then(|c| c.name.as_ref()) {
        Some(name) => name.to_string(),
        None => format!("Channel {}", index + 1),
    }
}

/// The display name of whatever a playlist item points at.
pub fn item_name(project: &Project, item: &PlaylistItem) -> String {
    match item.item_type {
        ItemType::Pattern => pattern_name(project, usize::from(item.clip_index)),
        ItemType::Channel => channel_name(project, usize::from(item.clip_index)),
    }
}

/// Render a tick offset as bar:step:tick, using the project's time signature
/// events and beat division.
pub fn ticks_to_bst(project: &Project, ticks: u32) -> String {
    let numerator = project
        .info
        .int("FLP_PatLength")
        .unwrap_or(DEFAULT_PAT_LENGTH)
        .max(1);
    let denominator = project
        .info
        .int("FLP_BlockLength")
        .unwrap_or(DEFAULT_BLOCK_LENGTH)
        .clamp(1, 16);
    let ticks_per_step = (u32::from(project.beat_div) / 4).max(1);
    let steps_per_bar = (numerator * (16 / denominator)).max(1);

    let bar = ticks / (steps_per_bar * ticks_per_step) + 1;
    let step = (ticks / ticks_per_step) % steps_per_bar + 1;
    let tick = ticks % ticks_per_step;
    format!("{}:{:02}:{:02}", bar, step, tick)
}
