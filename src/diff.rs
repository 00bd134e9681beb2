/*!
The `diff` module computes per-clip change sets between two versions of an
arrangement. Items are paired by (type, clip index, start tick); duplicates
under one key are paired by the closest track index. A clip whose length,
clip start or muted flag changed is `Modified` (which outranks `Moved`); one
that only changed track is `Moved`.

Out of scope: changes to track rows and to the time base.
!*/

use crate::file::{normalize_clip_start, ItemKey, PlaylistItem};
use crate::project::{names, Arrangement, Project};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum ChangeState {
    Added,
    Deleted,
    Modified,
    Moved,
}

/// One difference between two versions of an arrangement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Change {
    pub state: ChangeState,
    /// Index of the item in the first arrangement; `None` for additions.
    pub index: Option<usize>,
    /// The item as it appears in the second arrangement; `None` for
    /// deletions.
    pub item: Option<PlaylistItem>,
}

/// Compare two versions of an arrangement and report what changed from `a`
/// to `b`.
///
/// Assumes pattern and channel indices mean the same thing in both versions,
/// and that the time resolution is unchanged. Moving a clip horizontally
/// counts as a deletion plus an insertion.
pub fn diff_arrangements(a: &Arrangement, b: &Arrangement) -> Vec<Change> {
    // items of b not yet claimed by a match, grouped by key
    let mut unclaimed: HashMap<ItemKey, Vec<PlaylistItem>> = HashMap::new();
    for item in &b.items {
        unclaimed.entry(item.key()).or_default().push(item.clone());
    }

    let mut changes = Vec::new();
    for (index, item) in a.items.iter().enumerate() {
        let matched = match unclaimed.get_mut(&item.key()) {
            Some(candidates) if !candidates.is_empty() => {
                // same clip placed on the same tick more than once: pair with
                // the nearest row
                let best = candidates
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, candidate)| {
                        (i64::from(item.track) - i64::from(candidate.track)).abs()
                    })
                    .map(|(candidate_index, _)| candidate_index);
                best.map(|candidate_index| candidates.remove(candidate_index))
            }
            _ => None,
        };
        let other = match matched {
            Some(other) => other,
            None => {
                changes.push(Change {
                    state: ChangeState::Deleted,
                    index: Some(index),
                    item: None,
                });
                continue;
            }
        };
        // start, type and clip index are equal by key; that leaves length,
        // clip start and the muted flag, then the track row
        let modified = item.length != other.length
            || normalize_clip_start(item.clip_start) != normalize_clip_start(other.clip_start)
            || item.muted() != other.muted();
        let moved = item.track != other.track;
        if modified {
            changes.push(Change {
                state: ChangeState::Modified,
                index: Some(index),
                item: Some(other),
            });
        } else if moved {
            changes.push(Change {
                state: ChangeState::Moved,
                index: Some(index),
                item: Some(other),
            });
        }
    }

    // whatever b still holds is new, reported in b's item order
    for item in &b.items {
        if let Some(candidates) = unclaimed.get_mut(&item.key()) {
            if let Some(position) = candidates.iter().position(|candidate| candidate == item) {
                candidates.remove(position);
                changes.push(Change {
                    state: ChangeState::Added,
                    index: None,
                    item: Some(item.clone()),
                });
            }
        }
    }

    changes
}

/// Per-state counts over a change set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DiffSummary {
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
    pub moved: usize,
}

impl Display for DiffSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} clips added, {} deleted, {} modified, {} moved",
            self.added, self.deleted, self.modified, self.moved
        )
    }
}

pub fn summarize(changes: &[Change]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for change in changes {
        match change.state {
            ChangeState::Added => summary.added += 1,
            ChangeState::Deleted => summary.deleted += 1,
            ChangeState::Modified => summary.modified += 1,
            ChangeState::Moved => summary.moved += 1,
        }
    }
    summary
}

/// Human-readable lines for a change set, one per change.
pub fn describe(project: &Project, original: &Arrangement, changes: &[Change]) -> Vec<String> {
    changes
        .iter()
        .map(|change| describe_one(project, original, change))
        .collect()
}

fn describe_one(project: &Project, original: &Arrangement, change: &Change) -> String {
    let original_item = change.index.and_then(|index| original.items.get(index));
    let subject = change.item.as_ref().or(original_item);
    let name = match subject {
        Some(item) => names::item_name(project, item),
        None => String::from("(unknown clip)"),
    };
    match change.state {
        ChangeState::Added => match &change.item {
            Some(item) => format!(
                "{} added at {}",
                name,
                names::ticks_to_bst(project, item.start)
            ),
            None => format!("{} added", name),
        },
        ChangeState::Deleted => match original_item {
            Some(item) => format!(
                "{} at {} deleted",
                name,
                names::ticks_to_bst(project, item.start)
            ),
            None => format!("{} deleted", name),
        },
        ChangeState::Modified => match &change.item {
            Some(item) => format!(
                "{} at {} modified",
                name,
                names::ticks_to_bst(project, item.start)
            ),
            None => format!("{} modified", name),
        },
        ChangeState::Moved => match (original_item, &change.item) {
            (Some(from), Some(to)) => format!(
                "{} at {} moved from track {} to track {}",
                name,
                names::ticks_to_bst(project, from.start),
                from.track,
                to.track
            ),
            _ => format!("{} moved", name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{ItemType, PlaylistItem};

    fn channel_item(start: u32, track: u32, length: u32, clip_index: u16) -> PlaylistItem {
        PlaylistItem {
            start,
            length,
            track,
            clip_start: 0,
            clip_end: length,
            item_type: ItemType::Channel,
            clip_index,
            ..PlaylistItem::default()
        }
    }

    fn arrangement_of(items: Vec<PlaylistItem>) -> Arrangement {
        Arrangement {
            items,
            ..Arrangement::default()
        }
    }

    #[test]
    fn diff_of_identical_arrangements_is_empty() {
        let a = arrangement_of(vec![
            channel_item(0, 3, 64, 5),
            channel_item(128, 4, 64, 5),
        ]);
        assert!(diff_arrangements(&a, &a.clone()).is_empty());
    }

    #[test]
    fn single_move_is_reported_as_moved() {
        let a = arrangement_of(vec![channel_item(0, 3, 64, 5)]);
        let b = arrangement_of(vec![channel_item(0, 7, 64, 5)]);
        let changes = diff_arrangements(&a, &b);
        assert_eq!(1, changes.len());
        assert_eq!(ChangeState::Moved, changes[0].state);
        assert_eq!(Some(0), changes[0].index);
        assert_eq!(7, changes[0].item.as_ref().unwrap().track);
    }

    #[test]
    fn modified_outranks_moved() {
        let a = arrangement_of(vec![channel_item(0, 3, 64, 5)]);
        let b = arrangement_of(vec![channel_item(0, 7, 128, 5)]);
        let changes = diff_arrangements(&a, &b);
        assert_eq!(1, changes.len());
        assert_eq!(ChangeState::Modified, changes[0].state);
    }

    #[test]
    fn additions_and_deletions() {
        let a = arrangement_of(vec![channel_item(0, 0, 64, 1)]);
        let b = arrangement_of(vec![channel_item(96, 0, 64, 2)]);
        let changes = diff_arrangements(&a, &b);
        assert_eq!(2, changes.len());
        assert_eq!(ChangeState::Deleted, changes[0].state);
        assert_eq!(Some(0), changes[0].index);
        assert_eq!(ChangeState::Added, changes[1].state);
        assert_eq!(None, changes[1].index);
    }

    #[test]
    fn duplicate_keys_pair_by_track_distance() {
        // two copies of the same clip on the same tick; only the far one moves
        let a = arrangement_of(vec![channel_item(0, 2, 64, 5), channel_item(0, 9, 64, 5)]);
        let b = arrangement_of(vec![channel_item(0, 2, 64, 5), channel_item(0, 11, 64, 5)]);
        let changes = diff_arrangements(&a, &b);
        assert_eq!(1, changes.len());
        assert_eq!(ChangeState::Moved, changes[0].state);
        assert_eq!(Some(1), changes[0].index);
        assert_eq!(11, changes[0].item.as_ref().unwrap().track);
    }

    #[test]
    fn sentinel_clip_start_compares_equal_to_zero() {
        let a = arrangement_of(vec![channel_item(0, 3, 64, 5)]);
        let mut shifted = channel_item(0, 3, 64, 5);
        shifted.clip_start = crate::constants::UNSHIFTED_CLIP_START;
        let b = arrangement_of(vec![shifted]);
        assert!(diff_arrangements(&a, &b).is_empty());
    }

    #[test]
    fn mute_toggle_is_a_modification() {
        let a = arrangement_of(vec![channel_item(0, 3, 64, 5)]);
        let mut muted = channel_item(0, 3, 64, 5);
        muted.set_muted(true);
        let b = arrangement_of(vec![muted]);
        let changes = diff_arrangements(&a, &b);
        assert_eq!(1, changes.len());
        assert_eq!(ChangeState::Modified, changes[0].state);
    }

    #[test]
    fn every_item_is_accounted_for() {
        let a = arrangement_of(vec![
            channel_item(0, 0, 64, 1),
            channel_item(96, 1, 64, 1),
            channel_item(192, 2, 64, 2),
        ]);
        let b = arrangement_of(vec![
            channel_item(0, 0, 64, 1),
            channel_item(192, 5, 64, 2),
            channel_item(288, 0, 64, 3),
        ]);
        let changes = diff_arrangements(&a, &b);
        let summary = summarize(&changes);
        assert_eq!(1, summary.deleted); // the item at 96
        assert_eq!(1, summary.moved); // the item at 192
        assert_eq!(1, summary.added); // the item at 288
        assert_eq!(0, summary.modified);
    }
}
