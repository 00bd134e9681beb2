/*!
The `merge` module combines two change sets over a common original
arrangement into a new arrangement. At most one change from each side may
apply to any original item; when both sides touched the same item the
conflict is resolved by a fixed action table:

| A \ B      | added        | deleted | modified        | moved           |
|------------|--------------|---------|-----------------|-----------------|
| *added*    | maybeAddBoth | error   | error           | error           |
| *deleted*  | error        | delete  | delete          | delete          |
| *modified* | error        | delete  | twoModify       | moveAndModify   |
| *moved*    | error        | delete  | moveAndModify   | prefer A        |

The `error` cells cannot arise from well-formed differ output; hitting one is
reported to the caller with both change descriptors attached, never resolved
silently.
!*/

use crate::diff::{Change, ChangeState};
use crate::error::{self, LibResult};
use crate::file::{normalize_clip_start, PlaylistItem};
use crate::project::Arrangement;
use std::collections::HashMap;

/// Build a new arrangement from `original` with both change sets applied.
/// Unchanged items pass through in their original order; deletions drop out;
/// modifications and moves are replaced in place; additions from both sides
/// are appended last. Track rows are carried over from the original.
pub fn merge_arrangement(
    original: &Arrangement,
    changes_a: &[Change],
    changes_b: &[Change],
) -> crate::Result<Arrangement> {
    Ok(merge_inner(original, changes_a, changes_b)?)
}

fn merge_inner(
    original: &Arrangement,
    changes_a: &[Change],
    changes_b: &[Change],
) -> LibResult<Arrangement> {
    let a_by_index = indexed_changes(changes_a)?;
    let b_by_index = indexed_changes(changes_b)?;

    let mut items = Vec::with_capacity(original.items.len());
    for (index, item) in original.items.iter().enumerate() {
        match (a_by_index.get(&index), b_by_index.get(&index)) {
            (None, None) => items.push(item.clone()),
            (Some(change), None) | (None, Some(change)) => apply_one(&mut items, change)?,
            (Some(a), Some(b)) => items.extend(resolve(item, a, b)?),
        }
    }

    // additions from both sides land after everything kept from the
    // original; twin additions under one key collapse when identical
    let is_added = |change: &&Change| change.state == ChangeState::Added;
    let mut added_a: Vec<&Change> = changes_a.iter().filter(is_added).collect();
    for change_b in changes_b.iter().filter(is_added) {
        let item_b = changed_item(change_b)?;
        let twin = added_a.iter().position(|change_a| {
            change_a
                .item
                .as_ref()
                .map(|item_a| item_a.key() == item_b.key())
                .unwrap_or(false)
        });
        match twin {
            Some(position) => {
                let change_a = added_a.remove(position);
                items.extend(resolve_added(change_a, change_b)?);
            }
            None => items.push(item_b.clone()),
        }
    }
    for change_a in added_a {
        items.push(changed_item(change_a)?.clone());
    }

    Ok(Arrangement {
        name: original.name.clone(),
        items,
        // track rows are carried over unmerged
        tracks: original.tracks.clone(),
        misc: original.misc.clone(),
    })
}

/// Non-added changes keyed by original item index. Two changes from one side
/// for the same item means the differ misbehaved.
fn indexed_changes(changes: &[Change]) -> LibResult<HashMap<usize, &Change>> {
    let mut map: HashMap<usize, &Change> = HashMap::new();
    for change in changes {
        if change.state == ChangeState::Added {
            continue;
        }
        let index = match change.index {
            Some(index) => index,
            None => return error::OtherSnafu { site: site!() }.fail(),
        };
        if let Some(previous) = map.insert(index, change) {
            return error::MergeConflictSnafu {
                site: site!(),
                a: format!("{:?}", previous),
                b: format!("{:?}", change),
            }
            .fail();
        }
    }
    Ok(map)
}

fn changed_item(change: &Change) -> LibResult<&PlaylistItem> {
    match &change.item {
        Some(item) => Ok(item),
        None => error::OtherSnafu { site: site!() }.fail(),
    }
}

fn apply_one(items: &mut Vec<PlaylistItem>, change: &Change) -> LibResult<()> {
    match change.state {
        ChangeState::Deleted => {}
        ChangeState::Modified | ChangeState::Moved => {
            items.push(changed_item(change)?.clone())
        }
        ChangeState::Added => return error::OtherSnafu { site: site!() }.fail(),
    }
    Ok(())
}

fn resolve(original: &PlaylistItem, a: &Change, b: &Change) -> LibResult<Vec<PlaylistItem>> {
    use ChangeState::{Deleted, Modified, Moved};
    match (a.state, b.state) {
        (Deleted, Deleted)
        | (Deleted, Modified)
        | (Deleted, Moved)
        | (Modified, Deleted)
        | (Moved, Deleted) => Ok(Vec::new()),
        (Modified, Modified) => Ok(vec![two_modify(
            original,
            changed_item(a)?,
            changed_item(b)?,
        )]),
        (Modified, Moved) => Ok(vec![move_and_modify(
            original,
            changed_item(a)?,
            changed_item(b)?,
        )]),
        (Moved, Modified) => Ok(vec![move_and_modify(
            original,
            changed_item(b)?,
            changed_item(a)?,
        )]),
        // both sides only moved the clip: keep the first side's row
        (Moved, Moved) => Ok(vec![changed_item(a)?.clone()]),
        _ => error::MergeConflictSnafu {
            site: site!(),
            a: format!("{:?}", a),
            b: format!("{:?}", b),
        }
        .fail(),
    }
}

/// One side modified the clip, the other moved it. If the modifying side left
/// the clip on its original row, the move still applies; if both sides moved
/// it, the modified version wins whole.
fn move_and_modify(
    original: &PlaylistItem,
    modified: &PlaylistItem,
    moved: &PlaylistItem,
) -> PlaylistItem {
    let mut item = modified.clone();
    if modified.track == original.track {
        item.track = moved.track;
    }
    item
}

/// Per-attribute three-way merge. Where both sides agree, keep the value;
/// where only one side changed an attribute, take its value; where the sides
/// disagree about a changed attribute, the first side wins.
fn two_modify(original: &PlaylistItem, a: &PlaylistItem, b: &PlaylistItem) -> PlaylistItem {
    fn pick<T: PartialEq + Copy>(original: T, a: T, b: T) -> T {
        if a == original {
            b
        } else {
            a
        }
    }
    let mut merged = a.clone();
    merged.start = pick(original.start, a.start, b.start);
    merged.length = pick(original.length, a.length, b.length);
    merged.track = pick(original.track, a.track, b.track);
    merged.clip_start = pick(original.clip_start, a.clip_start, b.clip_start);
    merged.clip_end = pick(original.clip_end, a.clip_end, b.clip_end);
    merged.set_muted(pick(original.muted(), a.muted(), b.muted()));
    merged.set_selected(pick(original.selected(), a.selected(), b.selected()));
    merged
}

/// Both sides added a clip with the same key: keep one copy when the two are
/// effectively identical, both otherwise.
fn resolve_added(a: &Change, b: &Change) -> LibResult<Vec<PlaylistItem>> {
    let item_a = changed_item(a)?;
    let item_b = changed_item(b)?;
    let identical = item_a.length == item_b.length
        && normalize_clip_start(item_a.clip_start) == normalize_clip_start(item_b.clip_start);
    if identical {
        Ok(vec![item_a.clone()])
    } else {
        Ok(vec![item_a.clone(), item_b.clone()])
    }
}
