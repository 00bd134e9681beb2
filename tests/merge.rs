mod utils;

use flp_file::file::{ItemType, Payload, PlaylistItem};
use flp_file::project::{Arrangement, Channel, ChannelKind, Pattern};
use flp_file::{diff, merge, Project, Text};
use tempfile::TempDir;
use utils::enable_logging;

fn pattern_item(start: u32, track: u32, length: u32, clip_index: u16) -> PlaylistItem {
    PlaylistItem {
        start,
        length,
        track,
        clip_start: 0,
        clip_end: length,
        item_type: ItemType::Pattern,
        clip_index,
        ..PlaylistItem::default()
    }
}

/// A small project with one pattern placed three times on the playlist.
fn base_project() -> Project {
    let mut project = Project::default();
    project.info.insert("Tempo", Payload::Int(120_000));

    let mut pattern = Pattern::default();
    pattern.name = Some(Text::new("Loop"));
    project.patterns.push(pattern);

    let mut channel = Channel::default();
    channel.name = Some(Text::new("Lead"));
    channel.kind = Some(ChannelKind::Generator);
    project.channels.push(channel);

    let mut arrangement = Arrangement::default();
    arrangement.items.push(pattern_item(0, 1, 384, 0));
    arrangement.items.push(pattern_item(384, 1, 384, 0));
    arrangement.items.push(pattern_item(768, 2, 384, 0));
    project.arrangements.push(arrangement);
    project
}

/// Two divergent edits of the same project merge into one arrangement after
/// a save/load cycle for each participant.
#[test]
fn three_way_merge_through_files() {
    enable_logging();
    let td = TempDir::new().unwrap();

    let original = base_project();

    // side A: mute the second item
    let mut version_a = original.clone();
    version_a.arrangements[0].items[1].set_muted(true);

    // side B: move the third item down, delete the first, add a new clip
    let mut version_b = original.clone();
    version_b.arrangements[0].items[2].track = 7;
    version_b.arrangements[0].items.remove(0);
    version_b.arrangements[0]
        .items
        .push(pattern_item(1152, 3, 384, 0));

    let o_path = td.path().join("original.flp");
    let a_path = td.path().join("a.flp");
    let b_path = td.path().join("b.flp");
    original.save(&o_path).unwrap();
    version_a.save(&a_path).unwrap();
    version_b.save(&b_path).unwrap();

    let original = Project::load(&o_path).unwrap();
    let version_a = Project::load(&a_path).unwrap();
    let version_b = Project::load(&b_path).unwrap();

    let changes_a = diff::diff_arrangements(&original.arrangements[0], &version_a.arrangements[0]);
    let changes_b = diff::diff_arrangements(&original.arrangements[0], &version_b.arrangements[0]);

    let summary_a = diff::summarize(&changes_a);
    assert_eq!(1, summary_a.modified);
    assert_eq!(0, summary_a.added + summary_a.deleted + summary_a.moved);

    let summary_b = diff::summarize(&changes_b);
    assert_eq!(1, summary_b.deleted);
    assert_eq!(1, summary_b.moved);
    assert_eq!(1, summary_b.added);

    let merged =
        merge::merge_arrangement(&original.arrangements[0], &changes_a, &changes_b).unwrap();

    // first item deleted by B; second muted by A; third moved by B; one added
    assert_eq!(3, merged.items.len());
    assert_eq!(384, merged.items[0].start);
    assert!(merged.items[0].muted());
    assert_eq!(768, merged.items[1].start);
    assert_eq!(7, merged.items[1].track);
    assert_eq!(1152, merged.items[2].start);

    // the merged arrangement survives its own save/load round-trip
    let mut merged_project = original.clone();
    merged_project.arrangements[0] = merged;
    let merged_path = td.path().join("merged.flp");
    merged_project.save(&merged_path).unwrap();
    let reloaded = Project::load(&merged_path).unwrap();
    assert_eq!(merged_project, reloaded);
}

/// The diff describers name clips by their pattern, with ghosts rendered
/// synthetically.
#[test]
fn diff_descriptions_name_clips() {
    enable_logging();
    let original = base_project();
    let mut edited = original.clone();
    edited.arrangements[0].items[2].track = 9;
    edited.arrangements[0].items.push(pattern_item(1536, 0, 96, 4)); // ghost

    let changes = diff::diff_arrangements(&original.arrangements[0], &edited.arrangements[0]);
    let lines = diff::describe(&original, &original.arrangements[0], &changes);
    assert_eq!(2, lines.len());
    assert!(lines[0].contains("Loop"));
    assert!(lines[0].contains("moved from track 2 to track 9"));
    assert!(lines[1].contains("Pattern 5 (ghost)"));
    assert!(lines[1].contains("added"));
}
