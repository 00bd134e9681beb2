use crate::constants::{DATA_CHUNK_ID, MIXER_SLOTS_PER_TRACK, PLAYLIST_ITEM_BYTES};
use crate::error::LibResult;
use crate::file::{registry, Event, Header, Payload};
use crate::project::{Arrangement, Channel, ChannelKind, MixerTrack, Pattern, Project};
use log::debug;
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::Write;

// The interpreter is order-dependent, so emission follows a fixed schedule.
// Project globals are written in four groups around the entity sections, each
// group in a prescribed ID order.
const PROJECT_PRELUDE: &[u8] = &[
    199, 159, 28, 37, 200, 156, 67, 9, 11, 80, 17, 18, 35, 23, 30, 10, 194, 206, 207, 202, 195,
    197, 237,
];
const PROJECT_MID: &[u8] = &[146, 216];
const PROJECT_POSTLUDE: &[u8] = &[100, 29, 39, 40, 31, 38];
const PROJECT_TAIL: &[u8] = &[225, 133];

const PATTERN_MISC_ORDER: &[&str] = &["PatternAutomationData", "PatternData"];

// Everything the parser can store on a channel, minus the plugin preamble and
// the typed name/kind fields, which have their own slots in the schedule.
const CHANNEL_MISC_ORDER: &[&str] = &[
    "FLP_Color",
    "UNKNOWN_155",
    "FLP_PluginParams",
    "FLP_Enabled",
    "FLP_LoopType",
    "FLP_MixSliceNum",
    "FLP_FX",
    "FLP_Fade_Stereo",
    "FLP_CutOff",
    "FLP_Resonance",
    "FLP_PreAmp",
    "FLP_Decay",
    "FLP_Attack",
    "FLP_StDel",
    "FLP_FX3",
    "FLP_ShiftDelay",
    "FLP_FXSine",
    "FLP_CutCutBy",
    "FLP_Reverb",
    "FLP_IntStretch",
    "FLP_SSNote",
    "FLP_Delay",
    "FLP_Text_SampleFileName",
    "FLP_ChanParams",
    "ChannelParams",
    "ChannelEnvelopeParams",
    "ChannelFilterGroup",
    "UNKNOWN_32",
    "UNKNOWN_97",
    "UNKNOWN_142",
    "UNKNOWN_143",
    "UNKNOWN_144",
    "UNKNOWN_150",
    "UNKNOWN_157",
    "UNKNOWN_158",
    "UNKNOWN_164",
    "UNKNOWN_221",
    "UNKNOWN_228",
    "UNKNOWN_229",
    "UNKNOWN_234",
];

const EFFECT_MISC_ORDER: &[&str] = &["FLP_Color", "UNKNOWN_155", "FLP_PluginParams"];

const MIXER_TRACK_POSTAMBLE: &[&str] = &[
    "MixerTrackRouting",
    "InsertAudioInputSource",
    "InsertAudioOutputTarget",
    "MixerTrackColor",
    "MixerTrackIcon",
];

pub(crate) fn write<W: Write>(project: &Project, w: &mut W) -> LibResult<()> {
    let header = Header {
        format: 0,
        n_channels: project.n_channels,
        beat_div: project.beat_div,
    };
    header.write(w)?;
    w.write_all(DATA_CHUNK_ID.as_bytes()).context(wr!())?;

    // the data chunk is preceded by its length, so build it in memory first
    let mut data: Vec<u8> = Vec::new();
    write_data(project, &mut data)?;
    let data_length = match u32::try_from(data.len()) {
        Ok(length) => length,
        Err(_) => invalid_file_r!(
            "data chunk of {} bytes exceeds the 32-bit length field",
            data.len()
        )?,
    };
    w.write_all(&data_length.to_le_bytes()).context(wr!())?;
    w.write_all(&data).context(wr!())?;
    debug!("{} bytes of event data", data_length);
    Ok(())
}

fn write_data(project: &Project, w: &mut Vec<u8>) -> LibResult<()> {
    for &id in PROJECT_PRELUDE {
        emit_project_global(project, w, id)?;
    }

    for group in &project.channel_filter_groups {
        emit(w, 231, Payload::Bytes(group.name.to_bytes()))?;
    }
    for &id in PROJECT_MID {
        emit_project_global(project, w, id)?;
    }

    for (index, pattern) in project.patterns.iter().enumerate() {
        write_pattern(w, index, pattern)?;
    }

    emit_misc(w, &project.info, "UNKNOWN_226")?;

    // automation clip bodies precede the channel section
    for channel in &project.channels {
        if channel.kind == Some(ChannelKind::AutomationClip) {
            if let Some(data) = &channel.data {
                emit(w, 227, Payload::Bytes(data.clone()))?;
            }
        }
    }

    for (index, channel) in project.channels.iter().enumerate() {
        write_channel(w, index, channel)?;
    }

    for (index, arrangement) in project.arrangements.iter().enumerate() {
        write_arrangement(w, index, arrangement)?;
    }

    for &id in PROJECT_POSTLUDE {
        emit_project_global(project, w, id)?;
    }

    for track in &project.mixer_tracks {
        write_mixer_track(w, track)?;
    }

    for &id in PROJECT_TAIL {
        emit_project_global(project, w, id)?;
    }
    Ok(())
}

fn emit(w: &mut Vec<u8>, id: u8, payload: Payload) -> LibResult<()> {
    Event::new(id, payload).write(w)
}

/// Write every payload stored under `name`, in order; nothing if absent.
fn emit_misc(w: &mut Vec<u8>, misc: &crate::project::Misc, name: &str) -> LibResult<()> {
    let id = match registry::event_id(name) {
        Some(id) => id,
        None => {
            debug!("no event id for name {}, skipping", name);
            return Ok(());
        }
    };
    for payload in misc.payloads(name) {
        emit(w, id, payload.clone())?;
    }
    Ok(())
}

fn emit_project_global(project: &Project, w: &mut Vec<u8>, id: u8) -> LibResult<()> {
    emit_misc(w, &project.info, registry::event_name(id).as_ref())
}

fn write_pattern(w: &mut Vec<u8>, index: usize, pattern: &Pattern) -> LibResult<()> {
    // pattern numbers are 1-based on disk
    emit(w, 65, Payload::Int(index as u32 + 1))?;
    if let Some(name) = &pattern.name {
        emit(w, 193, Payload::Bytes(name.to_bytes()))?;
    }
    for misc_name in PATTERN_MISC_ORDER {
        emit_misc(w, &pattern.misc, misc_name)?;
    }
    Ok(())
}

fn write_channel(w: &mut Vec<u8>, index: usize, channel: &Channel) -> LibResult<()> {
    emit(w, 64, Payload::Int(index as u32))?;
    if let Some(kind) = channel.kind {
        emit(w, 21, Payload::Int(kind.to_u8().into()))?;
    }
    emit_misc(w, &channel.misc, "FLP_Text_PluginName")?;
    emit_misc(w, &channel.misc, "FLP_NewPlugin")?;
    if let Some(name) = &channel.name {
        emit(w, 203, Payload::Bytes(name.to_bytes()))?;
    }
    for misc_name in CHANNEL_MISC_ORDER {
        emit_misc(w, &channel.misc, misc_name)?;
    }
    Ok(())
}

fn write_arrangement(w: &mut Vec<u8>, index: usize, arrangement: &Arrangement) -> LibResult<()> {
    emit(w, 99, Payload::Int(index as u32))?;
    if let Some(name) = &arrangement.name {
        emit(w, 241, Payload::Bytes(name.to_bytes()))?;
    }
    emit_misc(w, &arrangement.misc, "UNKNOWN_36")?;

    let mut playlist = Vec::with_capacity(arrangement.items.len() * PLAYLIST_ITEM_BYTES);
    for item in &arrangement.items {
        playlist.extend_from_slice(&item.encode()?);
    }
    emit(w, 233, Payload::Bytes(playlist))?;

    for track in &arrangement.tracks {
        if track.misc.contains("TrackInfo") {
            emit_misc(w, &track.misc, "TrackInfo")?;
        } else {
            emit(w, 238, Payload::Bytes(Vec::new()))?;
        }
        if let Some(name) = &track.name {
            emit(w, 239, Payload::Bytes(name.to_bytes()))?;
        }
    }
    Ok(())
}

fn write_mixer_track(w: &mut Vec<u8>, track: &MixerTrack) -> LibResult<()> {
    if track.misc.contains("MixerTrackInfo") {
        emit_misc(w, &track.misc, "MixerTrackInfo")?;
    } else {
        emit(w, 236, Payload::Bytes(Vec::new()))?;
    }
    for slot in 0..MIXER_SLOTS_PER_TRACK {
        emit(w, 98, Payload::Int(slot))?;
        if let Some(effect) = track.effects.get(&slot) {
            emit_misc(w, &effect.misc, "FLP_Text_PluginName")?;
            emit_misc(w, &effect.misc, "FLP_NewPlugin")?;
            if let Some(name) = &effect.name {
                emit(w, 203, Payload::Bytes(name.to_bytes()))?;
            }
            for misc_name in EFFECT_MISC_ORDER {
                emit_misc(w, &effect.misc, misc_name)?;
            }
        }
    }
    for misc_name in MIXER_TRACK_POSTAMBLE {
        emit_misc(w, &track.misc, misc_name)?;
    }
    if let Some(name) = &track.name {
        emit(w, 204, Payload::Bytes(name.to_bytes()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Text;

    #[test]
    fn empty_project_writes_only_the_chunk_scaffolding() {
        let project = Project::default();
        let mut bytes = Vec::new();
        write(&project, &mut bytes).unwrap();
        let expected: Vec<u8> = vec![
            b'F', b'L', b'h', b'd', 6, 0, 0, 0, // header tag and length
            0, 0, 4, 0, 96, 0, // format, channel count, beat division
            b'F', b'L', b'd', b't', 0, 0, 0, 0, // empty data chunk
        ];
        assert_eq!(expected, bytes);
    }

    #[test]
    fn channel_events_follow_the_prescribed_order() {
        let mut channel = Channel::default();
        channel.kind = Some(ChannelKind::Generator);
        channel.name = Some(Text::new("A"));
        channel
            .misc
            .insert("FLP_Text_PluginName", Payload::Bytes(vec![0x00, 0x00]));
        channel
            .misc
            .insert("FLP_NewPlugin", Payload::Bytes(vec![1, 2]));
        channel.misc.insert("FLP_Color", Payload::Int(0x00aabbcc));
        let mut data = Vec::new();
        write_channel(&mut data, 3, &channel).unwrap();
        let ids: Vec<u8> = event_ids(&data);
        assert_eq!(vec![64, 21, 201, 212, 203, 128], ids);
    }

    #[test]
    fn mixer_track_emits_every_slot() {
        let track = MixerTrack::default();
        let mut data = Vec::new();
        write_mixer_track(&mut data, &track).unwrap();
        let ids: Vec<u8> = event_ids(&data);
        let mut expected = vec![236u8];
        for _ in 0..MIXER_SLOTS_PER_TRACK {
            expected.push(98);
        }
        assert_eq!(expected, ids);
    }

    // walk the framing to recover the sequence of event IDs
    fn event_ids(mut data: &[u8]) -> Vec<u8> {
        use crate::file::SizeClass;
        let mut ids = Vec::new();
        while !data.is_empty() {
            let id = data[0];
            ids.push(id);
            data = &data[1..];
            let skip = match SizeClass::of(id) {
                SizeClass::Byte => 1,
                SizeClass::Word => 2,
                SizeClass::Dword => 4,
                SizeClass::Text => {
                    let mut size = 0usize;
                    let mut shift = 0;
                    loop {
                        let byte = data[0];
                        data = &data[1..];
                        size |= ((byte & 0x7f) as usize) << shift;
                        shift += 7;
                        if byte & 0x80 == 0 {
                            break;
                        }
                    }
                    size
                }
            };
            data = &data[skip..];
        }
        ids
    }
}
