use crate::byte_iter::ByteIter;
use crate::constants::{MIXER_SLOTS_PER_TRACK, PLAYLIST_ITEM_BYTES};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::error::{self, LibResult};
use crate::file::{Event, Header, Payload, PlaylistItem};
use crate::project::{
    Arrangement, ArrangementTrack, Channel, ChannelFilterGroup, ChannelKind, MixerEffect,
    MixerTrack, Pattern, Project,
};
use crate::text::Text;
use log::{debug, trace};
use snafu::ResultExt;
use std::convert::TryInto;
use std::io::Read;

/// Tracks which entity each incoming event mutates. Constructor events
/// advance these pointers; every other handler reads them.
#[derive(Clone, Copy, Debug, Default)]
struct Context {
    arrangement: Option<usize>,
    arrangement_track: Option<usize>,
    pattern: Option<usize>,
    channel: Option<usize>,
    mixer_track: Option<usize>,
    effect_slot: Option<u32>,
    is_mixer_effect: bool,
}

pub(crate) fn parse<R: Read>(
    mut iter: ByteIter<R>,
    sink: &mut DiagnosticSink<'_>,
) -> LibResult<Project> {
    let header = Header::parse(&mut iter, sink)?;
    let data_length = Header::parse_data_length(&mut iter)?;
    let data_start = iter.position();
    iter.set_size_limit(u64::from(data_length));

    let mut interpreter = Interpreter {
        project: Project::default(),
        ctx: Context::default(),
        pending_clip_data: Vec::new(),
        sink,
    };
    interpreter.project.n_channels = header.n_channels;
    interpreter.project.beat_div = header.beat_div;

    while !iter.is_end() {
        let offset = iter.position();
        let event = Event::parse(&mut iter)?;
        let name = event.name().into_owned();
        trace!("handling event {} at byte {}", name, offset);
        interpreter
            .handle(&name, event.into_payload())
            .context(error::EventSnafu {
                name: name.clone(),
                offset,
            })?;
    }

    let consumed = iter.position() - data_start;
    if consumed != u64::from(data_length) {
        invalid_file!(
            "data chunk declared {} bytes but held {}",
            data_length,
            consumed
        );
    }
    iter.clear_size_limit();
    if !iter.is_end() {
        invalid_file!("bytes remain beyond the declared data chunk");
    }

    interpreter.finish()
}

struct Interpreter<'a, 'b> {
    project: Project,
    ctx: Context,
    /// `AutomationClipData` events precede channel construction; bodies wait
    /// here until `finish` can pair them with automation-clip channels.
    pending_clip_data: Vec<Vec<u8>>,
    sink: &'a mut DiagnosticSink<'b>,
}

fn int(payload: Payload) -> LibResult<u32> {
    match payload {
        Payload::Int(value) => Ok(value),
        Payload::Bytes(_) => invalid_file_r!("expected a numeric payload"),
    }
}

fn bytes(payload: Payload) -> LibResult<Vec<u8>> {
    match payload {
        Payload::Bytes(bytes) => Ok(bytes),
        Payload::Int(_) => invalid_file_r!("expected a raw payload"),
    }
}

fn text(payload: Payload) -> LibResult<Text> {
    Ok(Text::from(bytes(payload)?))
}

impl<'a, 'b> Interpreter<'a, 'b> {
    fn handle(&mut self, name: &str, payload: Payload) -> LibResult<()> {
        match name {
            // project-level setters
            "FLP_ShowInfo" | "FLP_Shuffle" | "FLP_PatLength" | "FLP_BlockLength"
            | "FLP_CurrentPatNum" | "FLP_MainPitch" | "FLP_WindowH" | "FLP_Text_Title"
            | "FLP_Text_Comment" | "FLP_Text_URL" | "FLP_Text_CommentRTF" | "FLP_Version"
            | "IsPerformanceMode" | "CurrentArrangement" | "CurrentChannelFilterGroup"
            | "Tempo" | "ProjectInfoGenre" | "ProjectInfoAuthor" | "FLP_Version_Minor"
            | "FLP_LoopActive" | "UNKNOWN_23" | "UNKNOWN_28" | "UNKNOWN_29" | "UNKNOWN_30"
            | "UNKNOWN_35" | "UNKNOWN_37" | "UNKNOWN_38" | "UNKNOWN_39" | "UNKNOWN_40"
            | "UNKNOWN_200" | "UNKNOWN_202" | "UNKNOWN_216" | "UNKNOWN_225" | "UNKNOWN_237" => {
                self.project.info.insert(name, payload);
                Ok(())
            }
            "UNKNOWN_226" => {
                self.project.info.append(name, payload);
                Ok(())
            }

            // channels
            "FLP_NewChan" => self.new_channel(payload),
            "FLP_ChanType" => self.channel_kind(payload),
            "ChannelName" => self.channel_or_effect_name(payload),
            "ChannelEnvelopeParams" | "UNKNOWN_228" => {
                self.channel_mut()?.misc.append(name, payload);
                Ok(())
            }
            "FLP_Enabled" | "FLP_LoopType" | "FLP_MixSliceNum" | "FLP_FX"
            | "FLP_Text_SampleFileName" | "FLP_Fade_Stereo" | "FLP_CutOff" | "FLP_PreAmp"
            | "FLP_Decay" | "FLP_Attack" | "FLP_Resonance" | "FLP_StDel" | "FLP_FX3"
            | "FLP_ShiftDelay" | "FLP_FXSine" | "FLP_CutCutBy" | "FLP_Reverb"
            | "FLP_IntStretch" | "FLP_SSNote" | "FLP_Delay" | "FLP_ChanParams"
            | "ChannelParams" | "ChannelFilterGroup" | "UNKNOWN_32" | "UNKNOWN_97"
            | "UNKNOWN_142" | "UNKNOWN_143" | "UNKNOWN_144" | "UNKNOWN_150" | "UNKNOWN_157"
            | "UNKNOWN_158" | "UNKNOWN_164" | "UNKNOWN_221" | "UNKNOWN_229" | "UNKNOWN_234" => {
                self.channel_mut()?.misc.insert(name, payload);
                Ok(())
            }

            // the same events target a channel or a mixer effect depending on
            // whether a SlotIndex has been seen since the last FLP_NewChan
            "FLP_Color" | "FLP_Text_PluginName" | "FLP_NewPlugin" | "FLP_PluginParams"
            | "UNKNOWN_155" => {
                if self.ctx.is_mixer_effect {
                    self.effect_mut()?.misc.insert(name, payload);
                } else {
                    self.channel_mut()?.misc.insert(name, payload);
                }
                Ok(())
            }

            // patterns
            "FLP_NewPat" => self.new_pattern(payload),
            "FLP_Text_PatName" => {
                self.pattern_mut()?.name = Some(text(payload)?);
                Ok(())
            }
            "PatternAutomationData" | "PatternData" => {
                self.pattern_mut()?.misc.insert(name, payload);
                Ok(())
            }

            // mixer
            "MixerTrackInfo" => self.new_mixer_track(name, payload),
            "InsertAudioOutputTarget" | "InsertAudioInputSource" | "MixerTrackRouting"
            | "MixerTrackColor" | "MixerTrackIcon" => {
                self.mixer_track_mut()?.misc.insert(name, payload);
                Ok(())
            }
            "InsertName" => {
                self.mixer_track_mut()?.name = Some(text(payload)?);
                Ok(())
            }
            "SlotIndex" => self.slot_index(payload),

            // arrangements
            "ArrangementIndex" => self.new_arrangement(payload),
            "ArrangementName" => {
                self.arrangement_mut()?.name = Some(text(payload)?);
                Ok(())
            }
            "PlaylistData" => self.playlist_data(payload),
            "UNKNOWN_36" => {
                self.arrangement_mut()?.misc.insert(name, payload);
                Ok(())
            }
            "TrackInfo" => self.new_arrangement_track(name, payload),
            "TrackName" => {
                self.arrangement_track_mut()?.name = Some(text(payload)?);
                Ok(())
            }

            // other
            "AutomationClipData" => {
                self.pending_clip_data.push(bytes(payload)?);
                Ok(())
            }
            "ChannelFilterGroupName" => {
                self.project.channel_filter_groups.push(ChannelFilterGroup {
                    name: text(payload)?,
                });
                Ok(())
            }

            _ => {
                self.warn(format!("Missing event handler for event {}", name));
                Ok(())
            }
        }
    }

    fn warn(&mut self, message: String) {
        (self.sink)(Severity::Warning, &message)
    }

    fn new_channel(&mut self, payload: Payload) -> LibResult<()> {
        let index = int(payload)? as usize;
        debug!("new channel {}", index);
        self.ctx.channel = Some(index);
        self.ctx.is_mixer_effect = false;
        if index >= self.project.channels.len() {
            self.project.channels.push(Channel::default());
        }
        Ok(())
    }

    fn channel_kind(&mut self, payload: Payload) -> LibResult<()> {
        let value = int(payload)?;
        if value > u32::from(u8::MAX) {
            invalid_file!("channel type {} out of range", value);
        }
        self.channel_mut()?.kind = Some(ChannelKind::from_u8(value as u8)?);
        Ok(())
    }

    fn channel_or_effect_name(&mut self, payload: Payload) -> LibResult<()> {
        let name = text(payload)?;
        if self.ctx.is_mixer_effect {
            self.effect_mut()?.name = Some(name);
        } else {
            self.channel_mut()?.name = Some(name);
        }
        Ok(())
    }

    fn new_pattern(&mut self, payload: Payload) -> LibResult<()> {
        let number = int(payload)?;
        // pattern numbers are 1-based on disk
        let index = match number.checked_sub(1) {
            Some(index) => index as usize,
            None => invalid_file_r!("pattern number 0 is invalid")?,
        };
        debug!("selecting pattern {}", index);
        self.ctx.pattern = Some(index);
        if index >= self.project.patterns.len() {
            self.project.patterns.push(Pattern::default());
        }
        Ok(())
    }

    fn new_arrangement(&mut self, payload: Payload) -> LibResult<()> {
        int(payload)?;
        self.project.arrangements.push(Arrangement::default());
        debug!("new arrangement {}", self.project.arrangements.len() - 1);
        self.ctx.arrangement = Some(self.project.arrangements.len() - 1);
        self.ctx.arrangement_track = None;
        Ok(())
    }

    fn new_arrangement_track(&mut self, name: &str, payload: Payload) -> LibResult<()> {
        let arrangement = self.arrangement_mut()?;
        let mut track = ArrangementTrack::default();
        track.misc.insert(name, payload);
        arrangement.tracks.push(track);
        let index = arrangement.tracks.len() - 1;
        self.ctx.arrangement_track = Some(index);
        Ok(())
    }

    fn new_mixer_track(&mut self, name: &str, payload: Payload) -> LibResult<()> {
        let mut track = MixerTrack::default();
        track.misc.insert(name, payload);
        self.project.mixer_tracks.push(track);
        self.ctx.mixer_track = Some(self.project.mixer_tracks.len() - 1);
        Ok(())
    }

    fn slot_index(&mut self, payload: Payload) -> LibResult<()> {
        let slot = int(payload)?;
        if slot >= MIXER_SLOTS_PER_TRACK {
            self.warn(format!(
                "mixer effect slot {} is beyond the last slot ({})",
                slot,
                MIXER_SLOTS_PER_TRACK - 1
            ));
        }
        self.ctx.effect_slot = Some(slot);
        self.ctx.is_mixer_effect = true;
        Ok(())
    }

    fn playlist_data(&mut self, payload: Payload) -> LibResult<()> {
        let data = bytes(payload)?;
        if data.len() % PLAYLIST_ITEM_BYTES != 0 {
            self.warn(format!(
                "PlaylistData payload of {} bytes is not a whole number of {}-byte items; \
                 ignoring the remainder",
                data.len(),
                PLAYLIST_ITEM_BYTES
            ));
        }
        let mut items = Vec::with_capacity(data.len() / PLAYLIST_ITEM_BYTES);
        for record in data.chunks_exact(PLAYLIST_ITEM_BYTES) {
            let record: &[u8; 32] = record
                .try_into()
                .map_err(|_| invalid_file_e!("short playlist item record"))?;
            items.push(PlaylistItem::decode(record)?);
        }
        self.arrangement_mut()?.items.extend(items);
        Ok(())
    }

    fn channel_mut(&mut self) -> LibResult<&mut Channel> {
        let index = match self.ctx.channel {
            Some(index) => index,
            None => invalid_file_r!("channel event before any FLP_NewChan")?,
        };
        match self.project.channels.get_mut(index) {
            Some(channel) => Ok(channel),
            None => invalid_file_r!("channel {} does not exist", index),
        }
    }

    fn pattern_mut(&mut self) -> LibResult<&mut Pattern> {
        let index = match self.ctx.pattern {
            Some(index) => index,
            None => invalid_file_r!("pattern event before any FLP_NewPat")?,
        };
        match self.project.patterns.get_mut(index) {
            Some(pattern) => Ok(pattern),
            None => invalid_file_r!("pattern {} does not exist", index),
        }
    }

    fn arrangement_mut(&mut self) -> LibResult<&mut Arrangement> {
        let index = match self.ctx.arrangement {
            Some(index) => index,
            None => invalid_file_r!("arrangement event before any ArrangementIndex")?,
        };
        match self.project.arrangements.get_mut(index) {
            Some(arrangement) => Ok(arrangement),
            None => invalid_file_r!("arrangement {} does not exist", index),
        }
    }

    fn arrangement_track_mut(&mut self) -> LibResult<&mut ArrangementTrack> {
        let index = match self.ctx.arrangement_track {
            Some(index) => index,
            None => invalid_file_r!("track event before any TrackInfo")?,
        };
        let arrangement = self.arrangement_mut()?;
        match arrangement.tracks.get_mut(index) {
            Some(track) => Ok(track),
            None => invalid_file_r!("arrangement track {} does not exist", index),
        }
    }

    fn mixer_track_mut(&mut self) -> LibResult<&mut MixerTrack> {
        let index = match self.ctx.mixer_track {
            Some(index) => index,
            None => invalid_file_r!("mixer event before any MixerTrackInfo")?,
        };
        match self.project.mixer_tracks.get_mut(index) {
            Some(track) => Ok(track),
            None => invalid_file_r!("mixer track {} does not exist", index),
        }
    }

    fn effect_mut(&mut self) -> LibResult<&mut MixerEffect> {
        let slot = match self.ctx.effect_slot {
            Some(slot) => slot,
            None => invalid_file_r!("mixer effect event before any SlotIndex")?,
        };
        let track = self.mixer_track_mut()?;
        Ok(track.effects.entry(slot).or_insert_with(MixerEffect::default))
    }

    fn finish(self) -> LibResult<Project> {
        let Interpreter {
            mut project,
            pending_clip_data,
            sink,
            ..
        } = self;
        let mut bodies = pending_clip_data.into_iter();
        for channel in project
            .channels
            .iter_mut()
            .filter(|channel| channel.kind == Some(ChannelKind::AutomationClip))
        {
            match bodies.next() {
                Some(body) => channel.data = Some(body),
                None => break,
            }
        }
        let leftover = bodies.count();
        if leftover > 0 {
            sink(
                Severity::Warning,
                &format!(
                    "{} automation clip bodies have no automation clip channel",
                    leftover
                ),
            );
        }
        debug!(
            "parsed {} channels, {} patterns, {} arrangements, {} mixer tracks",
            project.channels.len(),
            project.patterns.len(),
            project.arrangements.len(),
            project.mixer_tracks.len()
        );
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn file_with_events(events: &[u8]) -> Vec<u8> {
        let mut bytes = b"FLhd\x06\x00\x00\x00\x00\x00\x04\x00\x60\x00FLdt".to_vec();
        bytes.extend_from_slice(&(events.len() as u32).to_le_bytes());
        bytes.extend_from_slice(events);
        bytes
    }

    fn parse_bytes(
        bytes: Vec<u8>,
        sink: &mut DiagnosticSink<'_>,
    ) -> LibResult<Project> {
        let iter = ByteIter::new(Cursor::new(bytes).bytes()).unwrap();
        parse(iter, sink)
    }

    #[test]
    fn channel_construction_and_naming() {
        let events = [
            64u8, 0, 0, // FLP_NewChan 0
            21, 0, // FLP_ChanType sampler
            203, 4, 0x4b, 0x00, 0x6f, 0x00, // ChannelName "Ko"
        ];
        let mut sink = |_: Severity, _: &str| {};
        let project = parse_bytes(file_with_events(&events), &mut sink).unwrap();
        assert_eq!(1, project.channels.len());
        let channel = &project.channels[0];
        assert_eq!(Some(ChannelKind::Sampler), channel.kind);
        assert_eq!("Ko", channel.display_name());
    }

    #[test]
    fn unknown_event_warns_and_is_skipped() {
        let events = [12u8, 100]; // FLP_MainVol has no handler
        let mut warnings = Vec::new();
        let mut sink = |severity: Severity, message: &str| {
            warnings.push(format!("{}: {}", severity, message));
        };
        let project = parse_bytes(file_with_events(&events), &mut sink).unwrap();
        assert!(project.channels.is_empty());
        assert_eq!(1, warnings.len());
        assert!(warnings[0].contains("FLP_MainVol"));
        assert!(warnings[0].starts_with("Warning"));
    }

    #[test]
    fn channel_event_before_constructor_is_fatal() {
        let events = [21u8, 0]; // FLP_ChanType with no channel
        let mut sink = |_: Severity, _: &str| {};
        let result = parse_bytes(file_with_events(&events), &mut sink);
        let message = format!("{}", result.err().unwrap());
        assert!(message.contains("FLP_ChanType"));
    }

    #[test]
    fn data_length_mismatch_is_fatal() {
        let mut bytes = file_with_events(&[10u8, 1]); // FLP_ShowInfo 1
        // declare one more byte than the chunk holds
        let declared = 3u32.to_le_bytes();
        bytes[18..22].copy_from_slice(&declared);
        let mut sink = |_: Severity, _: &str| {};
        assert!(parse_bytes(bytes, &mut sink).is_err());
    }

    #[test]
    fn trailing_bytes_are_fatal() {
        let mut bytes = file_with_events(&[10u8, 1]); // FLP_ShowInfo 1
        bytes.push(0xff);
        let mut sink = |_: Severity, _: &str| {};
        assert!(parse_bytes(bytes, &mut sink).is_err());
    }

    #[test]
    fn mixer_effect_context_switches_name_target() {
        let events = [
            236u8, 0, // MixerTrackInfo, empty payload
            98, 2, 0, // SlotIndex 2
            203, 4, 0x45, 0x00, 0x51, 0x00, // ChannelName "EQ" goes to the effect
        ];
        let mut sink = |_: Severity, _: &str| {};
        let project = parse_bytes(file_with_events(&events), &mut sink).unwrap();
        assert_eq!(1, project.mixer_tracks.len());
        let effect = project.mixer_tracks[0].effects.get(&2).unwrap();
        assert_eq!("EQ", effect.name.as_ref().unwrap().as_str());
    }

    #[test]
    fn playlist_data_populates_the_current_arrangement() {
        let mut events = vec![99u8, 0, 0]; // ArrangementIndex 0
        events.push(233); // PlaylistData
        events.push(32); // one 32-byte item
        let record: [u8; 32] = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x50, 0x01, 0x50, 0x80, 0x00, 0x00, 0x00, 0xf4, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00, 0xa0, 0x40, 0x64, 0x80, 0x80, 0x00, 0x00, 0x00, 0x00,
            0x80, 0x00, 0x00, 0x00,
        ];
        events.extend_from_slice(&record);
        let mut sink = |_: Severity, _: &str| {};
        let project = parse_bytes(file_with_events(&events), &mut sink).unwrap();
        assert_eq!(1, project.arrangements.len());
        let items = &project.arrangements[0].items;
        assert_eq!(1, items.len());
        assert_eq!(128, items[0].length);
        assert!(items[0].muted());
    }
}
