/*!
The `registry` module is the bidirectional table between numeric event IDs and
the symbolic names used throughout the library. IDs without a known name get
the synthetic form `UNKNOWN_<id>`, which parses back to the ID.
!*/

use std::borrow::Cow;

/// Every named event ID. The name is what `misc` maps and the serializer's
/// order tables are keyed on.
const REGISTRY: &[(u8, &str)] = &[
    // BYTE events
    (0, "FLP_Enabled"),
    (1, "FLP_NoteOn"),
    (2, "FLP_Vol"),
    (3, "FLP_Pan"),
    (4, "FLP_MIDIChan"),
    (5, "FLP_MIDINote"),
    (6, "FLP_MIDIPatch"),
    (7, "FLP_MIDIBank"),
    (9, "FLP_LoopActive"),
    (10, "FLP_ShowInfo"),
    (11, "FLP_Shuffle"),
    (12, "FLP_MainVol"),
    (13, "FLP_Stretch"),
    (14, "FLP_Pitchable"),
    (15, "FLP_Zipped"),
    (16, "FLP_Delay_Flags"),
    (17, "FLP_PatLength"),
    (18, "FLP_BlockLength"),
    (19, "FLP_UseLoopPoints"),
    (20, "FLP_LoopType"),
    (21, "FLP_ChanType"),
    (22, "FLP_MixSliceNum"),
    (31, "IsPerformanceMode"),
    // WORD events
    (64, "FLP_NewChan"),
    (65, "FLP_NewPat"),
    (66, "FLP_Tempo"),
    (67, "FLP_CurrentPatNum"),
    (68, "FLP_PatData"),
    (69, "FLP_FX"),
    (70, "FLP_Fade_Stereo"),
    (71, "FLP_CutOff"),
    (72, "FLP_DotVol"),
    (73, "FLP_DotPan"),
    (74, "FLP_PreAmp"),
    (75, "FLP_Decay"),
    (76, "FLP_Attack"),
    (77, "FLP_DotNote"),
    (78, "FLP_DotPitch"),
    (79, "FLP_DotMix"),
    (80, "FLP_MainPitch"),
    (81, "FLP_RandChan"),
    (82, "FLP_MixChan"),
    (83, "FLP_Resonance"),
    (84, "FLP_LoopBar"),
    (85, "FLP_StDel"),
    (86, "FLP_FX3"),
    (87, "FLP_DotReso"),
    (88, "FLP_DotCutOff"),
    (89, "FLP_ShiftDelay"),
    (90, "FLP_LoopEndBar"),
    (91, "FLP_Dot"),
    (92, "FLP_DotShift"),
    (95, "MixerTrackIcon"),
    (98, "SlotIndex"),
    (99, "ArrangementIndex"),
    (100, "CurrentArrangement"),
    // DWORD events
    (128, "FLP_Color"),
    (129, "FLP_PlayListItem"),
    (130, "FLP_Echo"),
    (131, "FLP_FXSine"),
    (132, "FLP_CutCutBy"),
    (133, "FLP_WindowH"),
    (134, "FLP_MiddleNote"),
    (135, "FLP_Reserved"),
    (136, "FLP_MainResoCutOff"),
    (137, "FLP_DelayReso"),
    (138, "FLP_Reverb"),
    (139, "FLP_IntStretch"),
    (140, "FLP_SSNote"),
    (141, "FLP_FineTune"),
    (145, "ChannelFilterGroup"),
    (146, "CurrentChannelFilterGroup"),
    (147, "InsertAudioOutputTarget"),
    (149, "MixerTrackColor"),
    (154, "InsertAudioInputSource"),
    (156, "Tempo"),
    (159, "FLP_Version_Minor"),
    // TEXT events
    (192, "FLP_Text_ChanName"),
    (193, "FLP_Text_PatName"),
    (194, "FLP_Text_Title"),
    (195, "FLP_Text_Comment"),
    (196, "FLP_Text_SampleFileName"),
    (197, "FLP_Text_URL"),
    (198, "FLP_Text_CommentRTF"),
    (199, "FLP_Version"),
    (201, "FLP_Text_PluginName"),
    (203, "ChannelName"),
    (204, "InsertName"),
    (206, "ProjectInfoGenre"),
    (207, "ProjectInfoAuthor"),
    (208, "FLP_MIDICtrls"),
    (209, "FLP_Delay"),
    (210, "FLP_TS404Params"),
    (211, "FLP_DelayLine"),
    (212, "FLP_NewPlugin"),
    (213, "FLP_PluginParams"),
    (215, "FLP_ChanParams"),
    (218, "ChannelEnvelopeParams"),
    (219, "ChannelParams"),
    (223, "PatternAutomationData"),
    (224, "PatternData"),
    (227, "AutomationClipData"),
    (231, "ChannelFilterGroupName"),
    (233, "PlaylistData"),
    (235, "MixerTrackRouting"),
    (236, "MixerTrackInfo"),
    (238, "TrackInfo"),
    (239, "TrackName"),
    (241, "ArrangementName"),
];

const UNKNOWN_PREFIX: &str = "UNKNOWN_";

/// The name registered for `id`, if any.
pub fn known_event_name(id: u8) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == id)
        .map(|(_, name)| *name)
}

/// The symbolic name for `id`, synthesizing `UNKNOWN_<id>` when unregistered.
pub fn event_name(id: u8) -> Cow<'static, str> {
    match known_event_name(id) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(format!("{}{}", UNKNOWN_PREFIX, id)),
    }
}

/// The ID for a symbolic name, accepting the synthetic `UNKNOWN_<id>` form.
pub fn event_id(name: &str) -> Option<u8> {
    if let Some(digits) = name.strip_prefix(UNKNOWN_PREFIX) {
        return digits.parse().ok();
    }
    REGISTRY
        .iter()
        .find(|(_, registered)| *registered == name)
        .map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_bidirectional() {
        for (id, name) in REGISTRY {
            assert_eq!(Some(*name), known_event_name(*id));
            assert_eq!(Some(*id), event_id(name), "name {}", name);
        }
    }

    #[test]
    fn unknown_ids_synthesize_names() {
        assert_eq!("UNKNOWN_155", event_name(155));
        assert_eq!(Some(155), event_id("UNKNOWN_155"));
    }

    #[test]
    fn known_names_win_over_synthetic() {
        assert_eq!("SlotIndex", event_name(98));
        assert_eq!(Some(98), event_id("UNKNOWN_98"));
    }

    #[test]
    fn bad_synthetic_names_do_not_parse() {
        assert_eq!(None, event_id("UNKNOWN_300"));
        assert_eq!(None, event_id("UNKNOWN_x"));
        assert_eq!(None, event_id("NotAnEvent"));
    }
}
