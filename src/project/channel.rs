use crate::error::LibResult;
use crate::project::Misc;
use crate::text::Text;

/// The kind of generator a channel is, as carried by the `FLP_ChanType` event.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum ChannelKind {
    Sampler = 0,
    Generator = 2,
    AudioClip = 4,
    AutomationClip = 5,
}

impl ChannelKind {
    pub(crate) fn from_u8(value: u8) -> LibResult<Self> {
        match value {
            0 => Ok(ChannelKind::Sampler),
            2 => Ok(ChannelKind::Generator),
            4 => Ok(ChannelKind::AudioClip),
            5 => Ok(ChannelKind::AutomationClip),
            _ => invalid_file_r!("unrecognized channel type {}", value),
        }
    }

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }
}

/// A generator: a synth, a sampler, an audio clip or an automation clip.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Channel {
    /// `None` until a `ChannelName` event names the channel.
    pub name: Option<Text>,
    /// `None` until an `FLP_ChanType` event arrives.
    pub kind: Option<ChannelKind>,
    /// The raw `AutomationClipData` body for automation clips; opaque.
    pub data: Option<Vec<u8>>,
    pub misc: Misc,
}

impl Channel {
    /// The display name; empty when unnamed.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChannelKind;

    #[test]
    fn kind_tags_round_trip() {
        for kind in &[
            ChannelKind::Sampler,
            ChannelKind::Generator,
            ChannelKind::AudioClip,
            ChannelKind::AutomationClip,
        ] {
            assert_eq!(Ok(*kind), ChannelKind::from_u8(kind.to_u8()).map_err(|_| ()));
        }
    }

    #[test]
    fn unknown_kind_tag_is_fatal() {
        assert!(ChannelKind::from_u8(1).is_err());
        assert!(ChannelKind::from_u8(3).is_err());
        assert!(ChannelKind::from_u8(6).is_err());
    }
}
