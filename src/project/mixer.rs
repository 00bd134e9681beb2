use crate::project::Misc;
use crate::text::Text;
use std::collections::BTreeMap;

/// A mixer insert: a signal-processing lane with a fixed number of effect
/// slots. The master and current tracks are ordinary entries in the project's
/// mixer track list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MixerTrack {
    /// `None` renders as "Insert {index}".
    pub name: Option<Text>,
    /// Effects keyed by slot index, starting at 0.
    pub effects: BTreeMap<u32, MixerEffect>,
    pub misc: Misc,
}

/// An effect plugin loaded into one mixer slot.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MixerEffect {
    pub name: Option<Text>,
    pub misc: Misc,
}

/// A named group in the channel rack's filter list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChannelFilterGroup {
    pub name: Text,
}
