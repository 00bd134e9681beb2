/*!
The `project` module holds the in-memory model that the interpreter builds
from the event stream and the serializer turns back into bytes, plus those two
state machines and a few display helpers.
!*/

use crate::byte_iter::ByteIter;
use crate::constants::{DEFAULT_BEAT_DIV, DEFAULT_CHANNEL_COUNT};
use crate::diagnostics::{log_sink, DiagnosticSink};
use crate::error::LibResult;
use snafu::ResultExt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

mod arrangement;
mod channel;
mod misc;
mod mixer;
pub mod names;
mod parse;
mod pattern;
mod write;

pub use arrangement::{Arrangement, ArrangementTrack};
pub use channel::{Channel, ChannelKind};
pub use misc::{Misc, MiscValue};
pub use mixer::{ChannelFilterGroup, MixerEffect, MixerTrack};
pub use pattern::Pattern;

/// An entire project file: arrangements, channels, patterns, filter groups,
/// the mixer, and a bag of project-level events. Entity order is the on-disk
/// order; playlist items refer to patterns and channels by index into these
/// lists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Project-level events, keyed by event name.
    pub info: Misc,
    pub arrangements: Vec<Arrangement>,
    pub channels: Vec<Channel>,
    pub patterns: Vec<Pattern>,
    pub channel_filter_groups: Vec<ChannelFilterGroup>,
    pub mixer_tracks: Vec<MixerTrack>,
    /// The header's channel-count word, preserved for round-trips.
    pub n_channels: u16,
    /// Pulses per quarter note, from the header.
    pub beat_div: u16,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            info: Misc::default(),
            arrangements: Vec::new(),
            channels: Vec::new(),
            patterns: Vec::new(),
            channel_filter_groups: Vec::new(),
            mixer_tracks: Vec::new(),
            n_channels: DEFAULT_CHANNEL_COUNT,
            beat_div: DEFAULT_BEAT_DIV,
        }
    }
}

impl Project {
    /// Parse a project file, routing warnings to the `log` crate.
    pub fn read<R: Read>(r: R) -> crate::Result<Self> {
        Ok(Self::read_inner(r, &mut log_sink)?)
    }

    /// Parse a project file, routing warnings to the given sink.
    pub fn read_with_sink<R: Read>(r: R, sink: &mut DiagnosticSink<'_>) -> crate::Result<Self> {
        Ok(Self::read_inner(r, sink)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Ok(Self::load_inner(path, &mut log_sink)?)
    }

    pub fn load_with_sink<P: AsRef<Path>>(
        path: P,
        sink: &mut DiagnosticSink<'_>,
    ) -> crate::Result<Self> {
        Ok(Self::load_inner(path, sink)?)
    }

    /// Serialize the project in the canonical event order.
    pub fn write<W: Write>(&self, w: &mut W) -> crate::Result<()> {
        Ok(write::write(self, w)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        Ok(self.save_inner(path)?)
    }

    fn read_inner<R: Read>(r: R, sink: &mut DiagnosticSink<'_>) -> LibResult<Self> {
        let iter = ByteIter::new(r.bytes()).context(io!())?;
        parse::parse(iter, sink)
    }

    fn load_inner<P: AsRef<Path>>(path: P, sink: &mut DiagnosticSink<'_>) -> LibResult<Self> {
        let iter = ByteIter::new_file(path).context(io!())?;
        parse::parse(iter, sink)
    }

    fn save_inner<P: AsRef<Path>>(&self, path: P) -> LibResult<()> {
        let file = File::create(path).context(wr!())?;
        let mut w = BufWriter::new(file);
        write::write(self, &mut w)
    }
}
