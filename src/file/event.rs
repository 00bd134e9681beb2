use crate::byte_iter::ByteIter;
use crate::error::{self, LibResult};
use crate::file::registry;
use crate::vlq;
use log::trace;
use snafu::ResultExt;
use std::borrow::Cow;
use std::convert::TryFrom;
use std::io::{Read, Write};

/// Event IDs are partitioned into four size classes. The class alone
/// determines how many payload bytes follow a non-TEXT ID; TEXT payloads are
/// preceded by a self-describing size.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum SizeClass {
    /// IDs [0, 64): one payload byte.
    Byte,
    /// IDs [64, 128): two payload bytes.
    Word,
    /// IDs [128, 192): four payload bytes.
    Dword,
    /// IDs [192, 256): a varint size, then that many payload bytes.
    Text,
}

impl SizeClass {
    pub fn of(id: u8) -> Self {
        match id {
            0..=63 => SizeClass::Byte,
            64..=127 => SizeClass::Word,
            128..=191 => SizeClass::Dword,
            _ => SizeClass::Text,
        }
    }

    /// The largest integer the class can carry, `None` for TEXT.
    fn max_value(&self) -> Option<u32> {
        match self {
            SizeClass::Byte => Some(0xff),
            SizeClass::Word => Some(0xffff),
            SizeClass::Dword => Some(u32::MAX),
            SizeClass::Text => None,
        }
    }
}

/// A payload is either an unsigned little-endian integer (numeric classes) or
/// raw bytes (TEXT class). The codec never interprets TEXT bytes.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Payload {
    Int(u32),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn int(&self) -> Option<u32> {
        match self {
            Payload::Int(value) => Some(*value),
            Payload::Bytes(_) => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Int(_) => None,
            Payload::Bytes(bytes) => Some(bytes.as_slice()),
        }
    }
}

/// One tagged event: the unit of the data chunk.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Event {
    id: u8,
    payload: Payload,
}

impl Event {
    pub fn new(id: u8, payload: Payload) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn name(&self) -> Cow<'static, str> {
        registry::event_name(self.id)
    }

    pub(crate) fn into_payload(self) -> Payload {
        self.payload
    }

    /// Read the next event. The caller is responsible for checking that the
    /// cursor is not already at the end of the data chunk.
    pub(crate) fn parse<R: Read>(iter: &mut ByteIter<R>) -> LibResult<Self> {
        let id = iter.read_or_die().context(io!())?;
        let payload = match SizeClass::of(id) {
            SizeClass::Byte => Payload::Int(u32::from(iter.read_or_die().context(io!())?)),
            SizeClass::Word => Payload::Int(u32::from(iter.read_u16().context(io!())?)),
            SizeClass::Dword => Payload::Int(iter.read_u32().context(io!())?),
            SizeClass::Text => {
                let size = iter.read_text_size().context(io!())?;
                let size = usize::try_from(size)
                    .map_err(|_| invalid_file_e!("event payload of {} bytes", size))?;
                Payload::Bytes(iter.read_n(size).context(io!())?)
            }
        };
        trace!("parsed event {} ({:?})", registry::event_name(id), payload);
        Ok(Self { id, payload })
    }

    /// Write the ID byte and the payload, framed per the ID's size class.
    /// Integers that do not fit the class width are fatal, as is handing a
    /// numeric class raw bytes (or vice versa).
    pub(crate) fn write<W: Write>(&self, w: &mut W) -> LibResult<()> {
        let class = SizeClass::of(self.id);
        match (&self.payload, class.max_value()) {
            (Payload::Int(value), Some(max)) => {
                snafu::ensure!(
                    *value <= max,
                    error::EventValueOutOfRangeSnafu {
                        site: site!(),
                        id: self.id,
                        value: *value,
                    }
                );
                w.write_all(&[self.id]).context(wr!())?;
                let bytes = value.to_le_bytes();
                let width = match class {
                    SizeClass::Byte => 1,
                    SizeClass::Word => 2,
                    _ => 4,
                };
                w.write_all(&bytes[..width]).context(wr!())
            }
            (Payload::Bytes(bytes), None) => {
                w.write_all(&[self.id]).context(wr!())?;
                w.write_all(&vlq::encode_u64(bytes.len() as u64))
                    .context(wr!())?;
                w.write_all(bytes).context(wr!())
            }
            _ => error::EventPayloadKindSnafu {
                site: site!(),
                id: self.id,
            }
            .fail(),
        }
    }
}
