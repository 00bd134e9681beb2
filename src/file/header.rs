use crate::byte_iter::ByteIter;
use crate::constants::{DATA_CHUNK_ID, HEADER_CHUNK_ID, HEADER_CHUNK_LENGTH};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::error::LibResult;
use log::trace;
use snafu::ResultExt;
use std::io::{Read, Write};

/// The fields of the `FLhd` chunk. The format word must be zero (warned
/// otherwise); the channel count is 'not really used' by the format; the beat
/// division is the number of pulses per quarter note.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub(crate) struct Header {
    pub(crate) format: u16,
    pub(crate) n_channels: u16,
    pub(crate) beat_div: u16,
}

impl Header {
    pub(crate) fn parse<R: Read>(
        iter: &mut ByteIter<R>,
        sink: &mut DiagnosticSink<'_>,
    ) -> LibResult<Self> {
        trace!("parsing header chunk");
        iter.expect_tag(HEADER_CHUNK_ID).context(io!())?;
        let chunk_length = iter.read_u32().context(io!())?;
        if chunk_length != HEADER_CHUNK_LENGTH {
            invalid_file!("header length {} is not {}", chunk_length, HEADER_CHUNK_LENGTH);
        }
        let format = iter.read_u16().context(io!())?;
        if format != 0 {
            sink(Severity::Warning, &format!("header format {} is not 0", format));
        }
        let n_channels = iter.read_u16().context(io!())?;
        let beat_div = iter.read_u16().context(io!())?;
        Ok(Self {
            format,
            n_channels,
            beat_div,
        })
    }

    /// Read the `FLdt` tag and the declared length of the data chunk.
    pub(crate) fn parse_data_length<R: Read>(iter: &mut ByteIter<R>) -> LibResult<u32> {
        iter.expect_tag(DATA_CHUNK_ID).context(io!())?;
        Ok(iter.read_u32().context(io!())?)
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> LibResult<()> {
        w.write_all(HEADER_CHUNK_ID.as_bytes()).context(wr!())?;
        w.write_all(&HEADER_CHUNK_LENGTH.to_le_bytes()).context(wr!())?;
        w.write_all(&0u16.to_le_bytes()).context(wr!())?;
        w.write_all(&self.n_channels.to_le_bytes()).context(wr!())?;
        w.write_all(&self.beat_div.to_le_bytes()).context(wr!())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use std::io::{Cursor, Read};

    fn iter_for(bytes: Vec<u8>) -> ByteIter<Cursor<Vec<u8>>> {
        ByteIter::new(Cursor::new(bytes).bytes()).unwrap()
    }

    #[test]
    fn header_round_trip() {
        let header = Header {
            format: 0,
            n_channels: 4,
            beat_div: 96,
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        assert_eq!(
            vec![b'F', b'L', b'h', b'd', 6, 0, 0, 0, 0, 0, 4, 0, 96, 0],
            bytes
        );
        let mut warnings = Vec::new();
        let mut sink = |severity: Severity, message: &str| {
            warnings.push(format!("{}: {}", severity, message));
        };
        let parsed = Header::parse(&mut iter_for(bytes), &mut sink).unwrap();
        assert_eq!(header, parsed);
        assert!(warnings.is_empty());
    }

    #[test]
    fn wrong_magic_is_fatal() {
        let mut sink = |_: Severity, _: &str| {};
        let result = Header::parse(&mut iter_for(b"MThd\x06\x00\x00\x00".to_vec()), &mut sink);
        assert!(result.is_err());
    }

    #[test]
    fn wrong_header_length_is_fatal() {
        let mut sink = |_: Severity, _: &str| {};
        let bytes = b"FLhd\x07\x00\x00\x00\x00\x00\x04\x00\x60\x00".to_vec();
        assert!(Header::parse(&mut iter_for(bytes), &mut sink).is_err());
    }

    #[test]
    fn nonzero_format_warns() {
        let mut warned = false;
        let mut sink = |severity: Severity, _: &str| {
            warned = severity == Severity::Warning;
        };
        let bytes = b"FLhd\x06\x00\x00\x00\x01\x00\x04\x00\x60\x00".to_vec();
        let header = Header::parse(&mut iter_for(bytes), &mut sink).unwrap();
        assert_eq!(1, header.format);
        assert!(warned);
    }
}
