use crate::vlq::{decode_slice, VlqError, CONTINUE, MAX_VLQ_BYTES};
use log::trace;
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::fs::File;
use std::io::{BufReader, Bytes, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::str::{from_utf8, Utf8Error};

/// A forward-only cursor over a byte stream. All multi-byte integers in the
/// project file format are little-endian, so the fixed-width readers decode LE.
pub(crate) struct ByteIter<R: Read> {
    iter: Bytes<R>,
    /// The number of bytes consumed so far.
    position: u64,
    /// The next byte, if any.
    peek: Option<u8>,
    position_limit: Option<u64>,
}

#[derive(Debug, Snafu)]
pub(crate) enum ByteError {
    #[snafu(display("io error around byte {}: {}", position, source))]
    Io {
        position: u64,
        source: std::io::Error,
    },

    #[snafu(display("unexpected end reached around byte {}", position))]
    End { position: u64 },

    #[snafu(display(
        "expected string but found non-utf8 encoded bytes around {}: {}",
        position,
        source
    ))]
    Str { position: u64, source: Utf8Error },

    #[snafu(display(
        "expected tag '{}' but found '{}' near position {}",
        expected,
        found,
        position
    ))]
    Tag {
        expected: String,
        found: String,
        position: u64,
    },

    #[snafu(display("too many bytes while reading event size around {}", position))]
    VlqTooBig { position: u64 },

    #[snafu(display("problem decoding event size around {}: {}", position, source))]
    VlqDecode { position: u64, source: VlqError },

    #[snafu(display("unable to open '{}': {}", path.display(), source,))]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub(crate) type ByteResult<T> = std::result::Result<T, ByteError>;

const BYTE_SIZE: usize = 8;
const KB: usize = BYTE_SIZE * 1024;
const MB: usize = KB * 1024;

impl ByteIter<BufReader<File>> {
    pub(crate) fn new_file<P: AsRef<Path>>(path: P) -> ByteResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).context(FileOpenSnafu { path })?;
        let buf = BufReader::with_capacity(MB, f);
        Self::new(buf.bytes())
    }
}

impl<R: Read> ByteIter<R> {
    pub(crate) fn new(mut iter: Bytes<R>) -> ByteResult<Self> {
        let peek = Self::next_impl(&mut iter, 0)?;
        Ok(Self {
            iter,
            position: 0,
            peek,
            position_limit: None,
        })
    }

    fn next_impl(iter: &mut Bytes<R>, position: u64) -> ByteResult<Option<u8>> {
        match iter.next() {
            None => Ok(None),
            Some(result) => match result {
                Ok(val) => Ok(Some(val)),
                Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
                Err(e) => Err(e).context(IoSnafu { position }),
            },
        }
    }

    /// Read a single byte and advance the cursor. Returns `None` at the end of
    /// the underlying stream, or when a size limit has been exhausted.
    pub(crate) fn read(&mut self) -> ByteResult<Option<u8>> {
        if let Some(position_limit) = self.position_limit {
            if self.position >= position_limit {
                return Ok(None);
            }
        }
        let return_val = match self.peek {
            Some(b) => b,
            None => return Ok(None),
        };
        self.peek = Self::next_impl(&mut self.iter, self.position)?;
        self.position += 1;
        trace!("read {:#x} at position {}", return_val, self.position - 1);
        Ok(Some(return_val))
    }

    pub(crate) fn read_or_die(&mut self) -> ByteResult<u8> {
        let position = self.position;
        self.read()?.context(EndSnafu { position })
    }

    pub(crate) fn read2(&mut self) -> ByteResult<[u8; 2]> {
        Ok([self.read_or_die()?, self.read_or_die()?])
    }

    pub(crate) fn read4(&mut self) -> ByteResult<[u8; 4]> {
        Ok([
            self.read_or_die()?,
            self.read_or_die()?,
            self.read_or_die()?,
            self.read_or_die()?,
        ])
    }

    pub(crate) fn read_u16(&mut self) -> ByteResult<u16> {
        let bytes: [u8; 2] = self.read2()?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub(crate) fn read_u32(&mut self) -> ByteResult<u32> {
        let bytes = self.read4()?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read the self-describing size that precedes a TEXT event payload.
    pub(crate) fn read_text_size(&mut self) -> ByteResult<u64> {
        let mut bytes = Vec::new();
        // initialize with the continue bit set
        let mut current_byte = CONTINUE;
        while current_byte & CONTINUE == CONTINUE {
            ensure!(
                bytes.len() < MAX_VLQ_BYTES,
                VlqTooBigSnafu {
                    position: self.position
                }
            );
            current_byte = self.read_or_die()?;
            bytes.push(current_byte);
        }
        let decoded = decode_slice(&bytes).context(VlqDecodeSnafu {
            position: self.position,
        })?;
        trace!("decoded event size {} from {} bytes", decoded, bytes.len());
        Ok(decoded)
    }

    /// The number of bytes consumed so far.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn is_end(&self) -> bool {
        if let Some(limit) = self.position_limit {
            debug_assert!(self.position <= limit);
            if self.position >= limit {
                return true;
            }
        }
        self.peek.is_none()
    }

    pub(crate) fn expect_tag(&mut self, expected_tag: &str) -> ByteResult<()> {
        let tag_bytes = self.read4()?;
        let actual_tag = from_utf8(&tag_bytes).context(StrSnafu {
            position: self.position,
        })?;
        ensure!(
            expected_tag == actual_tag,
            TagSnafu {
                expected: expected_tag,
                found: actual_tag,
                position: self.position
            }
        );
        Ok(())
    }

    /// When this is set, the cursor will report that it is at the end after
    /// `size` more bytes have been read.
    pub(crate) fn set_size_limit(&mut self, size: u64) {
        self.position_limit = Some(self.position + size)
    }

    pub(crate) fn clear_size_limit(&mut self) {
        self.position_limit = None
    }

    pub(crate) fn read_n(&mut self, num_bytes: usize) -> ByteResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(num_bytes);
        for _ in 0..num_bytes {
            bytes.push(self.read_or_die()?)
        }
        debug_assert_eq!(num_bytes, bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::ByteIter;
    use std::io::{Cursor, Read};

    #[test]
    fn byte_iter_test() {
        let bytes = [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x10, 0x20, 0x30, 0x40];
        let cursor = Cursor::new(bytes);
        let mut iter = ByteIter::new(cursor.bytes()).unwrap();
        assert_eq!(0, iter.position());
        assert_eq!(0x00, iter.read().unwrap().unwrap());
        assert_eq!([0x01, 0x02], iter.read2().unwrap());
        assert_eq!(3, iter.position());
        iter.set_size_limit(2);
        assert!(!iter.is_end());
        assert_eq!(0x03, iter.read().unwrap().unwrap());
        assert_eq!(0x04, iter.read().unwrap().unwrap());
        assert!(iter.is_end());
        assert!(iter.read().unwrap().is_none());
        iter.clear_size_limit();
        assert_eq!(0x10, iter.read().unwrap().unwrap());
    }

    #[test]
    fn read_little_endian() {
        let bytes = [0x01u8, 0x50, 0xf4, 0x01, 0x00, 0x00];
        let cursor = Cursor::new(bytes);
        let mut iter = ByteIter::new(cursor.bytes()).unwrap();
        assert_eq!(0x5001, iter.read_u16().unwrap());
        assert_eq!(500, iter.read_u32().unwrap());
        assert!(iter.is_end());
    }

    #[test]
    fn read_text_size_test() {
        let bytes = [0xacu8, 0x02, 0x00, 0x7f];
        let cursor = Cursor::new(bytes);
        let mut iter = ByteIter::new(cursor.bytes()).unwrap();
        assert_eq!(300, iter.read_text_size().unwrap());
        assert_eq!(0, iter.read_text_size().unwrap());
        assert_eq!(127, iter.read_text_size().unwrap());
    }

    #[test]
    fn expect_tag_test() {
        let cursor = Cursor::new(b"FLhdFLxx".to_vec());
        let mut iter = ByteIter::new(cursor.bytes()).unwrap();
        iter.expect_tag("FLhd").unwrap();
        assert!(iter.expect_tag("FLdt").is_err());
    }
}
