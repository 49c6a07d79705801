//! Bounded reading and writing of the `.vox` chunk stream: little-endian
//! primitives, length-prefixed key/value dictionaries, and chunk headers,
//! all over in-memory byte buffers.

use std::fmt;

use crate::error::ReadError;

/// Chunk identifiers, stored on disk as four ASCII bytes read little-endian.
pub(crate) mod id {
    pub const VOX_: u32 = u32::from_le_bytes(*b"VOX ");
    pub const MAIN: u32 = u32::from_le_bytes(*b"MAIN");
    pub const SIZE: u32 = u32::from_le_bytes(*b"SIZE");
    pub const XYZI: u32 = u32::from_le_bytes(*b"XYZI");
    pub const RGBA: u32 = u32::from_le_bytes(*b"RGBA");
    pub const NTRN: u32 = u32::from_le_bytes(*b"nTRN");
    pub const NGRP: u32 = u32::from_le_bytes(*b"nGRP");
    pub const NSHP: u32 = u32::from_le_bytes(*b"nSHP");
    pub const IMAP: u32 = u32::from_le_bytes(*b"IMAP");
    pub const LAYR: u32 = u32::from_le_bytes(*b"LAYR");
    pub const MATL: u32 = u32::from_le_bytes(*b"MATL");
    pub const MATT: u32 = u32::from_le_bytes(*b"MATT");
}

/// Upper bound on the total key + value bytes of a single dictionary.
pub const MAX_DICT_BYTES: usize = 4096;
/// Upper bound on the number of key/value pairs in a single dictionary.
pub const MAX_DICT_PAIRS: u32 = 256;

// -------------------------------------------------------------------------------------------------

/// A forward-only cursor over an in-memory `.vox` byte buffer.
///
/// All multi-byte reads are little-endian. Reads past the end of the buffer
/// fail with [`ReadError::UnexpectedEof`] rather than truncating.
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, offset: 0 }
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn eof(&self) -> ReadError {
        ReadError::UnexpectedEof {
            offset: self.offset,
        }
    }

    /// Borrow the next `n` bytes without copying and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let end = self.offset.checked_add(n).ok_or_else(|| self.eof())?;
        let slice = self.bytes.get(self.offset..end).ok_or_else(|| self.eof())?;
        self.offset = end;
        Ok(slice)
    }

    /// Advance the cursor by `n` bytes without inspecting them.
    ///
    /// Seeking beyond the end of the buffer is not an error by itself; the
    /// next read will report it. (A truncated trailing chunk whose payload
    /// we skip anyway is tolerated, matching the chunk-skipping protocol.)
    pub fn skip(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n);
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let b: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(u32::from_le_bytes(b))
    }

    pub fn read_i32(&mut self) -> Result<i32, ReadError> {
        let b: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(i32::from_le_bytes(b))
    }
}

// -------------------------------------------------------------------------------------------------

/// A parsed chunk dictionary: ordered string key/value pairs.
///
/// Wire format: `u32` pair count, then for each pair a `u32` length and that
/// many bytes for the key, and the same for the value. Strings carry no NUL
/// terminator. A dictionary is bounded to [`MAX_DICT_PAIRS`] pairs and
/// [`MAX_DICT_BYTES`] total string bytes; exceeding either is a parse
/// failure, not a truncation.
#[derive(Clone, Default)]
pub(crate) struct Dict {
    pairs: Vec<(String, String)>,
}

impl Dict {
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self, ReadError> {
        let num_pairs = cursor.read_u32()?;
        if num_pairs > MAX_DICT_PAIRS {
            return Err(ReadError::DictTooManyPairs(num_pairs));
        }

        let mut bytes_used = 0usize;
        let mut pairs = Vec::with_capacity(num_pairs as usize);
        for _ in 0..num_pairs {
            let mut read_string = |cursor: &mut Cursor<'_>| -> Result<String, ReadError> {
                let len = cursor.read_u32()? as usize;
                bytes_used += len;
                if bytes_used > MAX_DICT_BYTES {
                    return Err(ReadError::DictTooLarge);
                }
                Ok(String::from_utf8_lossy(cursor.take(len)?).into_owned())
            };
            let key = read_string(cursor)?;
            let value = read_string(cursor)?;
            pairs.push((key, value));
        }
        Ok(Dict { pairs })
    }

    /// Look up a key; the first occurrence wins if the file repeats one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.pairs.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------

/// A growable output buffer with the little-endian primitive helpers the
/// chunk emitters need, plus offset bookkeeping for back-patching the MAIN
/// chunk's children size.
#[derive(Debug, Default)]
pub(crate) struct ChunkWriter {
    bytes: Vec<u8>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        ChunkWriter {
            bytes: Vec::with_capacity(1024),
        }
    }

    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Overwrite a previously written `u32` at `offset`.
    ///
    /// Panics if `offset` was never written, since that is a bug in the
    /// writer rather than in the input.
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Write a `(chunk_id, content_size, children_size = 0)` header.
    pub fn put_chunk_header(&mut self, chunk_id: u32, content_size: u32) {
        self.put_u32(chunk_id);
        self.put_u32(content_size);
        self.put_u32(0);
    }

    /// Write a dictionary from `(key, value)` pairs, skipping entries whose
    /// value is `None` — the writer's way of omitting default-valued keys.
    pub fn put_dict(&mut self, pairs: &[(&str, Option<&str>)]) {
        let present = pairs.iter().filter(|(_, v)| v.is_some()).count();
        self.put_u32(present as u32);
        for &(key, value) in pairs {
            if let Some(value) = value {
                self.put_u32(key.len() as u32);
                self.put_bytes(key.as_bytes());
                self.put_u32(value.len() as u32);
                self.put_bytes(value.as_bytes());
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Size in bytes that [`ChunkWriter::put_dict`] will emit for one pair,
/// or 0 for an omitted pair. Used when precomputing chunk content sizes.
pub(crate) fn dict_pair_size(key: &str, value: Option<&str>) -> u32 {
    match value {
        Some(value) => (4 + key.len() + 4 + value.len()) as u32,
        None => 0,
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cursor_reads_little_endian() {
        let mut cursor = Cursor::new(&[0x78, 0x56, 0x34, 0x12, 0xff, 0xff, 0xff, 0xff, 0x05]);
        assert_eq!(cursor.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(cursor.read_i32().unwrap(), -1);
        assert_eq!(cursor.read_u8().unwrap(), 5);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn cursor_short_read_fails() {
        let mut cursor = Cursor::new(&[1, 2, 3]);
        assert!(matches!(
            cursor.read_u32(),
            Err(ReadError::UnexpectedEof { offset: 0 })
        ));
    }

    #[test]
    fn dict_round_trip() {
        let mut w = ChunkWriter::new();
        w.put_dict(&[("_name", Some("wall")), ("_hidden", None), ("_t", Some("1 2 3"))]);
        let bytes = w.into_bytes();

        let dict = Dict::parse(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(dict.get("_name"), Some("wall"));
        assert_eq!(dict.get("_t"), Some("1 2 3"));
        assert_eq!(dict.get("_hidden"), None);
    }

    #[test]
    fn dict_pair_count_limit() {
        let mut w = ChunkWriter::new();
        w.put_u32(257);
        assert!(matches!(
            Dict::parse(&mut Cursor::new(&w.into_bytes())),
            Err(ReadError::DictTooManyPairs(257))
        ));
    }

    #[test]
    fn dict_byte_limit() {
        // One pair whose value alone exceeds the dictionary byte budget.
        let mut w = ChunkWriter::new();
        let big = "x".repeat(MAX_DICT_BYTES + 1);
        w.put_dict(&[("k", Some(big.as_str()))]);
        assert!(matches!(
            Dict::parse(&mut Cursor::new(&w.into_bytes())),
            Err(ReadError::DictTooLarge)
        ));
    }
}
