//! Binary layout of hash-trie data files
//!
//! ```text
//! magic            4 bytes  "DDHT"
//! version          u16      FORMAT_VERSION
//! property_count   u16
//!   name           u16 len + UTF-8
//! profile_count    u32
//!   per property   u16 len + UTF-8, ABSENT_VALUE length for a missing value
//! default_profile  u32      NO_DEFAULT_PROFILE when unset
//! pattern_count    u32
//!   pattern        u16 len + bytes
//!   profile        u32
//! ```
//!
//! All integers are little-endian. Anything after the pattern table is ignored.

use bytes::Buf;
use devdetect_core::InitStatus;
use std::ops::Range;

pub(crate) const MAGIC: &[u8; 4] = b"DDHT";

/// Version written by [`crate::DataSetBuilder`] and accepted by [`crate::HashTrieEngine`]
pub const FORMAT_VERSION: u16 = 34;

pub(crate) const ABSENT_VALUE: u16 = u16::MAX;
pub(crate) const NO_DEFAULT_PROFILE: u32 = u32::MAX;

/// Decoded table positions. Strings stay in the image and are referenced by range.
#[derive(Debug)]
pub(crate) struct Layout {
    pub properties: Vec<String>,
    /// `profile * properties.len() + property`
    pub values: Vec<Option<Range<usize>>>,
    pub profile_count: usize,
    pub default_profile: Option<u32>,
    pub patterns: Vec<Range<usize>>,
    pub pattern_profiles: Vec<u32>,
}

impl Layout {
    pub fn parse(image: &[u8]) -> Result<Self, InitStatus> {
        let mut reader = Reader::new(image);

        let magic = reader.bytes(MAGIC.len())?;
        if image[magic] != MAGIC[..] {
            return Err(InitStatus::CorruptData);
        }
        if reader.u16()? != FORMAT_VERSION {
            return Err(InitStatus::IncorrectVersion);
        }

        let property_count = reader.u16()? as usize;
        let mut properties = Vec::with_capacity(property_count);
        for _ in 0..property_count {
            let range = reader.str()?;
            properties.push(reader.text(range).to_owned());
        }

        let profile_count = reader.u32()? as usize;
        let cells = profile_count
            .checked_mul(property_count)
            .ok_or(InitStatus::CorruptData)?;
        let mut values = Vec::with_capacity(cells.min(reader.remaining()));
        for _ in 0..cells {
            let len = reader.u16()?;
            if len == ABSENT_VALUE {
                values.push(None);
            } else {
                values.push(Some(reader.str_of_len(len as usize)?));
            }
        }

        let default_profile = match reader.u32()? {
            NO_DEFAULT_PROFILE => None,
            profile if (profile as usize) < profile_count => Some(profile),
            _ => return Err(InitStatus::PointerOutOfBounds),
        };

        let pattern_count = reader.u32()? as usize;
        let mut patterns = Vec::with_capacity(pattern_count.min(reader.remaining()));
        let mut pattern_profiles = Vec::with_capacity(pattern_count.min(reader.remaining()));
        for _ in 0..pattern_count {
            let len = reader.u16()? as usize;
            patterns.push(reader.bytes(len)?);
            let profile = reader.u32()?;
            if profile as usize >= profile_count {
                return Err(InitStatus::PointerOutOfBounds);
            }
            pattern_profiles.push(profile);
        }

        Ok(Self {
            properties,
            values,
            profile_count,
            default_profile,
            patterns,
            pattern_profiles,
        })
    }
}

struct Reader<'a> {
    image: &'a [u8],
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(image: &'a [u8]) -> Self {
        Self { image, buf: image }
    }

    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn position(&self) -> usize {
        self.image.len() - self.buf.remaining()
    }

    fn u16(&mut self) -> Result<u16, InitStatus> {
        if self.buf.remaining() < 2 {
            return Err(InitStatus::CorruptData);
        }
        Ok(self.buf.get_u16_le())
    }

    fn u32(&mut self) -> Result<u32, InitStatus> {
        if self.buf.remaining() < 4 {
            return Err(InitStatus::CorruptData);
        }
        Ok(self.buf.get_u32_le())
    }

    fn bytes(&mut self, len: usize) -> Result<Range<usize>, InitStatus> {
        if self.buf.remaining() < len {
            return Err(InitStatus::CorruptData);
        }
        let start = self.position();
        self.buf.advance(len);
        Ok(start..start + len)
    }

    fn str(&mut self) -> Result<Range<usize>, InitStatus> {
        let len = self.u16()? as usize;
        self.str_of_len(len)
    }

    fn str_of_len(&mut self, len: usize) -> Result<Range<usize>, InitStatus> {
        let range = self.bytes(len)?;
        std::str::from_utf8(&self.image[range.clone()]).map_err(|_| InitStatus::CorruptData)?;
        Ok(range)
    }

    /// Text previously validated by `str`
    fn text(&self, range: Range<usize>) -> &'a str {
        std::str::from_utf8(&self.image[range]).unwrap_or_default()
    }
}
