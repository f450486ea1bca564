use serde::{Deserialize, Serialize};

use crate::error::HeaderError;

/// Encoded length of an LZMA stream header.
pub const HEADER_LEN: usize = 13;

/// Size field value meaning "uncompressed size not stored".
pub const UNKNOWN_SIZE: u64 = u64::MAX;

pub const MAX_LC: u8 = 8;
pub const MAX_LP: u8 = 4;
pub const MAX_PB: u8 = 4;

/// Literal context bits, literal position bits and position bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Properties {
    pub lc: u8,
    pub lp: u8,
    pub pb: u8,
}

impl Default for Properties {
    fn default() -> Self {
        Self { lc: 3, lp: 0, pb: 2 }
    }
}

impl Properties {
    pub fn verify(&self) -> Result<(), HeaderError> {
        if self.lc > MAX_LC || self.lp > MAX_LP || self.pb > MAX_PB {
            return Err(HeaderError::PropertiesOutOfRange {
                lc: self.lc,
                lp: self.lp,
                pb: self.pb,
            });
        }
        Ok(())
    }

    /// Pack into the single header byte: `(pb * 5 + lp) * 9 + lc`.
    pub fn code(&self) -> Result<u8, HeaderError> {
        self.verify()?;
        Ok((self.pb * 5 + self.lp) * 9 + self.lc)
    }

    pub fn from_code(code: u8) -> Result<Self, HeaderError> {
        if code >= (MAX_PB + 1) * (MAX_LP + 1) * (MAX_LC + 1) {
            return Err(HeaderError::InvalidPropertiesCode { code });
        }
        let lc = code % 9;
        let rest = code / 9;
        Ok(Self {
            lc,
            lp: rest % 5,
            pb: rest / 5,
        })
    }
}

/// On-disk field layout. bincode's default encoding writes these as fixed
/// width little-endian integers, which is exactly the header format.
#[derive(Serialize, Deserialize)]
struct RawHeader {
    properties: u8,
    dict_cap: u32,
    size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub properties: Properties,
    pub dict_cap: u32,
    /// Uncompressed size, `None` when the stream does not record it.
    ///
    /// `Some(0)` is written as a literal zero, not as the unknown-size
    /// sentinel that some LZMA writers emit for empty streams.
    pub size: Option<u64>,
}

impl Header {
    pub fn encode(&self) -> Result<[u8; HEADER_LEN], HeaderError> {
        let properties = self.properties.code()?;

        let size = match self.size {
            None => UNKNOWN_SIZE,
            Some(size) if size > i64::MAX as u64 => {
                return Err(HeaderError::SizeOutOfRange { size })
            }
            Some(size) => size,
        };

        let raw = RawHeader {
            properties,
            dict_cap: self.dict_cap,
            size,
        };
        let bytes = bincode::serialize(&raw)?;

        if bytes.len() != HEADER_LEN {
            return Err(HeaderError::WrongLength {
                len: bytes.len(),
                expected: HEADER_LEN,
            });
        }
        let mut out = [0u8; HEADER_LEN];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    pub fn decode(data: &[u8]) -> Result<Self, HeaderError> {
        if data.len() != HEADER_LEN {
            return Err(HeaderError::WrongLength {
                len: data.len(),
                expected: HEADER_LEN,
            });
        }

        let raw: RawHeader = bincode::deserialize(data)?;
        let properties = Properties::from_code(raw.properties)?;

        let size = match raw.size {
            UNKNOWN_SIZE => None,
            size if size > i64::MAX as u64 => return Err(HeaderError::SizeOutOfRange { size }),
            size => Some(size),
        };

        Ok(Self {
            properties,
            dict_cap: raw.dict_cap,
            size,
        })
    }
}
