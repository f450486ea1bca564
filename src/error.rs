use thiserror::Error;

/// Rejected hasher configuration. Raised only at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid window length: {len}\nThe window must cover at least one byte.")]
    InvalidWindowLength { len: i64 },

    #[error("Window length {len} does not fit in this platform's address space")]
    WindowTooLarge { len: u128 },

    #[error("Degenerate base multiplier: {base}\nThe base must be at least 2.")]
    DegenerateBase { base: u128 },

    #[error("Base multiplier {base:#x} does not fit in a {bits}-bit hash")]
    BaseOutOfRange { base: u128, bits: u32 },
}

/// Failure to encode or decode an LZMA stream header.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("LZMA header must be {expected} bytes, got {len}")]
    WrongLength { len: usize, expected: usize },

    #[error("Invalid LZMA properties code: {code}")]
    InvalidPropertiesCode { code: u8 },

    #[error("LZMA properties out of range: lc={lc} lp={lp} pb={pb}")]
    PropertiesOutOfRange { lc: u8, lp: u8, pb: u8 },

    #[error("Uncompressed size {size} is out of range")]
    SizeOutOfRange { size: u64 },

    #[error("Header serialization failed: {0}")]
    Codec(#[from] bincode::Error),
}
