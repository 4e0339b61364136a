//! LZW configuration.

use crate::error::{LzwError, Result};

/// In-band code that resets the dictionary. It never names a string.
pub const CLEAR_CODE: u32 = 0x100;

/// Code width after a dictionary reset.
pub const MIN_BITS: u8 = 9;

/// Dictionary size right after a reset: 256 literals plus the clear code.
pub const INITIAL_DICTIONARY_LEN: u32 = CLEAR_CODE + 1;

/// LZW encoder parameters.
///
/// The decoder needs no configuration: it follows whatever widths and clear
/// codes the stream contains. The encoder uses `max_bits` to decide when to
/// emit a clear code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwConfig {
    /// Widest code the encoder may produce (9..=24).
    pub max_bits: u8,
}

impl LzwConfig {
    /// ShrinkIt's 12-bit code ceiling.
    pub const NUFX: Self = Self { max_bits: 12 };

    /// The widest codes the bit streams support.
    pub const WIDE: Self = Self { max_bits: 24 };

    /// Create a configuration with the given code ceiling.
    pub fn new(max_bits: u8) -> Result<Self> {
        let config = Self { max_bits };
        config.validate()?;
        Ok(config)
    }

    /// Check that `max_bits` is within 9..=24.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BITS..=nufx_core::bitstream::MAX_WIDTH).contains(&self.max_bits) {
            return Err(LzwError::InvalidBitWidth(self.max_bits));
        }
        Ok(())
    }

    /// Largest code representable in `max_bits`.
    pub fn max_code(&self) -> u32 {
        (1 << self.max_bits) - 1
    }

    /// Decoder dictionary size at which the encoder clears.
    ///
    /// One more entry would make the decoder widen past `max_bits` for the
    /// code after next.
    pub fn clear_threshold(&self) -> u32 {
        self.max_code() - 1
    }
}

impl Default for LzwConfig {
    fn default() -> Self {
        Self::NUFX
    }
}
