//! CRC-16 as used throughout NuFX archives.
//!
//! ShrinkIt uses the XMODEM flavour of CRC-16 for the master header, the
//! header blocks, and the LZW/1 fork checksum:
//!
//! - Polynomial: 0x1021
//! - Initial value: 0x0000
//! - Reflected input/output: No
//! - Final XOR: none

/// CRC-16/XMODEM lookup table (polynomial 0x1021, not reflected).
const CRC16_TABLE: [u16; 256] = {
    let mut table = [0u16; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Returns the precomputed CRC-16 table.
pub fn crc16_table() -> &'static [u16; 256] {
    &CRC16_TABLE
}

/// CRC-16 calculator (XMODEM variant).
///
/// # Example
///
/// ```
/// use nufx_core::crc::Crc16;
///
/// let mut crc = Crc16::new();
/// crc.update(b"123456789");
/// assert_eq!(crc.value(), 0x31C3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16 {
    crc: u16,
}

impl Crc16 {
    /// Create a new CRC-16 calculator.
    pub fn new() -> Self {
        Self { crc: 0 }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.crc = 0;
    }

    /// Fold a single byte into the CRC.
    #[inline(always)]
    pub fn update_byte(&mut self, byte: u8) {
        let index = ((self.crc >> 8) as u8 ^ byte) as usize;
        self.crc = (self.crc << 8) ^ CRC16_TABLE[index];
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.update_byte(byte);
        }
    }

    /// Update the CRC with `len` bytes of `data` starting at `offset`.
    ///
    /// Out-of-range requests are clipped to the slice.
    pub fn update_range(&mut self, data: &[u8], offset: usize, len: usize) {
        let start = offset.min(data.len());
        let end = start.saturating_add(len).min(data.len());
        self.update(&data[start..end]);
    }

    /// Get the current CRC value.
    #[inline(always)]
    pub fn value(&self) -> u16 {
        self.crc
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u16 {
        self.crc
    }

    /// Compute CRC-16 for a slice in one call.
    pub fn compute(data: &[u8]) -> u16 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}
