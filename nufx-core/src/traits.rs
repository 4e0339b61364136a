//! Pull-based byte source trait shared by the codec layers.
//!
//! The decoders in this workspace are stacked: an RLE decoder may pull its
//! input straight from the archive bytes or from the output of an LZW
//! decoder. [`ByteSource`] is the seam between those layers.

use crate::error::Result;

/// A forward-only supplier of bytes, one at a time.
pub trait ByteSource {
    /// Returns the next byte, or `None` once the source is exhausted.
    fn next_byte(&mut self) -> Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        (**self).next_byte()
    }
}

/// Byte source over an in-memory slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source that yields the bytes of `data` in order.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of bytes already consumed.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.data.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source() {
        let mut source = SliceSource::new(&[1, 2]);
        assert_eq!(source.next_byte().unwrap(), Some(1));
        assert_eq!(source.next_byte().unwrap(), Some(2));
        assert_eq!(source.next_byte().unwrap(), None);
        assert_eq!(source.position(), 2);
    }
}
