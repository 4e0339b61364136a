//! LZW dictionary (code table) management.
//!
//! Strings are stored as prefix chains: each entry records the code of its
//! prefix and the byte appended to it, so adding a string is O(1) and
//! expanding a code walks the chain backwards.

use crate::config::{CLEAR_CODE, INITIAL_DICTIONARY_LEN};
use std::collections::HashMap;

const NO_PREFIX: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct DictEntry {
    prefix: u32,
    suffix: u8,
    first: u8,
    len: u32,
}

/// LZW dictionary shared by the encoder and decoder.
///
/// Codes 0..=255 are the single bytes and code 0x100 is an empty
/// placeholder for the clear code, so a fresh dictionary has 257 entries.
/// The reverse `(prefix, byte) -> code` map is only maintained for strings
/// added with [`insert`](Self::insert).
#[derive(Debug, Clone)]
pub struct LzwDictionary {
    /// Code table: code -> (prefix, suffix).
    entries: Vec<DictEntry>,
    /// Reverse lookup for encoding.
    lookup: HashMap<(u32, u8), u32>,
}

impl LzwDictionary {
    /// Create a dictionary in its initial state.
    pub fn new() -> Self {
        let mut dict = Self {
            entries: Vec::with_capacity(4096),
            lookup: HashMap::new(),
        };
        dict.reset();
        dict
    }

    /// Reset the dictionary to its initial state.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.lookup.clear();
        for byte in 0..=u8::MAX {
            self.entries.push(DictEntry {
                prefix: NO_PREFIX,
                suffix: byte,
                first: byte,
                len: 1,
            });
        }
        self.entries.push(DictEntry {
            prefix: NO_PREFIX,
            suffix: 0,
            first: 0,
            len: 0,
        });
        debug_assert_eq!(self.len(), INITIAL_DICTIONARY_LEN);
    }

    /// Number of codes assigned, including the clear placeholder.
    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    /// Returns true if only the initial entries are present.
    pub fn is_empty(&self) -> bool {
        self.len() <= INITIAL_DICTIONARY_LEN
    }

    /// Returns true if `code` names a string.
    pub fn contains(&self, code: u32) -> bool {
        code < self.len() && code != CLEAR_CODE
    }

    /// Length of the string for `code`.
    pub fn string_len(&self, code: u32) -> usize {
        self.entries[code as usize].len as usize
    }

    /// First byte of the string for `code`.
    pub fn first_byte(&self, code: u32) -> u8 {
        self.entries[code as usize].first
    }

    /// Add `prefix + suffix` without indexing it for lookup (decode side).
    pub fn push(&mut self, prefix: u32, suffix: u8) -> u32 {
        let code = self.len();
        let parent = self.entries[prefix as usize];
        self.entries.push(DictEntry {
            prefix,
            suffix,
            first: parent.first,
            len: parent.len + 1,
        });
        code
    }

    /// Add `prefix + suffix` and index it for lookup (encode side).
    pub fn insert(&mut self, prefix: u32, suffix: u8) -> u32 {
        let code = self.push(prefix, suffix);
        self.lookup.insert((prefix, suffix), code);
        code
    }

    /// Find the code for `prefix + byte`, if it was inserted.
    pub fn find(&self, prefix: u32, byte: u8) -> Option<u32> {
        self.lookup.get(&(prefix, byte)).copied()
    }

    /// Append the string for `code` to `out`.
    pub fn expand_into(&self, code: u32, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + self.string_len(code), 0);
        let mut code = code;
        for slot in out[start..].iter_mut().rev() {
            let entry = self.entries[code as usize];
            *slot = entry.suffix;
            code = entry.prefix;
        }
    }
}

impl Default for LzwDictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let dict = LzwDictionary::new();
        assert_eq!(dict.len(), 257);
        assert!(dict.contains(0x41));
        assert!(!dict.contains(CLEAR_CODE));
        assert!(!dict.contains(257));
        assert_eq!(dict.first_byte(0x41), 0x41);
        assert!(dict.is_empty());
    }

    #[test]
    fn test_push_and_expand() {
        let mut dict = LzwDictionary::new();
        let ab = dict.push(u32::from(b'A'), b'B');
        let abc = dict.push(ab, b'C');
        assert_eq!(ab, 257);
        assert_eq!(abc, 258);
        assert_eq!(dict.string_len(abc), 3);
        assert_eq!(dict.first_byte(abc), b'A');

        let mut out = b"x".to_vec();
        dict.expand_into(abc, &mut out);
        assert_eq!(out, b"xABC");
        assert_eq!(dict.find(ab, b'C'), None);
    }

    #[test]
    fn test_insert_lookup_and_reset() {
        let mut dict = LzwDictionary::new();
        let code = dict.insert(u32::from(b'T'), b'O');
        assert_eq!(dict.find(u32::from(b'T'), b'O'), Some(code));
        dict.reset();
        assert_eq!(dict.find(u32::from(b'T'), b'O'), None);
        assert_eq!(dict.len(), 257);
    }
}
