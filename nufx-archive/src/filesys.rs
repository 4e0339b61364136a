//! File system identifiers.

use std::fmt;

/// The file system an entry was archived from (`file_sys_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSystemId {
    /// 0: reserved.
    Reserved,
    /// 1: ProDOS or SOS.
    ProDos,
    /// 2: DOS 3.3.
    Dos33,
    /// 3: DOS 3.2.
    Dos32,
    /// 4: Apple II Pascal.
    Pascal,
    /// 5: Macintosh HFS.
    MacHfs,
    /// 6: Macintosh MFS.
    MacMfs,
    /// 7: Lisa File System.
    Lisa,
    /// 8: Apple CP/M.
    CpM,
    /// 10: MS-DOS.
    MsDos,
    /// 11: High Sierra.
    HighSierra,
    /// 12: ISO 9660.
    Iso9660,
    /// 13: AppleShare.
    AppleShare,
    /// Any other value, including the reserved 9.
    Unknown(u16),
}

impl FileSystemId {
    /// Raw value of DOS 3.3, used by the disk image size repair.
    pub const DOS33_RAW: u16 = 2;

    /// Decode a raw `file_sys_id`.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::Reserved,
            1 => Self::ProDos,
            2 => Self::Dos33,
            3 => Self::Dos32,
            4 => Self::Pascal,
            5 => Self::MacHfs,
            6 => Self::MacMfs,
            7 => Self::Lisa,
            8 => Self::CpM,
            10 => Self::MsDos,
            11 => Self::HighSierra,
            12 => Self::Iso9660,
            13 => Self::AppleShare,
            other => Self::Unknown(other),
        }
    }

    /// The raw `file_sys_id`.
    pub fn raw(&self) -> u16 {
        match self {
            Self::Reserved => 0,
            Self::ProDos => 1,
            Self::Dos33 => 2,
            Self::Dos32 => 3,
            Self::Pascal => 4,
            Self::MacHfs => 5,
            Self::MacMfs => 6,
            Self::Lisa => 7,
            Self::CpM => 8,
            Self::MsDos => 10,
            Self::HighSierra => 11,
            Self::Iso9660 => 12,
            Self::AppleShare => 13,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reserved => "Reserved",
            Self::ProDos => "ProDOS/SOS",
            Self::Dos33 => "DOS 3.3",
            Self::Dos32 => "DOS 3.2",
            Self::Pascal => "Apple II Pascal",
            Self::MacHfs => "Macintosh HFS",
            Self::MacMfs => "Macintosh MFS",
            Self::Lisa => "Lisa File System",
            Self::CpM => "Apple CP/M",
            Self::MsDos => "MS-DOS",
            Self::HighSierra => "High Sierra",
            Self::Iso9660 => "ISO 9660",
            Self::AppleShare => "AppleShare",
            Self::Unknown(9) => "Reserved",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for FileSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path separator encoded in the low byte of `file_sys_info`.
///
/// Both plain and high-bit ASCII are accepted, and `?` (0x3f) is taken to
/// mean `:` as the file type note documents.
pub fn separator_from_info(file_sys_info: u16) -> Option<char> {
    match file_sys_info & 0xff {
        0x2f | 0xaf => Some('/'),
        0x3a | 0xba | 0x3f => Some(':'),
        0x5c | 0xdc => Some('\\'),
        _ => None,
    }
}
