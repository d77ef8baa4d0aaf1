//! Character set handling for thermal printers
//!
//! Thermal printers expect single-byte code pages (or GBK in Chinese mode),
//! never UTF-8. This module provides:
//! - A static table of supported character sets and their ESC/POS selectors
//! - Encoding of free text with a placeholder for unrepresentable characters
//! - Width-aware truncation and padding measured in printer columns

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Byte printed in place of characters the printer cannot represent
pub const PLACEHOLDER: u8 = b'?';

/// Character sets a printer can be configured with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Charset {
    /// Windows-1252, Western European (Spanish, Portuguese, French)
    #[default]
    Wpc1252,
    /// Windows-1250, Central European (Slovenian, Croatian, Polish)
    Wpc1250,
    /// PC866, Cyrillic
    Pc866,
    /// GBK via the printer's Chinese mode
    Gbk,
}

/// Static description of a character set
#[derive(Debug)]
pub struct CharsetInfo {
    pub charset: Charset,
    pub name: &'static str,
    pub encoding: &'static Encoding,
    /// Bytes sent after initialization to select the code page
    pub select: &'static [u8],
}

/// Supported character sets
///
/// ESC t n selects a code page table; FS & enters Chinese mode.
pub static CHARSETS: &[CharsetInfo] = &[
    CharsetInfo {
        charset: Charset::Wpc1252,
        name: "WPC1252",
        encoding: encoding_rs::WINDOWS_1252,
        select: &[0x1B, 0x74, 16],
    },
    CharsetInfo {
        charset: Charset::Wpc1250,
        name: "WPC1250",
        encoding: encoding_rs::WINDOWS_1250,
        select: &[0x1B, 0x74, 45],
    },
    CharsetInfo {
        charset: Charset::Pc866,
        name: "PC866",
        encoding: encoding_rs::IBM866,
        select: &[0x1B, 0x74, 17],
    },
    CharsetInfo {
        charset: Charset::Gbk,
        name: "GBK",
        encoding: encoding_rs::GBK,
        select: &[0x1C, 0x26, 0x1C, 0x43, 0x01],
    },
];

impl Charset {
    pub fn info(self) -> &'static CharsetInfo {
        CHARSETS
            .iter()
            .find(|c| c.charset == self)
            .unwrap_or(&CHARSETS[0])
    }

    /// Look up a character set by its table name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        CHARSETS
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .map(|c| c.charset)
    }

    /// ESC/POS bytes that select this character set
    pub fn select_bytes(self) -> &'static [u8] {
        self.info().select
    }

    /// Encode free text for the printer
    ///
    /// Control characters and characters outside the code page become
    /// [`PLACEHOLDER`], so text can never smuggle opcodes into the stream.
    pub fn encode(self, s: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(s.len());
        for c in s.chars() {
            self.encode_char(c, &mut out);
        }
        out
    }

    /// Printed width of a string in columns
    ///
    /// Double-byte GBK characters take two columns.
    pub fn width(self, s: &str) -> usize {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Truncate a string to fit within a column width
    pub fn truncate(self, s: &str, max_width: usize) -> String {
        let mut width = 0;
        let mut result = String::new();
        for c in s.chars() {
            let char_len = self.char_width(c);
            if width + char_len > max_width {
                break;
            }
            result.push(c);
            width += char_len;
        }
        result
    }

    fn char_width(self, c: char) -> usize {
        let mut buf = Vec::with_capacity(2);
        self.encode_char(c, &mut buf);
        buf.len()
    }

    fn encode_char(self, c: char, out: &mut Vec<u8>) {
        if c.is_control() {
            out.push(PLACEHOLDER);
            return;
        }
        if c.is_ascii() {
            out.push(c as u8);
            return;
        }
        let mut tmp = [0u8; 4];
        let (bytes, _, had_errors) = self.info().encoding.encode(c.encode_utf8(&mut tmp));
        if had_errors || bytes.is_empty() {
            out.push(PLACEHOLDER);
        } else {
            out.extend_from_slice(&bytes);
        }
    }
}

impl std::str::FromStr for Charset {
    type Err = crate::PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Charset::from_name(s)
            .ok_or_else(|| crate::PrintError::InvalidConfig(format!("Unknown charset: {}", s)))
    }
}
