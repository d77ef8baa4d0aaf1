//! Plain-text preview of an ESC/POS stream
//!
//! Skips the commands the encoder emits together with their parameters,
//! and decodes the remaining text through the printer character set.

use crate::encoding::Charset;
use crate::escpos::{ESC, FS, GS, LF};

/// Render the printable text of an ESC/POS byte stream
pub fn preview_text(bytes: &[u8], charset: Charset) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut run: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let skip = match b {
            ESC => esc_len(&bytes[i..]),
            GS => gs_len(&bytes[i..]),
            FS => fs_len(&bytes[i..]),
            LF => {
                flush(&mut run, charset, &mut out);
                out.push('\n');
                1
            }
            0x20..=0x7E | 0x80..=0xFF => {
                run.push(b);
                1
            }
            _ => 1,
        };
        if matches!(b, ESC | GS | FS) {
            flush(&mut run, charset, &mut out);
        }
        i += skip.max(1);
    }

    flush(&mut run, charset, &mut out);
    out
}

fn flush(run: &mut Vec<u8>, charset: Charset, out: &mut String) {
    if run.is_empty() {
        return;
    }
    let (text, _) = charset.info().encoding.decode_without_bom_handling(run);
    out.push_str(&text);
    run.clear();
}

/// Length of an ESC command, parameters included
fn esc_len(cmd: &[u8]) -> usize {
    match cmd.get(1) {
        Some(0x40) => 2, // ESC @
        Some(0x70) => 5, // ESC p m t1 t2
        Some(0x2A) => {
            // ESC * m nL nH d1..dk
            let n = word(cmd, 3);
            let m = cmd.get(2).copied().unwrap_or(0);
            let per_col = if m >= 32 { 3 } else { 1 };
            5 + n * per_col
        }
        Some(_) => 3, // ESC a/E/M/t/d/!/- n
        None => 1,
    }
}

/// Length of a GS command, parameters included
fn gs_len(cmd: &[u8]) -> usize {
    match cmd.get(1) {
        Some(0x56) => match cmd.get(2) {
            // GS V 65/66 n carries a feed amount
            Some(65) | Some(66) => 4,
            _ => 3,
        },
        Some(0x6B) => {
            let m = cmd.get(2).copied().unwrap_or(0);
            if m <= 6 {
                // GS k m d1..dk NUL
                let end = cmd[3.min(cmd.len())..]
                    .iter()
                    .position(|&b| b == 0)
                    .map(|p| p + 1)
                    .unwrap_or(cmd.len().saturating_sub(3));
                3 + end
            } else {
                // GS k m n d1..dn
                4 + cmd.get(3).copied().unwrap_or(0) as usize
            }
        }
        // GS ( k pL pH ...
        Some(0x28) => 5 + word(cmd, 3),
        Some(0x76) => {
            // GS v 0 m xL xH yL yH d1..dk
            8 + word(cmd, 4) * word(cmd, 6)
        }
        Some(_) => 3, // GS !/H/h/w n
        None => 1,
    }
}

/// Length of an FS command, parameters included
fn fs_len(cmd: &[u8]) -> usize {
    match cmd.get(1) {
        Some(0x70) => 4, // FS p n m
        Some(0x43) => 3, // FS C n
        Some(_) => 2, // FS & / FS .
        None => 1,
    }
}

/// Little-endian u16 parameter at `at`
fn word(cmd: &[u8], at: usize) -> usize {
    let lo = cmd.get(at).copied().unwrap_or(0) as usize;
    let hi = cmd.get(at + 1).copied().unwrap_or(0) as usize;
    lo | (hi << 8)
}
