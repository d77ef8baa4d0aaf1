//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data. Text is encoded
//! into the printer's character set as it is written, so opcodes and text
//! never need to be separated again afterwards.

use crate::encoding::Charset;

pub const ESC: u8 = 0x1B;
pub const GS: u8 = 0x1D;
pub const FS: u8 = 0x1C;
pub const LF: u8 = 0x0A;

/// ESC @ - Initialize printer
pub const INIT: [u8; 2] = [ESC, 0x40];
/// FS p n m - Print NV bit image 1 in normal mode
pub const NV_LOGO: [u8; 4] = [FS, 0x70, 0x01, 0x00];
/// GS V 0 - Full cut
pub const CUT: [u8; 3] = [GS, 0x56, 0x00];

/// Byte-mode capacity of a version 40 QR code at error correction level M
pub const QR_MAX_BYTES: usize = 2331;

/// Paper width of a receipt roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperWidth {
    Mm58,
    Mm80,
}

impl PaperWidth {
    /// Characters per line in the printer's standard font
    pub fn columns(self) -> usize {
        match self {
            PaperWidth::Mm58 => 32,
            PaperWidth::Mm80 => 48,
        }
    }
}

impl TryFrom<u16> for PaperWidth {
    type Error = String;

    fn try_from(mm: u16) -> Result<Self, Self::Error> {
        match mm {
            58 => Ok(PaperWidth::Mm58),
            80 => Ok(PaperWidth::Mm80),
            other => Err(format!("paper width must be 58 or 80 mm, got {}", other)),
        }
    }
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
    charset: Charset,
}

impl EscPosBuilder {
    /// Create a builder that starts with printer initialization
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize, charset: Charset) -> Self {
        let mut b = Self::fragment(width, charset);
        b.init();
        b
    }

    /// Create an empty builder for a section of a larger document
    pub fn fragment(width: usize, charset: Charset) -> Self {
        Self {
            buf: Vec::with_capacity(512),
            width,
            charset,
        }
    }

    /// Get the configured paper width
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    // === Text Output ===

    /// Write text encoded in the configured character set
    pub fn text(&mut self, s: &str) -> &mut Self {
        let encoded = self.charset.encode(s);
        self.buf.extend_from_slice(&encoded);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(LF);
        self
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(LF);
        self
    }

    /// Write multiple empty lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n - Print and feed n lines
        self.buf.extend_from_slice(&[ESC, 0x64, lines]);
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x61, 0x00]);
        self
    }

    // === Text Style ===

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x45, 0x00]);
        self
    }

    /// Double width and height
    pub fn double_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[GS, 0x21, 0x11]);
        self
    }

    /// Double height only
    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[GS, 0x21, 0x01]);
        self
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[GS, 0x21, 0x00]);
        self
    }

    /// Select the smaller font B
    pub fn small_font(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x4D, 0x01]);
        self
    }

    /// Select the standard font A
    pub fn normal_font(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x4D, 0x00]);
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    // === Layout Helpers ===

    /// Print left and right text on the same line
    ///
    /// Left text is left-aligned, right text is right-aligned,
    /// with spaces filling the gap.
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        self.line_lr_in(left, right, self.width)
    }

    /// Like [`line_lr`](Self::line_lr) for a narrower column count,
    /// e.g. half the paper width under double-width text
    pub fn line_lr_in(&mut self, left: &str, right: &str, columns: usize) -> &mut Self {
        let lw = self.charset.width(left);
        let rw = self.charset.width(right);

        if lw + rw >= columns {
            // Too long, just print with space
            self.text(left);
            self.text(" ");
            self.line(right);
        } else {
            let spaces = columns - lw - rw;
            self.text(left);
            self.text(&" ".repeat(spaces));
            self.line(right);
        }
        self
    }

    /// Print a line truncated to the paper width
    pub fn line_fit(&mut self, s: &str) -> &mut Self {
        let fitted = self.charset.truncate(s, self.width);
        self.line(&fitted)
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&CUT);
        self
    }

    // === Graphics and Codes ===

    /// Print the logo stored in the printer's NV memory slot 1
    pub fn nv_logo(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&NV_LOGO);
        self
    }

    /// Print a CODE128 barcode with human readable text below
    pub fn barcode_code128(&mut self, data: &str) -> &mut Self {
        // Barcode payload must stay inside the printable ASCII range
        let payload: Vec<u8> = data
            .bytes()
            .filter(|b| (0x20..0x7F).contains(b))
            .take(253)
            .collect();

        // GS H 2 - HRI below; GS h 80 - height; GS w 2 - module width
        self.buf.extend_from_slice(&[GS, 0x48, 0x02]);
        self.buf.extend_from_slice(&[GS, 0x68, 80]);
        self.buf.extend_from_slice(&[GS, 0x77, 0x02]);

        // GS k 73 n {B data - CODE128 using code set B
        self.buf.extend_from_slice(&[GS, 0x6B, 73, (payload.len() + 2) as u8, b'{', b'B']);
        self.buf.extend_from_slice(&payload);
        self.buf.push(LF);
        self
    }

    /// Print a QR code
    ///
    /// Size: 1-16 (module size in dots). Payloads beyond the Model 2 level M
    /// byte capacity are cut at the last whole character that fits.
    pub fn qr_code(&mut self, data: &str, size: u8) -> &mut Self {
        let size = size.clamp(1, 16);

        // Function 165: Select model (Model 2)
        self.buf
            .extend_from_slice(&[GS, 0x28, 0x6B, 0x04, 0x00, 0x31, 0x41, 0x32, 0x00]);

        // Function 167: Set module size
        self.buf
            .extend_from_slice(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x43, size]);

        // Function 169: Set error correction (M)
        self.buf
            .extend_from_slice(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x45, 0x31]);

        // Function 180: Store data
        let mut end = data.len().min(QR_MAX_BYTES);
        while !data.is_char_boundary(end) {
            end -= 1;
        }
        let data_bytes = &data.as_bytes()[..end];
        let len = data_bytes.len() + 3;
        let p_l = (len & 0xFF) as u8;
        let p_h = ((len >> 8) & 0xFF) as u8;
        self.buf
            .extend_from_slice(&[GS, 0x28, 0x6B, p_l, p_h, 0x31, 0x50, 0x30]);
        self.buf.extend_from_slice(data_bytes);

        // Function 181: Print
        self.buf
            .extend_from_slice(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]);

        self
    }

    /// Initialize the printer and select the character set
    pub fn init(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&INIT);
        self.buf.extend_from_slice(self.charset.select_bytes());
        self
    }

    // === Build ===

    /// Finish and return the byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(PaperWidth::Mm80.columns(), Charset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_builder_starts_with_init_and_charset() {
        let data = EscPosBuilder::new(32, Charset::Wpc1252).build();
        assert_eq!(data, vec![ESC, 0x40, ESC, 0x74, 16]);
    }

    #[test]
    fn test_fragment_has_no_init() {
        let mut b = EscPosBuilder::fragment(32, Charset::Wpc1252);
        b.line("hola");
        assert_eq!(b.build(), b"hola\n");
    }

    #[test]
    fn test_line_lr() {
        let mut b = EscPosBuilder::fragment(20, Charset::Wpc1252);
        b.line_lr("TOTAL", "$20.00");
        let data = b.build();
        assert_eq!(data.len(), 21);
        assert_eq!(&data[..5], b"TOTAL");
        assert_eq!(&data[14..20], b"$20.00");
    }

    #[test]
    fn test_line_lr_overflow_keeps_both_sides() {
        let mut b = EscPosBuilder::fragment(8, Charset::Wpc1252);
        b.line_lr("Producto largo", "$1.00");
        assert_eq!(b.build(), b"Producto largo $1.00\n");
    }

    #[test]
    fn test_separators() {
        let mut b = EscPosBuilder::fragment(10, Charset::Wpc1252);
        b.sep_double();
        assert_eq!(b.build(), b"==========\n");
    }

    #[test]
    fn test_text_cannot_inject_opcodes() {
        let mut b = EscPosBuilder::fragment(32, Charset::Wpc1252);
        b.text("\x1DV\x00");
        assert!(!contains(&b.build(), &CUT));
    }

    #[test]
    fn test_barcode_length_prefix() {
        let mut b = EscPosBuilder::fragment(32, Charset::Wpc1252);
        b.barcode_code128("V-0001");
        let data = b.build();
        assert!(contains(&data, &[GS, 0x6B, 73, 8, b'{', b'B']));
        assert!(contains(&data, b"V-0001"));
    }

    #[test]
    fn test_qr_store_length_matches_payload() {
        let mut b = EscPosBuilder::fragment(32, Charset::Wpc1252);
        b.qr_code("V-0001", 6);
        let data = b.build();
        assert!(contains(&data, &[GS, 0x28, 0x6B, 9, 0, 0x31, 0x50, 0x30]));
        assert!(contains(&data, b"V-0001"));
    }

    #[test]
    fn test_long_qr_payload_is_capped() {
        let long = "A".repeat(70_000);
        let mut b = EscPosBuilder::fragment(32, Charset::Wpc1252);
        b.qr_code(&long, 6);
        let data = b.build();

        let len = QR_MAX_BYTES + 3;
        let header = [GS, 0x28, 0x6B, (len & 0xFF) as u8, (len >> 8) as u8, 0x31, 0x50, 0x30];
        let at = data
            .windows(header.len())
            .position(|w| w == header)
            .unwrap();
        let stored = &data[at + header.len()..];
        assert_eq!(stored.iter().take_while(|&&c| c == b'A').count(), QR_MAX_BYTES);
        assert!(data.ends_with(&[GS, 0x28, 0x6B, 0x03, 0x00, 0x31, 0x51, 0x30]));

        // Multi-byte characters are never split
        let wide = "é".repeat(QR_MAX_BYTES);
        let mut b = EscPosBuilder::fragment(32, Charset::Wpc1252);
        b.qr_code(&wide, 6);
        let len = QR_MAX_BYTES - 1 + 3;
        let header = [GS, 0x28, 0x6B, (len & 0xFF) as u8, (len >> 8) as u8, 0x31, 0x50, 0x30];
        assert!(contains(&b.build(), &header));
    }

    #[test]
    fn test_paper_width_conversion() {
        assert_eq!(PaperWidth::try_from(58).unwrap().columns(), 32);
        assert_eq!(PaperWidth::try_from(80).unwrap().columns(), 48);
        assert!(PaperWidth::try_from(72).is_err());
    }
}
