//! Sales ticket encoder
//!
//! Turns a sale plus business and ticket configuration into the ESC/POS
//! byte stream of a customer ticket. Encoding is pure: the same inputs
//! always produce the same bytes.
//!
//! Sections are emitted in a fixed order and a disabled section is left
//! out without touching any other:
//!
//! ```text
//! Init, Logo, Business, TaxId, HeaderMessage,
//! SaleHeader, Cashier, Customer,
//! Items,
//! Subtotal, TaxBreakdown, Total, Cae,
//! Payment, Change,
//! Footer, Barcode, Qr,
//! Cut
//! ```
//!
//! With `print_duplicate` everything after `Init` is repeated once per copy.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::encoding::Charset;
use crate::error::{PrintError, PrintResult};
use crate::escpos::{EscPosBuilder, PaperWidth};
use crate::model::{
    BusinessConfig, FontSize, SaleDocument, SaleItem, TicketConfig, format_money, to_decimal,
};

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";
const QR_MODULE_SIZE: u8 = 6;

/// Ticket sections in print order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Init,
    Logo,
    Business,
    TaxId,
    HeaderMessage,
    SaleHeader,
    Cashier,
    Customer,
    Items,
    Subtotal,
    TaxBreakdown,
    Total,
    Cae,
    Payment,
    Change,
    Footer,
    Barcode,
    Qr,
    Cut,
}

/// Encoded ESC/POS stream
///
/// Binary: must travel as raw bytes, or base64 towards a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTicket(Vec<u8>);

impl EncodedTicket {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Standard-alphabet base64, as handed to browser printing
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl From<Vec<u8>> for EncodedTicket {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EncodedTicket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Customer ticket encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketEncoder {
    charset: Charset,
}

impl TicketEncoder {
    pub fn new(charset: Charset) -> Self {
        Self { charset }
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Encode a sale ticket
    ///
    /// Fails with `EncodingInputInvalid` on malformed sale or configuration
    /// input; never performs I/O.
    pub fn encode(
        &self,
        sale: &SaleDocument,
        business: &BusinessConfig,
        config: &TicketConfig,
    ) -> PrintResult<EncodedTicket> {
        let sections = self.render_sections(sale, business, config)?;

        let mut out = Vec::new();
        for (section, bytes) in &sections {
            if *section == Section::Init {
                out.extend_from_slice(bytes);
            }
        }
        for _ in 0..config.copies() {
            for (section, bytes) in &sections {
                if *section != Section::Init {
                    out.extend_from_slice(bytes);
                }
            }
        }

        Ok(EncodedTicket(out))
    }

    /// Render one copy of the ticket, section by section
    ///
    /// Disabled sections are present with empty content.
    pub fn render_sections(
        &self,
        sale: &SaleDocument,
        business: &BusinessConfig,
        config: &TicketConfig,
    ) -> PrintResult<Vec<(Section, Vec<u8>)>> {
        business
            .validate()
            .and_then(|_| config.validate())
            .map_err(|e| match e {
                PrintError::InvalidConfig(msg) => PrintError::EncodingInputInvalid(msg),
                other => other,
            })?;
        sale.validate()?;

        let paper = config.paper()?;
        let width = paper.columns();
        let totals = sale.totals()?;
        let tax_rate = to_decimal(sale.tax_rate, "tax_rate")?;
        let amount_paid = sale
            .amount_paid
            .map(|paid| to_decimal(paid, "amount_paid"))
            .transpose()?;
        let change = sale.change_due()?;
        let lines = sale
            .items
            .iter()
            .map(ItemLine::from_item)
            .collect::<PrintResult<Vec<_>>>()?;
        let reference = sale.reference();

        let sections = vec![
            (Section::Init, self.fragment(width, |b| {
                b.init();
            })),
            (Section::Logo, self.fragment_if(config.show_logo, width, render_logo)),
            (Section::Business, self.fragment_if(config.show_business_info, width, |b| {
                render_business(b, business, config.font_size)
            })),
            (Section::TaxId, match (&business.cuit, config.show_cuit) {
                (Some(cuit), true) if !cuit.trim().is_empty() => self.fragment(width, |b| {
                    b.center();
                    b.line_fit(&format!("CUIT: {}", cuit.trim()));
                    b.left();
                }),
                _ => Vec::new(),
            }),
            (Section::HeaderMessage, match non_empty(&config.header_message) {
                Some(message) => self.fragment(width, |b| render_centered_text(b, message)),
                None => Vec::new(),
            }),
            (Section::SaleHeader, self.fragment(width, |b| {
                render_sale_header(b, sale, config, &reference)
            })),
            (Section::Cashier, match non_empty(&sale.cashier) {
                Some(cashier) if config.show_cashier => self.fragment(width, |b| {
                    b.line_fit(&format!("Cajero: {}", cashier));
                }),
                _ => Vec::new(),
            }),
            (Section::Customer, match non_empty(&sale.customer_name) {
                Some(customer) if config.show_customer => self.fragment(width, |b| {
                    b.line_fit(&format!("Cliente: {}", customer));
                }),
                _ => Vec::new(),
            }),
            (Section::Items, self.fragment(width, |b| render_items(b, &lines))),
            (Section::Subtotal, self.fragment(width, |b| {
                b.line_lr("SUBTOTAL:", &format_money(totals.subtotal));
                if totals.discount > Decimal::ZERO {
                    b.line_lr("Descuento:", &format!("-{}", format_money(totals.discount)));
                }
            })),
            (Section::TaxBreakdown, self.fragment_if(config.show_tax_breakdown, width, |b| {
                b.line_lr("Neto gravado:", &format_money(totals.net));
                b.line_lr(
                    &format!("IVA {}%:", tax_rate.normalize()),
                    &format_money(totals.tax),
                );
            })),
            (Section::Total, self.fragment(width, |b| {
                render_total(b, totals.total, config.font_size)
            })),
            (Section::Cae, match non_empty(&sale.cae) {
                Some(cae) if config.include_cae => self.fragment(width, |b| {
                    b.line_fit(&format!("CAE: {}", cae));
                    if let Some(expiry) = sale.cae_expiry {
                        b.line(&format!("Vto. CAE: {}", expiry.format("%d/%m/%Y")));
                    }
                }),
                _ => Vec::new(),
            }),
            (Section::Payment, match non_empty(&sale.payment_method) {
                Some(method) if config.show_payment_method => self.fragment(width, |b| {
                    b.sep_single();
                    b.line_lr("Pago:", method);
                    if let Some(paid) = amount_paid {
                        b.line_lr("Recibido:", &format_money(paid));
                    }
                }),
                _ => Vec::new(),
            }),
            (Section::Change, match change {
                Some(change) if config.show_change => self.fragment(width, |b| {
                    b.line_lr("Vuelto:", &format_money(change));
                }),
                _ => Vec::new(),
            }),
            (Section::Footer, self.fragment(width, |b| render_footer(b, business, config))),
            (Section::Barcode, self.fragment_if(config.show_barcode, width, |b| {
                b.newline();
                b.center();
                b.barcode_code128(&reference);
                b.left();
            })),
            (Section::Qr, self.fragment_if(config.show_qr, width, |b| {
                b.newline();
                b.center();
                b.qr_code(&reference, QR_MODULE_SIZE);
                b.newline();
                b.left();
            })),
            (Section::Cut, self.fragment(width, |b| {
                b.feed(4);
                b.cut();
            })),
        ];

        Ok(sections)
    }

    /// Diagnostic page sent by the test-print operation
    pub fn test_ticket(&self, paper: PaperWidth, printed_at: NaiveDateTime) -> EncodedTicket {
        let mut b = EscPosBuilder::new(paper.columns(), self.charset);

        b.center();
        b.bold();
        b.double_size();
        b.line("PRUEBA");
        b.reset_size();
        b.line("DE IMPRESION");
        b.bold_off();
        b.sep_double();

        b.line_fit("Impresora conectada correctamente.");
        b.line_fit("Si puede leer este texto,");
        b.line_fit("la impresora funciona.");
        b.newline();
        b.line(&printed_at.format(DATE_FORMAT).to_string());
        b.left();

        b.feed(4);
        b.cut();

        EncodedTicket(b.build())
    }

    fn fragment(&self, width: usize, render: impl FnOnce(&mut EscPosBuilder)) -> Vec<u8> {
        let mut b = EscPosBuilder::fragment(width, self.charset);
        render(&mut b);
        b.build()
    }

    fn fragment_if(
        &self,
        enabled: bool,
        width: usize,
        render: impl FnOnce(&mut EscPosBuilder),
    ) -> Vec<u8> {
        if enabled {
            self.fragment(width, render)
        } else {
            Vec::new()
        }
    }
}

fn render_logo(b: &mut EscPosBuilder) {
    b.center();
    b.nv_logo();
    b.newline();
    b.left();
}

fn render_business(b: &mut EscPosBuilder, business: &BusinessConfig, size: FontSize) {
    b.center();

    emphasis(b, size);
    let name = b.charset().truncate(business.name.trim(), columns(b.width(), size));
    b.line(&name);
    plain(b);

    if let Some(slogan) = non_empty(&business.slogan) {
        b.line_fit(slogan);
    }
    for field in [
        &business.address,
        &business.phone,
        &business.email,
        &business.website,
    ] {
        if let Some(value) = non_empty(field) {
            b.line_fit(value);
        }
    }

    b.left();
}

fn render_sale_header(
    b: &mut EscPosBuilder,
    sale: &SaleDocument,
    config: &TicketConfig,
    reference: &str,
) {
    b.sep_double();

    b.center();
    b.bold();
    b.line(config.fiscal_type.title());
    b.bold_off();
    b.left();

    b.line_lr("Nro:", reference);
    b.line_lr("Fecha:", &sale.created_at.format(DATE_FORMAT).to_string());
}

/// Line items always print in the plain style
/// A sale line with its amounts converted
struct ItemLine<'a> {
    name: &'a str,
    quantity: Decimal,
    unit_price: Decimal,
    total: Decimal,
}

impl<'a> ItemLine<'a> {
    fn from_item(item: &'a SaleItem) -> PrintResult<Self> {
        Ok(Self {
            name: item.name.trim(),
            quantity: to_decimal(item.quantity, "quantity")?,
            unit_price: to_decimal(item.unit_price, "unit_price")?,
            total: item.total()?,
        })
    }
}

fn render_items(b: &mut EscPosBuilder, items: &[ItemLine<'_>]) {
    plain(b);
    b.sep_single();

    for item in items {
        b.line_fit(item.name);

        let detail = format!(
            "  {} x {}",
            item.quantity.normalize(),
            format_money(item.unit_price)
        );
        b.line_lr(&detail, &format_money(item.total));
    }

    b.sep_single();
}

fn render_total(b: &mut EscPosBuilder, total: Decimal, size: FontSize) {
    emphasis(b, size);
    let cols = columns(b.width(), size);
    b.line_lr_in("TOTAL:", &format_money(total), cols);
    plain(b);
}

fn render_footer(b: &mut EscPosBuilder, business: &BusinessConfig, config: &TicketConfig) {
    let texts: Vec<&str> = [
        &business.footer_message,
        &config.footer_message,
        &config.return_policy,
    ]
    .into_iter()
    .filter_map(non_empty)
    .collect();

    if texts.is_empty() {
        return;
    }

    b.newline();
    for text in texts {
        render_centered_text(b, text);
    }
}

fn render_centered_text(b: &mut EscPosBuilder, text: &str) {
    b.center();
    for line in wrap(b.charset(), text, b.width()) {
        b.line(&line);
    }
    b.left();
}

/// Style of the header and total lines for the configured font size
fn emphasis(b: &mut EscPosBuilder, size: FontSize) {
    match size {
        FontSize::Small => {
            b.small_font();
            b.bold();
        }
        FontSize::Normal => {
            b.bold();
            b.double_height();
        }
        FontSize::Large => {
            b.bold();
            b.double_size();
        }
    }
}

fn plain(b: &mut EscPosBuilder) {
    b.reset_size();
    b.normal_font();
    b.bold_off();
}

/// Usable columns for emphasized text
fn columns(width: usize, size: FontSize) -> usize {
    match size {
        FontSize::Large => width / 2,
        FontSize::Small | FontSize::Normal => width,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Greedy word wrap measured in printer columns
fn wrap(charset: Charset, text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if charset.width(&candidate) <= width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            // Hard-split words longer than a line
            let mut rest = word;
            while charset.width(rest) > width {
                let head = charset.truncate(rest, width);
                if head.is_empty() {
                    break;
                }
                rest = &rest[head.len()..];
                lines.push(head);
            }
            current = rest.to_string();
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escpos::{CUT, GS, INIT, NV_LOGO};
    use crate::model::FiscalType;
    use chrono::NaiveDate;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn business() -> BusinessConfig {
        BusinessConfig {
            name: "Almacen Don Jose".to_string(),
            address: Some("Av. Siempreviva 742".to_string()),
            phone: Some("011 4444-5555".to_string()),
            email: Some("ventas@donjose.com.ar".to_string()),
            cuit: Some("20-12345678-9".to_string()),
            website: Some("donjose.com.ar".to_string()),
            logo: Some("logo.png".to_string()),
            slogan: Some("Calidad de barrio".to_string()),
            footer_message: Some("Gracias por su compra".to_string()),
        }
    }

    fn sale() -> SaleDocument {
        SaleDocument {
            id: 1234,
            receipt_number: None,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            cashier: Some("Marta".to_string()),
            customer_name: Some("Consumidor Final".to_string()),
            items: vec![
                SaleItem::new("Yerba 1kg", 1.0, 10.0),
                SaleItem::new("Azucar 1kg", 1.0, 10.0),
            ],
            discount: 0.0,
            tax_rate: 21.0,
            payment_method: Some("Efectivo".to_string()),
            amount_paid: Some(50.0),
            change: Some(30.0),
            cae: Some("74123456789012".to_string()),
            cae_expiry: NaiveDate::from_ymd_opt(2024, 3, 15),
        }
    }

    /// Every optional section enabled
    fn full_config() -> TicketConfig {
        TicketConfig {
            show_barcode: true,
            show_qr: true,
            include_cae: true,
            header_message: Some("Abierto de 8 a 20".to_string()),
            footer_message: Some("Vuelva pronto".to_string()),
            return_policy: Some("Cambios dentro de los 30 dias con ticket".to_string()),
            ..TicketConfig::default()
        }
    }

    fn section(sections: &[(Section, Vec<u8>)], which: Section) -> &[u8] {
        sections
            .iter()
            .find(|(s, _)| *s == which)
            .map(|(_, bytes)| bytes.as_slice())
            .unwrap()
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = TicketEncoder::default();
        let first = encoder.encode(&sale(), &business(), &full_config()).unwrap();
        let second = encoder.encode(&sale(), &business(), &full_config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let sections = TicketEncoder::default()
            .render_sections(&sale(), &business(), &full_config())
            .unwrap();

        assert_eq!(sections.first().map(|(s, _)| *s), Some(Section::Init));
        assert_eq!(sections.last().map(|(s, _)| *s), Some(Section::Cut));
        assert!(sections.iter().all(|(_, bytes)| !bytes.is_empty()));

        let encoded = TicketEncoder::default()
            .encode(&sale(), &business(), &full_config())
            .unwrap();
        assert!(encoded.as_bytes().starts_with(&INIT));
        assert!(encoded.as_bytes().ends_with(&CUT));
    }

    #[test]
    fn test_disabling_a_flag_removes_only_its_section() {
        type Toggle = fn(&mut TicketConfig);
        let cases: [(Toggle, Section); 11] = [
            (|c| c.show_logo = false, Section::Logo),
            (|c| c.show_business_info = false, Section::Business),
            (|c| c.show_cuit = false, Section::TaxId),
            (|c| c.show_cashier = false, Section::Cashier),
            (|c| c.show_customer = false, Section::Customer),
            (|c| c.show_tax_breakdown = false, Section::TaxBreakdown),
            (|c| c.include_cae = false, Section::Cae),
            (|c| c.show_payment_method = false, Section::Payment),
            (|c| c.show_change = false, Section::Change),
            (|c| c.show_barcode = false, Section::Barcode),
            (|c| c.show_qr = false, Section::Qr),
        ];

        let encoder = TicketEncoder::default();
        let full = encoder
            .render_sections(&sale(), &business(), &full_config())
            .unwrap();

        for (toggle, removed) in cases {
            let mut config = full_config();
            toggle(&mut config);
            let reduced = encoder
                .render_sections(&sale(), &business(), &config)
                .unwrap();

            assert_eq!(full.len(), reduced.len());
            for ((section, before), (_, after)) in full.iter().zip(&reduced) {
                if *section == removed {
                    assert!(!before.is_empty(), "{:?} should print when enabled", section);
                    assert!(after.is_empty(), "{:?} should be removed", section);
                } else {
                    assert_eq!(before, after, "{:?} changed when removing {:?}", section, removed);
                }
            }
        }
    }

    #[test]
    fn test_58mm_without_logo_totals_twenty() {
        let config = TicketConfig {
            paper_width: 58,
            show_logo: false,
            ..TicketConfig::default()
        };
        let mut sale = sale();
        sale.cae = None;

        let encoder = TicketEncoder::default();
        let bytes = encoder.encode(&sale, &business(), &config).unwrap().into_bytes();
        assert!(!contains(&bytes, &NV_LOGO));

        let sections = encoder.render_sections(&sale, &business(), &config).unwrap();
        let total = section(&sections, Section::Total);
        let expected = format!("TOTAL:{}$20.00\n", " ".repeat(32 - 6 - 6));
        assert!(contains(total, expected.as_bytes()));

        let items = section(&sections, Section::Items);
        let separator = format!("{}\n", "-".repeat(32));
        assert!(items.starts_with(&[GS, 0x21, 0x00]));
        assert!(contains(items, separator.as_bytes()));
        assert!(contains(items, b"  1 x $10.00"));
    }

    #[test]
    fn test_paper_width_changes_columns_only() {
        let encoder = TicketEncoder::default();
        let narrow = TicketConfig {
            paper_width: 58,
            ..TicketConfig::default()
        };
        let wide = TicketConfig::default();

        let narrow = encoder.render_sections(&sale(), &business(), &narrow).unwrap();
        let wide = encoder.render_sections(&sale(), &business(), &wide).unwrap();

        let narrow_items = String::from_utf8_lossy(section(&narrow, Section::Items)).to_string();
        let wide_items = String::from_utf8_lossy(section(&wide, Section::Items)).to_string();
        // Same content once separators and padding are ignored
        let squash = |s: &str| s.replace('-', "").split_whitespace().collect::<Vec<_>>().join(" ");
        assert_ne!(narrow_items, wide_items);
        assert_eq!(squash(&narrow_items), squash(&wide_items));
    }

    #[test]
    fn test_large_font_applies_to_header_and_total_only() {
        let config = TicketConfig {
            font_size: FontSize::Large,
            ..TicketConfig::default()
        };
        let sections = TicketEncoder::default()
            .render_sections(&sale(), &business(), &config)
            .unwrap();

        let double = [GS, 0x21, 0x11];
        assert!(contains(section(&sections, Section::Business), &double));
        assert!(contains(section(&sections, Section::Total), &double));
        assert!(!contains(section(&sections, Section::Items), &double));

        let expected = format!("TOTAL:{}$20.00\n", " ".repeat(24 - 6 - 6));
        assert!(contains(section(&sections, Section::Total), expected.as_bytes()));
    }

    #[test]
    fn test_small_font_selects_font_b() {
        let config = TicketConfig {
            font_size: FontSize::Small,
            ..TicketConfig::default()
        };
        let sections = TicketEncoder::default()
            .render_sections(&sale(), &business(), &config)
            .unwrap();
        assert!(contains(section(&sections, Section::Total), &[0x1B, 0x4D, 0x01]));
    }

    #[test]
    fn test_unprintable_characters_become_placeholder() {
        let mut sale = sale();
        sale.items[0].name = "Caf\u{e9} \u{2615}\u{1b}".to_string();

        let sections = TicketEncoder::default()
            .render_sections(&sale, &business(), &TicketConfig::default())
            .unwrap();
        let items = section(&sections, Section::Items);
        assert!(contains(items, &[b'C', b'a', b'f', 0xE9, b' ', b'?', b'?', b'\n']));
    }

    #[test]
    fn test_copies_repeat_ticket_body() {
        let config = TicketConfig {
            print_duplicate: true,
            copies_count: 3,
            ..TicketConfig::default()
        };
        let bytes = TicketEncoder::default()
            .encode(&sale(), &business(), &config)
            .unwrap()
            .into_bytes();

        assert_eq!(count(&bytes, &CUT), 3);
        assert_eq!(count(&bytes, &INIT), 1);

        let single = TicketEncoder::default()
            .encode(&sale(), &business(), &TicketConfig::default())
            .unwrap();
        assert_eq!(count(single.as_bytes(), &CUT), 1);
    }

    #[test]
    fn test_fiscal_title_and_tax_breakdown() {
        let config = TicketConfig {
            fiscal_type: FiscalType::FacturaB,
            ..TicketConfig::default()
        };
        let sections = TicketEncoder::default()
            .render_sections(&sale(), &business(), &config)
            .unwrap();

        assert!(contains(section(&sections, Section::SaleHeader), b"FACTURA B"));
        assert!(contains(section(&sections, Section::SaleHeader), b"05/03/2024 14:30"));
        assert!(contains(section(&sections, Section::SaleHeader), b"00001234"));
        let tax = section(&sections, Section::TaxBreakdown);
        assert!(contains(tax, b"IVA 21%:"));
        assert!(contains(tax, b"$16.53"));
        assert!(contains(tax, b"$3.47"));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let encoder = TicketEncoder::default();

        let mut empty = sale();
        empty.items.clear();
        assert!(matches!(
            encoder.encode(&empty, &business(), &TicketConfig::default()),
            Err(PrintError::EncodingInputInvalid(_))
        ));

        let bad_paper = TicketConfig {
            paper_width: 76,
            ..TicketConfig::default()
        };
        assert!(matches!(
            encoder.encode(&sale(), &business(), &bad_paper),
            Err(PrintError::EncodingInputInvalid(_))
        ));

        let nameless = BusinessConfig::default();
        assert!(matches!(
            encoder.encode(&sale(), &nameless, &TicketConfig::default()),
            Err(PrintError::EncodingInputInvalid(_))
        ));
    }

    #[test]
    fn test_oversized_amounts_are_rejected_not_zeroed() {
        let encoder = TicketEncoder::default();

        let mut overflowing = sale();
        overflowing.items = vec![SaleItem::new("Yerba 1kg", 1e15, 1e15)];
        assert!(matches!(
            encoder.encode(&overflowing, &business(), &TicketConfig::default()),
            Err(PrintError::EncodingInputInvalid(_))
        ));

        let mut unrepresentable = sale();
        unrepresentable.items = vec![SaleItem::new("Yerba 1kg", 1.0, 1e30)];
        assert!(matches!(
            encoder.encode(&unrepresentable, &business(), &TicketConfig::default()),
            Err(PrintError::EncodingInputInvalid(_))
        ));
    }

    #[test]
    fn test_base64_matches_bytes() {
        let ticket = TicketEncoder::default()
            .encode(&sale(), &business(), &TicketConfig::default())
            .unwrap();
        let decoded = STANDARD.decode(ticket.to_base64()).unwrap();
        assert_eq!(decoded, ticket.as_bytes());
    }

    #[test]
    fn test_test_ticket() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let ticket = TicketEncoder::default().test_ticket(PaperWidth::Mm58, at);

        assert!(ticket.as_bytes().starts_with(&INIT));
        assert!(ticket.as_bytes().ends_with(&CUT));
        assert!(contains(ticket.as_bytes(), b"PRUEBA"));
        assert!(contains(ticket.as_bytes(), b"02/01/2024 09:05"));
    }

    #[test]
    fn test_wrap() {
        let lines = wrap(Charset::Wpc1252, "Cambios dentro de los 30 dias", 12);
        assert_eq!(lines, vec!["Cambios", "dentro de", "los 30 dias"]);

        let lines = wrap(Charset::Wpc1252, "ABCDEFGHIJ", 4);
        assert_eq!(lines, vec!["ABCD", "EFGH", "IJ"]);

        assert!(wrap(Charset::Wpc1252, "  \n ", 10).is_empty());
    }
}
