//! Encoder inputs
//!
//! Business and ticket configuration records plus the sale document, as
//! supplied by the store. Amounts are `f64` on the wire and are converted
//! to `Decimal` for every calculation.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PrintError, PrintResult};
use crate::escpos::PaperWidth;

/// Money precision (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Largest unit price accepted on a sale line
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Largest quantity accepted on a sale line
pub const MAX_QUANTITY: f64 = 9_999.0;
/// Largest line total, discount, payment or change amount
pub const MAX_AMOUNT: f64 = MAX_PRICE * MAX_QUANTITY;

/// Allowed range of `copies_count`
pub const MAX_COPIES: u32 = 10;

/// Text size applied to the header and totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Normal,
    Large,
}

/// Fiscal document type printed as the ticket title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FiscalType {
    #[default]
    Ticket,
    FacturaA,
    FacturaB,
    FacturaC,
}

impl FiscalType {
    pub fn title(self) -> &'static str {
        match self {
            FiscalType::Ticket => "TICKET",
            FiscalType::FacturaA => "FACTURA A",
            FiscalType::FacturaB => "FACTURA B",
            FiscalType::FacturaC => "FACTURA C",
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_paper_width() -> u16 {
    80
}

fn default_copies() -> u32 {
    1
}

/// Ticket layout and printing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketConfig {
    #[serde(default = "default_true")]
    pub enable_print: bool,
    #[serde(default)]
    pub auto_print: bool,
    /// Last printer connected to; used for auto-connect at startup
    #[serde(default)]
    pub printer_name: Option<String>,
    #[serde(default = "default_paper_width")]
    pub paper_width: u16,
    #[serde(default = "default_true")]
    pub show_logo: bool,
    #[serde(default = "default_true")]
    pub show_business_info: bool,
    #[serde(default = "default_true")]
    pub show_cuit: bool,
    #[serde(default)]
    pub show_barcode: bool,
    #[serde(default)]
    pub show_qr: bool,
    #[serde(default)]
    pub font_size: FontSize,
    #[serde(default)]
    pub print_duplicate: bool,
    #[serde(default = "default_copies")]
    pub copies_count: u32,
    #[serde(default)]
    pub header_message: Option<String>,
    #[serde(default)]
    pub footer_message: Option<String>,
    #[serde(default)]
    pub return_policy: Option<String>,
    #[serde(default = "default_true")]
    pub show_cashier: bool,
    #[serde(default = "default_true")]
    pub show_customer: bool,
    #[serde(default = "default_true")]
    pub show_payment_method: bool,
    #[serde(default = "default_true")]
    pub show_change: bool,
    #[serde(default)]
    pub fiscal_type: FiscalType,
    #[serde(default = "default_true")]
    pub show_tax_breakdown: bool,
    #[serde(default)]
    pub include_cae: bool,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            enable_print: true,
            auto_print: false,
            printer_name: None,
            paper_width: default_paper_width(),
            show_logo: true,
            show_business_info: true,
            show_cuit: true,
            show_barcode: false,
            show_qr: false,
            font_size: FontSize::Normal,
            print_duplicate: false,
            copies_count: default_copies(),
            header_message: None,
            footer_message: None,
            return_policy: None,
            show_cashier: true,
            show_customer: true,
            show_payment_method: true,
            show_change: true,
            fiscal_type: FiscalType::Ticket,
            show_tax_breakdown: true,
            include_cae: false,
        }
    }
}

impl TicketConfig {
    pub fn paper(&self) -> PrintResult<PaperWidth> {
        PaperWidth::try_from(self.paper_width).map_err(PrintError::InvalidConfig)
    }

    /// Number of ticket copies to print
    pub fn copies(&self) -> u32 {
        if self.print_duplicate {
            self.copies_count
        } else {
            1
        }
    }

    pub fn validate(&self) -> PrintResult<()> {
        self.paper()?;
        if !(1..=MAX_COPIES).contains(&self.copies_count) {
            return Err(PrintError::InvalidConfig(format!(
                "copies_count must be between 1 and {}, got {}",
                MAX_COPIES, self.copies_count
            )));
        }
        Ok(())
    }
}

/// Business identity printed in the ticket header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessConfig {
    #[serde(rename = "business_name")]
    pub name: String,
    #[serde(rename = "business_address", default)]
    pub address: Option<String>,
    #[serde(rename = "business_phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "business_email", default)]
    pub email: Option<String>,
    /// Tax id
    #[serde(rename = "business_cuit", default)]
    pub cuit: Option<String>,
    #[serde(rename = "business_website", default)]
    pub website: Option<String>,
    /// Logo reference; the printer prints its stored NV image
    #[serde(rename = "business_logo", default)]
    pub logo: Option<String>,
    #[serde(rename = "business_slogan", default)]
    pub slogan: Option<String>,
    #[serde(rename = "business_footer_message", default)]
    pub footer_message: Option<String>,
}

impl BusinessConfig {
    pub fn validate(&self) -> PrintResult<()> {
        if self.name.trim().is_empty() {
            return Err(PrintError::InvalidConfig(
                "business_name is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// One sold line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Stored line total; computed from quantity and price when absent
    #[serde(default)]
    pub line_total: Option<f64>,
}

impl SaleItem {
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            line_total: None,
        }
    }

    pub fn total(&self) -> PrintResult<Decimal> {
        let total = match self.line_total {
            Some(total) => to_decimal(total, "line_total")?,
            None => to_decimal(self.quantity, "quantity")?
                .checked_mul(to_decimal(self.unit_price, "unit_price")?)
                .ok_or_else(|| overflow(&self.name))?,
        };
        Ok(round_money(total))
    }
}

fn default_tax_rate() -> f64 {
    21.0
}

/// A completed sale as read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDocument {
    pub id: i64,
    #[serde(default)]
    pub receipt_number: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub cashier: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub items: Vec<SaleItem>,
    #[serde(default)]
    pub discount: f64,
    /// VAT percentage included in the prices
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub amount_paid: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    /// Electronic authorization code of a fiscal invoice
    #[serde(default)]
    pub cae: Option<String>,
    #[serde(default)]
    pub cae_expiry: Option<NaiveDate>,
}

/// Computed amounts of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    /// Total without VAT
    pub net: Decimal,
    pub tax: Decimal,
}

impl SaleDocument {
    /// Printed sale reference: the receipt number, or the zero-padded id
    pub fn reference(&self) -> String {
        match &self.receipt_number {
            Some(number) if !number.trim().is_empty() => number.trim().to_string(),
            _ => format!("{:08}", self.id),
        }
    }

    /// Reject sales that cannot be rendered
    pub fn validate(&self) -> PrintResult<()> {
        if self.items.is_empty() {
            return Err(PrintError::invalid_input("sale has no items"));
        }

        for (i, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(PrintError::invalid_input(format!("item {} has no name", i)));
            }
            require_amount(item.quantity, "quantity", MAX_QUANTITY)?;
            require_amount(item.unit_price, "unit_price", MAX_PRICE)?;
            if item.quantity == 0.0 {
                return Err(PrintError::invalid_input(format!(
                    "item '{}' has zero quantity",
                    item.name
                )));
            }
            if let Some(total) = item.line_total {
                require_amount(total, "line_total", MAX_AMOUNT)?;
            }
        }

        require_amount(self.discount, "discount", MAX_AMOUNT)?;
        if !(0.0..=100.0).contains(&self.tax_rate) {
            return Err(PrintError::invalid_input(format!(
                "tax_rate must be between 0 and 100, got {}",
                self.tax_rate
            )));
        }
        for (value, field) in [(self.amount_paid, "amount_paid"), (self.change, "change")] {
            if let Some(v) = value {
                require_amount(v, field, MAX_AMOUNT)?;
            }
        }

        let subtotal = self.subtotal()?;
        let discount = round_money(to_decimal(self.discount, "discount")?);
        if discount > subtotal {
            return Err(PrintError::invalid_input(format!(
                "discount {} exceeds subtotal {}",
                discount, subtotal
            )));
        }
        Ok(())
    }

    /// Subtotal from line totals, minus discount; VAT is included in prices
    pub fn totals(&self) -> PrintResult<SaleTotals> {
        let subtotal = self.subtotal()?;
        let discount = round_money(to_decimal(self.discount, "discount")?);
        let total = subtotal
            .checked_sub(discount)
            .ok_or_else(|| overflow("total"))?;

        let rate = to_decimal(self.tax_rate, "tax_rate")? / Decimal::ONE_HUNDRED;
        let net = round_money(total / (Decimal::ONE + rate));

        Ok(SaleTotals {
            subtotal,
            discount,
            total,
            net,
            tax: total - net,
        })
    }

    pub fn change_due(&self) -> PrintResult<Option<Decimal>> {
        self.change
            .map(|c| to_decimal(c, "change").map(round_money))
            .transpose()
    }

    fn subtotal(&self) -> PrintResult<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, item| {
            sum.checked_add(item.total()?)
                .ok_or_else(|| overflow("subtotal"))
        })
    }
}

fn require_amount(value: f64, field: &str, max: f64) -> PrintResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PrintError::invalid_input(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    if value > max {
        return Err(PrintError::invalid_input(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, max, value
        )));
    }
    Ok(())
}

fn overflow(what: &str) -> PrintError {
    PrintError::invalid_input(format!("amount overflow in {}", what))
}

/// Convert a wire amount, rejecting values `Decimal` cannot hold
#[inline]
pub(crate) fn to_decimal(value: f64, field: &str) -> PrintResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| {
        PrintError::invalid_input(format!("{} is not a representable amount: {}", field, value))
    })
}

#[inline]
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `$1234.50`
pub fn format_money(value: Decimal) -> String {
    format!("${:.2}", round_money(value))
}
