//! Printer pool and print request types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standard raw-socket printing port
pub const DEFAULT_PRINTER_PORT: u16 = 9100;

fn default_port() -> u16 {
    DEFAULT_PRINTER_PORT
}

fn default_true() -> bool {
    true
}

fn default_copies() -> u32 {
    1
}

/// A configured physical printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterTarget {
    /// Stable identifier, unique within the pool
    pub id: String,
    /// Operator-facing label
    pub name: String,
    /// Network host (IP or hostname); targets with an empty address are
    /// never selected for jobs
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Capability tag used to match jobs to printers (e.g. "ethernet")
    pub class: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// One product label to print
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub upc: String,
    pub unit_price: Decimal,
    #[serde(default = "default_copies")]
    pub copies: u32,
}

/// Structured payload of a print request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrintContent {
    /// Free-form receipt text with inline per-line markers:
    /// leading `[C]` center, `[R]` right, `[B]` bold; a line that is
    /// exactly `[-]` or `[=]` prints a separator; a tab splits a line
    /// into left/right columns.
    Receipt { text: String },
    /// Product labels, one encoded block per label per copy
    Labels { labels: Vec<LabelSpec> },
}

/// A logical unit of print work, immutable once submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRequest {
    /// Which capability class of printer should receive this
    pub target_class: String,
    pub content: PrintContent,
}
