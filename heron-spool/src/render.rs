//! Request rendering: receipts and labels to ESC/POS bytes
//!
//! Pure translation, no state and no I/O. A request is encoded once per
//! submission and the same payload is fanned out to every target printer.

use crate::types::{LabelSpec, PrintContent};
use heron_printer::EscPosBuilder;
use serde::{Deserialize, Serialize};

/// Label paper width in characters (58mm stock)
const LABEL_WIDTH: usize = 32;

/// Character budget for the product name line
const NAME_BUDGET: usize = 30;

/// Fixed barcode geometry
const BARCODE_MODULE_WIDTH: u8 = 2;
const BARCODE_HEIGHT: u8 = 80;

/// Non-fatal conditions found while encoding a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodeWarning {
    /// A label descriptor carried neither UPC nor SKU, so no barcode (and
    /// no block) could be produced for it
    MissingBarcode { index: usize, name: String },
}

/// Result of encoding one request
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub payload: Vec<u8>,
    pub warnings: Vec<EncodeWarning>,
}

/// Encode a request payload into an ESC/POS byte stream
pub fn render_request(content: &PrintContent, receipt_width: usize) -> EncodedRequest {
    match content {
        PrintContent::Receipt { text } => EncodedRequest {
            payload: render_receipt(text, receipt_width),
            warnings: Vec::new(),
        },
        PrintContent::Labels { labels } => render_labels(labels),
    }
}

/// Render marked-up receipt text
///
/// Alignment and emphasis reset after every line, so a marker only ever
/// affects the line it starts.
fn render_receipt(text: &str, width: usize) -> Vec<u8> {
    let mut b = EscPosBuilder::new(width);

    for line in text.lines() {
        match line {
            "[-]" => {
                b.sep_single();
                continue;
            }
            "[=]" => {
                b.sep_double();
                continue;
            }
            _ => {}
        }

        let (centered, right, bold, rest) = parse_markers(line);

        if centered {
            b.center();
        } else if right {
            b.right();
        }
        if bold {
            b.bold();
        }

        // A tab splits the line into left/right columns (item vs. price)
        if let Some((left_text, right_text)) = rest.split_once('\t') {
            b.line_lr(left_text, right_text);
        } else {
            b.line(rest);
        }

        if bold {
            b.bold_off();
        }
        if centered || right {
            b.left();
        }
    }

    b.cut_feed(3);
    b.build()
}

/// Strip leading style markers from a line
fn parse_markers(line: &str) -> (bool, bool, bool, &str) {
    let mut centered = false;
    let mut right = false;
    let mut bold = false;
    let mut rest = line;

    loop {
        if let Some(r) = rest.strip_prefix("[C]") {
            centered = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("[R]") {
            right = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("[B]") {
            bold = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("[L]") {
            // Left is the default; accepted so callers can be explicit
            rest = r;
        } else {
            break;
        }
    }

    (centered, right, bold, rest)
}

/// Render label descriptors, one block per label per copy, request order
fn render_labels(labels: &[LabelSpec]) -> EncodedRequest {
    let mut payload = Vec::new();
    let mut warnings = Vec::new();

    for (index, label) in labels.iter().enumerate() {
        let barcode_data = if !label.upc.is_empty() {
            label.upc.as_str()
        } else if !label.sku.is_empty() {
            label.sku.as_str()
        } else {
            warnings.push(EncodeWarning::MissingBarcode {
                index,
                name: label.name.clone(),
            });
            continue;
        };

        let block = render_label_block(label, barcode_data);
        for _ in 0..label.copies {
            payload.extend_from_slice(&block);
        }
    }

    EncodedRequest { payload, warnings }
}

fn render_label_block(label: &LabelSpec, barcode_data: &str) -> Vec<u8> {
    // new() emits the printer reset (ESC @) that opens every block
    let mut b = EscPosBuilder::new(LABEL_WIDTH);

    b.center();
    b.bold().double_size();
    b.line(&truncate_name(&label.name));
    b.reset_size().bold_off();

    if !label.sku.is_empty() {
        b.line(&label.sku);
    }

    b.bold();
    b.line(&format!("{} €", label.unit_price.round_dp(2)));
    b.bold_off();

    b.newline();
    b.barcode(barcode_data, BARCODE_MODULE_WIDTH, BARCODE_HEIGHT);
    b.feed(2);
    b.cut();

    b.build()
}

/// Truncate a product name to the label budget, marking the cut with ".."
fn truncate_name(name: &str) -> String {
    if name.chars().count() <= NAME_BUDGET {
        return name.to_string();
    }
    let mut out: String = name.chars().take(NAME_BUDGET - 2).collect();
    out.push_str("..");
    out
}
