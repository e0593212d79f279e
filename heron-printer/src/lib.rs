//! # heron-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building (text styling, barcodes, paper cut)
//! - GBK encoding for mixed-language receipt text
//! - Raw network transport (TCP port 9100)
//!
//! Business logic (WHAT to print) stays in application code:
//! - Receipt/label rendering and job orchestration → heron-spool
//!
//! ## Example
//!
//! ```ignore
//! use heron_printer::{EscPosBuilder, TcpTransport, Transport};
//!
//! // Build ESC/POS content
//! let mut builder = EscPosBuilder::new(48);
//! builder.center();
//! builder.double_size();
//! builder.line("RECEIPT");
//! builder.reset_size();
//! builder.left();
//! builder.line("1x Americano");
//! builder.cut();
//!
//! // Send to a network printer
//! let transport = TcpTransport::default();
//! transport.send("192.168.1.100", 9100, &builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod transport;

// Re-exports
pub use encoding::{convert_to_gbk, gbk_width};
pub use error::{PrintError, PrintResult};
pub use escpos::EscPosBuilder;
pub use transport::{TcpTransport, Transport};
