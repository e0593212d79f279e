//! Print spooling for the point-of-sale client
//!
//! This crate turns logical print requests into delivered paper:
//! - Printer pool registry: configured printer targets, persisted in redb
//!   and cached in memory
//! - Request rendering: receipts and product labels to ESC/POS bytes
//! - Print job queue: fan-out to every matching printer, per-target result
//!   aggregation, and status notifications for subscribers
//!
//! Low-level command building and the socket transport live in
//! `heron-printer`.

pub mod queue;
pub mod registry;
pub mod render;
pub mod storage;
pub mod types;

pub use queue::{JobStatus, PrintJob, PrintQueue, Subscription, TargetResult};
pub use registry::{PrinterRegistry, RegistryError, RegistryResult};
pub use render::{EncodeWarning, EncodedRequest, render_request};
pub use storage::{PoolStorage, PoolStorageError, PoolStorageResult};
pub use types::{LabelSpec, PrintContent, PrintRequest, PrinterTarget};
