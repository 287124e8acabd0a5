//! Core logic for Aspire takeoff automation.
//!
//! This crate holds the pieces that are independent of any live browser:
//! the row/record data model, the tree-table extraction pass that flattens
//! Aspire's nested service-item table, the fill pass that writes takeoff
//! values back through a [`FillTarget`], and CSV persistence for both.

pub mod error;
pub mod extract;
pub mod fill;
pub mod model;
pub mod store;

pub use error::CoreError;
pub use extract::extract_service_items;
pub use fill::{CommitKey, FieldFiller, FieldRef, FillReport, FillTarget};
pub use model::{indent_from_style, FillInstruction, ServiceItemRecord, TableRow};
pub use store::{read_fill_instructions, write_service_items};
