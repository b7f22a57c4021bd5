//! Filesystem and spreadsheet adapters used by the sweep engine.

pub mod excel_read;
pub mod excel_write;
pub mod relocate;
