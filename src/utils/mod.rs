//! Utility modules for encoding lookup and raw file reads.

pub mod encoding;
