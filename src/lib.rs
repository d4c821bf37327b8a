//! Strict text-encoding checks for files.
//!
//! [`validate`] reads a file, decodes it under one encoding without
//! replacement, and returns a [`Validation`]: valid, invalid at a byte offset
//! with the surrounding bytes, or an I/O failure.

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::report::{write_report, OutputFormat};
pub use crate::core::validator::{validate, DecodeFailure, EncodingValidator, Validation};
pub use crate::error::{CheckError, Result};
pub use crate::utils::encoding::Charset;
