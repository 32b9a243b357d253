//! Command implementations.
//!
//! esm-cycles has a single command, [`check`], run for every invocation.

pub mod check;
pub(crate) mod utils;

pub use check::{CheckOutcome, Report, execute as check_execute};
