//! Script text handling: comment stripping, bracket-aware tokenizing, and
//! conversion of bracketed argument fragments into typed values.

pub mod args;
pub mod canonical;

pub use canonical::{canonicalize, tokenize, Canonical};
