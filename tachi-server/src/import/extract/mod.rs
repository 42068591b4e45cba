//! Per-format field extraction
//!
//! Each submodule turns one source format's raw payload into intermediate
//! score records plus the import context, folding the batch version as it
//! goes.

pub mod arc_api;
pub mod eamusement_csv;
pub mod fervidex;
