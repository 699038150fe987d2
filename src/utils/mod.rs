//! Supporting utilities
//!
//! Arrow helpers, file I/O, logging, JSON serialization, folder metadata and
//! filesystem path handling, plus helpers for comparing frames in tests.

pub mod arrow;
pub mod foldermeta;
pub mod io;
pub mod json;
pub mod logging;
pub mod paths;
pub mod test;
