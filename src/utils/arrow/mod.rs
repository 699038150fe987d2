//! Arrow utilities
//!
//! Helpers shared by the time, frame and I/O modules for working with
//! Arrow arrays and record batches.

pub mod array_utils;
pub mod conversion;

pub use array_utils::{build_batch, downcast_array, is_numeric, is_temporal, take_optional};
pub use conversion::{array_to_f64, array_to_strings, missing_mask};
