//! Logging, console output and progress tracking
//!
//! [`Log`] is the named logging context with console and rotating file
//! handlers; the free functions log operations through the `log` facade.

pub mod console;
pub mod handlers;
pub mod log;
pub mod progress;

pub use console::{format_head, print_frame_summary, print_schema_info};
pub use handlers::{HandlerKind, Level, Log, RotateWhen};
pub use log::{init, log_operation_complete, log_operation_start, log_warning};
pub use progress::{create_main_progress_bar, finish_progress_bar};
