//! Terminal output for command headers, status lines and summaries.

mod headers;
mod output;
mod status;

pub use headers::print_command_header;
pub use output::{format_duration, print_key_value, print_summary_box};
pub use status::{print_error, print_success};
