//! User-facing output.
//!
//! - `formatter` - pure formatting of a [`VersionResult`](crate::domain::VersionResult)
//! - this module - styled status lines on stderr

use console::style;

pub mod formatter;

pub use formatter::{format_json, format_text, format_variable};

/// Print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a warning with a yellow marker.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}
