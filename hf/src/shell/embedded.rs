//! Embedded shell
//!
//! Compiled into the binary from templates/shell.hbs.

/// Default HTML5 document skeleton
pub const SHELL: &str = include_str!("../../templates/shell.hbs");
