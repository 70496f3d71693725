//! UI module for consistent CLI output
//!
//! Uses `cliclack` for interactive prompts with automatic fallback to plain
//! output in CI/non-interactive environments.

mod context;
mod output;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, note, outro_success, outro_warn, section, step_error, step_info, step_ok,
    step_ok_detail, step_warn, step_warn_hint,
};
pub use prompts::{confirm, field, input, multi_select, select};
