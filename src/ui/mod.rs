//! Terminal output
//!
//! Uses `cliclack` for prompts and status lines and `indicatif` for the
//! install progress bar. Outside an interactive terminal (pipes, CI) every
//! helper degrades to plain `[OK]`/`[WARN]`/`[FAIL]` lines.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro, remark, step_error_detail, step_info, step_ok, step_warn,
    step_warn_hint,
};
pub use progress::{InstallProgress, TaskSpinner};
pub use prompts::confirm;
