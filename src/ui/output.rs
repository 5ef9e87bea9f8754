//! Status lines with a plain fallback for CI

use super::context::UiContext;
use console::style;

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Info,
    Warn,
    Error,
}

impl Level {
    fn tag(self) -> String {
        match self {
            Self::Ok => style("[OK]").green().to_string(),
            Self::Info => style("[INFO]").cyan().to_string(),
            Self::Warn => style("[WARN]").yellow().to_string(),
            Self::Error => style("[FAIL]").red().to_string(),
        }
    }
}

fn step(ctx: &UiContext, level: Level, message: &str) {
    if ctx.is_interactive() {
        let _ = match level {
            Level::Ok => cliclack::log::success(message),
            Level::Info => cliclack::log::info(message),
            Level::Warn => cliclack::log::warning(message),
            Level::Error => cliclack::log::error(message),
        };
    } else {
        println!("  {} {}", level.tag(), message);
    }
}

/// Heading for a command's output
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.is_interactive() {
        let _ = cliclack::intro(style(title).cyan().bold());
    } else {
        println!("{}", style(title).cyan().bold());
    }
}

/// Closing line; styled by whether the command fully succeeded
pub fn outro(ctx: &UiContext, message: &str, success: bool) {
    let styled = if success {
        style(message).green().bold()
    } else {
        style(message).yellow().bold()
    };
    if ctx.is_interactive() {
        let _ = cliclack::outro(styled);
    } else {
        println!("{}", styled);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message);
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Level::Info, message);
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Level::Warn, message);
}

/// Warning followed by a dimmed suggestion
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    step(ctx, Level::Warn, &format!("{} - {}", message, style(hint).dim()));
}

/// Failure with the error that caused it
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    step(ctx, Level::Error, &format!("{}: {}", message, detail));
}

/// Dimmed follow-up line
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.is_interactive() {
        let _ = cliclack::log::remark(message);
    } else {
        println!("  {}", style(message).dim());
    }
}

/// Aligned `key: value` line
pub fn key_value(key: &str, value: &str) {
    println!("  {:<18} {}", style(format!("{}:", key)).dim(), value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_does_not_panic() {
        let ctx = UiContext::non_interactive();
        intro(&ctx, "compkit add");
        step_ok(&ctx, "button");
        step_warn_hint(&ctx, "card skipped", "Re-run with --overwrite");
        step_error_detail(&ctx, "table", "File already exists");
        remark(&ctx, "2 files");
        key_value("root", "/tmp/app");
        outro(&ctx, "Done", true);
    }
}
