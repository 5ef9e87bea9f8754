//! Confirmation prompts with non-interactive fallback

use super::context::UiContext;
use crate::error::{CompkitError, CompkitResult};

/// Ask a yes/no question.
///
/// Auto-yes answers `true`; without a terminal the default is returned.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> CompkitResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| CompkitError::Internal(format!("prompt task failed: {}", e)))?
    .map_err(|e| CompkitError::User(format!("Prompt failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_yes_confirms() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Clear cache?", false).await.unwrap());
    }

    #[tokio::test]
    async fn non_interactive_uses_default() {
        let ctx = UiContext::non_interactive();
        assert!(confirm(&ctx, "Clear cache?", true).await.unwrap());
        assert!(!confirm(&ctx, "Clear cache?", false).await.unwrap());
    }
}
