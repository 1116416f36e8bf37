//! One-shot interactive artifact generation
//!
//! Unlike the streamed explainer path, artifacts are produced in a single
//! non-streaming call and returned whole. Models often wrap the document in
//! a fenced code block, so the first fence is extracted when present.

use crate::error::{Result, ScenegenError};
use crate::prompts;
use crate::providers::TextGenerator;
use std::sync::Arc;

/// Generate a self-contained interactive HTML document
///
/// Builds the artifact prompt, runs one non-streaming generation, and
/// returns the extracted document.
///
/// # Errors
///
/// Returns `ScenegenError::Provider` on call failure and
/// `ScenegenError::EmptyResult` when extraction yields nothing.
pub async fn generate_artifact(
    generator: Arc<dyn TextGenerator>,
    request: &str,
) -> Result<String> {
    let prompt = prompts::build_artifact_prompt(request);
    let raw = generator.generate(&prompt).await?;

    let html = match extract_fenced_block(&raw) {
        Some(block) => block,
        None => raw.trim().to_string(),
    };
    if html.is_empty() {
        return Err(ScenegenError::EmptyResult.into());
    }
    tracing::debug!("Generated artifact of {} chars", html.len());
    Ok(html)
}

/// Extract the contents of the first fenced code block
///
/// The opening fence may carry a language tag (```html). Returns `None`
/// when the text has no complete fence pair.
pub fn extract_fenced_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip the language tag, if any, up to the end of the opening line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::prompts::GenerationMode;
    use crate::providers::FragmentStream;
    use crate::session::ChatMessage;
    use async_trait::async_trait;

    struct FixedGenerator {
        reply: std::result::Result<String, String>,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn stream(
            &self,
            _mode: GenerationMode,
            _topic: &str,
            _history: &[ChatMessage],
        ) -> Result<FragmentStream> {
            Err(ScenegenError::Provider("not used".to_string()).into())
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(ScenegenError::Provider(msg.clone()).into()),
            }
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn replying(text: &str) -> Arc<dyn TextGenerator> {
        Arc::new(FixedGenerator {
            reply: Ok(text.to_string()),
        })
    }

    #[test]
    fn test_extract_fence_with_language_tag() {
        let text = "Here you go:\n```html\n<html></html>\n```\nEnjoy!";
        assert_eq!(extract_fenced_block(text).unwrap(), "<html></html>");
    }

    #[test]
    fn test_extract_fence_without_language_tag() {
        let text = "```\n<div></div>\n```";
        assert_eq!(extract_fenced_block(text).unwrap(), "<div></div>");
    }

    #[test]
    fn test_extract_first_of_multiple_fences() {
        let text = "```html\nfirst\n```\nthen\n```html\nsecond\n```";
        assert_eq!(extract_fenced_block(text).unwrap(), "first");
    }

    #[test]
    fn test_extract_unclosed_fence_is_none() {
        assert!(extract_fenced_block("```html\n<html>").is_none());
        assert!(extract_fenced_block("no fences at all").is_none());
    }

    #[tokio::test]
    async fn test_artifact_unwraps_fenced_reply() {
        let generator = replying("Sure!\n```html\n<html>model</html>\n```");
        let html = generate_artifact(generator, "a pendulum").await.unwrap();
        assert_eq!(html, "<html>model</html>");
    }

    #[tokio::test]
    async fn test_artifact_accepts_bare_reply() {
        let generator = replying("  <html>bare</html>  ");
        let html = generate_artifact(generator, "a pendulum").await.unwrap();
        assert_eq!(html, "<html>bare</html>");
    }

    #[tokio::test]
    async fn test_artifact_empty_fence_is_empty_result() {
        let generator = replying("```html\n\n```");
        let err = generate_artifact(generator, "a pendulum").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScenegenError>(),
            Some(ScenegenError::EmptyResult)
        ));
    }

    #[tokio::test]
    async fn test_artifact_provider_failure_propagates() {
        let generator: Arc<dyn TextGenerator> = Arc::new(FixedGenerator {
            reply: Err("overloaded".to_string()),
        });
        let err = generate_artifact(generator, "a pendulum").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScenegenError>(),
            Some(ScenegenError::Provider(_))
        ));
    }
}
