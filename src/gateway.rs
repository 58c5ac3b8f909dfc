//! Translation gateway: prompt construction on top of a text generator.
//!
//! The generator is an opaque capability (prompt in, text out). The gateway
//! knows the two prompt shapes the pipeline needs and maps generator failures
//! into [`PipelineError::Generation`]. Calls are single-shot: no retry, no
//! timeout, and the error is passed on as-is.

use crate::error::{PipelineError, PipelineResult};
use crate::i18n::LanguageConfig;
use async_trait::async_trait;

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        (**self).generate(prompt).await
    }
}

/// Build the prompt for translating a chunk of Markdown body text
fn build_body_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text into {lang}, maintain the original markdown format.\n\n{text}\n\n\nTranslated into {lang}:",
        lang = target_language,
        text = text
    )
}

/// Build the prompt for translating a single front matter key
fn build_header_prompt(block: &str, target_language: &str, key: &str) -> String {
    format!(
        "Suppose the following text is a JSON format. The value of the key for ```{key}``` translates into {lang} and other key are not changed. maintain the original markdown format.\n\n\n{block}\n\n\nTranslated into {lang}:",
        key = key,
        lang = target_language,
        block = block
    )
}

pub struct TranslationGateway<G> {
    generator: G,
}

impl<G: TextGenerator> TranslationGateway<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Free-form translation of one body chunk, keeping Markdown structure.
    pub async fn translate_body(
        &self,
        text: &str,
        language: &LanguageConfig,
    ) -> PipelineResult<String> {
        self.call(&build_body_prompt(text, language.name), language)
            .await
    }

    /// Constrained translation of a front matter block: only `key`'s value
    /// is meant to change.
    pub async fn translate_header(
        &self,
        block: &str,
        language: &LanguageConfig,
        key: &str,
    ) -> PipelineResult<String> {
        self.call(&build_header_prompt(block, language.name, key), language)
            .await
    }

    async fn call(&self, prompt: &str, language: &LanguageConfig) -> PipelineResult<String> {
        self.generator
            .generate(prompt)
            .await
            .map_err(|source| PipelineError::Generation {
                language: language.name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::i18n::{LanguageConfig, ARABIC_STRINGS};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Generator that replays canned responses and records every prompt.
    /// With no responses left it fails, like an exhausted quota.
    pub(crate) struct ScriptedGenerator {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(responses: Vec<String>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted response left"))
        }
    }

    fn arabic() -> LanguageConfig {
        LanguageConfig::new("ar", "Arabic", "out/ar", &ARABIC_STRINGS)
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_build_body_prompt() {
        let prompt = build_body_prompt("# Hello\n\nWorld", "Arabic");

        assert!(prompt.starts_with("Translate the following text into Arabic"));
        assert!(prompt.contains("maintain the original markdown format"));
        assert!(prompt.contains("\n\n# Hello\n\nWorld\n\n\n"));
        assert!(prompt.ends_with("Translated into Arabic:"));
    }

    #[test]
    fn test_build_header_prompt_names_key() {
        let prompt = build_header_prompt("title: Hi\ndraft: true", "Spanish", "title");

        assert!(prompt.contains("```title```"));
        assert!(prompt.contains("translates into Spanish"));
        assert!(prompt.contains("other key are not changed"));
        assert!(prompt.contains("title: Hi\ndraft: true"));
        assert!(prompt.ends_with("Translated into Spanish:"));
    }

    // ==================== Gateway Tests ====================

    #[tokio::test]
    async fn test_translate_body_returns_generated_text() {
        let gateway = TranslationGateway::new(ScriptedGenerator::new(vec!["مرحبا".to_string()]));

        let result = gateway
            .translate_body("Hello", &arabic())
            .await
            .expect("Should succeed");

        assert_eq!(result, "مرحبا");
        assert_eq!(gateway.generator().prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_generator_failure_is_passed_on() {
        let gateway = TranslationGateway::new(ScriptedGenerator::new(vec![]));

        let result = gateway.translate_body("Hello", &arabic()).await;

        match result {
            Err(PipelineError::Generation { language, source }) => {
                assert_eq!(language, "Arabic");
                assert!(source.to_string().contains("no scripted response"));
            }
            other => panic!("expected generation error, got {:?}", other),
        }
        // One attempt only
        assert_eq!(gateway.generator().prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_boxed_generator() {
        let boxed: Box<dyn TextGenerator> =
            Box::new(ScriptedGenerator::new(vec!["ok".to_string()]));
        let gateway = TranslationGateway::new(boxed);

        let result = gateway.translate_header("title: x", &arabic(), "title").await;

        assert_eq!(result.expect("Should succeed"), "ok");
    }
}
