use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("translation from {source_language} to {target_language} failed: {message}")]
pub struct TranslateError {
    pub source_language: String,
    pub target_language: String,
    pub message: String,
}

impl TranslateError {
    pub fn name(&self) -> &'static str {
        "TranslateError"
    }
}

pub trait Translator {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslateError>;
}

/// Amazon Translate backed [`Translator`].
pub struct AwsTranslator {
    client: aws_sdk_translate::Client,
}

impl AwsTranslator {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_translate::Client::new(config),
        }
    }
}

impl Translator for AwsTranslator {
    fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslateError> {
        let request = self
            .client
            .translate_text()
            .text(text)
            .source_language_code(source_language)
            .target_language_code(target_language);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                request
                    .send()
                    .await
                    .map(|output| output.translated_text)
                    .map_err(|error| TranslateError {
                        source_language: source_language.to_string(),
                        target_language: target_language.to_string(),
                        message: aws_sdk_translate::error::DisplayErrorContext(&error).to_string(),
                    })
            })
        })
    }
}
