use serde::Deserialize;

use crate::messages::Usage;

/// Non-streaming Chat Completions response. Only the fields the relay uses are modelled.
#[derive(Debug, Deserialize)]
pub(super) struct OpenAIResponse {
    pub(super) choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub(super) usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIChoice {
    pub(super) message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIResponseMessage {
    #[serde(default)]
    pub(super) content: Option<String>,
}

impl OpenAIResponse {
    /// Text of the first choice, if the provider returned one.
    pub(super) fn into_parts(self) -> (Option<String>, Option<Usage>) {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content);

        (content, self.usage)
    }
}
