use serde::Serialize;

/// Request body for the Chat Completions API.
#[derive(Debug, Serialize)]
pub(super) struct OpenAIRequest<'a> {
    /// ID of the model to use.
    pub(super) model: &'a str,

    /// The conversation, here always a single user message.
    pub(super) messages: Vec<OpenAIMessage<'a>>,

    /// Sampling temperature, between 0 and 2.
    pub(super) temperature: f64,

    /// Responses are relayed whole, never as server-sent events.
    pub(super) stream: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct OpenAIMessage<'a> {
    pub(super) role: &'static str,
    pub(super) content: &'a str,
}

impl<'a> OpenAIRequest<'a> {
    pub(super) fn user_prompt(model: &'a str, prompt: &'a str, temperature: f64) -> Self {
        Self {
            model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            stream: false,
        }
    }
}
