use std::collections::VecDeque;

use pdf_categorizer::error::{CategorizerError, Result};
use pdf_categorizer::model::{
    Completion, CompletionModel, CompletionRequest, FinishReason,
};

/// What the scripted model answers for one call.
pub enum Reply {
    Text(&'static str),
    NoChoices,
    Fail(&'static str),
}

/// Replays canned replies in order and remembers every request it saw.
/// Once the script runs out it answers `{}`.
#[derive(Default)]
pub struct ScriptedModel {
    replies: VecDeque<Reply>,
    pub requests: Vec<CompletionRequest>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Reply>) -> Self {
        ScriptedModel {
            replies: replies.into(),
            requests: Vec::new(),
        }
    }

    /// The chunk text embedded in each prompt, in call order.
    pub fn chunks_seen(&self) -> Vec<String> {
        self.requests
            .iter()
            .map(|request| chunk_of(&request.prompt).to_string())
            .collect()
    }
}

impl CompletionModel for ScriptedModel {
    fn complete(&mut self, request: &CompletionRequest) -> Result<Completion> {
        self.requests.push(request.clone());
        match self.replies.pop_front() {
            Some(Reply::Text(text)) => Ok(Completion::single(text, FinishReason::Stop)),
            Some(Reply::NoChoices) => Ok(Completion::default()),
            Some(Reply::Fail(message)) => Err(CategorizerError::Inference(message.to_string())),
            None => Ok(Completion::single("{}", FinishReason::Stop)),
        }
    }
}

pub fn chunk_of(prompt: &str) -> &str {
    prompt
        .split("Text to process: ")
        .nth(1)
        .and_then(|rest| rest.split("\n\nFormat the response").next())
        .unwrap_or("")
}
