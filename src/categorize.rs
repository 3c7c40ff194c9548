use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::chunker::chunk_text;
use crate::logging::CATEGORIZE;
use crate::model::{CompletionModel, CompletionRequest};

pub const MAX_COMPLETION_TOKENS: usize = 512;
pub const TEMPERATURE: f64 = 0.7;
pub const STOP_SEQUENCE: &str = "</s>";

const NO_OUTPUT_MESSAGE: &str = "No valid output text found";

/// Outcome for one chunk. Serializes untagged: a structured record is the
/// model's JSON as-is, the others are `{"text": ..}` and `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseRecord {
    Text { text: String },
    Error { error: String },
    Structured(Value),
}

impl ResponseRecord {
    /// Parse the model's reply, keeping the raw text when it is not JSON.
    pub fn from_output(output: &str) -> Self {
        match serde_json::from_str::<Value>(output) {
            Ok(value) => ResponseRecord::Structured(value),
            Err(_) => ResponseRecord::Text {
                text: output.to_string(),
            },
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ResponseRecord::Error {
            error: message.into(),
        }
    }
}

pub fn build_prompt(chunk: &str) -> String {
    format!(
        "
Extract and categorize data into structured JSON format with fields like 'name', 'grade', 'course',
credits, year, etc. Ensure that multiple categories are separated into rows, and if applicable,
provide multiple instances.

Text to process: {chunk}

Format the response as valid JSON.
"
    )
}

pub fn completion_request(chunk: &str) -> CompletionRequest {
    CompletionRequest {
        prompt: build_prompt(chunk),
        max_tokens: MAX_COMPLETION_TOKENS,
        temperature: TEMPERATURE,
        stop: vec![STOP_SEQUENCE.to_string()],
        echo: false,
    }
}

/// Run one completion per chunk. Never fails: each chunk yields exactly one
/// record, in chunk order, whatever the model does.
pub fn categorize_chunks<M, S>(chunks: &[S], model: &mut M) -> Vec<ResponseRecord>
where
    M: CompletionModel + ?Sized,
    S: AsRef<str>,
{
    let mut records = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        let chunk = chunk.as_ref();
        debug!(
            target: CATEGORIZE,
            chunk = index,
            total = chunks.len(),
            words = chunk.split_whitespace().count(),
            "Categorizing chunk"
        );

        let record = match model.complete(&completion_request(chunk)) {
            Ok(completion) => match completion.first_text() {
                Some(text) => ResponseRecord::from_output(text.trim()),
                None => {
                    warn!(
                        target: CATEGORIZE,
                        "Warning: Unexpected response format: {:?}", completion
                    );
                    ResponseRecord::error(NO_OUTPUT_MESSAGE)
                }
            },
            Err(e) => {
                error!(target: CATEGORIZE, chunk = index, "Error processing chunk: {}", e);
                ResponseRecord::error(e.to_string())
            }
        };
        records.push(record);
    }

    records
}

/// Chunk `text` into `max_words`-word pieces and categorize each.
pub fn categorize_text<M>(text: &str, model: &mut M, max_words: usize) -> Vec<ResponseRecord>
where
    M: CompletionModel + ?Sized,
{
    let chunks = chunk_text(text, max_words);
    categorize_chunks(&chunks, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_prompt_embeds_chunk() {
        let prompt = build_prompt("Alice Algebra A");
        assert!(prompt.contains("Text to process: Alice Algebra A"));
        assert!(prompt.contains("Format the response as valid JSON."));
    }

    #[test]
    fn test_request_parameters() {
        let request = completion_request("chunk");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.stop, vec!["</s>".to_string()]);
        assert!(!request.echo);
    }

    #[test]
    fn test_record_from_json_object() {
        let record = ResponseRecord::from_output(r#"{"name": "Alice", "grade": "A"}"#);
        assert_eq!(
            record,
            ResponseRecord::Structured(json!({"name": "Alice", "grade": "A"}))
        );
    }

    #[test]
    fn test_record_from_plain_text() {
        let record = ResponseRecord::from_output("not json");
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"text": "not json"})
        );
    }

    #[test]
    fn test_record_serialization_shapes() {
        let records = vec![
            ResponseRecord::Structured(json!([{"course": "Biology"}])),
            ResponseRecord::Text {
                text: "raw".into(),
            },
            ResponseRecord::error("boom"),
        ];
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([[{"course": "Biology"}], {"text": "raw"}, {"error": "boom"}])
        );
    }
}
