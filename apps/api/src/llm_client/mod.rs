/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use std::pin::Pin;

use async_trait::async_trait;
use futures::{future, stream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::analysis::AnalysisResult;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed model response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// An ordered, finite sequence of text fragments from a streaming reply.
/// Not restartable: drain it once.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Scores one resume against one job description.
/// Trait seam so the orchestrator can be exercised without a live model.
#[async_trait]
pub trait AnalysisModel: Send + Sync {
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<AnalysisResult, LlmError>;
}

/// Answers follow-up questions about a completed analysis as a fragment stream.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn stream_reply(
        &self,
        context: &AnalysisResult,
        question: &str,
    ) -> Result<FragmentStream, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenates every text part of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single LLM client used by the whole service.
/// Wraps the Gemini REST API for structured analysis and streaming chat.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn post_generate(
        &self,
        endpoint: &str,
        body: &GenerateRequest<'_>,
    ) -> Result<reqwest::Response, LlmError> {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        let url = format!("{GEMINI_API_BASE}/{MODEL}:{endpoint}{sep}key={}", self.api_key);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the API's error envelope for a readable message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// JSON schema for the structured analysis response, in the Gemini
    /// `responseSchema` dialect. Field set mirrors `AnalysisResult`.
    fn analysis_response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "relevanceScore": {
                    "type": "INTEGER",
                    "description": "A score from 0 to 100 representing the resume's relevance to the job description."
                },
                "verdict": {
                    "type": "STRING",
                    "enum": ["High", "Medium", "Low"],
                    "description": "The final verdict on the candidate's suitability."
                },
                "summary": {
                    "type": "STRING",
                    "description": "A concise two-sentence summary of the candidate's fit for the role."
                },
                "missingSkills": {
                    "type": "OBJECT",
                    "properties": {
                        "mustHave": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "A list of essential 'must-have' skills from the JD that are missing in the resume."
                        },
                        "niceToHave": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "A list of 'nice-to-have' skills from the JD that are missing in the resume."
                        }
                    },
                    "required": ["mustHave", "niceToHave"]
                },
                "improvementSuggestions": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of 2-3 personalized, actionable suggestions for the candidate to improve their resume for this specific job."
                },
                "alternativeRoles": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of 1-2 alternative job titles that might be a better fit if relevance for the current role is low (score < 50)."
                }
            },
            "required": ["relevanceScore", "verdict", "summary", "missingSkills", "improvementSuggestions"]
        })
    }
}

#[async_trait]
impl AnalysisModel for GeminiClient {
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<AnalysisResult, LlmError> {
        let prompt = prompts::ANALYSIS_PROMPT_TEMPLATE
            .replace("{job_description}", job_description)
            .replace("{resume_text}", resume_text);

        let request_body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Self::analysis_response_schema(),
            }),
        };

        let response = self
            .post_generate("generateContent", &request_body)
            .await?
            .json::<GenerateResponse>()
            .await?;

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        // Structured output mode should give bare JSON, but strip fences anyway
        let text = strip_json_fences(&text);

        let result: AnalysisResult = serde_json::from_str(text)?;

        if result.relevance_score > 100 {
            return Err(LlmError::Malformed(format!(
                "relevanceScore {} out of range 0-100",
                result.relevance_score
            )));
        }

        debug!(
            "analysis call succeeded: score={} verdict={:?}",
            result.relevance_score, result.verdict
        );

        Ok(result)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn stream_reply(
        &self,
        context: &AnalysisResult,
        question: &str,
    ) -> Result<FragmentStream, LlmError> {
        let analysis_json = serde_json::to_string_pretty(context)?;
        let prompt = prompts::CHAT_PROMPT_TEMPLATE
            .replace("{analysis_json}", &analysis_json)
            .replace("{question}", question);

        let request_body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: None,
        };

        let response = self
            .post_generate("streamGenerateContent?alt=sse", &request_body)
            .await?;

        // Decode the SSE byte stream into ordered text fragments. Byte chunks
        // can split lines (and UTF-8 sequences) anywhere, so decoding is
        // buffered across chunks.
        let fragments = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(LlmError::Http))
            .scan(SseDecoder::default(), |decoder, chunk| {
                let events: Vec<Result<String, LlmError>> = match chunk {
                    Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                future::ready(Some(stream::iter(events)))
            })
            .flatten();

        Ok(Box::pin(fragments))
    }
}

/// Incremental decoder for the Gemini SSE stream: buffers raw bytes, splits
/// on newlines, and pulls candidate text out of each `data:` line. Buffering
/// bytes (not text) keeps a UTF-8 sequence split across chunks intact until
/// its line is complete.
#[derive(Default)]
struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    /// Feeds one byte chunk and returns every complete fragment it finished.
    fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut fragments = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..pos]);
            if let Some(fragment) = parse_sse_line(line.trim_end_matches('\r')) {
                fragments.push(fragment);
            }
        }
        fragments
    }
}

/// Extracts the text fragment from one SSE line, if it carries any.
/// Unparseable data lines are logged and skipped rather than failing the stream.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GenerateResponse>(data) {
        Ok(chunk) => chunk.text(),
        Err(e) => {
            warn!("Failed to parse stream line: {data} - Error: {e}");
            None
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    fn data_line(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{text}\"}}]}}}}]}}\n"
        )
    }

    #[test]
    fn test_sse_decoder_extracts_fragments_in_order() {
        let mut decoder = SseDecoder::default();
        let input = format!("{}\n{}\n", data_line("Hel"), data_line("lo!"));
        let fragments = decoder.feed(input.as_bytes());
        assert_eq!(fragments, vec!["Hel", "lo!"]);
    }

    #[test]
    fn test_sse_decoder_buffers_across_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let line = data_line("split");
        let (head, tail) = line.split_at(line.len() / 2);
        assert!(decoder.feed(head.as_bytes()).is_empty());
        assert_eq!(decoder.feed(tail.as_bytes()), vec!["split"]);
    }

    #[test]
    fn test_sse_decoder_keeps_utf8_split_across_chunks_intact() {
        let mut decoder = SseDecoder::default();
        let line = data_line("héllo");
        let bytes = line.as_bytes();
        // Split mid-way through the two-byte 'é' sequence.
        let mid = line.find('é').unwrap() + 1;
        assert!(decoder.feed(&bytes[..mid]).is_empty());
        assert_eq!(decoder.feed(&bytes[mid..]), vec!["héllo"]);
    }

    #[test]
    fn test_sse_decoder_skips_blank_done_and_malformed_lines() {
        let mut decoder = SseDecoder::default();
        let input = format!("data:\n\ndata: [DONE]\nnot-sse\ndata: {{oops\n{}", data_line("ok"));
        assert_eq!(decoder.feed(input.as_bytes()), vec!["ok"]);
    }

    #[test]
    fn test_generate_response_text_concatenates_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"first "},{"text":"second"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("first second".to_string()));
    }

    #[test]
    fn test_generate_response_text_none_when_empty() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_analysis_schema_names_required_fields() {
        let schema = GeminiClient::analysis_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(required.contains(&"relevanceScore"));
        assert!(required.contains(&"verdict"));
        assert!(!required.contains(&"alternativeRoles"));
    }
}
