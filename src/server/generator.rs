//! Question generation through a language model
//!
//! The service only depends on the `QuestionGenerator` trait; `GeminiGenerator`
//! is the production implementation. Whatever the model returns goes through
//! `questions::parse_generated` before it is stored.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::questions::{PoolError, Question, parse_generated};

/// Questions generated per session
pub const QUESTIONS_PER_GAME: usize = 30;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A sanitised generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRequest {
    pub subject: String,
    pub topic: String,
    pub class: String,
    pub chapter: String,
}

impl QuestionRequest {
    /// Trim every field and cut it down to its length limit
    pub fn sanitized(subject: &str, topic: &str, class: &str, chapter: &str) -> Self {
        Self {
            subject: truncate(subject.trim(), 100),
            topic: truncate(topic.trim(), 100),
            class: truncate(class.trim(), 20),
            chapter: truncate(chapter.trim(), 100),
        }
    }

    pub fn prompt(&self) -> String {
        let QuestionRequest {
            subject,
            topic,
            class,
            chapter,
        } = self;
        format!(
            r#"You are an expert educator creating quiz questions for students.

Generate exactly {QUESTIONS_PER_GAME} multiple-choice questions with the following specifications:

Subject: {subject}
Topic: {topic}
Class/Grade: {class}
Chapter: {chapter}

CRITICAL REQUIREMENTS:
1. ALL {QUESTIONS_PER_GAME} questions MUST be specifically about "{topic}" from chapter "{chapter}" in the subject of "{subject}"
2. DO NOT include questions from other topics, chapters, or subjects
3. Each question must have exactly 4 options
4. Only one option should be correct
5. Questions should be age-appropriate for class {class}
6. Vary difficulty levels (easy, medium, hard)
7. Keep questions concise and clear
8. Avoid ambiguous wording
9. Options MUST be very short (1-2 words maximum)

Return ONLY a valid JSON array with NO additional text, markdown, or formatting.
Use this EXACT format:

[
  {{
    "id": 1,
    "question": "What is the sum of angles in a triangle?",
    "options": ["90°", "180°", "270°", "360°"],
    "answer": 1
  }}
]

Generate all {QUESTIONS_PER_GAME} questions about "{topic}" from chapter "{chapter}" now:"#
        )
    }
}

/// Character-based truncation (never splits a UTF-8 sequence)
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("language model request failed: {0}")]
    Request(String),
    #[error("language model returned no text")]
    EmptyResponse,
    #[error("generated questions failed validation: {0}")]
    Invalid(#[from] PoolError),
}

/// Source of question sets
pub trait QuestionGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        request: &QuestionRequest,
    ) -> impl Future<Output = Result<Vec<Question>, GenerateError>> + Send;
}

/// Google Gemini `generateContent` client
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiGenerator {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

impl QuestionGenerator for GeminiGenerator {
    async fn generate(&self, request: &QuestionRequest) -> Result<Vec<Question>, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;
        let url = format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }]
        });

        log::info!("Calling {} for {}/{}", self.model, request.subject, request.chapter);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GenerateError::Request(e.without_url().to_string()))?;
        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Request(e.without_url().to_string()))?;

        let text = parsed.into_text().ok_or(GenerateError::EmptyResponse)?;
        let questions = parse_generated(&text, QUESTIONS_PER_GAME)?;
        log::info!("Validation passed: {} questions generated", questions.len());
        Ok(questions)
    }
}
