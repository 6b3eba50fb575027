use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{EvalError, IdeaEvaluator};

const ANALYSIS_PROMPT: &str = r#"Evaluate the following business idea in detail, using this structure:

Business idea:
{idea}

1. Short summary of the idea
2. Target audience
3. Monetization paths
4. Comparable products or competitors
5. Strengths and weaknesses of the idea
6. Long-term sustainability outlook
7. Recommendations for improving the idea"#;

const GEMINI_MODEL: &str = "gemini-1.5-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
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

pub struct GeminiAgent {
    client: Client,
    api_key: String,
}

impl GeminiAgent {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }
}

pub(crate) fn build_prompt(idea: &str) -> String {
    ANALYSIS_PROMPT.replace("{idea}", idea)
}

#[async_trait]
impl IdeaEvaluator for GeminiAgent {
    async fn evaluate(&self, idea: &str) -> Result<String, EvalError> {
        info!("Requesting idea analysis ({} chars)", idea.len());

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(idea),
                }],
            }],
        };

        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, GEMINI_MODEL);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await?;
            return Err(EvalError::Service { status, detail });
        }

        let parsed: GenerateResponse = response.json().await?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(EvalError::EmptyResponse);
        }

        info!("Received analysis ({} chars)", text.len());
        Ok(text)
    }
}
