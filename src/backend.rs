use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Serialize)]
struct FeedbackRequest<'a> {
    question: &'a str,
    solution: &'a str,
    is_correct: bool,
}

/// Reply body for `/ask`: carries either `error` or `solution` (+ optional `source`).
#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    solution: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// A well-formed backend reply to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Solution {
        solution: String,
        source: Option<String>,
    },
    Error(String),
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a question to `POST /ask`. Returns `Ok` for any reply the backend
    /// produced, including backend-reported errors; `Err` only when the request
    /// itself failed or the body could not be parsed.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await?;

        // The body is interpreted regardless of HTTP status: the backend
        // reports its own failures through the `error` field.
        let body: AskResponse = response.json().await?;

        if let Some(error) = body.error {
            return Ok(Answer::Error(error));
        }
        match body.solution {
            Some(solution) => Ok(Answer::Solution {
                solution,
                source: body.source,
            }),
            None => Err(anyhow!("reply carried neither a solution nor an error")),
        }
    }

    /// Send one feedback verdict to `POST /feedback`. The response body is
    /// never interpreted; only the transport outcome is reported.
    pub async fn feedback(&self, question: &str, solution: &str, is_correct: bool) -> Result<()> {
        let url = format!("{}/feedback", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&FeedbackRequest {
                question,
                solution,
                is_correct,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "feedback request failed with status: {}",
                response.status()
            ));
        }
        Ok(())
    }
}
