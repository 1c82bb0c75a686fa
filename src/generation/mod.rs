// Generation
// The completion client wraps an OpenAI-style chat endpoint behind the
// CompletionBackend seam; the Rewriter drives one full request:
// retrieve -> compose -> complete -> trim.


use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::{Config, OpenAiConfig};
use crate::embeddings::Embedder;
use crate::prompt::{self, SYSTEM_PROMPT};
use crate::retriever::Retriever;
use crate::{PolishError, Result};

/// Number of examples retrieved per rewrite unless the caller overrides it.
pub const DEFAULT_TOP_K: usize = 3;

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Single-turn completion boundary. Tests substitute fakes here without
/// touching any global state.
pub trait CompletionBackend {
    /// Send one (system, user) exchange and return the generated text.
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Blocking client for the chat-completion endpoint. The credential is
/// resolved at construction so a missing key fails fast instead of deep
/// inside a request; the agent carries a bounded global timeout.
pub struct CompletionClient {
    agent: ureq::Agent,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl CompletionClient {
    #[inline]
    pub fn new(config: &OpenAiConfig, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(PolishError::Config(format!(
                "Missing completion API key; set {API_KEY_VAR}"
            )));
        }

        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(CHAT_COMPLETIONS_PATH))
            .map_err(|e| PolishError::Config(format!("Invalid completion base URL: {e}")))?;

        let timeout = Duration::from_secs(config.timeout_seconds);
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self {
            agent,
            endpoint,
            api_key: api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
        })
    }

    /// Construct with the credential from the process environment.
    #[inline]
    pub fn from_env(config: &OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| {
            PolishError::Config(format!("Missing completion API key; set {API_KEY_VAR}"))
        })?;
        Self::new(config, &api_key)
    }
}

impl CompletionBackend for CompletionClient {
    #[inline]
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };
        let request_json = serde_json::to_string(&request).map_err(|e| {
            PolishError::Generation(format!("Failed to serialize completion request: {e}"))
        })?;

        debug!(
            "Sending completion request to {} (model: {}, prompt length: {})",
            self.endpoint,
            self.model,
            user.len()
        );

        let response_text = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|error| match error {
                ureq::Error::Timeout(_) => PolishError::GenerationTimeout(self.timeout),
                ureq::Error::StatusCode(status) => PolishError::Generation(format!(
                    "Completion endpoint returned HTTP {status}"
                )),
                other => PolishError::Generation(format!("Completion request failed: {other}")),
            })?;

        let response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            PolishError::Generation(format!("Failed to parse completion response: {e}"))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(PolishError::Generation(
                "Completion endpoint returned empty content".to_string(),
            ));
        }

        Ok(content)
    }
}

/// Drives one rewrite request end to end. Artifacts are loaded fresh per
/// request; the rule set is re-read every time so prompt policy can change
/// without a rebuild.
pub struct Rewriter<'a, E: Embedder, C: CompletionBackend> {
    config: &'a Config,
    embedder: &'a E,
    completion: &'a C,
}

impl<'a, E: Embedder, C: CompletionBackend> Rewriter<'a, E, C> {
    #[inline]
    pub fn new(config: &'a Config, embedder: &'a E, completion: &'a C) -> Self {
        Self {
            config,
            embedder,
            completion,
        }
    }

    /// Rewrite a raw resume using the `k` closest stored examples.
    #[inline]
    pub fn rewrite(&self, raw_resume_text: &str, k: usize) -> Result<String> {
        let retriever = Retriever::load(
            &self.config.index_path(),
            &self.config.records_path(),
            &self.config.ollama.model,
            self.embedder,
        )?;

        let examples = retriever.search(raw_resume_text, k)?;
        if examples.is_empty() {
            warn!("Rewriting without retrieved examples");
        }

        let rules = prompt::load_rules(&self.config.paths.rules_file)?;
        let user_prompt = prompt::build_prompt(&rules, &examples, raw_resume_text);

        let generated = self.completion.complete(SYSTEM_PROMPT, &user_prompt)?;
        Ok(generated.trim().to_string())
    }
}
