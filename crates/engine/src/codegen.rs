use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

const SYSTEM_PROMPT: &str = r#"You are an expert Pulumi TypeScript infrastructure engineer.
Output raw TypeScript code only — no markdown, no code fences, no explanation.

Rules:
- Default to AWS unless the user explicitly requests GCP or Azure
- For AWS: import from "@pulumi/aws"
- For GCP: import from "@pulumi/gcp"; use gcp.compute, gcp.storage, gcp.sql, gcp.cloudfunctions, gcp.container, gcp.pubsub, etc.
- Import "@pulumi/pulumi" for types and stack exports
- Assign all resources to const variables with descriptive camelCase names
- Set explicit parent or dependsOn relationships where logical
- Do NOT use config.require(), async/await, or hardcoded secrets
- Do NOT wrap code in an async function — Pulumi programs are synchronous at the top level
- Export useful stack outputs at the end using exports
- Use the latest stable resource types for the chosen provider"#;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Natural language in, infrastructure program text out. Failures
/// propagate; there is nothing to visualize without generated code.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, description: &str) -> Result<String>;

    async fn update(&self, existing_code: &str, change_description: &str) -> Result<String>;
}

/// Chat-completions-backed generator (OpenAI wire format).
pub struct OpenAiCodeGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCodeGenerator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Reads `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL` (optional).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY environment variable is not set")?;
        let mut generator = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            generator.base_url = base_url.trim_end_matches('/').to_string();
        }
        Ok(generator)
    }

    async fn chat(&self, user_prompt: String) -> Result<String> {
        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0.1,
            "max_tokens": 4096,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            anyhow::bail!("chat completion returned {status}: {}", detail.trim());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("parse chat completion response")?;
        let raw = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        Ok(strip_code_fences(&raw))
    }
}

#[async_trait]
impl CodeGenerator for OpenAiCodeGenerator {
    async fn generate(&self, description: &str) -> Result<String> {
        self.chat(format!(
            "Generate a Pulumi TypeScript program for the following infrastructure:\n\n{description}"
        ))
        .await
    }

    async fn update(&self, existing_code: &str, change_description: &str) -> Result<String> {
        self.chat(format!(
            "Here is an existing Pulumi TypeScript program:\n\n{existing_code}\n\nApply the following change and return the complete updated program:\n\n{change_description}"
        ))
        .await
    }
}

/// Stand-in used when no API key is configured. Generation and update
/// report the configuration problem; visualization and deploy of existing
/// stacks keep working.
pub struct UnconfiguredCodeGenerator {
    reason: String,
}

impl UnconfiguredCodeGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CodeGenerator for UnconfiguredCodeGenerator {
    async fn generate(&self, _description: &str) -> Result<String> {
        anyhow::bail!("{}", self.reason)
    }

    async fn update(&self, _existing_code: &str, _change_description: &str) -> Result<String> {
        anyhow::bail!("{}", self.reason)
    }
}

/// Models occasionally wrap output in markdown fences despite the prompt.
fn strip_code_fences(code: &str) -> String {
    let mut text = code.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fences_with_language_tag_are_stripped() {
        let fenced = "```typescript\nconst x = 1;\n```";
        assert_eq!(strip_code_fences(fenced), "const x = 1;");
    }

    #[test]
    fn test_bare_fences_are_stripped() {
        let fenced = "```\nconst x = 1;\n```";
        assert_eq!(strip_code_fences(fenced), "const x = 1;");
    }

    #[test]
    fn test_unfenced_code_is_untouched() {
        let code = "const x = 1;\nexport const y = x;";
        assert_eq!(strip_code_fences(code), code);
    }
}
