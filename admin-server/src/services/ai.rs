//! AI Copywriting Service
//!
//! Calls an OpenAI-compatible chat-completions endpoint to draft discount
//! and pickup copy for a store. Strictly best-effort: the rest of the
//! system must stay correct when this fails, so every failure surfaces as
//! an error value and never as a panic.

use serde::{Deserialize, Serialize};

use crate::utils::{AppError, AppResult};

/// 默认接口地址
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// 随请求附带的既有文案示例上限
const MAX_EXAMPLES: usize = 5;

const SYSTEM_PROMPT: &str = "You are a marketing copywriter for small food \
storefronts. Given a store's name and basic info, infer its category and \
write an attractive discount announcement and pickup guide.\n\
\n\
Rules:\n\
- Keep the discount title under 30 characters and its description under 90.\n\
- Keep the pickup title under 40 characters and its description under 160.\n\
- Stay realistic and usable as-is; never overpromise.\n\
- When the operator adds an extra request, it takes priority over these rules.\n\
\n\
Respond with pure JSON only, no markdown, exactly this shape:\n\
{\n\
  \"discount\": {\"title\": \"...\", \"description\": \"...\"},\n\
  \"pickup\": {\"title\": \"...\", \"description\": \"...\"},\n\
  \"analysis\": {\"category\": \"...\", \"reasoning\": \"...\"}\n\
}";

/// AI 配置 — 全部来自环境变量
#[derive(Clone, Debug)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            endpoint: std::env::var("OPENAI_BASE_URL")
                .map(|base| format!("{}/chat/completions", base.trim_end_matches('/')))
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.into()),
            timeout_secs: std::env::var("OPENAI_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_tokens: std::env::var("OPENAI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.7),
        }
    }
}

/// 文案生成请求
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiGenerateRequest {
    pub store_name: String,
    pub store_subtitle: String,
    pub store_phone: String,
    pub store_address: String,
    /// 运营者的附加要求 (自由文本)
    pub user_prompt: String,
}

/// 其他店铺已保存的文案，作为 few-shot 示例
#[derive(Debug, Clone)]
pub struct AiExample {
    pub store_name: String,
    pub discount_title: String,
    pub pickup_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCopy {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiAnalysis {
    pub category: String,
    pub reasoning: String,
}

/// 解析后的 AI 回复
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiContent {
    pub discount: AiCopy,
    pub pickup: AiCopy,
    #[serde(default)]
    pub analysis: AiAnalysis,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Clone)]
pub struct AiService {
    config: AiConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for AiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiService")
            .field("model", &self.config.model)
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

impl AiService {
    pub fn new(config: AiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(AiConfig::from_env())
    }

    /// 请求文案；`examples` 取前 5 条附到提示词里
    pub async fn generate(
        &self,
        request: &AiGenerateRequest,
        examples: &[AiExample],
    ) -> AppResult<AiContent> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::external("OPENAI_API_KEY is not configured"))?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(request, examples)},
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external(format!("AI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external(format!(
                "AI request failed with status {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::external(format!("AI reply was not valid JSON: {}", e)))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| AppError::external("AI reply contained no choices"))?;

        parse_reply(content)
    }
}

/// 把回复内容解析成 [`AiContent`]
fn parse_reply(content: &str) -> AppResult<AiContent> {
    serde_json::from_str(content)
        .map_err(|e| AppError::external(format!("AI reply did not match the expected shape: {}", e)))
}

fn build_user_prompt(request: &AiGenerateRequest, examples: &[AiExample]) -> String {
    let mut prompt = format!(
        "Store name: {}\nStore subtitle: {}\nPhone: {}\nAddress: {}\n",
        request.store_name, request.store_subtitle, request.store_phone, request.store_address
    );

    if !examples.is_empty() {
        prompt.push_str("\nCopy already in use by sibling stores, for tone reference:\n");
        for example in examples.iter().take(MAX_EXAMPLES) {
            prompt.push_str(&format!(
                "- {}: discount \"{}\", pickup \"{}\"\n",
                example.store_name, example.discount_title, example.pickup_title
            ));
        }
    }

    prompt.push_str("\nWrite the discount and pickup copy for this store as JSON.");

    if !request.user_prompt.trim().is_empty() {
        prompt.push_str(&format!(
            "\n\nOperator request (must be honored): {}",
            request.user_prompt.trim()
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(n: usize) -> AiExample {
        AiExample {
            store_name: format!("Store {}", n),
            discount_title: "10% off takeout".into(),
            pickup_title: "Pickup at the counter".into(),
        }
    }

    #[test]
    fn user_prompt_contains_store_info_and_operator_request() {
        let request = AiGenerateRequest {
            store_name: "Corner Deli".into(),
            store_subtitle: "Best sandwiches".into(),
            store_phone: "123".into(),
            store_address: "Main St".into(),
            user_prompt: "mention the lunch rush".into(),
        };
        let prompt = build_user_prompt(&request, &[]);
        assert!(prompt.contains("Corner Deli"));
        assert!(prompt.contains("mention the lunch rush"));
        assert!(!prompt.contains("sibling stores"));
    }

    #[test]
    fn examples_are_capped_at_five() {
        let examples: Vec<AiExample> = (0..8).map(example).collect();
        let prompt = build_user_prompt(&AiGenerateRequest::default(), &examples);
        assert!(prompt.contains("Store 4"));
        assert!(!prompt.contains("Store 5"));
    }

    #[test]
    fn valid_reply_parses() {
        let content = r#"{
            "discount": {"title": "10% off", "description": "Takeout orders save 10%."},
            "pickup": {"title": "Counter pickup", "description": "Give your order number at the counter."},
            "analysis": {"category": "deli", "reasoning": "name suggests sandwiches"}
        }"#;
        let parsed = parse_reply(content).unwrap();
        assert_eq!(parsed.discount.title, "10% off");
        assert_eq!(parsed.analysis.category, "deli");
    }

    #[test]
    fn reply_without_analysis_still_parses() {
        let content = r#"{
            "discount": {"title": "t", "description": "d"},
            "pickup": {"title": "t", "description": "d"}
        }"#;
        assert!(parse_reply(content).is_ok());
    }

    #[test]
    fn malformed_reply_is_an_external_error() {
        let err = parse_reply("not json at all").unwrap_err();
        assert!(matches!(err, AppError::External(_)));
    }

    #[tokio::test]
    async fn missing_api_key_fails_fast() {
        let service = AiService::new(AiConfig {
            api_key: None,
            model: "gpt-4o-mini".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_secs: 1,
            max_tokens: 100,
            temperature: 0.7,
        });
        let err = service
            .generate(&AiGenerateRequest::default(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::External(_)));
    }
}
