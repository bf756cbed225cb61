pub mod config;
pub mod prompt;

use log::{debug, info};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};

use crate::error::ReplyError;
use config::{ClientConfig, API_VERSION};
use prompt::ChatPrompt;

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 250;
const TOP_P: f64 = 0.95;

// A thin wrapper over the Azure OpenAI chat completions API
pub struct AzureOpenAIClient {
    completions_url: Url,
    api_key: Secret<String>,
    deployment: String,
    client: Client,
}

impl AzureOpenAIClient {
    /// Reads the configuration from the environment and builds a client.
    pub fn from_env() -> Result<Self, ReplyError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn new(config: ClientConfig) -> Result<Self, ReplyError> {
        let completions_url = completions_url(&config.endpoint, &config.deployment)?;
        let client = Client::builder()
            .build()
            .map_err(|e| ReplyError::ClientInitialization(e.to_string()))?;

        info!(
            "Azure OpenAI client initialized successfully (endpoint: {}, deployment: {}, api key: {})",
            config.endpoint,
            config.deployment,
            config.masked_api_key()
        );

        Ok(Self {
            completions_url,
            api_key: config.api_key,
            deployment: config.deployment,
            client,
        })
    }

    pub async fn generate_reply(&self, prompt: &ChatPrompt) -> Result<String, ReplyError> {
        let payload = json!({
            "model": self.deployment,
            "messages": prompt,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "top_p": TOP_P,
            "frequency_penalty": 0,
            "presence_penalty": 0,
            "stop": null
        });

        info!("Sending prompt to Azure OpenAI deployment {}", self.deployment);
        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(self.completions_url.clone())
            .header("api-key", self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ReplyError::Completion(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ReplyError::Completion(format!(
                "Azure OpenAI returned {}: {}",
                status, error_text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ReplyError::Completion(format!("invalid response body: {}", e)))?;
        debug!("Response JSON: {}", response_json);

        // Only the first choice is used
        let choice = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .ok_or_else(|| ReplyError::Completion("response contained no choices".to_string()))?;

        let content = choice
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| {
                let finish_reason = choice
                    .get("finish_reason")
                    .and_then(|reason| reason.as_str())
                    .unwrap_or("unknown");
                ReplyError::Completion(format!(
                    "response contained no message content (finish_reason: {})",
                    finish_reason
                ))
            })?;

        let reply = content.trim().to_string();
        info!("Generated reply length: {} characters", reply.chars().count());
        debug!("Generated reply: {}", reply);
        Ok(reply)
    }
}

fn completions_url(endpoint: &str, deployment: &str) -> Result<Url, ReplyError> {
    let invalid = |detail: String| {
        ReplyError::ClientInitialization(format!("invalid endpoint '{}': {}", endpoint, detail))
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    url.path_segments_mut()
        .map_err(|_| invalid("endpoint cannot be used as a base URL".to_string()))?
        .pop_if_empty()
        .extend(["openai", "deployments", deployment, "chat", "completions"]);
    url.query_pairs_mut().append_pair("api-version", API_VERSION);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::models::IncomingReplyRequest;
    use mockito::Matcher;
    use super::prompt::build_prompt;

    const COMPLETIONS_PATH: &str = "/openai/deployments/gpt-test/chat/completions";

    fn config(endpoint: &str) -> ClientConfig {
        ClientConfig {
            api_key: Secret::new("test-key-123456".to_string()),
            endpoint: endpoint.to_string(),
            deployment: "gpt-test".to_string(),
        }
    }

    fn sample_prompt() -> ChatPrompt {
        build_prompt(&IncomingReplyRequest {
            subject: "Meeting".to_string(),
            body: "Can we meet?".to_string(),
            sender_name: "Alice".to_string(),
            sender_email: None,
            recipient_name: None,
        })
    }

    #[test]
    fn builds_deployment_url_with_api_version() {
        let url = completions_url("https://example.openai.azure.com/", "gpt-35-turbo").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.openai.azure.com/openai/deployments/gpt-35-turbo/chat/completions?api-version=2024-02-01"
        );

        let url = completions_url("https://example.openai.azure.com", "gpt-35-turbo").unwrap();
        assert_eq!(url.path(), "/openai/deployments/gpt-35-turbo/chat/completions");
    }

    #[test]
    fn rejects_malformed_endpoints() {
        for endpoint in ["not a url", "ftp://example.com", "mailto:someone@example.com"] {
            assert!(matches!(
                AzureOpenAIClient::new(config(endpoint)),
                Err(ReplyError::ClientInitialization(_))
            ));
        }
    }

    #[actix_web::test]
    async fn sends_prompt_and_returns_trimmed_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COMPLETIONS_PATH)
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                API_VERSION.into(),
            ))
            .match_header("api-key", "test-key-123456")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "gpt-test",
                    "temperature": 0.7,
                    "max_tokens": 250,
                    "top_p": 0.95,
                    "frequency_penalty": 0,
                    "presence_penalty": 0,
                    "stop": null
                })),
                Matcher::Regex("Can we meet".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        { "index": 0, "message": { "role": "assistant", "content": "\n  Dear Alice,\nSure.  \n" } },
                        { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let client = AzureOpenAIClient::new(config(&server.url())).unwrap();
        let reply = client.generate_reply(&sample_prompt()).await.unwrap();

        assert_eq!(reply, "Dear Alice,\nSure.");
        mock.assert_async().await;
    }

    #[actix_web::test]
    async fn non_success_status_is_a_completion_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETIONS_PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Rate limit is exceeded")
            .create_async()
            .await;

        let client = AzureOpenAIClient::new(config(&server.url())).unwrap();
        let err = client.generate_reply(&sample_prompt()).await.unwrap_err();

        match err {
            ReplyError::Completion(detail) => {
                assert!(detail.contains("429"));
                assert!(detail.contains("Rate limit is exceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[actix_web::test]
    async fn filtered_content_is_a_completion_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETIONS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        { "index": 0, "finish_reason": "content_filter", "message": { "role": "assistant", "content": null } }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = AzureOpenAIClient::new(config(&server.url())).unwrap();
        let err = client.generate_reply(&sample_prompt()).await.unwrap_err();

        assert!(matches!(err, ReplyError::Completion(ref d) if d.contains("content_filter")));
    }

    #[actix_web::test]
    async fn empty_choices_is_a_completion_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETIONS_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = AzureOpenAIClient::new(config(&server.url())).unwrap();
        let err = client.generate_reply(&sample_prompt()).await.unwrap_err();

        assert!(matches!(err, ReplyError::Completion(_)));
    }

    #[actix_web::test]
    async fn unreachable_service_is_a_completion_error() {
        // Nothing listens on port 1
        let client = AzureOpenAIClient::new(config("http://127.0.0.1:1")).unwrap();
        let err = client.generate_reply(&sample_prompt()).await.unwrap_err();

        assert!(matches!(err, ReplyError::Completion(_)));
    }
}
