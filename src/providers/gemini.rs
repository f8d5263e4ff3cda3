use crate::core::chat::{ChatModel, Content};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// [`ChatModel`] over the `generateContent` REST endpoint.
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl GeminiProvider {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Result<Self> {
        let endpoint = Url::parse_with_params(
            &format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            &[("key", api_key)],
        )
        .with_context(|| format!("Invalid assistant base URL: {base_url}"))?;
        let client = reqwest::Client::builder()
            .user_agent("bizdash/0.1")
            .build()?;
        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }
}

#[derive(Serialize, Debug)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[async_trait]
impl ChatModel for GeminiProvider {
    #[instrument(name = "GeminiGenerate", skip(self, contents), fields(model = %self.model))]
    async fn generate(&self, contents: &[Content]) -> Result<Option<String>> {
        debug!("Sending {} turns to the language model", contents.len());
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GenerateRequest { contents })
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for model: {}", e.without_url(), self.model))?;

        debug!(status = %response.status(), "Received language model response");

        let data = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse language model response: {}", e.without_url()))?;
        Ok(data.first_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::{Part, Role};
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn contents() -> Vec<Content> {
        vec![Content {
            role: Role::User,
            parts: vec![Part {
                text: "How is my shop doing?".to_string(),
            }],
        }]
    }

    #[tokio::test]
    async fn test_successful_generate() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Quite well."}]}}]}"#;
        let mock_server = create_mock_server(200, body).await;

        let provider =
            GeminiProvider::new(&mock_server.uri(), "gemini-2.5-flash", "test-key").unwrap();
        let answer = provider.generate(&contents()).await.unwrap();
        assert_eq!(answer.as_deref(), Some("Quite well."));
    }

    #[tokio::test]
    async fn test_request_body_carries_contents() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "How is my shop doing?"}]}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = format!("{}/", mock_server.uri());
        let provider = GeminiProvider::new(&base, "gemini-2.5-flash", "k").unwrap();
        assert_eq!(provider.generate(&contents()).await.unwrap().as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_missing_text_is_none() {
        for body in [
            r#"{"candidates":[]}"#,
            r#"{}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[{}]}}]}"#,
        ] {
            let mock_server = create_mock_server(200, body).await;
            let provider =
                GeminiProvider::new(&mock_server.uri(), "gemini-2.5-flash", "test-key").unwrap();
            assert_eq!(provider.generate(&contents()).await.unwrap(), None, "{body}");
        }
    }

    #[tokio::test]
    async fn test_error_status_without_candidates_is_none() {
        let body = r#"{"error":{"code":403,"message":"API key not valid"}}"#;
        let mock_server = create_mock_server(403, body).await;
        let provider =
            GeminiProvider::new(&mock_server.uri(), "gemini-2.5-flash", "test-key").unwrap();
        assert_eq!(provider.generate(&contents()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_json_is_error() {
        let mock_server = create_mock_server(200, "<html>oops</html>").await;
        let provider =
            GeminiProvider::new(&mock_server.uri(), "gemini-2.5-flash", "test-key").unwrap();
        assert!(provider.generate(&contents()).await.is_err());
    }

    #[tokio::test]
    async fn test_errors_do_not_expose_api_key() {
        // The key travels in the query string, so the URL must stay out of errors.
        let provider =
            GeminiProvider::new("http://127.0.0.1:1", "gemini-2.5-flash", "SUPERSECRETKEY").unwrap();
        let err = provider.generate(&contents()).await.unwrap_err();
        assert!(!format!("{err:?}").contains("SUPERSECRETKEY"), "{err:?}");

        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;
        let provider =
            GeminiProvider::new(&mock_server.uri(), "gemini-2.5-flash", "SUPERSECRETKEY").unwrap();
        let err = provider.generate(&contents()).await.unwrap_err();
        assert!(!format!("{err:?}").contains("SUPERSECRETKEY"), "{err:?}");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(GeminiProvider::new("not a url", "gemini-2.5-flash", "k").is_err());
    }
}
