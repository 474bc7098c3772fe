//! 翻译服务客户端
//!
//! 翻译服务协议：
//!
//! ```text
//! POST <api_url>
//! { "text": "<unit1>\n---SEPARATOR---\n<unit2>" }
//!
//! 200 OK
//! { "translatedText": "<result1>\n---SEPARATOR---\n<result2>", "warning": null }
//! ```

use serde::{Deserialize, Serialize};

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译能力
///
/// 接收一个已拼接的批次负载，返回同样拼接的译文
#[allow(async_fn_in_trait)]
pub trait Translator {
    async fn translate(&self, text: &str) -> TranslationResult<String>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    warning: Option<String>,
    retry_after: Option<u64>,
}

/// 基于 HTTP 的翻译客户端
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    api_url: String,
}

impl HttpTranslator {
    /// 根据配置创建客户端
    pub fn new(config: &TranslationConfig) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl Translator for HttpTranslator {
    async fn translate(&self, text: &str) -> TranslationResult<String> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&TranslateRequest { text })
            .send()
            .await
            .map_err(|e| TranslationError::TransportError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::ResponseError {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::TransportError(e.to_string()))?;

        let parsed: TranslateResponse = serde_json::from_str(&body)
            .map_err(|e| TranslationError::FormatError(format!("响应不是合法JSON: {}", e)))?;

        if let Some(warning) = parsed.warning.as_deref() {
            tracing::warn!("翻译服务警告: {}", warning);
        }
        if let Some(retry_after) = parsed.retry_after {
            tracing::debug!("翻译服务建议 {} 秒后重试", retry_after);
        }

        parsed
            .translated_text
            .ok_or_else(|| TranslationError::FormatError("响应缺少 translatedText 字段".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn translator_for(server: &MockServer) -> HttpTranslator {
        let config = TranslationConfig::with_api_url(&format!("{}/translate", server.uri()));
        HttpTranslator::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_successful_translation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({ "text": "Hello" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "translatedText": "Namaste" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = translator_for(&server).translate("Hello").await.unwrap();
        assert_eq!(result, "Namaste");
    }

    #[tokio::test]
    async fn test_error_status_is_response_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let error = translator_for(&server).translate("Hello").await.unwrap_err();
        assert!(matches!(error, TranslationError::ResponseError { status: 500 }));
    }

    #[tokio::test]
    async fn test_missing_field_is_format_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "detail": "nope" })),
            )
            .mount(&server)
            .await;

        let error = translator_for(&server).translate("Hello").await.unwrap_err();
        assert!(matches!(error, TranslationError::FormatError(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_format_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let error = translator_for(&server).translate("Hello").await.unwrap_err();
        assert!(matches!(error, TranslationError::FormatError(_)));
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        // Port 9 (discard) is not expected to have an HTTP listener
        let config = TranslationConfig::with_api_url("http://127.0.0.1:9/translate");
        let translator = HttpTranslator::new(&config).unwrap();

        let error = translator.translate("Hello").await.unwrap_err();
        assert!(matches!(error, TranslationError::TransportError(_)));
    }
}
