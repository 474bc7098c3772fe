// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use markup5ever_rcdom::RcDom;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use page_translator::parsers::{html_to_dom, serialize_document};
use page_translator::translation::config::constants::SEPARATOR;
use page_translator::translation::{
    EngineConfig, HttpTranslator, TranslationConfig, TranslationEngine,
};

/// HTML 测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 创建测试DOM
    pub fn create_test_dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    pub fn to_html(dom: &RcDom) -> String {
        String::from_utf8(serialize_document(dom, "utf-8").unwrap()).unwrap()
    }

    /// `<body>` 与 `</body>` 之间的内容
    pub fn body_html(dom: &RcDom) -> String {
        let html = Self::to_html(dom);
        let start = html.find("<body>").unwrap() + "<body>".len();
        let end = html.find("</body>").unwrap();
        html[start..end].to_string()
    }

    pub fn create_simple_page() -> String {
        "<html><head><title>Greeting</title></head><body><p>Hello</p><p>World</p></body></html>"
            .to_string()
    }

    /// 每个段落一个文本节点：`Paragraph 0` .. `Paragraph n-1`
    pub fn create_paragraph_page(count: usize) -> String {
        let paragraphs: String = (0..count)
            .map(|i| format!("<p>Paragraph {}</p>", i))
            .collect();
        format!("<html><head></head><body>{}</body></html>", paragraphs)
    }
}

/// 用分隔符拼接文本
pub fn joined(texts: &[&str]) -> String {
    texts.join(SEPARATOR)
}

/// 模拟翻译服务
pub struct MockTranslationApi {
    pub server: MockServer,
}

impl MockTranslationApi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        format!("{}/translate", self.server.uri())
    }

    /// 对指定请求文本返回译文，并断言恰好收到 `times` 次
    pub async fn expect_translation(&self, request: &[&str], response: &[&str], times: u64) {
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({ "text": joined(request) })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "translatedText": joined(response) })),
            )
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// 对指定请求文本返回任意响应
    pub async fn respond_to(&self, request: &[&str], template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({ "text": joined(request) })))
            .respond_with(template)
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub fn engine(&self, batch_size: usize) -> TranslationEngine<HttpTranslator> {
        engine_for(&self.url(), batch_size)
    }
}

pub fn engine_for(api_url: &str, batch_size: usize) -> TranslationEngine<HttpTranslator> {
    let mut config = TranslationConfig::with_api_url(api_url);
    config.batch_size = batch_size;
    config.request_timeout_secs = 5;

    TranslationEngine::new(
        HttpTranslator::new(&config).unwrap(),
        EngineConfig::from(&config),
    )
}
