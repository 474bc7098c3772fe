//! 开关信号服务器集成测试

#![cfg(feature = "web")]

use std::time::Duration;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use page_translator::translation::{StateStore, TranslationConfig};
use page_translator::web::{create_router, ToggleServer, WebConfig};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{HtmlTestHelper, MockTranslationApi};

fn server_config(api_url: &str, dir: &TempDir) -> TranslationConfig {
    let mut config = TranslationConfig::with_api_url(api_url);
    config.state_file = dir.path().join("state.json").to_string_lossy().into_owned();
    config
}

async fn start_server(api_url: &str, dir: &TempDir) -> String {
    start_server_with(
        server_config(api_url, dir),
        HtmlTestHelper::create_simple_page(),
    )
    .await
}

async fn start_server_with(config: TranslationConfig, page: String) -> String {
    let web_config = WebConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
    };
    let app_state = ToggleServer::new(web_config, config)
        .prepare(page.into_bytes(), None)
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(app_state)).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn post_signal(client: &reqwest::Client, base: &str, enabled: bool) -> serde_json::Value {
    client
        .post(format!("{}/api/toggle", base))
        .json(&serde_json::json!({ "action": "TOGGLE_TRANSLATION", "enabled": enabled }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn get_json(client: &reqwest::Client, url: String) -> serde_json::Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn test_toggle_round_trip_over_http() {
    let api = MockTranslationApi::start().await;
    api.expect_translation(&["Hello", "World"], &["Namaste", "Duniya"], 1)
        .await;
    let dir = TempDir::new().unwrap();
    let base = start_server(&api.url(), &dir).await;
    let client = reqwest::Client::new();

    let outcome = post_signal(&client, &base, true).await;
    assert_eq!(outcome["state"], "enabled");
    assert_eq!(outcome["report"]["nodesMarked"], 2);

    let document = client
        .get(format!("{}/api/document", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(document.contains(">Namaste</span>"));

    let state = get_json(&client, format!("{}/api/state", base)).await;
    assert_eq!(state["translationEnabled"], true);
    assert!(StateStore::new(dir.path().join("state.json"))
        .is_enabled()
        .unwrap());

    let outcome = post_signal(&client, &base, false).await;
    assert_eq!(outcome["report"]["nodesRestored"], 2);

    let document = client
        .get(format!("{}/api/document", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(document.contains("<p>Hello</p><p>World</p>"));
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let dir = TempDir::new().unwrap();
    let base = start_server("http://127.0.0.1:9/translate", &dir).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/toggle", base))
        .json(&serde_json::json!({ "action": "RELOAD" }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_disable_stops_pass_in_flight() {
    let api = MockTranslationApi::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(600))
                .set_body_json(serde_json::json!({ "translatedText": "अनुवाद" })),
        )
        .expect(1)
        .mount(&api.server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = server_config(&api.url(), &dir);
    config.batch_size = 1;
    let page = HtmlTestHelper::create_paragraph_page(3);
    let base = start_server_with(config, page).await;
    let client = reqwest::Client::new();

    let enable = {
        let client = client.clone();
        let base = base.clone();
        tokio::spawn(async move { post_signal(&client, &base, true).await })
    };

    // Let the first batch reach the endpoint
    tokio::time::sleep(Duration::from_millis(150)).await;
    let disabled = post_signal(&client, &base, false).await;
    let enabled = enable.await.unwrap();

    assert_eq!(enabled["changed"], true);
    assert_eq!(enabled["report"]["cancelled"], true);
    assert_eq!(enabled["report"]["nodesMarked"], 0);
    assert_eq!(enabled["report"]["batchesTotal"], 3);
    assert_eq!(disabled["state"], "disabled");

    let document = client
        .get(format!("{}/api/document", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!document.contains("hindi-translation"));
    assert!(document.contains("<p>Paragraph 0</p><p>Paragraph 1</p><p>Paragraph 2</p>"));
}

#[tokio::test]
async fn test_concurrent_signals_agree_with_persisted_state() {
    let api = MockTranslationApi::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(20))
                .set_body_json(serde_json::json!({ "translatedText": "अनुवाद" })),
        )
        .mount(&api.server)
        .await;

    let dir = TempDir::new().unwrap();
    let base = start_server(&api.url(), &dir).await;
    let client = reqwest::Client::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            let base = base.clone();
            tokio::spawn(async move { post_signal(&client, &base, i % 2 == 0).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let state = get_json(&client, format!("{}/api/state", base)).await;
    let persisted = StateStore::new(dir.path().join("state.json"))
        .is_enabled()
        .unwrap();
    assert_eq!(state["translationEnabled"], persisted);
}
