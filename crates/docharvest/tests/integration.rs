//! Integration tests for DocHarvest using wiremock

use docharvest::{
    harvest, ApiConfig, DocumentFetcher, DocumentRequest, FetchError, HarvestConfig,
    PortalClient, TaskOutcome,
};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PortalClient {
    PortalClient::new(ApiConfig::with_endpoint(format!("{}/getDocumentById", server.uri())))
        .unwrap()
}

fn document_response(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "code": 0,
        "message": "success",
        "value": {
            "docId": title,
            "title": title,
            "fileName": format!("{}.md", title.to_lowercase()),
            "anchorList": [{"title": "Overview"}],
            "content": {"content": body}
        }
    }))
}

#[tokio::test]
async fn test_fetch_posts_document_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getDocumentById"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "objectId": "start-overview",
            "version": "",
            "catalogName": "harmonyos-guides",
            "language": "cn"
        })))
        .respond_with(document_response("Start", "<h2>Hi</h2>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let doc = client
        .fetch(&DocumentRequest::new("start-overview", "harmonyos-guides", "cn"))
        .await
        .unwrap();

    assert_eq!(doc.title.as_deref(), Some("Start"));
    assert_eq!(doc.file_name.as_deref(), Some("start.md"));
    assert_eq!(doc.anchors.len(), 1);
    assert_eq!(doc.body(), Some("<h2>Hi</h2>"));
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(document_response("UA", ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(ApiConfig {
        user_agent: "TestAgent/1.0".to_string(),
        ..ApiConfig::with_endpoint(format!("{}/getDocumentById", mock_server.uri()))
    })
    .unwrap();
    let doc = client
        .fetch(&DocumentRequest::new("ua", "harmonyos-guides", "en"))
        .await
        .unwrap();
    assert_eq!(doc.body(), None);
}

#[tokio::test]
async fn test_fetch_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch(&DocumentRequest::new("x", "harmonyos-guides", "cn"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::HttpStatus(503)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch(&DocumentRequest::new("x", "harmonyos-guides", "cn"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_fetch_rejected_by_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1001,
            "message": "document not found",
            "value": null
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .fetch(&DocumentRequest::new("missing", "harmonyos-guides", "cn"))
        .await
        .unwrap_err();

    match err {
        FetchError::Rejected { code, message } => {
            assert_eq!(code, 1001);
            assert_eq!(message, "document not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(document_response("Slow", "").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = PortalClient::new(ApiConfig {
        timeout: Duration::from_millis(200),
        ..ApiConfig::with_endpoint(format!("{}/getDocumentById", mock_server.uri()))
    })
    .unwrap();
    let err = client
        .fetch(&DocumentRequest::new("slow", "harmonyos-guides", "cn"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout));
}

fn write_index(dir: &Path) -> std::path::PathBuf {
    let input = dir.join("category.json");
    let tree = json!([
        {
            "nodeName": "Getting Started",
            "nodeId": 1,
            "isLeaf": false,
            "children": [
                {"nodeName": "Overview", "relateDocument": "start-overview", "nodeId": 2, "isLeaf": true},
                {"nodeName": "Broken", "relateDocument": "broken-doc", "nodeId": 3, "isLeaf": true}
            ]
        },
        {"nodeName": "FAQ: Common?", "relateDocument": "faq", "nodeId": 4, "isLeaf": true}
    ]);
    std::fs::write(&input, tree.to_string()).unwrap();
    input
}

fn config_for(server: &MockServer, dir: &Path) -> HarvestConfig {
    HarvestConfig::builder()
        .input(write_index(dir))
        .output_dir(dir.join("docs"))
        .documents_file(dir.join("documents.json"))
        .summary_file(dir.join("documents_summary.json"))
        .language("en")
        .delay(Duration::ZERO)
        .endpoint(format!("{}/getDocumentById", server.uri()))
        .build()
}

#[tokio::test]
async fn test_harvest_end_to_end_and_resume() {
    let dir = tempfile::tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"objectId": "start-overview"})))
        .respond_with(document_response(
            "Overview",
            "<h2>Install</h2><p>Run <code>hvigor</code> &amp; wait.</p>",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"objectId": "broken-doc"})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"objectId": "faq"})))
        .respond_with(document_response("FAQ", "<ul><li>One</li></ul>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server, dir.path());
    let mut outcomes = Vec::new();
    let result = harvest(&config, |p| outcomes.push(p.outcome)).await.unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.saved, 2);
    assert!(matches!(outcomes[1], TaskOutcome::FetchFailed(_)));

    let overview =
        std::fs::read_to_string(dir.path().join("docs/Getting_Started/Overview.md")).unwrap();
    assert!(overview.starts_with("# Overview\n\n**Source**: Overview  \n"));
    assert!(overview.contains("**File name**: overview.md\n"));
    assert!(overview.contains("## Table of Contents\n\n- Overview\n"));
    assert!(overview.contains("## Install"));
    assert!(overview.contains("Run `hvigor` & wait."));
    assert!(!dir.path().join("docs/Getting_Started/Broken.md").exists());
    assert!(dir.path().join("docs/FAQ_Common.md").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.summary_file).unwrap()).unwrap();
    assert_eq!(summary.as_array().unwrap().len(), 2);
    assert_eq!(summary[0]["path"], "Getting_Started/Overview");
    assert_eq!(summary[1]["anchorCount"], 1);

    // Second run: only the failed document is requested again
    let result = harvest(&config, |_| {}).await.unwrap();
    assert_eq!(result.skipped, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.successful, 0);

    // The documents file only lists what this run fetched
    let documents = docharvest::load_documents(&config.documents_file).unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_harvest_without_markdown_files() {
    let dir = tempfile::tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(document_response("Doc", "<p>body</p>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HarvestConfig {
        save_markdown: false,
        ..config_for(&mock_server, dir.path())
    };
    let result = harvest(&config, |_| {}).await.unwrap();

    assert_eq!(result.successful, 3);
    assert_eq!(result.saved, 0);
    assert!(!dir.path().join("docs").exists());

    let documents = docharvest::load_documents(&config.documents_file).unwrap();
    assert_eq!(documents.len(), 3);
    assert_eq!(documents[2].task.path, "FAQ_Common");
}
