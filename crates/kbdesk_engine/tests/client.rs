use std::time::Duration;

use kbdesk_engine::{
    ChatApi, ChatMessage, ClientSettings, DashboardApi, DocumentRequest, FailureKind, FileEntry,
    PreviewChunk, ReqwestApi,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

fn document(dir: &TempDir) -> DocumentRequest {
    let file = dir.path().join("panduan.txt");
    std::fs::write(&file, "Layanan KTP buka setiap hari kerja.").expect("write doc");
    DocumentRequest {
        file,
        chunk_size: 2000,
        chunk_overlap: 400,
    }
}

#[tokio::test]
async fn lists_files_with_changed_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {"id": 3, "filename": "a.pdf", "filetype": "pdf", "uploaded_at": "2024-05-01 10:00", "changed": true},
                {"id": 4, "filename": "b.txt", "filetype": "txt", "uploaded_at": "2024-05-02 11:30"}
            ]
        })))
        .mount(&server)
        .await;

    let files = api_for(&server).list_files().await.expect("files");
    assert_eq!(
        files,
        vec![
            FileEntry {
                id: 3,
                filename: "a.pdf".into(),
                filetype: "pdf".into(),
                uploaded_at: "2024-05-01 10:00".into(),
                changed: true,
            },
            FileEntry {
                id: 4,
                filename: "b.txt".into(),
                filetype: "txt".into(),
                uploaded_at: "2024-05-02 11:30".into(),
                changed: false,
            },
        ]
    );
}

#[tokio::test]
async fn base_url_with_path_prefix_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/desk/api/kb_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "active"})))
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ClientSettings {
        base_url: format!("{}/desk", server.uri()),
        ..ClientSettings::default()
    })
    .expect("client");
    let reply = api.kb_status().await.expect("status");
    assert_eq!(reply.status, "active");
}

#[tokio::test]
async fn embed_progress_defaults_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/embed_progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let reply = api_for(&server).embed_progress().await.expect("progress");
    assert_eq!(reply.status, "idle");
    assert_eq!(reply.progress, None);
    assert_eq!(reply.message, None);
}

#[tokio::test]
async fn delete_sends_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/delete/7"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server).delete_file(7).await.expect("deleted");
}

#[tokio::test]
async fn delete_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/delete/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = api_for(&server).delete_file(9).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn embed_scope_selects_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/embed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/embed_all"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.start_embedding(false).await.expect("changed");
    api.start_embedding(true).await.expect("all");
}

#[tokio::test]
async fn preview_posts_multipart_and_parses_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/preview-chunking"))
        .and(body_string_contains("name=\"chunk_size\""))
        .and(body_string_contains("name=\"chunk_overlap\""))
        .and(body_string_contains("filename=\"panduan.txt\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "preview_chunks": [
                {"chunk_number": 1, "content": "Layanan KTP"},
                {"chunk_number": 2, "content": "buka setiap hari kerja."}
            ]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let reply = api_for(&server)
        .preview_chunking(&document(&dir))
        .await
        .expect("preview");
    assert!(reply.success);
    assert_eq!(
        reply.preview_chunks,
        Some(vec![
            PreviewChunk {
                chunk_number: 1,
                content: "Layanan KTP".into(),
            },
            PreviewChunk {
                chunk_number: 2,
                content: "buka setiap hari kerja.".into(),
            },
        ])
    );
}

#[tokio::test]
async fn preview_error_body_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/preview-chunking"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Unsupported file type"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let reply = api_for(&server)
        .preview_chunking(&document(&dir))
        .await
        .expect("semantic failure is still a reply");
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Unsupported file type"));
}

#[tokio::test]
async fn preview_without_json_body_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/preview-chunking"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let err = api_for(&server)
        .preview_chunking(&document(&dir))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn missing_document_is_io_failure() {
    let server = MockServer::start().await;
    let request = DocumentRequest {
        file: "/nonexistent/kbdesk/panduan.txt".into(),
        chunk_size: 2000,
        chunk_overlap: 400,
    };

    let err = api_for(&server).upload_document(&request).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn upload_posts_to_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin"))
        .and(body_string_contains("Layanan KTP"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    api_for(&server)
        .upload_document(&document(&dir))
        .await
        .expect("uploaded");
}

#[tokio::test]
async fn chat_uses_camel_case_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "message": "halo",
            "user_id": "web-user-1700000000000-abc123def",
            "conversationHasStarted": false,
            "isInitialGreetingSent": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": "Halo! Ada yang bisa dibantu?"})),
        )
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .send_chat(&ChatMessage {
            message: "halo".into(),
            user_id: "web-user-1700000000000-abc123def".into(),
            conversation_has_started: false,
            is_initial_greeting_sent: false,
        })
        .await
        .expect("reply");
    assert_eq!(reply.response, "Halo! Ada yang bisa dibantu?");
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/kb_status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "active"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(100),
        ..ClientSettings::default()
    })
    .expect("client");
    let err = api.kb_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestApi::new(ClientSettings {
        base_url: "not a url".into(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
