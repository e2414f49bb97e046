//! The REST client against a minimal in-process imitation of the service.

use pdf_translate::{
    ContentId, ContentStatus, ExtractionGraph, ExtractionService, HttpExtractionService,
    TranslateError, TranslationConfig,
};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Log = Arc<Mutex<Vec<String>>>;

/// Answer one request; returns (status line, body).
fn route(method: &str, path: &str, tasks_json: &str) -> (&'static str, Vec<u8>) {
    match (method, path) {
        ("POST", "/namespaces/default/extraction_graphs") => ("200 OK", b"{}".to_vec()),
        // Every graph in this namespace is already registered.
        ("POST", "/namespaces/taken/extraction_graphs") => {
            ("409 Conflict", b"graph already exists".to_vec())
        }
        ("POST", "/namespaces/default/extraction_graphs/pdf_translator/extract") => {
            ("200 OK", br#"{"content_id":"abc123"}"#.to_vec())
        }
        ("GET", "/namespaces/default/content/abc123/tasks") => ("200 OK", tasks_json.as_bytes().to_vec()),
        (
            "GET",
            "/namespaces/default/extraction_graphs/pdf_translator/extraction_policies/pdf_to_french/content/abc123",
        ) => (
            "200 OK",
            br#"{"content_tree_metadata":[
                {"id":"abc123","mime_type":"application/pdf","source":""},
                {"id":"child1","mime_type":"text/plain","source":"pdf_to_french"}
            ]}"#
            .to_vec(),
        ),
        ("GET", "/namespaces/default/content/child1/download") => {
            ("200 OK", "Bonjour le monde".as_bytes().to_vec())
        }
        _ => ("404 Not Found", b"no such route".to_vec()),
    }
}

async fn spawn_server(tasks_json: &'static str) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let server_log = log.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let log = server_log.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let header_end = loop {
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                };

                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                while buf.len() < header_end + content_length {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
                let method = request_line.next().unwrap_or("").to_string();
                let path = request_line.next().unwrap_or("").to_string();
                log.lock().unwrap().push(format!("{method} {path}"));

                let (status, body) = route(&method, &path, tasks_json);
                let response_head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(response_head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), log)
}

fn client_in(base: &str, namespace: &str, reuse_existing_graph: bool) -> HttpExtractionService {
    let config = TranslationConfig::builder()
        .server_url(base)
        .namespace(namespace)
        .request_timeout_secs(5)
        .reuse_existing_graph(reuse_existing_graph)
        .build()
        .unwrap();
    HttpExtractionService::new(&config).unwrap()
}

fn client(base: &str) -> HttpExtractionService {
    let config = TranslationConfig::builder()
        .server_url(base)
        .request_timeout_secs(5)
        .build()
        .unwrap();
    HttpExtractionService::new(&config).unwrap()
}

#[tokio::test]
async fn full_exchange() {
    let (base, log) = spawn_server(r#"{"tasks":[{"id":"t1","extraction_policy_id":"pdf_to_french","outcome":"Success"}]}"#).await;
    let service = client(&base);

    let mut pdf = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    std::io::Write::write_all(&mut pdf, b"%PDF-1.7 test").unwrap();

    service
        .create_extraction_graph(&ExtractionGraph::pdf_translator("gpt-4o", "k"))
        .await
        .unwrap();
    let id = service.upload_file("pdf_translator", pdf.path()).await.unwrap();
    assert_eq!(id, ContentId::from("abc123"));

    assert_eq!(service.content_status(&id).await.unwrap(), ContentStatus::Completed);

    let artifacts = service
        .extracted_content(&id, "pdf_translator", "pdf_to_french")
        .await
        .unwrap();
    assert_eq!(artifacts.len(), 1, "root content must be filtered out");
    assert_eq!(artifacts[0].id, "child1");
    assert_eq!(artifacts[0].content, "Bonjour le monde".as_bytes());

    let log = log.lock().unwrap();
    assert_eq!(log[0], "POST /namespaces/default/extraction_graphs");
    assert_eq!(log[1], "POST /namespaces/default/extraction_graphs/pdf_translator/extract");
}

#[tokio::test]
async fn pending_until_tasks_exist() {
    let (base, _) = spawn_server(r#"{"tasks":[]}"#).await;
    let status = client(&base)
        .content_status(&ContentId::from("abc123"))
        .await
        .unwrap();
    assert_eq!(status, ContentStatus::Pending);
}

#[tokio::test]
async fn failed_task_surfaces_as_failed_status() {
    let (base, _) = spawn_server(r#"{"tasks":[{"id":"t1","extraction_policy_id":"pdf_to_french","outcome":"Failed"}]}"#).await;
    let status = client(&base)
        .content_status(&ContentId::from("abc123"))
        .await
        .unwrap();
    assert!(matches!(status, ContentStatus::Failed { .. }), "got {status:?}");
}

#[tokio::test]
async fn unknown_route_is_a_service_error() {
    let (base, _) = spawn_server(r#"{"tasks":[]}"#).await;
    let err = client(&base)
        .content_status(&ContentId::from("other"))
        .await
        .unwrap_err();
    match err {
        TranslateError::ServiceError { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such route");
        }
        other => panic!("expected ServiceError, got {other:?}"),
    }
}

#[tokio::test]
async fn existing_graph_is_an_error_by_default() {
    let (base, log) = spawn_server(r#"{"tasks":[]}"#).await;
    let graph = ExtractionGraph::translator_for("Spanish", "gpt-4o", "k");

    let err = client_in(&base, "taken", false)
        .create_extraction_graph(&graph)
        .await
        .unwrap_err();

    match err {
        TranslateError::GraphExists { name, namespace } => {
            assert_eq!(name, "pdf_translator_spanish");
            assert_eq!(namespace, "taken");
        }
        other => panic!("expected GraphExists, got {other:?}"),
    }
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn existing_graph_is_accepted_when_reuse_is_requested() {
    let (base, _) = spawn_server(r#"{"tasks":[]}"#).await;
    client_in(&base, "taken", true)
        .create_extraction_graph(&ExtractionGraph::pdf_translator("gpt-4o", "k"))
        .await
        .expect("409 with reuse enabled is not an error");
}

#[tokio::test]
async fn reserved_characters_in_ids_stay_inside_their_segment() {
    let (base, log) = spawn_server(r#"{"tasks":[]}"#).await;
    let err = client(&base)
        .content_status(&ContentId::from("a/b?c#d"))
        .await
        .unwrap_err();

    assert!(matches!(err, TranslateError::ServiceError { status: 404, .. }), "got {err:?}");
    assert_eq!(
        log.lock().unwrap()[0],
        "GET /namespaces/default/content/a%2Fb%3Fc%23d/tasks"
    );
}

#[tokio::test]
async fn zero_request_timeout_still_talks_to_the_server() {
    let (base, _) = spawn_server(r#"{"tasks":[{"id":"t1","extraction_policy_id":"pdf_to_french","outcome":"Success"}]}"#).await;
    let config = TranslationConfig::builder()
        .server_url(&base)
        .request_timeout_secs(0)
        .build()
        .unwrap();
    let status = HttpExtractionService::new(&config)
        .unwrap()
        .content_status(&ContentId::from("abc123"))
        .await
        .unwrap();
    assert_eq!(status, ContentStatus::Completed);
}
