use headerdoc_transformer::{
    build_transformer, TransformError, TransformMode, TransformerConfig,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one HTTP response and hand back the raw request.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }

        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write");
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    });

    (format!("http://{addr}/v1"), handle)
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    buf.len() >= header_end + 4 + content_length
}

fn config(base_url: String) -> TransformerConfig {
    TransformerConfig {
        mode: TransformMode::Chat,
        base_url,
        api_key: Some("secret".to_string()),
        model: "doc-model".to_string(),
        ..TransformerConfig::default()
    }
}

#[tokio::test]
async fn chat_transformer_posts_block_and_returns_reply() {
    let reply = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": "## add {#add}\n"}}]
    })
    .to_string();
    let (base_url, server) = serve_once("HTTP/1.1 200 OK", reply).await;

    let transformer = build_transformer(&config(base_url)).expect("transformer");
    let doc = transformer
        .transform("int add(int a, int b);")
        .await
        .expect("transform");
    assert_eq!(doc, "## add {#add}\n");

    let request = server.await.expect("server task");
    let lowered = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /v1/chat/completions"), "{request}");
    assert!(lowered.contains("authorization: bearer secret"), "{request}");
    assert!(request.contains("\"model\":\"doc-model\""), "{request}");
    assert!(request.contains("int add(int a, int b);"), "{request}");
}

#[tokio::test]
async fn chat_transformer_surfaces_http_status() {
    let (base_url, server) = serve_once(
        "HTTP/1.1 503 Service Unavailable",
        r#"{"error":"overloaded"}"#.to_string(),
    )
    .await;

    let transformer = build_transformer(&config(base_url)).expect("transformer");
    let err = transformer.transform("void f(void);").await.unwrap_err();
    match err {
        TransformError::Status { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    server.await.expect("server task");
}
