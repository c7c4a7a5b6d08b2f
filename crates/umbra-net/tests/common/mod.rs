//! Minimal HTTP responder for adapter tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Request as seen by a handler: request line and body
pub struct Request {
    pub line: String,
    pub body: Vec<u8>,
}

type Handler = Arc<dyn Fn(&Request) -> (u16, String) + Send + Sync>;

/// Serve every connection with `handler`; returns the base URL
pub async fn serve<F>(handler: F) -> String
where
    F: Fn(&Request) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler: Handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let handler = handler.clone();
            tokio::spawn(async move {
                let _ = respond(stream, handler).await;
            });
        }
    });

    format!("http://{}", addr)
}

/// Serve JSON-RPC replies keyed by method name
///
/// Each value is the reply minus `jsonrpc` and `id`, e.g.
/// `{"result": "0x1"}` or `{"error": {...}}`.
pub async fn serve_rpc(replies: HashMap<&'static str, Value>) -> String {
    serve(move |req| {
        let call: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
        let method = call["method"].as_str().unwrap_or_default();
        let mut reply = replies.get(method).cloned().unwrap_or_else(|| {
            json!({ "error": { "code": -32601, "message": "method not found" } })
        });
        reply["jsonrpc"] = json!("2.0");
        reply["id"] = call["id"].clone();
        (200, reply.to_string())
    })
    .await
}

async fn respond(mut stream: TcpStream, handler: Handler) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = Request {
        line: head.lines().next().unwrap_or_default().to_string(),
        body: buf[header_end..].to_vec(),
    };
    let (status, body) = handler(&request);
    let response = format!(
        "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
