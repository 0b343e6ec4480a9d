//! Score client against a throwaway HTTP server on loopback.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use arcade_vault::api::{ApiError, NewScore, ScoreClient};
use serde_json::{json, Value};

struct Request {
    method: String,
    path: String,
    body: String,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; length];
    reader.read_exact(&mut body).ok()?;
    Some(Request { method, path, body: String::from_utf8_lossy(&body).into_owned() })
}

fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let reply = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(reply.as_bytes());
    let _ = stream.flush();
}

/// Serves `/api/scores/` from an in-memory list. `wrap` answers GETs with
/// the `{"results": [...]}` envelope; `post_reply` overrides the POST body.
fn spawn_server(wrap: bool, post_reply: Option<Value>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let stored: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let Some(req) = read_request(&mut stream) else { continue };
            if req.path != "/api/scores/" {
                respond(&mut stream, "404 Not Found", r#"{"detail":"Not found"}"#);
                continue;
            }
            match req.method.as_str() {
                "GET" => {
                    let list = Value::Array(stored.lock().unwrap().clone());
                    let body = if wrap { json!({ "results": list }) } else { list };
                    respond(&mut stream, "200 OK", &body.to_string());
                }
                "POST" => {
                    let record: Value = serde_json::from_str(&req.body).unwrap();
                    stored.lock().unwrap().push(record.clone());
                    let reply = post_reply.clone().unwrap_or(record);
                    respond(&mut stream, "201 Created", &reply.to_string());
                }
                _ => respond(&mut stream, "405 Method Not Allowed", "{}"),
            }
        }
    });

    format!("http://{addr}")
}

fn spawn_failing_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            if read_request(&mut stream).is_some() {
                respond(&mut stream, "500 Internal Server Error", r#"{"detail":"boom"}"#);
            }
        }
    });
    format!("http://{addr}")
}

#[test]
fn test_submit_then_fetch_round_trip() {
    let client = ScoreClient::new(&spawn_server(false, None));

    assert!(client.fetch_scores().unwrap().is_empty());

    let created = client
        .submit_score(&NewScore::new(Some("ana".into()), 120, Some("pong".into())))
        .unwrap();
    assert_eq!(created.name.as_deref(), Some("ana"));
    assert_eq!(created.score, 120);

    let scores = client.fetch_scores().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].game.as_deref(), Some("pong"));
    assert_eq!(scores[0].score, 120);
}

#[test]
fn test_results_envelope_and_ok_reply() {
    let base = spawn_server(true, Some(json!({ "ok": true })));
    // Trailing slash on the base is tolerated
    let client = ScoreClient::new(&format!("{base}/"));

    let created = client
        .submit_score(&NewScore::new(Some("bo".into()), 9, Some("chicken-run".into())))
        .unwrap();
    // Reply carried no record, so the submission is echoed
    assert_eq!(created.name.as_deref(), Some("bo"));
    assert_eq!(created.score, 9);

    let scores = client.fetch_scores().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].name.as_deref(), Some("bo"));
}

#[test]
fn test_server_errors_map_to_fixed_messages() {
    let client = ScoreClient::new(&spawn_failing_server());

    let err = client.fetch_scores().unwrap_err();
    assert_eq!(err, ApiError::FetchFailed);
    assert_eq!(err.to_string(), "Failed to fetch scores");

    let err = client.submit_score(&NewScore::new(None, 1, None)).unwrap_err();
    assert_eq!(err, ApiError::SubmitFailed);
    assert_eq!(err.to_string(), "Failed to post score");
}
