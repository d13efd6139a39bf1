// Loopback HTTP server for client tests: replays canned responses and
// records each raw request.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub(crate) struct MockResponse {
    pub status: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: &'static str, body: impl Into<String>) -> Self {
        MockResponse {
            status,
            body: body.into(),
        }
    }

    pub fn no_content() -> Self {
        MockResponse {
            status: "204 No Content",
            body: String::new(),
        }
    }
}

/// Serve `responses` in order, one connection per request. The handle
/// resolves to the raw requests (head and body) that were received.
pub(crate) async fn serve(responses: Vec<MockResponse>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let raw = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                response.body.len(),
                response.body
            );
            socket.write_all(raw.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// First line of a raw request, e.g. `POST /auth/v1/token?grant_type=password HTTP/1.1`.
pub(crate) fn request_line(raw: &str) -> &str {
    raw.lines().next().unwrap_or("")
}

/// Body of a raw request.
pub(crate) fn request_body(raw: &str) -> &str {
    raw.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
}

/// Value of a header (case-insensitive name).
pub(crate) fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let name = name.to_ascii_lowercase();
    raw.lines().skip(1).take_while(|l| !l.is_empty()).find_map(|l| {
        let (k, v) = l.split_once(':')?;
        (k.trim().to_ascii_lowercase() == name).then(|| v.trim())
    })
}

/// Method and percent-decoded target, e.g. `GET /rest/v1/teams?id=in.("a")`.
pub(crate) fn decoded_target(raw: &str) -> String {
    let line = request_line(raw);
    let line = line.strip_suffix(" HTTP/1.1").unwrap_or(line);
    percent_decode(line)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                match u8::from_str_radix(hex, 16) {
                    Ok(b) => {
                        out.push(b);
                        i += 3;
                    }
                    Err(_) => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).to_string()
}
