use std::time::Duration;

use ipl_types::ContentHash;
use reqwest::blocking::{multipart, Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::config::BlobStoreConfig;
use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

/// Client for an IPFS-compatible HTTP API (`/api/v0`).
///
/// `upload` posts the content as multipart form data to `/add` and returns
/// the `Hash` field of the reply. `fetch` posts to `/cat?arg=<hash>` and
/// returns the body. Requests are blocking.
#[derive(Debug)]
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    pin: bool,
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Message")]
    message: String,
}

impl HttpBlobStore {
    pub fn new(config: &BlobStoreConfig) -> BlobResult<Self> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| BlobError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: format!("http://{}/api/v0", config.endpoint()),
            pin: config.pin,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check(resp: Response, operation: &str) -> BlobResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(BlobError::Remote {
            status: status.as_u16(),
            message: format!("{operation}: {}", parse_error_message(&body)),
        })
    }
}

/// Extract the content hash from an `/add` reply.
///
/// The API streams one JSON object per line; the first names the uploaded
/// content.
pub(crate) fn parse_add_response(body: &str) -> BlobResult<ContentHash> {
    let line = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| BlobError::InvalidResponse("empty add response".into()))?;
    let reply: AddResponse =
        serde_json::from_str(line).map_err(|e| BlobError::InvalidResponse(e.to_string()))?;
    if reply.hash.is_empty() {
        return Err(BlobError::InvalidResponse("add response carries no hash".into()));
    }
    Ok(ContentHash::new(reply.hash))
}

/// The `Message` of an API error body, or the body itself.
pub(crate) fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn transport_error(operation: &str, e: reqwest::Error) -> BlobError {
    if e.is_timeout() {
        BlobError::Http(format!("{operation}: timed out"))
    } else {
        BlobError::Http(format!("{operation}: {e}"))
    }
}

impl BlobStore for HttpBlobStore {
    fn upload(&self, content: &[u8]) -> BlobResult<ContentHash> {
        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(content.to_vec()).file_name("data"));
        let resp = self
            .client
            .post(format!("{}/add", self.base_url))
            .query(&[("pin", self.pin)])
            .multipart(form)
            .send()
            .map_err(|e| transport_error("add", e))?;
        let body = Self::check(resp, "add")?
            .text()
            .map_err(|e| transport_error("add", e))?;
        let hash = parse_add_response(&body)?;
        debug!(hash = %hash, bytes = content.len(), pin = self.pin, "blob added");
        Ok(hash)
    }

    fn fetch(&self, hash: &ContentHash) -> BlobResult<Vec<u8>> {
        let resp = self
            .client
            .post(format!("{}/cat", self.base_url))
            .query(&[("arg", hash.as_str())])
            .send()
            .map_err(|e| transport_error("cat", e))?;
        let bytes = Self::check(resp, "cat")?
            .bytes()
            .map_err(|e| transport_error("cat", e))?;
        debug!(hash = %hash, bytes = bytes.len(), "blob fetched");
        Ok(bytes.to_vec())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return String::from_utf8_lossy(&buf).into_owned();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        let chunked = head.contains("transfer-encoding: chunked");
        loop {
            let done = match content_length {
                Some(len) => buf.len() >= header_end + len,
                None if chunked => buf.ends_with(b"0\r\n\r\n"),
                None => true,
            };
            if done {
                break;
            }
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answer exactly one request, returning what the client sent.
    fn serve_once(status: &'static str, body: &'static [u8]) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();
            request
        });
        (addr, handle)
    }

    fn store_for(addr: SocketAddr, pin: bool) -> HttpBlobStore {
        let config = BlobStoreConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            pin,
            timeout_secs: 5,
            ..Default::default()
        };
        HttpBlobStore::new(&config).unwrap()
    }

    #[test]
    fn base_url_from_config() {
        let store = HttpBlobStore::new(&BlobStoreConfig::default()).unwrap();
        assert_eq!(store.base_url(), "http://ipfs0:5001/api/v0");
    }

    #[test]
    fn parse_add_single_line() {
        let hash = parse_add_response(r#"{"Name":"data","Hash":"Qm123","Size":"11"}"#).unwrap();
        assert_eq!(hash.as_str(), "Qm123");
    }

    #[test]
    fn parse_add_takes_first_object() {
        let body = "{\"Name\":\"data\",\"Hash\":\"QmFile\"}\n{\"Name\":\"\",\"Hash\":\"QmDir\"}\n";
        assert_eq!(parse_add_response(body).unwrap().as_str(), "QmFile");
    }

    #[test]
    fn parse_add_rejects_garbage() {
        assert!(matches!(parse_add_response(""), Err(BlobError::InvalidResponse(_))));
        assert!(matches!(parse_add_response("<html>"), Err(BlobError::InvalidResponse(_))));
        assert!(matches!(
            parse_add_response(r#"{"Hash":""}"#),
            Err(BlobError::InvalidResponse(_))
        ));
    }

    #[test]
    fn parse_error_message_prefers_json() {
        assert_eq!(
            parse_error_message(r#"{"Message":"invalid path","Code":0,"Type":"error"}"#),
            "invalid path"
        );
        assert_eq!(parse_error_message(" bad gateway \n"), "bad gateway");
    }

    #[test]
    fn upload_posts_multipart_add() {
        let (addr, server) = serve_once("200 OK", br#"{"Name":"data","Hash":"Qm123","Size":"3"}"#);
        let store = store_for(addr, true);
        let hash = store.upload(b"abc").unwrap();
        assert_eq!(hash.as_str(), "Qm123");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/v0/add?pin=true "));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("abc"));
    }

    #[test]
    fn upload_without_pin() {
        let (addr, server) = serve_once("200 OK", br#"{"Hash":"QmNoPin"}"#);
        let store = store_for(addr, false);
        assert_eq!(store.upload(b"x").unwrap().as_str(), "QmNoPin");
        assert!(server.join().unwrap().starts_with("POST /api/v0/add?pin=false "));
    }

    #[test]
    fn fetch_posts_cat() {
        let (addr, server) = serve_once("200 OK", b"abc");
        let store = store_for(addr, true);
        assert_eq!(store.fetch(&ContentHash::from("Qm123")).unwrap(), b"abc");
        assert!(server.join().unwrap().starts_with("POST /api/v0/cat?arg=Qm123 "));
    }

    #[test]
    fn remote_failure_maps_to_remote_error() {
        let (addr, server) = serve_once(
            "500 Internal Server Error",
            br#"{"Message":"invalid path \"\": path does not have enough components","Code":0,"Type":"error"}"#,
        );
        let store = store_for(addr, true);
        let err = store.fetch(&ContentHash::empty()).unwrap_err();
        match err {
            BlobError::Remote { status, message } => {
                assert_eq!(status, 500);
                assert!(message.starts_with("cat: invalid path"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn unreachable_store_is_transport_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let store = store_for(addr, true);
        assert!(matches!(store.upload(b"abc"), Err(BlobError::Http(_))));
    }
}
