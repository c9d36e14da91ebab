use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehavior {
    Normal,
    /// Every request answers 500.
    Broken,
    /// Every success response carries a body that is not JSON.
    Garbled,
}

/// In-memory book service speaking the `/books` REST contract.
pub struct BookServiceStub {
    pub base_url: String,
    books: Arc<Mutex<Vec<Value>>>,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
impl BookServiceStub {
    pub fn spawn(seed: Vec<Value>, behavior: StubBehavior) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start book service stub");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let books = Arc::new(Mutex::new(seed));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_books = Arc::clone(&books);
        let thread_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let method = request.method().to_string();
                let path = request.url().to_string();
                thread_requests
                    .lock()
                    .unwrap()
                    .push(format!("{method} {path}"));

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(json_response(
                        400,
                        &serde_json::json!({"error": "invalid request body"}),
                    ));
                    continue;
                }

                if behavior == StubBehavior::Broken {
                    let _ = request.respond(json_response(
                        500,
                        &serde_json::json!({"error": "database is locked"}),
                    ));
                    continue;
                }

                let (status, payload) =
                    handle_books(&thread_books, request.method(), &path, &body);
                let response = if behavior == StubBehavior::Garbled && status < 300 {
                    tiny_http::Response::from_string("<html>maintenance</html>")
                        .with_status_code(status)
                } else {
                    json_response(status, &payload)
                };
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            books,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn books(&self) -> Vec<Value> {
        self.books.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for BookServiceStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[allow(dead_code)]
pub fn book(id: i64, title: &str, author: &str, year: i64) -> Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "author": author,
        "published_year": year,
    })
}

fn json_response(status: u16, payload: &Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("build header");
    tiny_http::Response::from_string(payload.to_string())
        .with_status_code(status)
        .with_header(header)
}

fn not_found() -> (u16, Value) {
    (404, serde_json::json!({"error": "Book not found"}))
}

fn handle_books(
    books: &Mutex<Vec<Value>>,
    method: &tiny_http::Method,
    path: &str,
    body: &str,
) -> (u16, Value) {
    let mut books = books.lock().unwrap();

    if path == "/books" {
        return match method {
            tiny_http::Method::Get => (200, Value::Array(books.clone())),
            tiny_http::Method::Post => {
                let Ok(data) = serde_json::from_str::<Value>(body) else {
                    return (400, serde_json::json!({"error": "invalid json"}));
                };
                let title = data.get("title").and_then(Value::as_str).unwrap_or("");
                let author = data.get("author").and_then(Value::as_str).unwrap_or("");
                if title.is_empty() || author.is_empty() {
                    return (
                        400,
                        serde_json::json!({"error": "Title and Author are required"}),
                    );
                }
                let next_id = books
                    .iter()
                    .filter_map(|b| b.get("id").and_then(Value::as_i64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                let created = serde_json::json!({
                    "id": next_id,
                    "title": title,
                    "author": author,
                    "published_year": data.get("published_year").cloned().unwrap_or(Value::Null),
                });
                books.push(created.clone());
                (201, created)
            }
            _ => (405, serde_json::json!({"error": "method not allowed"})),
        };
    }

    let Some(id) = path.strip_prefix("/books/") else {
        return (404, serde_json::json!({"error": "not found"}));
    };
    let Some(index) = books
        .iter()
        .position(|b| b.get("id").map(|v| v.to_string()).as_deref() == Some(id))
    else {
        return not_found();
    };

    match method {
        tiny_http::Method::Get => (200, books[index].clone()),
        tiny_http::Method::Put => {
            let Ok(data) = serde_json::from_str::<Value>(body) else {
                return (400, serde_json::json!({"error": "invalid json"}));
            };
            let book = &mut books[index];
            for field in ["title", "author", "published_year"] {
                if let Some(value) = data.get(field) {
                    book[field] = value.clone();
                }
            }
            (200, book.clone())
        }
        tiny_http::Method::Delete => {
            books.remove(index);
            (200, serde_json::json!({"message": "Book deleted"}))
        }
        _ => (405, serde_json::json!({"error": "method not allowed"})),
    }
}
