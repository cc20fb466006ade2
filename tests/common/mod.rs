//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use config_fanout_proxy::registry::RegistryClientFactory;
use config_fanout_proxy::{HttpServer, ServiceConfig, Shutdown};

/// A request seen by a mock backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest { method, path, headers, body })
}

async fn write_response(socket: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "200 OK",
        403 => "403 Forbidden",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// In-process stand-in for Consul's KV HTTP API.
#[derive(Clone)]
#[allow(dead_code)]
pub struct MockConsul {
    pub addr: SocketAddr,
    pub store: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockConsul {
    pub fn seed(&self, key: &str, value: &str) {
        self.store.lock().unwrap().insert(key.to_string(), value.as_bytes().to_vec());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.store
            .lock()
            .unwrap()
            .get(key)
            .map(|v| String::from_utf8_lossy(v).to_string())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock Consul on an ephemeral port.
#[allow(dead_code)]
pub async fn start_mock_consul() -> MockConsul {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = MockConsul {
        addr: listener.local_addr().unwrap(),
        store: Arc::default(),
        requests: Arc::default(),
    };

    let state = mock.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                state.requests.lock().unwrap().push(request.clone());

                let key = request
                    .path
                    .split('?')
                    .next()
                    .and_then(|p| p.strip_prefix("/v1/kv/"))
                    .map(str::to_string);

                let (status, body) = match (request.method.as_str(), key) {
                    ("GET", Some(key)) => {
                        if state.store.lock().unwrap().contains_key(&key) {
                            (200, format!(r#"[{{"Key":"{}"}}]"#, key))
                        } else {
                            (404, String::new())
                        }
                    }
                    ("PUT", Some(key)) => {
                        state.store.lock().unwrap().insert(key, request.body);
                        (200, "true".to_string())
                    }
                    _ => (404, String::new()),
                };
                write_response(&mut socket, status, &body).await;
            });
        }
    });

    mock
}

/// Start a backend answering every request with `f()`.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_none() {
                    return;
                }
                let (status, body) = f().await;
                write_response(&mut socket, status, &body).await;
            });
        }
    });

    addr
}

/// A running proxy bound to an ephemeral port.
#[allow(dead_code)]
pub struct RunningProxy {
    pub url: String,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config pointing the registry at `registry_addr`.
#[allow(dead_code)]
pub fn config_for(registry_addr: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.registry.host = registry_addr.ip().to_string();
    config.registry.port = registry_addr.port();
    config.registry.timeout_secs = 5;
    config
}

/// Start the proxy with `server`.
#[allow(dead_code)]
pub async fn start_proxy(server: HttpServer) -> RunningProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (config_tx, config_rx) = mpsc::unbounded_channel();

    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, config_rx, server_shutdown).await;
    });

    RunningProxy {
        url: format!("http://{}", addr),
        shutdown,
        config_tx,
    }
}

/// Start the proxy with a custom registry factory.
#[allow(dead_code)]
pub async fn start_proxy_with_factory(
    config: ServiceConfig,
    factory: Arc<dyn RegistryClientFactory>,
) -> RunningProxy {
    start_proxy(HttpServer::with_factory(config, factory)).await
}

/// HTTP client that never reuses connections.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
