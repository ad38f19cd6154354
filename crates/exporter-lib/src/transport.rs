//! HTTP/1.1 over the engine's Unix domain socket
//!
//! The transport only decides *where* bytes go: a [`Dialer`] hands back a
//! connected byte stream and hyper does the HTTP framing on top of it,
//! exactly as it would over TCP. The request host is a fixed placeholder
//! and is never resolved.

use crate::error::{ExporterError, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::{ACCEPT, HOST};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixStream;
use tracing::debug;

/// Default location of the Docker engine socket
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Host header sent with every engine request
pub const ENGINE_HOST: &str = "docker";

/// Default bound on dialing and on each request/response exchange
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens a fresh byte stream to the engine
#[async_trait]
pub trait Dialer: Send + Sync {
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    async fn dial(&self) -> Result<Self::Io>;
}

/// Dials a fixed Unix domain socket path
#[derive(Debug, Clone)]
pub struct UnixSocketDialer {
    path: PathBuf,
}

impl UnixSocketDialer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for UnixSocketDialer {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_PATH)
    }
}

#[async_trait]
impl Dialer for UnixSocketDialer {
    type Io = UnixStream;

    async fn dial(&self) -> Result<UnixStream> {
        UnixStream::connect(&self.path).await.map_err(|e| {
            ExporterError::connection(
                format!("failed to connect to engine at {}", self.path.display()),
                e,
            )
        })
    }
}

/// Issues GET requests to the engine over connections from a [`Dialer`]
///
/// Every request dials a new connection; nothing is pooled.
pub struct SocketTransport<D> {
    dialer: D,
    timeout: Duration,
}

impl<D: Dialer> SocketTransport<D> {
    pub fn new(dialer: D) -> Self {
        Self {
            dialer,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the bound applied to dialing and to each exchange
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// GET `path` (origin-form, e.g. `/containers/json?all=true`) and
    /// return the body of a 2xx response
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(HOST, ENGINE_HOST)
            .header(ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| ExporterError::fetch_with(format!("invalid request path {path}"), e))?;

        let io = tokio::time::timeout(self.timeout, self.dialer.dial())
            .await
            .map_err(|e| ExporterError::connection("timed out dialing engine", e))??;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(io))
            .await
            .map_err(|e| ExporterError::fetch_with("HTTP handshake with engine failed", e))?;

        let conn_task = tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "Engine connection closed");
            }
        });

        let exchange = async {
            let response = sender
                .send_request(request)
                .await
                .map_err(|e| ExporterError::fetch_with(format!("GET {path} failed"), e))?;

            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| ExporterError::fetch_with(format!("failed to read body of {path}"), e))?
                .to_bytes();

            if !status.is_success() {
                return Err(ExporterError::fetch(format!(
                    "engine returned {} for {}: {}",
                    status,
                    path,
                    String::from_utf8_lossy(&body).trim()
                )));
            }

            Ok::<_, ExporterError>(body)
        };

        let result = tokio::time::timeout(self.timeout, exchange).await;
        conn_task.abort();

        match result {
            Ok(body) => body,
            Err(elapsed) => Err(ExporterError::fetch_with(
                format!("GET {path} timed out after {:?}", self.timeout),
                elapsed,
            )),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A tiny hyper server on a Unix socket, standing in for the engine

    use http_body_util::Full;
    use hyper::body::{Bytes, Incoming};
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::net::UnixListener;

    /// Canned response for one request path (path and query)
    #[derive(Clone)]
    pub struct Route {
        pub status: StatusCode,
        pub body: String,
        pub delay: Option<Duration>,
    }

    impl Route {
        pub fn ok(body: impl Into<String>) -> Self {
            Self {
                status: StatusCode::OK,
                body: body.into(),
                delay: None,
            }
        }

        pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
            Self {
                status,
                body: body.into(),
                delay: None,
            }
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    pub struct FakeEngine {
        _dir: TempDir,
        pub socket_path: PathBuf,
        pub hosts: Arc<Mutex<Vec<String>>>,
        pub connections: Arc<AtomicUsize>,
        _task: tokio::task::JoinHandle<()>,
    }

    impl FakeEngine {
        pub fn start(routes: HashMap<String, Route>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let socket_path = dir.path().join("docker.sock");
            let listener = UnixListener::bind(&socket_path).unwrap();
            let routes = Arc::new(routes);
            let hosts = Arc::new(Mutex::new(Vec::new()));
            let seen = hosts.clone();
            let connections = Arc::new(AtomicUsize::new(0));
            let accepted = connections.clone();

            let task = tokio::spawn(async move {
                loop {
                    let (stream, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let routes = routes.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<Incoming>| {
                            let routes = routes.clone();
                            let seen = seen.clone();
                            async move {
                                if let Some(host) = req.headers().get("host") {
                                    seen.lock()
                                        .unwrap()
                                        .push(host.to_str().unwrap_or_default().to_string());
                                }
                                let key = req
                                    .uri()
                                    .path_and_query()
                                    .map(|pq| pq.as_str().to_string())
                                    .unwrap_or_default();
                                let route = routes.get(&key).cloned().unwrap_or_else(|| {
                                    Route::status(
                                        StatusCode::NOT_FOUND,
                                        r#"{"message":"page not found"}"#,
                                    )
                                });
                                if let Some(delay) = route.delay {
                                    tokio::time::sleep(delay).await;
                                }
                                let response = Response::builder()
                                    .status(route.status)
                                    .header("content-type", "application/json")
                                    .body(Full::new(Bytes::from(route.body)))
                                    .unwrap();
                                Ok::<_, Infallible>(response)
                            }
                        });
                        let _ = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await;
                    });
                }
            });

            Self {
                _dir: dir,
                socket_path,
                hosts,
                connections,
                _task: task,
            }
        }
    }
}
