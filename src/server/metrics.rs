// src/server/metrics.rs
use super::{listener::bind_tcp, ServerBuilder};
use crate::metrics::MetricsRegistry;
use anyhow::Result;
use hyper::{header, Body, Request, Response, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower::Service;

/// Serves the prometheus text format on a single path.
#[derive(Clone)]
pub struct MetricsHandler {
    registry: Arc<MetricsRegistry>,
    path: Arc<str>,
}

impl MetricsHandler {
    pub fn new(registry: Arc<MetricsRegistry>, path: &str) -> Self {
        Self {
            registry,
            path: Arc::from(path),
        }
    }

    fn respond(&self, req: &Request<Body>) -> Response<Body> {
        if req.uri().path() != &*self.path {
            let mut response = Response::new(Body::from("Not Found"));
            *response.status_mut() = StatusCode::NOT_FOUND;
            return response;
        }

        match self.registry.gather() {
            Ok(metrics) => {
                let mut response = Response::new(Body::from(metrics));
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("text/plain; version=0.0.4"),
                );
                response
            }
            Err(e) => {
                tracing::error!("Failed to encode metrics: {}", e);
                let mut response = Response::new(Body::from("metrics unavailable"));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }
}

impl Service<Request<Body>> for MetricsHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        futures::future::ready(Ok(self.respond(&req)))
    }
}

/// Bind `addr`, then serve metrics in the background until `shutdown`
/// resolves. A bind failure is returned to the caller.
pub async fn start_metrics_server<F>(
    addr: SocketAddr,
    handler: MetricsHandler,
    shutdown: F,
) -> Result<(SocketAddr, JoinHandle<()>)>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind_tcp(addr).await?;
    let local_addr = listener.local_addr()?;

    let task = tokio::spawn(async move {
        let server = ServerBuilder::new(local_addr)
            .with_listener(listener)
            .with_handler(handler);
        if let Err(e) = server.serve_with_shutdown(shutdown).await {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    Ok((local_addr, task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    async fn get(handler: MetricsHandler, uri: &str) -> Response<Body> {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        handler.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn serves_registry_on_configured_path() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        let handler = MetricsHandler::new(registry, "/metrics");

        let response = get(handler.clone(), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("pinger_service_status"));

        let response = get(handler, "/other").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn start_fails_when_port_is_taken() {
        let held = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = held.local_addr().unwrap();
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        let handler = MetricsHandler::new(registry, "/metrics");

        let result = start_metrics_server(addr, handler, std::future::pending()).await;

        let err = result.err().expect("bind on a held port must fail");
        assert!(err.to_string().contains("Failed to bind"));
    }

    #[tokio::test]
    async fn started_server_answers_until_shutdown() {
        let registry = Arc::new(MetricsRegistry::new().unwrap());
        let handler = MetricsHandler::new(registry, "/metrics");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let (addr, task) = start_metrics_server(
            "127.0.0.1:0".parse().unwrap(),
            handler,
            async move {
                let _ = stop_rx.await;
            },
        )
        .await
        .unwrap();

        let body = reqwest::get(format!("http://{}/metrics", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("pinger_service_status"));

        stop_tx.send(()).unwrap();
        task.await.unwrap();
    }
}
