// src/server/handler.rs
use hyper::{Body, Method, Request, Response, StatusCode};
use rand::Rng;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;

pub const DEFAULT_GUEST: &str = "Guest";

/// Knobs for the demo backend.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    pub base_delay_ms: u64,
    /// Percentage of `/hello` and `/greet` requests answered with 500.
    pub fail_pct: f64,
}

/// The two services the panel probes: `/hello` and `/greet?name=`.
#[derive(Clone)]
pub struct BackendHandler {
    options: Arc<BackendOptions>,
    req_counter: Arc<AtomicU64>,
}

impl BackendHandler {
    pub fn new(options: BackendOptions) -> Self {
        Self {
            options: Arc::new(options),
            req_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn requests_served(&self) -> u64 {
        self.req_counter.load(Ordering::SeqCst)
    }
}

impl Service<Request<Body>> for BackendHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let options = self.options.clone();
        let n = self.req_counter.fetch_add(1, Ordering::SeqCst) + 1;

        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let query = req.uri().query().map(str::to_owned);

        Box::pin(async move {
            let response = respond(&method, &path, query.as_deref(), &options).await;
            tracing::debug!(
                req = n,
                %method,
                %path,
                status = response.status().as_u16(),
                "served"
            );
            Ok(response)
        })
    }
}

async fn respond(
    method: &Method,
    path: &str,
    query: Option<&str>,
    options: &BackendOptions,
) -> Response<Body> {
    if path != "/hello" && path != "/greet" {
        return text(StatusCode::NOT_FOUND, "Not Found".to_string());
    }
    if *method != Method::GET {
        return text(
            StatusCode::METHOD_NOT_ALLOWED,
            "Unsupported request method.".to_string(),
        );
    }

    if options.base_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(options.base_delay_ms)).await;
    }
    if inject_failure(options.fail_pct) {
        return text(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Injected failure".to_string(),
        );
    }

    if path == "/hello" {
        text(StatusCode::OK, "Hello, World!".to_string())
    } else {
        let name = greet_name(query);
        text(StatusCode::OK, format!("Hello, {}!", name))
    }
}

fn inject_failure(fail_pct: f64) -> bool {
    fail_pct > 0.0 && rand::thread_rng().gen_bool((fail_pct / 100.0).min(1.0))
}

fn greet_name(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "name")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_GUEST.to_string())
}

fn text(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}
