use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use axum::{
    body::{self, Body},
    http::{HeaderValue, Request, Response, StatusCode, Uri, header},
};
use entity::Employee;
use tower::{Layer, Service, ServiceExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{BackendError, BackendResult, BackendSettings, Route};

/// Largest create body the fake backend will buffer.
const MAX_BODY_BYTES: usize = 64 * 1024;

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

#[derive(Debug)]
struct Shared {
    fixture_uri: Uri,
    collection_path: String,
    latency: Duration,
}

/// Puts a [`FakeBackend`] in front of a transport service.
#[derive(Clone, Debug)]
pub struct FakeBackendLayer {
    shared: Arc<Shared>,
}

impl FakeBackendLayer {
    pub fn new(settings: BackendSettings) -> BackendResult<Self> {
        let path = settings.fixture_path();
        let fixture_uri =
            Uri::try_from(path.as_str()).map_err(|source| BackendError::InvalidFixturePath {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            shared: Arc::new(Shared {
                fixture_uri,
                collection_path: settings.collection_path,
                latency: settings.latency,
            }),
        })
    }
}

impl<S> Layer<S> for FakeBackendLayer {
    type Service = FakeBackend<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FakeBackend {
            inner,
            shared: self.shared.clone(),
        }
    }
}

/// Answers the employee endpoints locally and forwards everything else.
#[derive(Clone, Debug)]
pub struct FakeBackend<S> {
    inner: S,
    shared: Arc<Shared>,
}

impl<S> Service<Request<Body>> for FakeBackend<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<Response<Body>, S::Error>;

    // The inner transport is only polled on the paths that forward to it, so
    // synthesized responses never hold its capacity.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let route = Route::classify(req.method(), req.uri().path(), &self.shared.collection_path);
        let Some(route) = route else {
            let inner = self.inner.clone();
            return Box::pin(forward(inner, req));
        };
        debug!(route = route.name(), uri = %req.uri(), "fake backend intercepted request");

        let latency = self.shared.latency;
        match route {
            Route::List => {
                *req.uri_mut() = self.shared.fixture_uri.clone();
                let inner = self.inner.clone();
                Box::pin(async move {
                    let response = forward(inner, req).await?;
                    if response.status().is_success() {
                        tokio::time::sleep(latency).await;
                    } else {
                        warn!(status = %response.status(), "fixture fetch failed");
                    }
                    Ok(response)
                })
            }
            Route::Create => Box::pin(async move {
                let response = create_employee(req.into_body()).await;
                if response.status().is_success() {
                    tokio::time::sleep(latency).await;
                }
                Ok(response)
            }),
            Route::Delete(id) => Box::pin(async move {
                tokio::time::sleep(latency).await;
                Ok(text_response(StatusCode::OK, id))
            }),
        }
    }
}

async fn forward<S>(mut inner: S, req: Request<Body>) -> Result<Response<Body>, S::Error>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    inner.ready().await?.call(req).await
}

async fn create_employee(body: Body) -> Response<Body> {
    let bytes = match body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "unreadable create body");
            return text_response(StatusCode::BAD_REQUEST, "unreadable request body".into());
        }
    };
    let employee: Employee = match serde_json::from_slice(&bytes) {
        Ok(employee) => employee,
        Err(err) => {
            warn!(error = %err, "create body is not an employee");
            return text_response(StatusCode::BAD_REQUEST, format!("invalid employee: {err}"));
        }
    };
    let employee = employee.with_id(Uuid::new_v4().to_string());
    match serde_json::to_vec(&employee) {
        Ok(json) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(Body::from(json))
            .unwrap_or_else(|_| text_response(StatusCode::INTERNAL_SERVER_ERROR, String::new())),
        Err(err) => text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn text_response(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
