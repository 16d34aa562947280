use std::convert::Infallible;

use axum::{
    body::{self, Body},
    http::{HeaderValue, Method, Request, Response, StatusCode, header},
};
use entity::Employee;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tower::{Service, ServiceExt, util::BoxCloneService};
use tracing::debug;

use crate::{ApiError, ApiResult, EMPLOYEES_PATH};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Escaped when an id is placed in the path, so it stays one segment.
const ID_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Anything that turns a request into a response without failing at the
/// transport level. Errors travel as status codes.
pub type Transport = BoxCloneService<Request<Body>, Response<Body>, Infallible>;

/// The three calls the desk makes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmployeeRequest {
    List,
    Create(Employee),
    Delete(String),
}

/// Response body, tagged by the endpoint that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmployeePayload {
    Employees(Vec<Employee>),
    Employee(Employee),
    Id(String),
}

impl EmployeePayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Employees(_) => "employee list",
            Self::Employee(_) => "employee",
            Self::Id(_) => "id",
        }
    }
}

/// A successful response: its status and decoded body, as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub body: T,
}

impl<T> Reply<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            status: self.status,
            body: f(self.body),
        }
    }
}

#[derive(Clone)]
pub struct EmployeeClient {
    transport: Transport,
    base: String,
}

impl EmployeeClient {
    pub fn new<S>(service: S) -> Self
    where
        S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        Self {
            transport: BoxCloneService::new(service),
            base: String::new(),
        }
    }

    /// Prefix every request path with `base` (e.g. `/api/v1`).
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn collection_path(&self) -> String {
        format!("{}{EMPLOYEES_PATH}", self.base)
    }

    pub async fn send(&self, request: EmployeeRequest) -> ApiResult<Reply<EmployeePayload>> {
        match request {
            EmployeeRequest::List => {
                let path = self.collection_path();
                let reply = self.dispatch(Method::GET, &path, Body::empty()).await?;
                let employees = serde_json::from_slice(&reply.body)
                    .map_err(|source| ApiError::Decode { path, source })?;
                Ok(reply.map(|_| EmployeePayload::Employees(employees)))
            }
            EmployeeRequest::Create(employee) => {
                let path = self.collection_path();
                let json = serde_json::to_vec(&employee).map_err(ApiError::Encode)?;
                let reply = self.dispatch(Method::POST, &path, Body::from(json)).await?;
                let created = serde_json::from_slice(&reply.body)
                    .map_err(|source| ApiError::Decode { path, source })?;
                Ok(reply.map(|_| EmployeePayload::Employee(created)))
            }
            EmployeeRequest::Delete(id) => {
                let segment = utf8_percent_encode(&id, ID_SEGMENT);
                let path = format!("{}/{segment}", self.collection_path());
                let Reply { status, body } =
                    self.dispatch(Method::DELETE, &path, Body::empty()).await?;
                let deleted = String::from_utf8(body)
                    .map_err(|source| ApiError::InvalidId { path, source })?;
                Ok(Reply {
                    status,
                    body: EmployeePayload::Id(deleted),
                })
            }
        }
    }

    pub async fn list_employees(&self) -> ApiResult<Reply<Vec<Employee>>> {
        let reply = self.send(EmployeeRequest::List).await?;
        match reply.body {
            EmployeePayload::Employees(list) => Ok(Reply {
                status: reply.status,
                body: list,
            }),
            other => Err(unexpected("employee list", &other)),
        }
    }

    pub async fn create_employee(&self, employee: Employee) -> ApiResult<Reply<Employee>> {
        let reply = self.send(EmployeeRequest::Create(employee)).await?;
        match reply.body {
            EmployeePayload::Employee(created) => Ok(Reply {
                status: reply.status,
                body: created,
            }),
            other => Err(unexpected("employee", &other)),
        }
    }

    pub async fn delete_employee(&self, id: &str) -> ApiResult<Reply<String>> {
        let reply = self.send(EmployeeRequest::Delete(id.to_string())).await?;
        match reply.body {
            EmployeePayload::Id(deleted) => Ok(Reply {
                status: reply.status,
                body: deleted,
            }),
            other => Err(unexpected("id", &other)),
        }
    }

    async fn dispatch(&self, method: Method, path: &str, body: Body) -> ApiResult<Reply<Vec<u8>>> {
        let mut request = Request::builder().method(method.clone()).uri(path);
        if method == Method::POST {
            request = request.header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        let request = request.body(body)?;
        debug!(%method, path, "sending employee request");

        let response = self
            .transport
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|source| ApiError::Body {
                path: path.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(Reply {
            status,
            body: bytes.to_vec(),
        })
    }
}

fn unexpected(expected: &'static str, actual: &EmployeePayload) -> ApiError {
    ApiError::UnexpectedPayload {
        expected,
        actual: actual.kind(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use platform_backend::{BackendSettings, build_stack};
    use tower::service_fn;

    use super::*;

    fn client_over_fixture(fixture: &str) -> (EmployeeClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("employes.json"), fixture).unwrap();
        let settings = BackendSettings::new(dir.path()).with_latency(Duration::ZERO);
        let client = EmployeeClient::new(build_stack(settings).unwrap());
        (client, dir)
    }

    #[tokio::test]
    async fn lists_fixture_contents() {
        let (client, _dir) = client_over_fixture(
            r#"[{"id":"1","full_name":"Grace Hopper","unit":"Engineering","emp_avatar":"a"}]"#,
        );
        let reply = client.list_employees().await.unwrap();
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body.len(), 1);
        assert_eq!(reply.body[0].full_name, "Grace Hopper");
    }

    #[tokio::test]
    async fn create_returns_server_assigned_id() {
        let (client, _dir) = client_over_fixture("[]");
        let reply = client
            .create_employee(Employee::draft("Ada Lovelace", "Engineering"))
            .await
            .unwrap();
        assert!(reply.body.has_id());
        assert_eq!(reply.body.full_name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn delete_returns_id_verbatim() {
        let (client, _dir) = client_over_fixture("[]");
        let reply = client.delete_employee("abc").await.unwrap();
        assert_eq!(reply, Reply { status: StatusCode::OK, body: "abc".to_string() });
    }

    #[tokio::test]
    async fn send_tags_payload_by_endpoint() {
        let (client, _dir) = client_over_fixture("[]");
        let reply = client.send(EmployeeRequest::List).await.unwrap();
        assert_eq!(reply.body, EmployeePayload::Employees(Vec::new()));
        let reply = client
            .send(EmployeeRequest::Delete("x".into()))
            .await
            .unwrap();
        assert_eq!(reply.body, EmployeePayload::Id("x".into()));
    }

    #[tokio::test]
    async fn missing_fixture_is_a_status_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BackendSettings::new(dir.path()).with_latency(Duration::ZERO);
        let client = EmployeeClient::new(build_stack(settings).unwrap());
        let err = client.list_employees().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn malformed_fixture_is_a_decode_error() {
        let (client, _dir) = client_over_fixture("{ not a list");
        let err = client.list_employees().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn delete_keeps_reserved_characters_in_id() {
        let (client, _dir) = client_over_fixture("[]");
        for id in ["x?y", "a b", "d/7", "50%", "r#1", "émile"] {
            let reply = client.delete_employee(id).await.unwrap();
            assert_eq!(reply.body, id);
        }
    }

    #[tokio::test]
    async fn delete_id_is_sent_as_one_segment() {
        let transport = service_fn(|req: Request<Body>| async move {
            let echoed = req.uri().to_string();
            Ok::<_, Infallible>(Response::new(Body::from(echoed)))
        });
        let client = EmployeeClient::new(transport);
        let reply = client.delete_employee("d/7?x y").await.unwrap();
        assert_eq!(reply.body, "/employes/d%2F7%3Fx%20y");
    }

    #[tokio::test]
    async fn base_prefix_is_applied() {
        let transport = service_fn(|req: Request<Body>| async move {
            let echoed = req.uri().path().to_string();
            Ok::<_, Infallible>(Response::new(Body::from(echoed)))
        });
        let client = EmployeeClient::new(transport).with_base("/api/v1/");
        let reply = client.delete_employee("7").await.unwrap();
        assert_eq!(reply.body, "/api/v1/employes/7");
    }
}
