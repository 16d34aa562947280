use axum::http::Method;
use percent_encoding::percent_decode_str;

/// An employee endpoint the fake backend answers itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `GET <collection>`: served from the fixture file.
    List,
    /// `POST <collection>`: echoed back with a fresh id.
    Create,
    /// `DELETE <collection>/<id>`: acknowledged with the id.
    Delete(String),
}

impl Route {
    /// Match a request against the employee endpoints. Rules are tried in order
    /// and the first hit wins; `None` means the request should pass through.
    pub fn classify(method: &Method, path: &str, collection: &str) -> Option<Self> {
        let on_collection = path.ends_with(collection);
        if on_collection && method == Method::GET {
            return Some(Self::List);
        }
        if on_collection && method == Method::POST {
            return Some(Self::Create);
        }
        if method == Method::DELETE && path.contains(&format!("{collection}/")) {
            let segment = path.rsplit('/').next().unwrap_or_default();
            let id = percent_decode_str(segment).decode_utf8_lossy();
            return Some(Self::Delete(id.into_owned()));
        }
        None
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Delete(_) => "delete",
        }
    }
}
