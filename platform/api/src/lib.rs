//! Client for the employee endpoints.
//!
//! The client only builds requests and decodes responses; whatever answers
//! them is injected as a tower service, so the same code runs against the
//! in-process fake backend or any other transport.

mod client;
mod error;

pub use client::{EmployeeClient, EmployeePayload, EmployeeRequest, Reply, Transport};
pub use error::{ApiError, ApiResult};

/// Path of the employee collection, relative to the client's base.
pub const EMPLOYEES_PATH: &str = "/employes";
