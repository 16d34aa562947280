//! The employee desk: a controller holding the employee list, driven from a
//! terminal and talking to the fake backend through the employee client.

pub mod config;
pub mod controller;
pub mod ui;

use std::sync::Arc;

use platform_api::EmployeeClient;
use platform_backend::{BackendResult, build_stack};

use crate::{
    config::AppConfig,
    controller::{Alert, EmployeeController},
};

/// Wire the controller to a freshly built fake backend.
pub fn connect(config: &AppConfig, alerts: Arc<dyn Alert>) -> BackendResult<EmployeeController> {
    let stack = build_stack(config.backend.clone())?;
    let client = EmployeeClient::new(stack).with_base(config.api_base.clone());
    Ok(EmployeeController::new(client, alerts))
}
