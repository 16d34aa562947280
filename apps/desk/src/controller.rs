use std::sync::Arc;

use axum::http::StatusCode;
use entity::{Employee, ValidationError, validate};
use platform_api::{ApiError, EmployeeClient};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Blocking, user-facing notification for rejected form input.
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(
        "invalid employee form: {}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("backend answered {0} instead of 200 OK")]
    UnexpectedStatus(StatusCode),
}

/// The add-employee form fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    pub full_name: String,
    pub unit: String,
}

impl EmployeeForm {
    pub fn clear(&mut self) {
        self.full_name.clear();
        self.unit.clear();
    }
}

/// Raises the loading flag for as long as it lives.
struct Busy<'a>(&'a watch::Sender<bool>);

impl<'a> Busy<'a> {
    fn start(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// Owns the employee list. The list only changes after the backend confirms
/// an operation; failures leave it as it was.
pub struct EmployeeController {
    client: EmployeeClient,
    alerts: Arc<dyn Alert>,
    employees: Vec<Employee>,
    form: EmployeeForm,
    loading: watch::Sender<bool>,
}

impl EmployeeController {
    pub fn new(client: EmployeeClient, alerts: Arc<dyn Alert>) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            client,
            alerts,
            employees: Vec::new(),
            form: EmployeeForm::default(),
            loading,
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EmployeeForm {
        &mut self.form
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Fetch the full list, replacing whatever is held.
    pub async fn initialize(&mut self) -> Result<usize, ControllerError> {
        let _busy = Busy::start(&self.loading);
        let reply = self
            .client
            .list_employees()
            .await
            .map_err(|err| failed("get all employees", err.into()))?;
        if reply.status != StatusCode::OK {
            return Err(failed(
                "get all employees",
                ControllerError::UnexpectedStatus(reply.status),
            ));
        }
        self.employees = reply.body;
        info!(count = self.employees.len(), "employees loaded");
        Ok(self.employees.len())
    }

    /// Fill the form and submit it.
    pub async fn submit_new_employee(
        &mut self,
        full_name: &str,
        unit: &str,
    ) -> Result<Employee, ControllerError> {
        self.form.full_name = full_name.to_string();
        self.form.unit = unit.to_string();
        self.submit_form().await
    }

    /// Validate the form and, if it passes, create the employee. The form is
    /// cleared only once the backend has accepted it.
    pub async fn submit_form(&mut self) -> Result<Employee, ControllerError> {
        if let Err(errors) = validate(&self.form.full_name, &self.form.unit) {
            for err in &errors {
                self.alerts.alert(&err.to_string());
            }
            warn!(?errors, "employee form rejected");
            return Err(ControllerError::Validation(errors));
        }

        let draft = Employee::draft(self.form.full_name.trim(), self.form.unit.trim());
        let _busy = Busy::start(&self.loading);
        let reply = self
            .client
            .create_employee(draft)
            .await
            .map_err(|err| failed("add a new employee", err.into()))?;
        if reply.status != StatusCode::OK {
            return Err(failed(
                "add a new employee",
                ControllerError::UnexpectedStatus(reply.status),
            ));
        }

        let created = reply.body;
        info!(id = %created.id, name = %created.full_name, "employee added");
        self.employees.push(created.clone());
        self.form.clear();
        Ok(created)
    }

    /// Delete by id, dropping whichever entry matches the id the backend
    /// confirms. Returns that id.
    pub async fn request_delete(&mut self, id: &str) -> Result<String, ControllerError> {
        let _busy = Busy::start(&self.loading);
        let reply = self
            .client
            .delete_employee(id)
            .await
            .map_err(|err| failed("delete an employee", err.into()))?;
        if reply.status != StatusCode::OK {
            return Err(failed(
                "delete an employee",
                ControllerError::UnexpectedStatus(reply.status),
            ));
        }

        let deleted = reply.body;
        let before = self.employees.len();
        self.employees.retain(|employee| employee.id != deleted);
        info!(id = %deleted, removed = before - self.employees.len(), "employee deleted");
        Ok(deleted)
    }
}

fn failed(action: &str, err: ControllerError) -> ControllerError {
    error!(error = %err, "error occurred when trying to {action}");
    err
}
