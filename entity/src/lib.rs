//! Employee records as held by the desk and served by the fake backend.

pub mod department;
pub mod employee;
pub mod validation;

pub use department::{DEPARTMENTS, resolve_department};
pub use employee::{Employee, avatar_url};
pub use validation::{ValidationError, validate};
