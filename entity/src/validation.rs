use thiserror::Error;

/// A form field that failed validation. The message is what the user sees.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please Enter Full Name")]
    MissingFullName,
    #[error("Please Select A Department")]
    MissingDepartment,
}

/// Check the employee form, reporting every failed field in form order.
pub fn validate(full_name: &str, unit: &str) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if full_name.trim().is_empty() {
        errors.push(ValidationError::MissingFullName);
    }
    if unit.trim().is_empty() {
        errors.push(ValidationError::MissingDepartment);
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_complete_form() {
        assert!(validate("Ada Lovelace", "Engineering").is_ok());
    }

    #[test]
    fn reports_each_missing_field() {
        assert_eq!(
            validate("", "  "),
            Err(vec![
                ValidationError::MissingFullName,
                ValidationError::MissingDepartment
            ])
        );
        assert_eq!(
            validate("   ", "Sales"),
            Err(vec![ValidationError::MissingFullName])
        );
        assert_eq!(
            validate("Ada", ""),
            Err(vec![ValidationError::MissingDepartment])
        );
    }

    #[test]
    fn messages_match_form_alerts() {
        assert_eq!(
            ValidationError::MissingFullName.to_string(),
            "Please Enter Full Name"
        );
        assert_eq!(
            ValidationError::MissingDepartment.to_string(),
            "Please Select A Department"
        );
    }
}
