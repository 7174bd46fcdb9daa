//! Input validation helpers
//!
//! Converts `validator` reports into the structured 400 the API returns.

use shared::error::AppError;
use validator::{Validate, ValidationErrors};

/// Run derive-based validation, mapping failures to `ValidationFailed`
pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(validation_error)
}

/// Field-level details: `{ "<field>": "<first failing rule>" }`
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let names: Vec<String> = fields.iter().map(|(name, _)| name.to_string()).collect();
    let mut err = AppError::validation(format!("Invalid fields: {}", names.join(", ")));
    for (name, errs) in fields {
        let rule = errs
            .first()
            .map(|e| e.code.to_string())
            .unwrap_or_else(|| "invalid".to_string());
        err = err.with_detail(name.to_string(), rule);
    }
    err
}
