pub mod error;
pub mod extract;
pub mod logger;
pub mod validation;

pub use error::{ServiceError, ServiceResult};
pub use extract::{JsonBody, QueryParams};
pub use shared::error::{AppError, ErrorCode};

/// Handler result type
pub type AppResult<T> = Result<T, AppError>;
