pub mod error;
pub mod extract;
mod health;
pub mod router;
pub mod state;

pub use error::{ApiError, FieldError, PROBLEM_JSON, ProblemDetails, problem_instance};
pub use extract::{ApiPath, ApiQuery, Validate, ValidatedJson};
pub use health::HealthResponse;
pub use router::{method_not_allowed, not_found, system_router};
pub use state::{ApiState, ApiStateBuilder, ApiStateError};

/// `OpenAPI` tag of the infrastructure endpoints.
pub const SYSTEM_TAG: &str = "System";
