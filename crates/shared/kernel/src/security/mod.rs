pub mod principal;
pub mod resource;

pub use principal::CurrentUser;
pub use resource::{ResourceGuard, ResourceGuardError};
