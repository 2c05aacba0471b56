use crate::Identity;
use crate::error::IdentityError;
use catalog_kernel::domain::auth::Role;
use tracing::info;

/// Accounts created on first start.
pub const DEFAULT_USERS: [(&str, &str, Role); 2] =
    [("admin", "Admin123!", Role::Admin), ("user", "User123!", Role::User)];

/// Creates the default accounts that do not exist yet and returns how many were added.
///
/// # Errors
/// Storage failures.
pub async fn seed(identity: &Identity) -> Result<usize, IdentityError> {
    let mut created = 0;
    for (username, password, role) in DEFAULT_USERS {
        if identity.service.ensure_user(username, password, role).await? {
            created += 1;
        }
    }
    info!(created, "Default users seeded");
    Ok(created)
}
