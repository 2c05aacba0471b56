use std::borrow::Cow;

#[catalog_derive::catalog_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

const MAX_KEY_LEN: usize = 64;

/// Utilities for safe resource handling and ID validation.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Validates a client supplied identifier against a table and returns its bare key.
    ///
    /// Accepts `product:abc` or `abc`. Rejects keys for another table
    /// (e.g. `user:admin` on a `product` endpoint) and anything that is not a
    /// short run of ASCII letters, digits, `_` or `-`.
    ///
    /// # Errors
    /// Returns an error if the table does not match or the key is malformed.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id_ref = id.as_ref().trim();
        let table_ref = expected_table.as_ref();

        let key = match id_ref.split_once(':') {
            Some((table, _)) if table != table_ref => {
                return Err(ResourceGuardError::Validation {
                    message: format!("Expected '{table_ref}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            },
            Some((_, key)) => key,
            None => id_ref,
        };

        let well_formed = !key.is_empty()
            && key.len() <= MAX_KEY_LEN
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !well_formed {
            return Err(ResourceGuardError::Validation {
                message: format!("Malformed {table_ref} id '{key}'").into(),
                context: None,
            });
        }

        Ok(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_verification() {
        assert_eq!(ResourceGuard::verify("product:abc123", "product").unwrap(), "abc123");
        assert_eq!(ResourceGuard::verify(" abc123 ", "product").unwrap(), "abc123");

        let err = ResourceGuard::verify("user:admin", "product");
        assert!(err.is_err());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(ResourceGuard::verify("", "product").is_err());
        assert!(ResourceGuard::verify("product:", "product").is_err());
        assert!(ResourceGuard::verify("a b", "product").is_err());
        assert!(ResourceGuard::verify("x".repeat(65), "product").is_err());
    }
}
