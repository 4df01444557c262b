//! Storage-specific error type wrapping sqlx errors.

use scenehub_domain::error::SceneHubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// The action grid could not be encoded or decoded.
    #[error("scene actions are not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for SceneHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_into_storage_variant_keeping_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SceneHubError = StorageError::from(json_err).into();
        let SceneHubError::Storage(source) = err else {
            panic!("expected a storage error");
        };
        assert_eq!(source.to_string(), "scene actions are not valid JSON");
    }
}
