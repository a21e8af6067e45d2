use std::sync::Arc;

use girlgram_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub identity: IdentityProvider,
    /// Mark the session cookie `Secure`. Off only for plain-HTTP local development.
    pub secure_cookies: bool,
}

/// Settings for verifying ID tokens from the external identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    pub issuer: String,
    pub audience: String,
    pub secret: String,
}

/// Run a blocking database call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(ApiError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            session_secret: "secret".into(),
            identity: IdentityProvider {
                issuer: "issuer".into(),
                audience: "audience".into(),
                secret: "provider".into(),
            },
            secure_cookies: false,
        })
    }

    #[tokio::test]
    async fn panicked_db_task_is_internal_error() {
        let state = test_state();
        let result: Result<(), ApiError> = run_db(&state, |_| panic!("db task died")).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }

    #[tokio::test]
    async fn db_errors_pass_through_as_internal() {
        let state = test_state();
        let result: Result<(), ApiError> =
            run_db(&state, |_| Err(anyhow::anyhow!("constraint failed"))).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }
}
