//! Shared identity state and the auth lifecycle.
//!
//! `SessionContext` is the one piece of state shared across sessions and
//! components. It is mutated only by [`SessionAuth`]'s operations; every
//! other reader takes a point-in-time snapshot and never holds the lock
//! across an await.

use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use leveltest_core::error::ApiError;
use leveltest_core::model::{Identity, Role};

use crate::claims;
use crate::error::AuthFlowError;
use crate::store::TokenStore;

/// Process-wide identity holder, passed explicitly to whoever needs to
/// read it.
#[derive(Default)]
pub struct SessionContext {
    inner: RwLock<Option<Identity>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A point-in-time copy of the current identity.
    pub fn snapshot(&self) -> Option<Identity> {
        self.inner.read().expect("identity lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .expect("identity lock poisoned")
            .is_some()
    }

    fn set(&self, identity: Identity) {
        *self.inner.write().expect("identity lock poisoned") = Some(identity);
    }

    fn clear(&self) {
        *self.inner.write().expect("identity lock poisoned") = None;
    }
}

/// Login credentials.
///
/// Note: custom Debug impl masks the password to prevent accidental
/// exposure in logs.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Registration request.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// What the auth endpoints return on success. The token is authoritative;
/// the loose fields are ignored in favor of the decoded claims.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// The HTTP side of the auth lifecycle, implemented by `leveltest-api`.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;

    /// Confirm the persisted identity still exists server-side.
    async fn current_user(&self, token: &str) -> Result<(), ApiError>;
}

/// Owns the identity token lifecycle: load-on-start, decode, persist,
/// clear-on-logout, expiry detection.
pub struct SessionAuth {
    store: Arc<dyn TokenStore>,
    backend: Arc<dyn AuthBackend>,
    context: Arc<SessionContext>,
}

impl SessionAuth {
    pub fn new(
        store: Arc<dyn TokenStore>,
        backend: Arc<dyn AuthBackend>,
        context: Arc<SessionContext>,
    ) -> Self {
        Self {
            store,
            backend,
            context,
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Restore the identity from the persisted token, typically at
    /// application start.
    ///
    /// A token that fails to decode or is past its expiry is cleared from
    /// the store and `None` is returned.
    pub fn restore(&self) -> Result<Option<Identity>, AuthFlowError> {
        let Some(token) = self.store.load()? else {
            return Ok(None);
        };

        match claims::decode_claims(&token) {
            Ok(claims) if !claims.is_expired() => {
                let identity = Identity {
                    token,
                    username: claims.username,
                    role: claims.role,
                };
                self.context.set(identity.clone());
                tracing::debug!(username = %identity.username, "identity restored");
                Ok(Some(identity))
            }
            Ok(_) | Err(_) => {
                tracing::warn!("persisted token invalid or expired, clearing");
                self.store.clear()?;
                self.context.clear();
                Ok(None)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, AuthFlowError> {
        let response = self.backend.login(credentials).await.map_err(|e| match e {
            ApiError::Auth(message) => AuthFlowError::CredentialsRejected(message),
            other => AuthFlowError::Api(other),
        })?;
        self.install(response.token)
    }

    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Identity, AuthFlowError> {
        let response = self
            .backend
            .register(registration)
            .await
            .map_err(|e| match e {
                ApiError::Auth(message) => AuthFlowError::CredentialsRejected(message),
                other => AuthFlowError::Api(other),
            })?;
        self.install(response.token)
    }

    fn install(&self, token: String) -> Result<Identity, AuthFlowError> {
        let claims = claims::decode_claims(&token)?;
        let identity = Identity {
            token,
            username: claims.username,
            role: claims.role,
        };
        self.store.save(&identity.token)?;
        self.context.set(identity.clone());
        tracing::info!(username = %identity.username, role = %identity.role, "logged in");
        Ok(identity)
    }

    /// Clear the persisted token and the shared identity. Never fails; a
    /// storage problem is logged and the in-memory identity is cleared
    /// regardless.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        self.context.clear();
        tracing::info!("logged out");
    }

    /// Check that the identity still exists server-side.
    ///
    /// Returns `Ok(true)` when the backend confirms it, `Ok(false)` after
    /// any non-success response (which forces a logout). Transport failures
    /// propagate so a caller can retry instead of dropping a valid session
    /// over a flaky connection.
    pub async fn revalidate(&self) -> Result<bool, AuthFlowError> {
        let Some(identity) = self.context.snapshot() else {
            return Ok(false);
        };

        match self.backend.current_user(&identity.token).await {
            Ok(()) => Ok(true),
            Err(e @ (ApiError::Network(_) | ApiError::Timeout(_))) => Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "identity revalidation rejected, logging out");
                self.logout();
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use std::sync::Mutex;

    fn token_for(username: &str, role: &str, exp: Option<i64>) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let exp_field = exp.map(|e| format!(r#","exp":{e}"#)).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"username":"{username}","role":"{role}"{exp_field}}}"#
        ));
        format!("{header}.{payload}.sig")
    }

    struct ScriptedBackend {
        login_responses: Mutex<Vec<Result<AuthResponse, ApiError>>>,
        current_user_responses: Mutex<Vec<Result<(), ApiError>>>,
    }

    impl ScriptedBackend {
        fn with_login(responses: Vec<Result<AuthResponse, ApiError>>) -> Self {
            Self {
                login_responses: Mutex::new(responses),
                current_user_responses: Mutex::new(Vec::new()),
            }
        }

        fn with_current_user(responses: Vec<Result<(), ApiError>>) -> Self {
            Self {
                login_responses: Mutex::new(Vec::new()),
                current_user_responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl AuthBackend for ScriptedBackend {
        async fn login(&self, _credentials: &Credentials) -> Result<AuthResponse, ApiError> {
            self.login_responses.lock().unwrap().remove(0)
        }

        async fn register(
            &self,
            _registration: &Registration,
        ) -> Result<AuthResponse, ApiError> {
            self.login_responses.lock().unwrap().remove(0)
        }

        async fn current_user(&self, _token: &str) -> Result<(), ApiError> {
            self.current_user_responses.lock().unwrap().remove(0)
        }
    }

    fn auth_with(store: MemoryTokenStore, backend: ScriptedBackend) -> SessionAuth {
        SessionAuth::new(
            Arc::new(store),
            Arc::new(backend),
            Arc::new(SessionContext::new()),
        )
    }

    #[test]
    fn restore_with_no_token_yields_none() {
        let auth = auth_with(
            MemoryTokenStore::new(),
            ScriptedBackend::with_login(Vec::new()),
        );
        assert!(auth.restore().unwrap().is_none());
        assert!(!auth.context().is_authenticated());
    }

    #[test]
    fn restore_decodes_persisted_token() {
        let token = token_for("maria", "student", None);
        let auth = auth_with(
            MemoryTokenStore::with_token(&token),
            ScriptedBackend::with_login(Vec::new()),
        );

        let identity = auth.restore().unwrap().unwrap();
        assert_eq!(identity.username, "maria");
        assert_eq!(identity.role, Role::Student);
        assert!(auth.context().is_authenticated());
    }

    #[test]
    fn restore_clears_undecodable_token() {
        let store = MemoryTokenStore::with_token("garbage");
        let auth = auth_with(store, ScriptedBackend::with_login(Vec::new()));

        assert!(auth.restore().unwrap().is_none());
        assert!(auth.store.load().unwrap().is_none());
        assert!(!auth.context().is_authenticated());
    }

    #[test]
    fn restore_clears_expired_token() {
        let token = token_for("maria", "student", Some(1_000_000));
        let auth = auth_with(
            MemoryTokenStore::with_token(&token),
            ScriptedBackend::with_login(Vec::new()),
        );

        assert!(auth.restore().unwrap().is_none());
        assert!(auth.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn login_persists_token_and_installs_identity() {
        let token = token_for("nikos", "teacher", None);
        let backend = ScriptedBackend::with_login(vec![Ok(AuthResponse {
            token: token.clone(),
            username: None,
            role: None,
        })]);
        let auth = auth_with(MemoryTokenStore::new(), backend);

        let identity = auth
            .login(&Credentials {
                username: "nikos".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        assert_eq!(identity.role, Role::Teacher);
        assert_eq!(auth.store.load().unwrap().as_deref(), Some(token.as_str()));
        let snapshot = auth.context().snapshot().unwrap();
        assert_eq!(snapshot.username, "nikos");
    }

    #[tokio::test]
    async fn login_rejection_maps_to_credentials_rejected() {
        let backend = ScriptedBackend::with_login(vec![Err(ApiError::Auth(
            "invalid credentials".into(),
        ))]);
        let auth = auth_with(MemoryTokenStore::new(), backend);

        let err = auth
            .login(&Credentials {
                username: "maria".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthFlowError::CredentialsRejected(_)));
        assert!(!auth.context().is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_store_and_context() {
        let token = token_for("maria", "student", None);
        let auth = auth_with(
            MemoryTokenStore::with_token(&token),
            ScriptedBackend::with_login(Vec::new()),
        );
        auth.restore().unwrap();
        assert!(auth.context().is_authenticated());

        auth.logout();
        assert!(auth.store.load().unwrap().is_none());
        assert!(!auth.context().is_authenticated());
    }

    #[tokio::test]
    async fn revalidation_rejection_forces_logout() {
        let token = token_for("maria", "student", None);
        let backend = ScriptedBackend::with_current_user(vec![Err(ApiError::Auth(
            "user no longer exists".into(),
        ))]);
        let auth = auth_with(MemoryTokenStore::with_token(&token), backend);
        auth.restore().unwrap();

        assert!(!auth.revalidate().await.unwrap());
        assert!(!auth.context().is_authenticated());
        assert!(auth.store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn revalidation_transport_failure_keeps_session() {
        let token = token_for("maria", "student", None);
        let backend = ScriptedBackend::with_current_user(vec![Err(ApiError::Network(
            "connection reset".into(),
        ))]);
        let auth = auth_with(MemoryTokenStore::with_token(&token), backend);
        auth.restore().unwrap();

        assert!(auth.revalidate().await.is_err());
        assert!(auth.context().is_authenticated());
    }

    #[tokio::test]
    async fn revalidation_confirms_live_identity() {
        let token = token_for("maria", "student", None);
        let backend = ScriptedBackend::with_current_user(vec![Ok(())]);
        let auth = auth_with(MemoryTokenStore::with_token(&token), backend);
        auth.restore().unwrap();

        assert!(auth.revalidate().await.unwrap());
        assert!(auth.context().is_authenticated());
    }

    #[test]
    fn credentials_debug_masks_password() {
        let credentials = Credentials {
            username: "maria".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("hunter2"));
    }
}
