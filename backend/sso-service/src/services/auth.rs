//! Authentication service: Login, Register, IsAdmin
//!
//! Orchestrates the credential store, password hasher and token issuer, and
//! owns the translation of storage failures into [`AuthError`].

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::context::RequestContext;
use crate::error::{AuthError, Result};
use crate::security::{JwtIssuer, PasswordHasher};
use crate::storage::{AppProvider, StorageError, UserProvider, UserSaver};

#[derive(Clone)]
pub struct AuthService {
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    // TODO: pick the signing secret from the requested app once per-tenant keys are settled
    #[allow(dead_code)]
    app_provider: Arc<dyn AppProvider>,
    hasher: PasswordHasher,
    issuer: JwtIssuer,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        app_provider: Arc<dyn AppProvider>,
        hasher: PasswordHasher,
        issuer: JwtIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            hasher,
            issuer,
            token_ttl,
        }
    }

    /// Check the user's credentials and return an access token.
    ///
    /// An unknown email and a wrong password both yield
    /// `AuthError::InvalidCredentials`.
    #[instrument(
        name = "auth.login",
        skip(self, ctx, password),
        fields(correlation_id = ctx.correlation_id())
    )]
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
        app_id: i32,
    ) -> Result<String> {
        const FN: &str = "auth.login";

        info!("attempting to login user");

        let user = match ctx.run(self.user_provider.user(email)).await? {
            Ok(user) => user,
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                // Pay the Argon2 cost anyway so response time does not reveal
                // whether the email is registered
                let hasher = self.hasher.clone();
                let password = password.to_owned();
                ctx.run(blocking(FN, move || hasher.verify_absent(&password)))
                    .await??;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "failed to get user");
                return Err(AuthError::internal(FN, e));
            }
        };

        let hasher = self.hasher.clone();
        let pass_hash = user.pass_hash.clone();
        let password = password.to_owned();
        let matched = ctx
            .run(blocking(FN, move || hasher.verify(&pass_hash, &password)))
            .await??
            .map_err(|e| {
                error!(user_id = user.id, error = %e, "stored password hash is unreadable");
                AuthError::internal(FN, e)
            })?;

        if !matched {
            info!(user_id = user.id, "invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue(user.id, &user.email, self.token_ttl)
            .map_err(|e| {
                error!(user_id = user.id, error = %e, "failed to create token");
                AuthError::internal(FN, e)
            })?;

        info!(user_id = user.id, "user logged in successfully");

        Ok(token)
    }

    /// Register a new user and return its ID.
    ///
    /// Not idempotent: a second call with the same email fails with
    /// `AuthError::UserExists`.
    #[instrument(
        name = "auth.register",
        skip(self, ctx, password),
        fields(correlation_id = ctx.correlation_id())
    )]
    pub async fn register(&self, ctx: &RequestContext, email: &str, password: &str) -> Result<i64> {
        const FN: &str = "auth.register";

        info!("registering user");

        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let pass_hash = ctx
            .run(blocking(FN, move || hasher.hash(&password)))
            .await??
            .map_err(|e| {
                error!(error = %e, "failed to hash password");
                AuthError::internal(FN, e)
            })?;

        let user_id = match ctx.run(self.user_saver.save_user(email, &pass_hash)).await? {
            Ok(id) => id,
            Err(StorageError::UserExists) => {
                warn!("user already exists");
                return Err(AuthError::UserExists);
            }
            Err(e) => {
                error!(error = %e, "failed to save user");
                return Err(AuthError::internal(FN, e));
            }
        };

        info!(user_id, "user registered");

        Ok(user_id)
    }

    /// Whether `user_id` is an administrator.
    ///
    /// An unknown user is reported as `AuthError::InvalidAppId`.
    #[instrument(
        name = "auth.is_admin",
        skip(self, ctx),
        fields(correlation_id = ctx.correlation_id())
    )]
    pub async fn is_admin(&self, ctx: &RequestContext, user_id: i64) -> Result<bool> {
        const FN: &str = "auth.is_admin";

        let is_admin = match ctx.run(self.user_provider.is_admin(user_id)).await? {
            Ok(is_admin) => is_admin,
            Err(StorageError::UserNotFound | StorageError::AppNotFound) => {
                warn!("user not found");
                return Err(AuthError::InvalidAppId);
            }
            Err(e) => {
                error!(error = %e, "failed to check admin flag");
                return Err(AuthError::internal(FN, e));
            }
        };

        info!(is_admin, "checked if user is admin");

        Ok(is_admin)
    }
}

/// Run CPU-bound work on the blocking pool
async fn blocking<T, F>(op: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        if e.is_cancelled() {
            AuthError::Cancelled
        } else {
            AuthError::internal(op, e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::storage::{MockAppProvider, MockUserProvider, MockUserSaver, StorageResult};
    use argon2::Params;
    use async_trait::async_trait;

    const SECRET: &str = "unit-test-secret";

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(Params::new(1024, 1, 1, None).unwrap())
    }

    fn service(saver: MockUserSaver, provider: MockUserProvider) -> AuthService {
        AuthService::new(
            Arc::new(saver),
            Arc::new(provider),
            Arc::new(MockAppProvider::new()),
            cheap_hasher(),
            JwtIssuer::new(SECRET).unwrap(),
            Duration::from_secs(3600),
        )
    }

    fn stored_user(id: i64, email: &str, password: &str) -> User {
        User {
            id,
            email: email.to_string(),
            pass_hash: cheap_hasher().hash(password).unwrap(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_login_success_issues_token() {
        let user = stored_user(1, "a@x.com", "secret1");
        let mut provider = MockUserProvider::new();
        provider
            .expect_user()
            .withf(|email| email == "a@x.com")
            .returning(move |_| Ok(user.clone()));

        let svc = service(MockUserSaver::new(), provider);
        let token = svc
            .login(&RequestContext::background(), "a@x.com", "secret1", 1)
            .await
            .unwrap();

        let claims = JwtIssuer::new(SECRET).unwrap().verify(&token).unwrap();
        assert_eq!(claims.uid, 1);
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_look_the_same() {
        let user = stored_user(1, "a@x.com", "secret1");
        let mut provider = MockUserProvider::new();
        provider
            .expect_user()
            .withf(|email| email == "a@x.com")
            .returning(move |_| Ok(user.clone()));
        provider
            .expect_user()
            .withf(|email| email == "nobody@x.com")
            .returning(|_| Err(StorageError::UserNotFound));

        let svc = service(MockUserSaver::new(), provider);
        let ctx = RequestContext::background();

        let wrong_password = svc.login(&ctx, "a@x.com", "wrong", 1).await.unwrap_err();
        let unknown_user = svc.login(&ctx, "nobody@x.com", "secret1", 1).await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));

        let (a, b) = (wrong_password.to_status(), unknown_user.to_status());
        assert_eq!(a.code(), b.code());
        assert_eq!(a.message(), b.message());
    }

    #[tokio::test]
    async fn test_login_storage_failure_is_internal() {
        let mut provider = MockUserProvider::new();
        provider
            .expect_user()
            .returning(|_| Err(StorageError::Database("disk I/O error".to_string())));

        let svc = service(MockUserSaver::new(), provider);
        let err = svc
            .login(&RequestContext::background(), "a@x.com", "secret1", 1)
            .await
            .unwrap_err();

        match err {
            AuthError::Internal(msg) => assert!(msg.starts_with("auth.login:")),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_malformed_hash_is_internal() {
        let mut provider = MockUserProvider::new();
        provider.expect_user().returning(|_| {
            Ok(User {
                id: 3,
                email: "a@x.com".to_string(),
                pass_hash: b"plaintext-by-mistake".to_vec(),
                is_admin: false,
            })
        });

        let svc = service(MockUserSaver::new(), provider);
        let err = svc
            .login(&RequestContext::background(), "a@x.com", "secret1", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn test_register_hashes_before_saving() {
        let mut saver = MockUserSaver::new();
        saver
            .expect_save_user()
            .withf(|email, hash| email == "a@x.com" && hash != b"secret1" && hash.starts_with(b"$argon2id$"))
            .times(1)
            .returning(|_, _| Ok(1));

        let svc = service(saver, MockUserProvider::new());
        let id = svc
            .register(&RequestContext::background(), "a@x.com", "secret1")
            .await
            .unwrap();

        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_user_exists() {
        let mut saver = MockUserSaver::new();
        saver
            .expect_save_user()
            .returning(|_, _| Err(StorageError::UserExists));

        let svc = service(saver, MockUserProvider::new());
        let err = svc
            .register(&RequestContext::background(), "a@x.com", "secret1")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_register_storage_failure_is_internal() {
        let mut saver = MockUserSaver::new();
        saver
            .expect_save_user()
            .returning(|_, _| Err(StorageError::Database("database is locked".to_string())));

        let svc = service(saver, MockUserProvider::new());
        let err = svc
            .register(&RequestContext::background(), "a@x.com", "secret1")
            .await
            .unwrap_err();

        match err {
            AuthError::Internal(msg) => assert!(msg.starts_with("auth.register:")),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_is_admin_mapping() {
        let mut provider = MockUserProvider::new();
        provider
            .expect_is_admin()
            .withf(|id| *id == 1)
            .returning(|_| Ok(false));
        provider
            .expect_is_admin()
            .withf(|id| *id == 2)
            .returning(|_| Ok(true));
        provider
            .expect_is_admin()
            .withf(|id| *id == 404)
            .returning(|_| Err(StorageError::UserNotFound));
        provider
            .expect_is_admin()
            .withf(|id| *id == 500)
            .returning(|_| Err(StorageError::Database("boom".to_string())));

        let svc = service(MockUserSaver::new(), provider);
        let ctx = RequestContext::background();

        assert!(!svc.is_admin(&ctx, 1).await.unwrap());
        assert!(svc.is_admin(&ctx, 2).await.unwrap());
        assert!(matches!(
            svc.is_admin(&ctx, 404).await,
            Err(AuthError::InvalidAppId)
        ));
        assert!(matches!(
            svc.is_admin(&ctx, 500).await,
            Err(AuthError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user_still_hashes() {
        // With the deadline already gone, only the blocking Argon2 step can
        // fail; both branches must reach it
        let user = stored_user(1, "a@x.com", "secret1");
        let mut provider = MockUserProvider::new();
        provider
            .expect_user()
            .withf(|email| email == "a@x.com")
            .returning(move |_| Ok(user.clone()));
        provider
            .expect_user()
            .withf(|email| email == "nobody@x.com")
            .returning(|_| Err(StorageError::UserNotFound));

        let svc = AuthService::new(
            Arc::new(MockUserSaver::new()),
            Arc::new(provider),
            Arc::new(MockAppProvider::new()),
            PasswordHasher::default(),
            JwtIssuer::new(SECRET).unwrap(),
            Duration::from_secs(3600),
        );
        let ctx = RequestContext::with_timeout(Duration::ZERO);

        assert!(matches!(
            svc.login(&ctx, "a@x.com", "wrong", 1).await,
            Err(AuthError::DeadlineExceeded)
        ));
        assert!(matches!(
            svc.login(&ctx, "nobody@x.com", "secret1", 1).await,
            Err(AuthError::DeadlineExceeded)
        ));
    }

    struct StalledStore;

    #[async_trait]
    impl UserSaver for StalledStore {
        async fn save_user(&self, _email: &str, _pass_hash: &[u8]) -> StorageResult<i64> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(1)
        }
    }

    #[async_trait]
    impl UserProvider for StalledStore {
        async fn user(&self, _email: &str) -> StorageResult<User> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(StorageError::UserNotFound)
        }

        async fn is_admin(&self, _user_id: i64) -> StorageResult<bool> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_deadline_aborts_store_call() {
        let svc = AuthService::new(
            Arc::new(StalledStore),
            Arc::new(StalledStore),
            Arc::new(MockAppProvider::new()),
            cheap_hasher(),
            JwtIssuer::new(SECRET).unwrap(),
            Duration::from_secs(3600),
        );
        let ctx = RequestContext::with_timeout(Duration::from_millis(20));

        let started = std::time::Instant::now();
        assert!(matches!(
            svc.login(&ctx, "a@x.com", "secret1", 1).await,
            Err(AuthError::DeadlineExceeded)
        ));
        assert!(matches!(
            svc.is_admin(&ctx, 1).await,
            Err(AuthError::DeadlineExceeded)
        ));

        let ctx = RequestContext::with_timeout(Duration::from_millis(200));
        assert!(matches!(
            svc.register(&ctx, "a@x.com", "secret1").await,
            Err(AuthError::DeadlineExceeded)
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
