/// gRPC server implementation for sso-service
///
/// Implements all RPCs from sso.proto:
/// - Register
/// - Login
/// - IsAdmin
use std::time::Duration;
use tonic::{metadata::MetadataValue, Request, Response, Status};
use uuid::Uuid;

use crate::context::{CorrelationId, RequestContext, CORRELATION_HEADER};
use crate::services::AuthService;

// Import generated protobuf types
pub mod sso {
    pub mod auth {
        tonic::include_proto!("auth");
    }
}

use sso::auth::auth_server::Auth;
use sso::auth::*;

/// SSO gRPC server
#[derive(Clone)]
pub struct SsoGrpcServer {
    auth: AuthService,
    /// Upper bound on how long a single call may spend in the store
    call_timeout: Duration,
}

impl SsoGrpcServer {
    pub fn new(auth: AuthService, call_timeout: Duration) -> Self {
        Self { auth, call_timeout }
    }
}

#[tonic::async_trait]
impl Auth for SsoGrpcServer {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> std::result::Result<Response<RegisterResponse>, Status> {
        let ctx = RequestContext::from_request(&request, self.call_timeout);
        let req = request.into_inner();

        require_credentials(&req.email, &req.password)?;

        let user_id = self.auth.register(&ctx, &req.email, &req.password).await?;

        Ok(Response::new(RegisterResponse { user_id }))
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> std::result::Result<Response<LoginResponse>, Status> {
        let ctx = RequestContext::from_request(&request, self.call_timeout);
        let req = request.into_inner();

        // Any app_id is accepted; tokens are not yet scoped per app
        require_credentials(&req.email, &req.password)?;

        let token = self
            .auth
            .login(&ctx, &req.email, &req.password, req.app_id)
            .await?;

        Ok(Response::new(LoginResponse { token }))
    }

    async fn is_admin(
        &self,
        request: Request<IsAdminRequest>,
    ) -> std::result::Result<Response<IsAdminResponse>, Status> {
        let ctx = RequestContext::from_request(&request, self.call_timeout);
        let req = request.into_inner();

        if req.user_id == 0 {
            return Err(Status::invalid_argument("user_id is required"));
        }

        let is_admin = self.auth.is_admin(&ctx, req.user_id).await?;

        Ok(Response::new(IsAdminResponse { is_admin }))
    }
}

fn require_credentials(email: &str, password: &str) -> std::result::Result<(), Status> {
    if email.is_empty() {
        return Err(Status::invalid_argument("email is required"));
    }
    if password.is_empty() {
        return Err(Status::invalid_argument("password is required"));
    }
    Ok(())
}

/// Propagate the caller's correlation ID, or assign one
///
/// The ID is echoed into request metadata and stored in request extensions
/// where [`RequestContext::from_request`] picks it up for logging.
pub fn correlation_interceptor(mut req: Request<()>) -> std::result::Result<Request<()>, Status> {
    let existing = req
        .metadata()
        .get(CORRELATION_HEADER)
        .and_then(|val| val.to_str().ok())
        .map(str::to_owned);

    let correlation_id = match existing {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().to_string();
            let value = MetadataValue::try_from(id.as_str())
                .map_err(|_| Status::internal("failed to set correlation id"))?;
            req.metadata_mut().insert(CORRELATION_HEADER, value);
            id
        }
    };

    req.extensions_mut().insert(CorrelationId(correlation_id));

    Ok(req)
}
