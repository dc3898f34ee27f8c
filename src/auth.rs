use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::Role,
    policy,
    repository::RepositoryState,
    session::{Session, SessionState},
};

/// Claims
///
/// Payload of a session token. `sid` ties the token to a live entry in the session store,
/// which is what makes logout effective before `exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: Uuid,
    /// The session id.
    pub sid: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// Signs a token for a freshly created session.
pub fn issue_token(config: &AppConfig, session: &Session) -> Result<String, AppError> {
    let claims = Claims {
        sub: session.user_id,
        sid: session.id,
        exp: session.expires_at.timestamp() as usize,
        iat: session.created_at.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
}

/// AuthUser
///
/// The resolved identity of the current request. This is the session context handed to
/// every handler that needs one; nothing about the caller is stored globally.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    /// `None` when the identity came from the local development bypass.
    pub session_id: Option<Uuid>,
}

impl AuthUser {
    /// Fails with `Forbidden` (carrying both roles) unless the caller holds `required`.
    pub fn require(&self, required: Role) -> Result<(), AppError> {
        policy::check_role(self.role, Some(required)).map_err(AppError::from)
    }

    /// resolve
    ///
    /// 1. Local bypass: with `dev_auth_bypass` set in `Env::Local`, an `x-user-id` header
    ///    naming a known user is accepted.
    /// 2. Bearer token: decoded and validated (signature and expiry).
    /// 3. Session check: the token's `sid` must be live and belong to `sub`.
    /// 4. Directory lookup: the user must still exist; the role is read from there.
    async fn resolve<S>(parts: &Parts, state: &S) -> Result<Self, AppError>
    where
        S: Send + Sync,
        RepositoryState: FromRef<S>,
        SessionState: FromRef<S>,
        AppConfig: FromRef<S>,
    {
        let repo = RepositoryState::from_ref(state);
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local && config.dev_auth_bypass {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| Uuid::parse_str(raw).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await {
                    return Ok(AuthUser {
                        id: user.id,
                        role: user.role,
                        session_id: None,
                    });
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("rejected token: {:?}", e.kind());
            AppError::Unauthorized
        })?
        .claims;

        let session = sessions
            .get(claims.sid)
            .await
            .filter(|s| s.user_id == claims.sub)
            .ok_or(AppError::Unauthorized)?;

        let user = repo
            .get_user(session.user_id)
            .await
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
            session_id: Some(session.id),
        })
    }
}

/// Required identity: rejects with 401 when the request carries no valid session.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AuthUser::resolve(parts, state).await
    }
}

/// Optional identity (`Option<AuthUser>`): a missing or invalid session resolves to `None`,
/// for endpoints that answer anonymous callers differently rather than refusing them.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(AuthUser::resolve(parts, state).await.ok())
    }
}
