use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    routing::{get, post},
    Json,
};
use campushub_core::{AuthContext, Credentials, DatabaseError, NewSignup, ProfileData, SessionData};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{LoginSchema, RegisterSchema, SignupRole, ValidatedJson},
    serialized::{LoginResult, Profile, ToSerialized},
    Router,
};

/// Header that unlocks the bootstrap override
pub const BOOTSTRAP_KEY_HEADER: &str = "x-bootstrap-key";

/// Wraps [SessionData] so [FromRequestParts] can be implemented for it.
/// Use this for routes that need a live session but no specific role.
pub struct Session(SessionData);

impl Session {
    /// Returns the profile of the session
    pub fn profile(&self) -> ProfileData {
        self.0.profile.clone()
    }

    pub fn token(&self) -> &str {
        &self.0.token
    }
}

#[async_trait]
impl FromRequestParts<ServerContext> for Session {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);
        let token = bearer_token(parts)?
            .ok_or((StatusCode::UNAUTHORIZED, "Missing authorization"))?;

        let session = context
            .hub
            .auth
            .session(&token)
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Session does not exist"))?;

        Ok(Self(session))
    }
}

/// How the caller is authenticated, resolved once per request and handed
/// to the access evaluator. This extractor is the only code path that can
/// produce [AuthContext::LocalOverride].
pub struct Caller(pub AuthContext);

#[async_trait]
impl FromRequestParts<ServerContext> for Caller {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);

        let presented_key = parts
            .headers
            .get(BOOTSTRAP_KEY_HEADER)
            .and_then(|x| x.to_str().ok());

        if let Some(key) = presented_key {
            if context.bootstrap_key.as_deref() == Some(key) {
                return Ok(Self(AuthContext::LocalOverride));
            }
        }

        let Some(token) = bearer_token(parts)? else {
            return Ok(Self(AuthContext::Anonymous));
        };

        match context.hub.auth.session(&token).await {
            Ok(session) => Ok(Self(AuthContext::Session(session))),
            Err(DatabaseError::NotFound { .. }) => Ok(Self(AuthContext::Anonymous)),
            Err(_) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not resolve session",
            )),
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, (StatusCode, &'static str)> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|x| x.to_str().ok());

    let Some(header) = header else {
        return Ok(None);
    };

    let parts: Vec<_> = header.split_ascii_whitespace().collect();

    if parts.first() != Some(&"Bearer") {
        return Err((StatusCode::BAD_REQUEST, "Authorization must be Bearer"));
    }

    Ok(Some(parts.last().cloned().unwrap_or_default().to_string()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult)
    )
)]
async fn login(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<LoginResult>> {
    let session = context
        .hub
        .auth
        .login(Credentials {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;

    Ok(Json(session.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 200, body = Profile)
    )
)]
async fn register(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<Json<Profile>> {
    let signup = NewSignup {
        username: body.username,
        email: body.email,
        password: body.password,
        display_name: body.display_name,
    };

    let profile = match body.role {
        SignupRole::Student => context.hub.auth.register_student(signup).await?,
        SignupRole::Society => context.hub.auth.register_society(signup).await?.1,
    };

    Ok(Json(profile.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Session was invalidated")
    )
)]
async fn logout(session: Session, context: ServerContext) -> ServerResult<()> {
    context.hub.auth.logout(session.token()).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/auth/user",
    tag = "auth",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Profile)
    )
)]
async fn user(session: Session) -> Json<Profile> {
    Json(session.profile().to_serialized())
}

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/user", get(user))
}
