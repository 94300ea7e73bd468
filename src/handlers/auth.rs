use axum::{Form, Json, extract::State};

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{LoginForm, MessageResponse, NewUser, Token, User, UserCreate},
};

/// login
///
/// Exchanges form-encoded credentials for a bearer token. The identifier may
/// be a username or an email. Wrong username and wrong password are
/// indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = Token),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let denied = || ApiError::Unauthorized("Incorrect username or password".into());

    let record = state
        .repo
        .get_user_record(&form.username)
        .await?
        .ok_or_else(denied)?;

    if !auth::verify_password(&form.password, &record.password_hash)? {
        return Err(denied());
    }

    let access_token = auth::issue_token(
        record.id,
        state.config.token_ttl_minutes,
        &state.config.jwt_secret,
    )?;
    Ok(Json(Token {
        access_token,
        token_type: "bearer".into(),
    }))
}

/// register
///
/// Open self-registration. New accounts always get the viewer role; any
/// role_id in the payload is ignored. Username is checked before email so the
/// two conflict messages stay deterministic.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = UserCreate,
    responses(
        (status = 200, description = "Account created", body = User),
        (status = 400, description = "Username or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<Json<User>, ApiError> {
    if state
        .repo
        .get_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already registered".into()));
    }
    if state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let viewer = state
        .repo
        .get_role_by_name("viewer")
        .await?
        .ok_or_else(|| ApiError::Validation("Default role not found".into()))?;

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            role_id: viewer.id,
        })
        .await?;
    Ok(Json(user))
}

/// me
///
/// Returns the profile of the token's subject.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses((status = 200, description = "Current user", body = User)),
    security(("bearer_auth" = []))
)]
pub async fn me(user: AuthUser, State(state): State<AppState>) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

/// refresh
///
/// Issues a fresh token for an already-authenticated caller, restarting the
/// TTL window. The old token stays valid until its natural expiry.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses((status = 200, description = "Token reissued", body = Token)),
    security(("bearer_auth" = []))
)]
pub async fn refresh(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Token>, ApiError> {
    let access_token = auth::issue_token(
        user.id,
        state.config.token_ttl_minutes,
        &state.config.jwt_secret,
    )?;
    Ok(Json(Token {
        access_token,
        token_type: "bearer".into(),
    }))
}

/// logout
///
/// Stateless acknowledgement. Tokens are not blacklisted; clients discard
/// their copy.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Acknowledged", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn logout(_user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new("Successfully logged out"))
}
