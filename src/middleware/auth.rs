// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{User, UserRole},
};

async fn authenticate(app_state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return app_state.auth_service.validate_token(token).await;
        }
    }
    Err(AppError::InvalidToken)
}

// Requires a valid bearer token; stores the user in request extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&app_state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Same as auth_guard, plus the admin role check. Guards all /api/admin routes.
pub async fn admin_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&app_state, request.headers()).await?;
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extractor for handlers that need the authenticated user.
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::Utc;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::test_support::{StaticUsers, TEST_JWT_SECRET, state_with_users, token_for};

    fn make_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "person@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Jan".to_string(),
            last_name: "Novák".to_string(),
            role,
            remonline_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn admin_router(state: AppState) -> Router {
        Router::new()
            .route("/admin/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(state.clone(), admin_guard))
            .with_state(state)
    }

    async fn request(app: Router, token: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri("/admin/ping");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let state = state_with_users(Arc::new(StaticUsers {
            users: Vec::new(),
            profiles: Vec::new(),
        }));
        assert_eq!(
            request(admin_router(state), None).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let state = state_with_users(Arc::new(StaticUsers {
            users: Vec::new(),
            profiles: Vec::new(),
        }));
        assert_eq!(
            request(admin_router(state), Some("not-a-jwt")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn non_admin_token_is_forbidden() {
        let customer = make_user(UserRole::Customer);
        let token = token_for(customer.id, TEST_JWT_SECRET);
        let state = state_with_users(Arc::new(StaticUsers {
            users: vec![customer],
            profiles: Vec::new(),
        }));
        assert_eq!(
            request(admin_router(state), Some(&token)).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn admin_token_reaches_the_handler() {
        let admin = make_user(UserRole::Admin);
        let token = token_for(admin.id, TEST_JWT_SECRET);
        let state = state_with_users(Arc::new(StaticUsers {
            users: vec![admin],
            profiles: Vec::new(),
        }));
        assert_eq!(
            request(admin_router(state), Some(&token)).await,
            StatusCode::OK
        );
    }
}
