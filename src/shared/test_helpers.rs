#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "test-admin-id".to_string(),
        sub: "test-admin-sub".to_string(),
        roles: vec![crate::shared::constants::ROLE_ADMIN.to_string()],
    }
}

#[cfg(test)]
pub fn create_viewer_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "test-viewer-id".to_string(),
        sub: "test-viewer-sub".to_string(),
        roles: vec!["support".to_string()],
    }
}

#[cfg(test)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
async fn inject_viewer_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_viewer_user());
    next.run(request).await
}

/// Wrap a router so every request is authenticated as an admin
#[cfg(test)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

/// Wrap a router so every request is authenticated as a non-admin user
#[cfg(test)]
pub fn with_viewer_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_viewer_middleware))
}
