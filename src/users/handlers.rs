use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::{
    state::AppState,
    users::{
        auth::AuthenticatedUser,
        dto::{EmailAvailability, EmailQuery, LoginRequest, UserInput, UserPatch},
        error::UserError,
        repo_types::User,
    },
};

type ApiError = (StatusCode, String);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn reject_bad_email(email: Option<&str>) -> Result<(), ApiError> {
    match email {
        Some(e) if !e.is_empty() && !is_valid_email(e) => {
            warn!(email = %e, "invalid email");
            Err((StatusCode::BAD_REQUEST, "Invalid email".into()))
        }
        _ => Ok(()),
    }
}

fn api_error(e: UserError) -> ApiError {
    let status = match &e {
        UserError::Validation(_) => StatusCode::BAD_REQUEST,
        UserError::NotFound => StatusCode::NOT_FOUND,
        UserError::EmailTaken => StatusCode::CONFLICT,
        UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        UserError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        UserError::Query(_) | UserError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = if status.is_server_error() {
        // details are in the log line written by the repository
        status.canonical_reason().unwrap_or("error").to_string()
    } else {
        e.to_string()
    };
    (status, message)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(get_user_by_email))
        .route("/users/availability", get(email_availability))
        .route(
            "/users/:id",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    reject_bad_email(Some(payload.email.as_str()))?;
    let user = state.users.create(payload).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    state.users.get_by_id(id).await.map(Json).map_err(api_error)
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .get_by_email(&q.email)
        .await
        .map(Json)
        .map_err(api_error)
}

#[instrument(skip(state, payload))]
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserInput>,
) -> Result<Json<User>, ApiError> {
    reject_bad_email(Some(payload.email.as_str()))?;
    state
        .users
        .update(id, payload)
        .await
        .map(Json)
        .map_err(api_error)
}

#[instrument(skip(state, payload))]
pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    reject_bad_email(payload.email.as_deref())?;
    state
        .users
        .patch(id, payload)
        .await
        .map(Json)
        .map_err(api_error)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn email_availability(
    State(state): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> Result<Json<EmailAvailability>, ApiError> {
    let available = state
        .users
        .validate_email_is_unique(&q.email)
        .await
        .map_err(api_error)?;
    Ok(Json(EmailAvailability {
        email: q.email,
        available,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthenticatedUser>, ApiError> {
    state.auth.login(&payload).await.map(Json).map_err(api_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        crate::app::build_app(AppState::fake())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().method(method).uri(uri);
        if body.is_some() {
            req = req.header("content-type", "application/json");
        }
        let req = req
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    const RAY: &str =
        r#"{"email":"cinnamon@nice.com","name":"Ray May","currentPassword":"P0werpuff"}"#;

    #[test]
    fn email_regex() {
        assert!(is_valid_email("cinnamon@nice.com"));
        assert!(!is_valid_email("cinnamon"));
        assert!(!is_valid_email("a b@c.d"));
    }

    #[tokio::test]
    async fn create_fetch_and_delete_over_http() {
        let app = app();
        let (status, body) = send(&app, "POST", "/api/v1/users", Some(RAY)).await;
        assert_eq!(status, StatusCode::CREATED);
        let created: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(created["name"], "Ray May");
        assert!(created.get("currentPassword").is_none());
        assert_eq!(created["createdDate"], created["updatedDate"]);
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("cinnamon@nice.com"));

        let (status, _) = send(&app, "GET", "/api/v1/users?email=cinnamon@nice.com", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_fields_are_a_bad_request() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/users",
            Some(r#"{"email":"cinnamon@nice.com","currentPassword":"P0werpuff"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Please provide all fields, including: Name");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = app();
        send(&app, "POST", "/api/v1/users", Some(RAY)).await;
        let (status, _) = send(&app, "POST", "/api/v1/users", Some(RAY)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/users/availability?email=cinnamon@nice.com",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#""available":false"#));
    }

    #[tokio::test]
    async fn patch_and_replace() {
        let app = app();
        let (_, body) = send(&app, "POST", "/api/v1/users", Some(RAY)).await;
        let id = serde_json::from_str::<serde_json::Value>(&body).unwrap()["id"]
            .as_i64()
            .unwrap();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/v1/users/{id}"),
            Some(r#"{"name":"Ray P. May"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ray P. May"));

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/users/{id}"),
            Some(r#"{"email":"ray@nice.com","name":"Ray"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/users/999",
            Some(RAY),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn login_over_http() {
        let app = app();
        send(&app, "POST", "/api/v1/users", Some(RAY)).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            Some(r#"{"email":"cinnamon@nice.com","currentPassword":"P0werpuff"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ray May"));

        let (wrong_status, wrong_body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            Some(r#"{"email":"cinnamon@nice.com","currentPassword":"wrong"}"#),
        )
        .await;
        let (unknown_status, unknown_body) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            Some(r#"{"email":"nosuch@x.com","currentPassword":"anything"}"#),
        )
        .await;
        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/users",
            Some(r#"{"email":"not-an-email","name":"X","currentPassword":"p"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid email");
    }

    #[tokio::test]
    async fn unreachable_database_is_service_unavailable() {
        use crate::users::pg_store::tests::unreachable_store;

        let app = crate::app::build_app(AppState::fake_with_store(std::sync::Arc::new(
            unreachable_store(),
        )));
        let (status, body) = send(&app, "GET", "/api/v1/users/1", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, "Service Unavailable");

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/auth/login",
            Some(r#"{"email":"cinnamon@nice.com","currentPassword":"P0werpuff"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn query_failure_is_a_generic_server_error() {
        use crate::users::repo::tests::FailingStore;

        let app =
            crate::app::build_app(AppState::fake_with_store(std::sync::Arc::new(FailingStore)));
        let (status, body) = send(&app, "POST", "/api/v1/users", Some(RAY)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal Server Error");
        assert!(!body.contains("relation"));

        let (status, _) = send(
            &app,
            "GET",
            "/api/v1/users/availability?email=cinnamon@nice.com",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
