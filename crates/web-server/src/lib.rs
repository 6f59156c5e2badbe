use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::Settings;
use database::DbRepository;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod extractors;
pub mod handlers;

/// Request bodies are small JSON records.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
}

/// Builds the full route table over an already-initialised repository.
pub fn build_router(db_repo: DbRepository) -> Router {
    let app_state = Arc::new(AppState { db_repo });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(|| async { "OK" }))
        // --- Users ---
        .route("/users", get(handlers::list_users))
        .route("/user", post(handlers::create_user))
        .route("/user/:id", get(handlers::get_user).delete(handlers::delete_user))
        .route("/user-detail/:id", get(handlers::get_user_detail))
        // --- Books ---
        .route("/books", get(handlers::list_books))
        .route("/book", post(handlers::create_book))
        .route("/book/:id", get(handlers::get_book).delete(handlers::delete_book))
        .route("/book-detail/:id", get(handlers::get_book_detail))
        // --- Links & roles ---
        .route("/book-author", post(handlers::create_book_author))
        .route("/book-authors", get(handlers::list_book_authors))
        .route("/book-borrow", post(handlers::create_book_borrow))
        .route("/book-borrows", get(handlers::list_book_borrows))
        .route("/roles", get(handlers::list_roles))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Connects to the database, makes sure the schema exists, serves until
/// Ctrl+C / SIGTERM, then closes the pool.
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database).await?;
    database::init_schema(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);
    let app = build_router(db_repo.clone());

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database::disconnect(db_repo.pool()).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C.");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("Received Ctrl+C, shutting down."),
        _ = terminate => tracing::warn!("Received SIGTERM, shutting down."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let pool = database::connect_in_memory().await.expect("in-memory pool");
        database::init_schema(&pool).await.expect("schema");
        build_router(DbRepository::new(pool))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
        };

        read(app, request).await
    }

    async fn send_raw(
        app: &Router,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        read(app, builder.body(Body::from(body.to_owned())).unwrap()).await
    }

    async fn read(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn index_and_health_respond() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Index page");

        let (status, _) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn create_then_fetch_user_with_default_role() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/user",
            Some(json!({ "username": "a", "email": "a@x.com", "password": "p" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "New User successfully added");
        let id = body["id"].as_i64().unwrap();

        let (status, user) = send(&app, "GET", &format!("/user/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["username"], "a");
        assert_eq!(user["email"], "a@x.com");
        assert_eq!(user["role_id"], 2);
        assert!(user.get("password").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_400_and_not_inserted() {
        let app = test_app().await;
        let payload = json!({ "username": "a", "email": "a@x.com", "password": "p" });

        let (status, _) = send(&app, "POST", "/user", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "POST", "/user", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "conflict");

        let (_, users) = send(&app, "GET", "/users", None).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_book_title_is_422_with_issue() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/book",
            Some(json!({ "description": "no title", "year": 2000 })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["issues"][0]["field"], "title");
        assert_eq!(body["issues"][0]["problem"]["kind"], "missing");
    }

    #[tokio::test]
    async fn unknown_ids_are_404() {
        let app = test_app().await;
        for (method, uri) in [
            ("GET", "/user/41"),
            ("GET", "/user-detail/41"),
            ("DELETE", "/user/41"),
            ("GET", "/book/41"),
            ("GET", "/book-detail/41"),
            ("DELETE", "/book/41"),
        ] {
            let (status, body) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(body["error"], "not_found");
        }
    }

    #[tokio::test]
    async fn non_numeric_id_is_422_json() {
        let app = test_app().await;
        for (method, uri) in [
            ("GET", "/user/abc"),
            ("GET", "/book-detail/x1"),
            ("DELETE", "/book/1.5"),
        ] {
            let (status, body) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{method} {uri}");
            assert_eq!(body["error"], "validation_error");
            assert_eq!(body["issues"][0]["field"], "id");
            assert_eq!(body["issues"][0]["problem"]["kind"], "wrong_type");
        }
    }

    #[tokio::test]
    async fn malformed_json_body_is_422_json() {
        let app = test_app().await;
        let (status, body) = send_raw(&app, "/book", Some("application/json"), "{not json").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["issues"][0]["field"], "body");

        let (_, books) = send(&app, "GET", "/books", None).await;
        assert_eq!(books, json!([]));
    }

    #[tokio::test]
    async fn missing_content_type_is_422_json() {
        let app = test_app().await;
        let payload = json!({ "username": "a", "email": "a@x.com", "password": "p" }).to_string();
        let (status, body) = send_raw(&app, "/user", None, &payload).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["issues"][0]["field"], "body");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn book_lifecycle() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/book",
            Some(json!({ "title": "Dune", "description": "Spice", "year": 1965 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();

        let (_, books) = send(&app, "GET", "/books", None).await;
        let books = books.as_array().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0]["title"], "Dune");
        assert_eq!(books[0]["year"], 1965);

        let (status, body) = send(&app, "DELETE", &format!("/book/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Book deleted successfully");

        let (status, _) = send(&app, "GET", &format!("/book/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_detail_embeds_full_books() {
        let app = test_app().await;
        let (_, user) = send(
            &app,
            "POST",
            "/user",
            Some(json!({ "username": "w", "email": "w@x.com", "password": "p" })),
        )
        .await;
        let user_id = user["id"].as_i64().unwrap();
        let (_, book) = send(
            &app,
            "POST",
            "/book",
            Some(json!({ "title": "Own", "description": "d", "year": 2020 })),
        )
        .await;
        let book_id = book["id"].as_i64().unwrap();

        let link = json!({ "book_id": book_id, "user_id": user_id });
        let (status, _) = send(&app, "POST", "/book-author", Some(link.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, "POST", "/book-borrow", Some(link)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, detail) = send(&app, "GET", &format!("/user-detail/{user_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["username"], "w");
        assert_eq!(detail["authored_books"][0]["title"], "Own");
        assert_eq!(detail["borrowed_books"][0]["title"], "Own");

        let (_, book_detail) = send(&app, "GET", &format!("/book-detail/{book_id}"), None).await;
        assert_eq!(book_detail["authors"][0]["username"], "w");
        assert_eq!(book_detail["borrowers"][0]["username"], "w");
    }

    #[tokio::test]
    async fn empty_detail_lists_are_present() {
        let app = test_app().await;
        let (_, user) = send(
            &app,
            "POST",
            "/user",
            Some(json!({ "username": "e", "email": "e@x.com", "password": "p" })),
        )
        .await;
        let user_id = user["id"].as_i64().unwrap();

        let (_, detail) = send(&app, "GET", &format!("/user-detail/{user_id}"), None).await;
        assert_eq!(detail["authored_books"], json!([]));
        assert_eq!(detail["borrowed_books"], json!([]));
    }

    #[tokio::test]
    async fn link_to_missing_user_is_400() {
        let app = test_app().await;
        let (_, book) = send(
            &app,
            "POST",
            "/book",
            Some(json!({ "title": "T", "description": "d", "year": 1 })),
        )
        .await;
        let book_id = book["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "POST",
            "/book-borrow",
            Some(json!({ "book_id": book_id, "user_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_reference");
    }

    #[tokio::test]
    async fn deleted_author_leaves_dangling_link() {
        let app = test_app().await;
        let (_, user) = send(
            &app,
            "POST",
            "/user",
            Some(json!({ "username": "g", "email": "g@x.com", "password": "p" })),
        )
        .await;
        let user_id = user["id"].as_i64().unwrap();
        let (_, book) = send(
            &app,
            "POST",
            "/book",
            Some(json!({ "title": "T", "description": "d", "year": 1 })),
        )
        .await;
        let book_id = book["id"].as_i64().unwrap();
        send(&app, "POST", "/book-author", Some(json!({ "book_id": book_id, "user_id": user_id }))).await;

        let (status, _) = send(&app, "DELETE", &format!("/user/{user_id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, links) = send(&app, "GET", "/book-authors", None).await;
        assert_eq!(links[0]["book_id"], book_id);
        assert_eq!(links[0]["user_id"], Value::Null);

        let (status, detail) = send(&app, "GET", &format!("/book-detail/{book_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["authors"], json!([]));
    }

    #[tokio::test]
    async fn roles_are_listed() {
        let app = test_app().await;
        let (status, roles) = send(&app, "GET", "/roles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(roles[0]["name"], "admin");
        assert_eq!(roles[1]["name"], "regular");
    }
}
