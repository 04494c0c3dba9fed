use std::net::SocketAddr;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use aula::auth::jwt::{self, Claims};
use aula::config::Config;

/// A running test server instance with a dedicated scratch database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub jwt_secret: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_for(&self, account_id: Uuid, role: &str) -> String {
        jwt::encode_token(&Claims::new(account_id, role.to_string()), &self.jwt_secret)
            .expect("token encoding failed")
    }

    /// Accounts are owned by an external service; tests seed the projection
    /// directly.
    pub async fn insert_account(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        role: &str,
        status: &str,
    ) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO accounts (first_name, last_name, email, role, status)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(role)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .expect("account insert failed")
    }

    /// Seed an admin account and mint its token.
    pub async fn admin(&self) -> (Uuid, String) {
        let id = self
            .insert_account("Ana", "Torres", "admin@test.com", "admin", "active")
            .await;
        let token = self.token_for(id, "admin");
        (id, token)
    }

    /// Seed an active learner account and mint its token.
    pub async fn learner(&self, email: &str) -> (Uuid, String) {
        let id = self
            .insert_account("Luis", "Rojas", email, "learner", "active")
            .await;
        let token = self.token_for(id, "learner");
        (id, token)
    }

    /// Create an activity via the API (multipart, like the real client).
    pub async fn create_activity(
        &self,
        token: &str,
        name: &str,
        description: &str,
        deadline: &str,
        attachments: Vec<(&str, &'static [u8])>,
    ) -> (Value, StatusCode) {
        let mut form = Form::new()
            .text("name", name.to_string())
            .text("description", description.to_string())
            .text("deadline", deadline.to_string());
        for (file_name, bytes) in attachments {
            form = form.part(
                "attachments",
                Part::bytes(bytes).file_name(file_name.to_string()),
            );
        }

        let resp = self
            .client
            .post(self.url("/api/v1/activities"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("create activity request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit evidence for an activity. Identity can come from the session
    /// token, the query string, or a `learner_id` form field.
    pub async fn submit_evidence(
        &self,
        activity_id: &str,
        token: Option<&str>,
        query_learner: Option<Uuid>,
        body_learner: Option<Uuid>,
        file: Option<(&str, &'static [u8])>,
    ) -> (Value, StatusCode) {
        let mut url = self.url(&format!("/api/v1/activities/{activity_id}/submissions"));
        if let Some(id) = query_learner {
            url = format!("{url}?learner_id={id}");
        }

        let mut form = Form::new();
        if let Some(id) = body_learner {
            form = form.text("learner_id", id.to_string());
        }
        if let Some((file_name, bytes)) = file {
            form = form.part("evidence", Part::bytes(bytes).file_name(file_name.to_string()));
        }

        let mut req = self.client.post(url).multipart(form);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.expect("submit evidence request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn review(
        &self,
        token: &str,
        submission_id: &str,
        decision: &str,
        comment: Option<&str>,
    ) -> (Value, StatusCode) {
        let mut body = json!({ "decision": decision });
        if let Some(comment) = comment {
            body["comment"] = json!(comment);
        }

        let resp = self
            .client
            .put(self.url(&format!("/api/v1/submissions/{submission_id}/review")))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("review request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (Value, StatusCode) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Update an activity via multipart, only sending the given fields.
    pub async fn update_activity(
        &self,
        token: &str,
        activity_id: &str,
        fields: Vec<(&str, &str)>,
        attachments: Vec<(&str, &'static [u8])>,
    ) -> (Value, StatusCode) {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }
        for (file_name, bytes) in attachments {
            form = form.part(
                "attachments",
                Part::bytes(bytes).file_name(file_name.to_string()),
            );
        }

        let resp = self
            .client
            .put(self.url(&format!("/api/v1/activities/{activity_id}")))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("update activity request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn a test app against a freshly created database. Returns None (and the
/// test should bail out) when DATABASE_URL is not configured.
pub async fn spawn_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();

    let Ok(base_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let suffix = Uuid::now_v7().to_string().replace('-', "");
    let db_name = format!("aula_test_{suffix}");

    // Connect to the default postgres DB to create the scratch DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let jwt_secret = "test-jwt-secret-that-is-long-enough".to_string();
    let config = Config {
        database_url: test_url,
        jwt_secret: jwt_secret.clone(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to a random port
        base_url: "http://localhost:0".to_string(),
        max_body_size: 12 * 1024 * 1024,
        upload_dir: std::env::temp_dir().join(format!("aula-test-uploads-{suffix}")),
        worker_count: 1,
        log_level: "warn".to_string(),
        smtp: None,
    };

    let (app, _state) = aula::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    Some(TestApp {
        addr,
        pool,
        client,
        db_name,
        jwt_secret,
    })
}

/// Drop the scratch database after a test completes.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
