use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use spendbook_auth::{AuthConfig, Role, TokenClaims};

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = spendbook_api::app::build_app(&AuthConfig::new(ACCESS_SECRET, REFRESH_SECRET))
            .expect("valid test config");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint(secret: &str, username: &str, email: &str, role: &str, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        username: username.to_string(),
        email: email.to_string(),
        role: Role::new(role.to_string()),
        issued_at: now - ChronoDuration::minutes(1),
        expires_at: now + expires_in,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

struct Tokens {
    access: String,
    refresh: String,
}

fn tokens(username: &str, role: &str) -> Tokens {
    let email = format!("{username}@example.com");
    Tokens {
        access: mint(ACCESS_SECRET, username, &email, role, ChronoDuration::minutes(10)),
        refresh: mint(REFRESH_SECRET, username, &email, role, ChronoDuration::days(1)),
    }
}

fn expired_access(username: &str, role: &str) -> Tokens {
    let email = format!("{username}@example.com");
    Tokens {
        access: mint(ACCESS_SECRET, username, &email, role, -ChronoDuration::minutes(10)),
        refresh: mint(REFRESH_SECRET, username, &email, role, ChronoDuration::days(1)),
    }
}

fn cookies(t: &Tokens) -> String {
    format!("accessToken={}; refreshToken={}", t.access, t.refresh)
}

async fn get_with_cookies(srv: &TestServer, path: &str, t: &Tokens) -> reqwest::Response {
    reqwest::Client::new()
        .get(srv.url(path))
        .header("cookie", cookies(t))
        .send()
        .await
        .unwrap()
}

async fn error_message(res: reqwest::Response) -> String {
    let body: serde_json::Value = res.json().await.unwrap();
    body["message"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_tokens_are_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(res).await, "Unauthorized");

    // Access token alone is not enough.
    let t = tokens("alice", "User");
    let res = client
        .get(srv.url("/whoami"))
        .bearer_auth(&t.access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(res).await, "Unauthorized");
}

#[tokio::test]
async fn identity_is_derived_from_tokens() {
    let srv = TestServer::spawn().await;
    let t = tokens("alice", "User");

    let res = get_with_cookies(&srv, "/whoami", &t).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("set-cookie").is_none());

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "User");
    assert!(body.get("refreshNotice").is_none());
}

#[tokio::test]
async fn header_transport_is_supported() {
    let srv = TestServer::spawn().await;
    let t = tokens("alice", "User");

    let res = reqwest::Client::new()
        .get(srv.url("/users/alice"))
        .bearer_auth(&t.access)
        .header("x-refresh-token", &t.refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn same_user_route_rejects_other_users() {
    let srv = TestServer::spawn().await;
    let t = tokens("bob", "Admin");

    let res = get_with_cookies(&srv, "/users/alice", &t).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        error_message(res).await,
        "Token has a username different from the requested one"
    );

    let res = get_with_cookies(&srv, "/users/bob", &t).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn mismatched_token_subjects_are_unauthorized() {
    let srv = TestServer::spawn().await;
    let alice = tokens("alice", "User");
    let bob = tokens("bob", "User");
    let mixed = Tokens {
        access: alice.access,
        refresh: bob.refresh,
    };

    let res = get_with_cookies(&srv, "/users/alice", &mixed).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(res).await, "Mismatched users");
}

#[tokio::test]
async fn forged_token_reports_codec_label() {
    let srv = TestServer::spawn().await;
    let t = Tokens {
        access: mint("someone-else", "alice", "alice@example.com", "Admin", ChronoDuration::minutes(5)),
        refresh: tokens("alice", "Admin").refresh,
    };

    let res = get_with_cookies(&srv, "/whoami", &t).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(res).await, "InvalidSignature");
}

#[tokio::test]
async fn groups_are_managed_by_admins_and_read_by_members() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = tokens("root", "Admin");
    let alice = tokens("alice", "User");
    let bob = tokens("bob", "User");

    // Non-admins cannot create groups.
    let res = client
        .put(srv.url("/groups/household"))
        .header("cookie", cookies(&alice))
        .json(&json!({ "members": ["alice@example.com"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(res).await, "Admin authority needed");

    let res = client
        .put(srv.url("/groups/household"))
        .header("cookie", cookies(&admin))
        .json(&json!({ "members": ["alice@example.com", "root@example.com"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = get_with_cookies(&srv, "/groups/household", &alice).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["members"], json!(["alice@example.com", "root@example.com"]));

    let res = get_with_cookies(&srv, "/groups/household", &bob).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(res).await, "User is not in the group");

    // Unknown groups look like groups the caller is not in.
    let res = get_with_cookies(&srv, "/groups/unknown", &alice).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_group_body_is_a_client_error_after_authorization() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/groups/household"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .put(srv.url("/groups/household"))
        .header("cookie", cookies(&tokens("root", "Admin")))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_access_is_renewed_through_cookie() {
    let srv = TestServer::spawn().await;
    let t = expired_access("alice", "User");

    let res = get_with_cookies(&srv, "/users/alice", &t).await;
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get("set-cookie")
        .expect("renewed cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("accessToken="));
    assert!(set_cookie.contains("HttpOnly"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["refreshNotice"], spendbook_auth::RENEWAL_NOTICE);

    // The renewed token works on its own next to the original refresh token.
    let renewed = set_cookie
        .trim_start_matches("accessToken=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let next = Tokens {
        access: renewed,
        refresh: t.refresh,
    };
    let res = get_with_cookies(&srv, "/users/alice", &next).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn expired_access_is_renewed_through_header() {
    let srv = TestServer::spawn().await;
    let t = expired_access("alice", "User");

    let res = reqwest::Client::new()
        .get(srv.url("/whoami"))
        .bearer_auth(&t.access)
        .header("x-refresh-token", &t.refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("x-access-token").is_some());
    assert!(res.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn renewal_is_withheld_when_policy_denies() {
    let srv = TestServer::spawn().await;
    let t = expired_access("bob", "User");

    let res = get_with_cookies(&srv, "/users/alice", &t).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(res.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn expired_refresh_requires_login() {
    let srv = TestServer::spawn().await;
    let t = Tokens {
        access: mint(ACCESS_SECRET, "alice", "alice@example.com", "User", -ChronoDuration::minutes(10)),
        refresh: mint(REFRESH_SECRET, "alice", "alice@example.com", "User", -ChronoDuration::minutes(1)),
    };

    let res = get_with_cookies(&srv, "/whoami", &t).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(res).await, "Perform login again");
}

#[tokio::test]
async fn expired_refresh_with_fresh_access_requires_login() {
    let srv = TestServer::spawn().await;
    let t = Tokens {
        access: mint(ACCESS_SECRET, "alice", "alice@example.com", "User", ChronoDuration::minutes(10)),
        refresh: mint(REFRESH_SECRET, "alice", "alice@example.com", "User", -ChronoDuration::minutes(1)),
    };

    let res = get_with_cookies(&srv, "/whoami", &t).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(res).await, "Perform login again");
}

#[tokio::test]
async fn filters_are_built_from_query_parameters() {
    let srv = TestServer::spawn().await;
    let t = tokens("alice", "User");

    let res = get_with_cookies(&srv, "/transactions/filters?date=2023-01-01&min=50&max=600", &t).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "date": { "gte": "2023-01-01T00:00:00.000Z", "lte": "2023-01-01T23:59:59.000Z" },
            "amount": { "gte": 50.0, "lte": 600.0 },
        })
    );
}

#[tokio::test]
async fn malformed_filters_are_client_errors() {
    let srv = TestServer::spawn().await;
    let t = tokens("alice", "User");

    let res = get_with_cookies(&srv, "/transactions/filters?date=2023-01-01&from=2023-01-01", &t).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(res).await,
        "The query parameters include `date` together with at least one of `from` or `upTo`"
    );

    let res = get_with_cookies(&srv, "/transactions/filters?min=x", &t).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(res).await, "The Min value must be a numerical value");
}

#[tokio::test]
async fn filters_require_authentication() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/transactions/filters?min=x")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
