//! End-to-end tests for the OAuth flow and HTTP surface, with HubSpot
//! replaced by a local mock server.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string_contains, header as request_header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hubspot_quickstart::{
    router, AccessTokenCache, AppConfig, AppState, ClientCredentials, Environment,
    EnvironmentState, InMemoryAccessTokenCache, InMemoryRefreshTokenStore, ProviderBaseUrls,
    RefreshTokenStore,
};

const SESSION: &str = "test-session";
const SESSION_COOKIE: &str = "quickstart_session=test-session";

fn test_config(provider_uri: &str) -> AppConfig {
    let provider = Url::parse(provider_uri).unwrap();
    AppConfig {
        environment: Environment::Prod,
        prod_credentials: ClientCredentials {
            client_id: "prod-client".to_string(),
            client_secret: SecretString::new("prod-secret".to_string()),
        },
        qa_credentials: Some(ClientCredentials {
            client_id: "qa-client".to_string(),
            client_secret: SecretString::new("qa-secret".to_string()),
        }),
        scopes: vec!["contacts".to_string()],
        app_base_url: Url::parse("http://localhost:3000").unwrap(),
        port: 3000,
        prod_urls: ProviderBaseUrls {
            app: provider.clone(),
            api: provider.clone(),
        },
        qa_urls: ProviderBaseUrls {
            app: Url::parse("https://app.hubspotqa.com").unwrap(),
            api: Url::parse("https://api.hubapiqa.com").unwrap(),
        },
    }
}

fn build_state(
    provider_uri: &str,
) -> (
    AppState,
    Arc<InMemoryRefreshTokenStore>,
    Arc<InMemoryAccessTokenCache>,
) {
    let env = Arc::new(EnvironmentState::new(test_config(provider_uri)).unwrap());
    let refresh = Arc::new(InMemoryRefreshTokenStore::new());
    let access = Arc::new(InMemoryAccessTokenCache::new());
    let state = AppState::with_stores(
        env,
        reqwest::Client::new(),
        refresh.clone(),
        access.clone(),
    );
    (state, refresh, access)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, SESSION_COOKIE)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn token_body(access: &str, refresh: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
        "token_type": "bearer"
    })
}

#[tokio::test]
async fn code_grant_populates_both_stores_and_redirects_home() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=sample-code"))
        .and(body_string_contains("client_id=prod-client"))
        .and(body_string_contains("client_secret=prod-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("A", "R", 100)))
        .expect(1)
        .mount(&provider)
        .await;

    let (state, refresh, access) = build_state(&provider.uri());
    let app = router(state.clone());

    assert!(!state.tokens.is_authorized(SESSION).await);

    let response = app
        .oneshot(get("/oauth-callback?code=sample-code"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    assert!(state.tokens.is_authorized(SESSION).await);
    assert_eq!(refresh.get(SESSION).await.unwrap().as_deref(), Some("R"));
    // the cached token is served without a second exchange (expect(1) above)
    assert_eq!(access.get(SESSION).await.unwrap().as_deref(), Some("A"));
    let ctx = state.env.snapshot();
    assert_eq!(
        state
            .tokens
            .access_token(&ctx, SESSION)
            .await
            .unwrap()
            .as_deref(),
        Some("A")
    );
}

#[tokio::test]
async fn callback_without_code_performs_no_exchange_and_no_redirect() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("A", "R", 100)))
        .expect(0)
        .mount(&provider)
        .await;

    let (state, _, _) = build_state(&provider.uri());
    let response = router(state)
        .oneshot(get("/oauth-callback"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn provider_rejection_redirects_with_message_and_leaves_stores_untouched() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"status": "error", "message": "bad code"})),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let (state, refresh, access) = build_state(&provider.uri());
    let response = router(state.clone())
        .oneshot(get("/oauth-callback?code=expired"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/error?msg=bad+code");

    assert!(!state.tokens.is_authorized(SESSION).await);
    assert_eq!(refresh.get(SESSION).await.unwrap(), None);
    assert_eq!(access.get(SESSION).await.unwrap(), None);
}

#[tokio::test]
async fn expired_cache_triggers_exactly_one_refresh_exchange() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/v1/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("A2", "R2", 100)))
        .expect(1)
        .mount(&provider)
        .await;

    let (state, refresh, access) = build_state(&provider.uri());
    refresh.set(SESSION, "R".to_string()).await.unwrap();
    access
        .put(SESSION, "stale".to_string(), Duration::ZERO)
        .await
        .unwrap();

    let ctx = state.env.snapshot();
    let first = state.tokens.access_token(&ctx, SESSION).await.unwrap();
    assert_eq!(first.as_deref(), Some("A2"));

    // second call is served from the cache; expect(1) holds
    let second = state.tokens.access_token(&ctx, SESSION).await.unwrap();
    assert_eq!(second.as_deref(), Some("A2"));

    assert_eq!(refresh.get(SESSION).await.unwrap().as_deref(), Some("R2"));
}

#[tokio::test]
async fn home_renders_contact_for_authorized_session() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists/all/contacts/all"))
        .and(query_param("count", "1"))
        .and(request_header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contacts": [{
                "vid": 101,
                "properties": {
                    "firstname": {"value": "Ada"},
                    "lastname": {"value": "Lovelace"}
                }
            }]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let (state, refresh, access) = build_state(&provider.uri());
    refresh.set(SESSION, "R".to_string()).await.unwrap();
    access
        .put(SESSION, "tok-1".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    let response = router(state).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Access token: tok-1"));
    assert!(body.contains("Contact name: Ada Lovelace"));
}

#[tokio::test]
async fn home_renders_inline_error_when_contact_fetch_fails() {
    let provider = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists/all/contacts/all"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"status": "error", "message": "expired token"})),
        )
        .mount(&provider)
        .await;

    let (state, refresh, access) = build_state(&provider.uri());
    refresh.set(SESSION, "R".to_string()).await.unwrap();
    access
        .put(SESSION, "tok-1".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    let body = body_string(router(state).oneshot(get("/")).await.unwrap()).await;
    assert!(body.contains("Unable to retrieve contact! Error Message: expired token"));
}

#[tokio::test]
async fn home_for_new_visitor_skips_token_resolution() {
    let provider = MockServer::start().await;
    let (state, _, _) = build_state(&provider.uri());

    let body = body_string(router(state).oneshot(get("/")).await.unwrap()).await;
    assert!(body.contains("Install the app"));
    assert!(!body.contains("Access token"));
}

#[tokio::test]
async fn install_redirects_to_consent_page() {
    let provider = MockServer::start().await;
    let (state, _, _) = build_state(&provider.uri());

    let response = router(state).oneshot(get("/install")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with(&format!("{}/oauth/authorize?", provider.uri())));
    assert!(location.contains("client_id=prod-client"));
    assert!(location.contains("scope=contacts"));
    assert!(location.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth-callback"));
}

#[tokio::test]
async fn env_toggle_flips_selector_and_reports_json() {
    let provider = MockServer::start().await;
    let (state, _, _) = build_state(&provider.uri());
    let app = router(state.clone());

    let response = app.clone().oneshot(get("/env-toggle")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(payload, json!({"hubspotEnv": "QA"}));
    assert_eq!(state.env.snapshot().environment, Environment::Qa);

    let response = app.oneshot(get("/env-toggle")).await.unwrap();
    let payload: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(payload, json!({"hubspotEnv": "PROD"}));
    assert_eq!(state.env.snapshot().environment, Environment::Prod);
}

#[tokio::test]
async fn error_page_renders_message_verbatim() {
    let provider = MockServer::start().await;
    let (state, _, _) = build_state(&provider.uri());

    let body = body_string(
        router(state)
            .oneshot(get("/error?msg=Foo"))
            .await
            .unwrap(),
    )
    .await;
    assert!(body.contains("Foo"));
}

#[tokio::test]
async fn webhook_deliveries_are_acknowledged_without_processing() {
    let provider = MockServer::start().await;
    let (state, _, _) = build_state(&provider.uri());

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"[{"eventId": 1}]"#))
        .unwrap();
    let response = router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn new_visitors_receive_a_session_cookie() {
    let provider = MockServer::start().await;
    let (state, _, _) = build_state(&provider.uri());

    let response = router(state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("quickstart_session="));
    assert!(cookie.contains("HttpOnly"));
}
