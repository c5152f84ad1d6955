//! Route Handlers
//!
//! One handler per route; each reads a single environment snapshot and
//! drives the token lifecycle with the request's session ID.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::ProviderContext;
use crate::server::session::SessionId;
use crate::server::{views, AppState};

/// `GET /` — landing page; renders the contact when the session holds tokens.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Html<String> {
    let ctx = state.env.snapshot();

    let authorized_section = if state.tokens.is_authorized(session.as_str()).await {
        Some(render_authorized(&state, &ctx, session.as_str()).await)
    } else {
        None
    };

    Html(views::home_page(ctx.environment, authorized_section))
}

async fn render_authorized(state: &AppState, ctx: &ProviderContext, session_id: &str) -> String {
    match state.tokens.access_token(ctx, session_id).await {
        Ok(Some(access_token)) => {
            let contact_line = match state.contacts.first_contact(ctx, &access_token).await {
                Ok(contact) => views::contact_line(&contact),
                Err(e) => views::contact_error_line(&e.user_message()),
            };
            views::authorized_section(&access_token, &contact_line)
        }
        // Refresh token disappeared between the check and the lookup.
        Ok(None) => String::new(),
        Err(e) => views::contact_error_line(&e.user_message()),
    }
}

/// `GET /install` — start of the OAuth flow.
pub async fn install(State(state): State<AppState>) -> Redirect {
    let ctx = state.env.snapshot();
    info!("initiating OAuth 2.0 flow with HubSpot");
    info!(url = %ctx.authorize_url, "step 1: redirecting user to HubSpot's consent page");
    // Step 2, the consent prompt, happens entirely on HubSpot's side.
    Redirect::to(ctx.authorize_url.as_str())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// `GET /oauth-callback` — the provider redirect carrying the code.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    info!("step 3: handling the redirect sent by HubSpot");

    let Some(code) = query.code else {
        warn!("callback arrived without an authorization code");
        return (StatusCode::BAD_REQUEST, Html(views::missing_code_page())).into_response();
    };

    let ctx = state.env.snapshot();
    info!("step 4: exchanging the authorization code for an access token and refresh token");
    match state.tokens.authorize(&ctx, session.as_str(), code).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            warn!(error = %e, "authorization code exchange failed");
            let target = format!("/error?msg={}", encode_query_value(&e.user_message()));
            Redirect::to(&target).into_response()
        }
    }
}

/// `GET /env-toggle` — flip QA <-> PROD and report the new selector.
pub async fn env_toggle(State(state): State<AppState>) -> Response {
    match state.env.toggle() {
        Ok(ctx) => {
            info!(env = %ctx.environment, "switched HubSpot environment");
            Json(json!({ "hubspotEnv": ctx.environment })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "environment toggle refused");
            (
                StatusCode::CONFLICT,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    pub msg: Option<String>,
}

/// `GET /error` — renders the message from the query string verbatim.
pub async fn error_page(Query(query): Query<ErrorQuery>) -> Html<String> {
    Html(views::error_page(query.msg.as_deref().unwrap_or("")))
}

/// `POST /webhook` — deliveries are logged and acknowledged, nothing more.
pub async fn webhook(body: String) -> StatusCode {
    info!(bytes = body.len(), "received webhook delivery");
    debug!(payload = %body, "webhook payload");
    StatusCode::NO_CONTENT
}

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_query_value() {
        assert_eq!(encode_query_value("bad code"), "bad+code");
        assert_eq!(encode_query_value("a&b=c"), "a%26b%3Dc");
    }
}
