use axum::{
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Redirect},
};
use tracing::instrument;

const SETTINGS_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Settings</title>
  </head>
  <body>
    <form action="/auth/logout" method="post">
      <button type="submit">Sign Out</button>
    </form>
  </body>
</html>
"#;

#[utoipa::path(
    get,
    path= "/settings",
    responses (
        (status = 200, description = "Settings page with the sign-out form", content_type = "text/html"),
    ),
    tag= "settings"
)]
// axum handler for the settings page, renders regardless of session state
pub async fn settings() -> impl IntoResponse {
    Html(SETTINGS_PAGE)
}

#[utoipa::path(
    post,
    path= "/auth/logout",
    responses (
        (status = 303, description = "Session terminated, redirect to the login page"),
    ),
    tag= "settings"
)]
// axum handler for sign-out, session issuance itself belongs to the auth
// layer; terminating one here means expiring the cookie
#[instrument]
pub async fn sign_out() -> impl IntoResponse {
    let mut headers = HeaderMap::new();

    if let Ok(cookie) = "session=; Max-Age=0; Path=/; HttpOnly".parse() {
        headers.insert(SET_COOKIE, cookie);
    }

    (headers, Redirect::to("/auth/login"))
}
