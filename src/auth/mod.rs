use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

mod callback;
mod prompt;
mod session;

pub use callback::CallbackListener;
pub use session::Session;

pub const SCOPES: &[&str] = &[
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-modify-playback-state",
];

pub const DEFAULT_CALLBACK_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token request rejected with {status}: {body}")]
    TokenRequest { status: StatusCode, body: String },

    #[error("Token response did not include a refresh token")]
    MissingRefreshToken,

    #[error("Token lifetime out of range: {0}s")]
    InvalidExpiry(i64),

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Redirect did not contain an authorization code")]
    MissingCode,

    #[error("Authorization state did not match, ignoring redirect")]
    StateMismatch,

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Callback listener stopped before receiving a code")]
    CallbackClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
}

#[derive(Clone)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    fn from_response(
        response: TokenResponse,
        now: DateTime<Utc>,
        previous_refresh: Option<&str>,
    ) -> Result<Self, AuthError> {
        let refresh_token = response
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string))
            .ok_or(AuthError::MissingRefreshToken)?;

        let expires_at = TimeDelta::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(AuthError::InvalidExpiry(response.expires_in))?;

        Ok(Self {
            access_token: response.access_token,
            refresh_token,
            expires_at,
        })
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Browser,
    Manual,
}

pub struct Authenticator {
    http: Client,
    credentials: Credentials,
    accounts_url: Url,
}

impl Authenticator {
    pub fn new(http: Client, credentials: Credentials, accounts_url: Url) -> Self {
        Self {
            http,
            credentials,
            accounts_url,
        }
    }

    pub fn redirect_uri(&self) -> &Url {
        &self.credentials.redirect_uri
    }

    pub fn authorize_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = self.accounts_url.join("authorize")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", self.credentials.redirect_uri.as_str())
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state);
        Ok(url)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];
        let response = self.request_token(&params).await?;
        Token::from_response(response, Utc::now(), None)
    }

    pub async fn refresh(&self, token: &Token) -> Result<Token, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
        ];
        let response = self.request_token(&params).await?;
        Token::from_response(response, Utc::now(), Some(token.refresh_token.as_str()))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = self.accounts_url.join("api/token")?;
        let response = self
            .http
            .post(url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRequest { status, body });
        }

        Ok(response.json().await?)
    }
}

pub async fn authorize(authenticator: &Authenticator, flow: AuthFlow) -> Result<Token, AuthError> {
    let state = Uuid::new_v4().to_string();
    let url = authenticator.authorize_url(&state)?;

    let code = match flow {
        AuthFlow::Manual => prompt::ask_for_code(&url, &state).await?,
        AuthFlow::Browser => {
            let addr = callback::listen_addr(authenticator.redirect_uri());
            let listener = CallbackListener::bind(addr).await?;

            info!("Opening browser for Spotify authorization...");
            if let Err(e) = webbrowser::open(url.as_str()) {
                warn!("Failed to open browser: {e}");
                println!("Please log in to Spotify by visiting: {url}");
            }

            listener.wait_for_code(&state).await?
        }
    };

    let token = authenticator.exchange_code(&code).await?;
    info!("Authorized with Spotify");
    Ok(token)
}

pub(crate) fn code_from_params<'a, I>(params: I, expected_state: &str) -> Result<String, AuthError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in params {
        match key {
            "code" => code = Some(value),
            "state" => state = Some(value),
            "error" => error = Some(value),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::Denied(error.to_string()));
    }
    let code = code.filter(|c| !c.is_empty()).ok_or(AuthError::MissingCode)?;
    if state != Some(expected_state) {
        return Err(AuthError::StateMismatch);
    }
    Ok(code.to_string())
}
