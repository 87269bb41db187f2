use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use super::{AuthError, Authenticator, Token};

/// Sole owner of the live token.
pub struct Session {
    authenticator: Authenticator,
    token: Mutex<Token>,
}

impl Session {
    pub fn new(authenticator: Authenticator, token: Token) -> Self {
        Self {
            authenticator,
            token: Mutex::new(token),
        }
    }

    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut token = self.token.lock().await;
        if token.is_expired_at(Utc::now()) {
            info!("Access token expired, refreshing");
            *token = self.authenticator.refresh(&token).await?;
        }
        Ok(token.access_token.clone())
    }
}
