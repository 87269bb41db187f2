use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

use super::{AuthError, DEFAULT_CALLBACK_PORT, code_from_params};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    code_tx: mpsc::Sender<Result<String, AuthError>>,
}

pub struct CallbackListener {
    listener: TcpListener,
}

pub fn listen_addr(redirect_uri: &Url) -> SocketAddr {
    let port = redirect_uri.port().unwrap_or(DEFAULT_CALLBACK_PORT);
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

impl CallbackListener {
    pub async fn bind(addr: SocketAddr) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "Waiting for authorization callback on http://{}",
            listener.local_addr()?
        );
        Ok(Self { listener })
    }

    pub async fn wait_for_code(self, expected_state: &str) -> Result<String, AuthError> {
        let (code_tx, mut code_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .fallback(handle_callback)
            .with_state(CallbackState {
                expected_state: Arc::from(expected_state),
                code_tx,
            });

        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = code_rx.recv().await.unwrap_or(Err(AuthError::CallbackClosed));

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
            Ok(Ok(Ok(()))) => debug!("Callback listener stopped"),
            Ok(Ok(Err(e))) => warn!("Callback listener failed: {e}"),
            Ok(Err(e)) => warn!("Callback listener task failed: {e}"),
            Err(_) => warn!("Callback listener did not stop within {SHUTDOWN_GRACE:?}"),
        }

        outcome
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, &'static str) {
    let pairs = params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    match code_from_params(pairs, &state.expected_state) {
        Ok(code) => {
            let _ = state.code_tx.try_send(Ok(code));
            (StatusCode::OK, "Login successful! You may close this window.")
        }
        Err(AuthError::Denied(reason)) => {
            let _ = state.code_tx.try_send(Err(AuthError::Denied(reason)));
            (StatusCode::OK, "Authorization was denied. You may close this window.")
        }
        Err(AuthError::StateMismatch) => {
            warn!("Ignoring callback with unexpected state");
            (StatusCode::BAD_REQUEST, "Unexpected authorization state")
        }
        Err(_) => (StatusCode::BAD_REQUEST, "No code in callback"),
    }
}
