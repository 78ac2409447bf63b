use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::Uri;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{AppError, Result};

const LOGIN_COMPLETE_PAGE: &str = "Login completed! You can close this window.";

// How long the server gets to flush the login page after the redirect arrived.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A local listener that waits for the browser to come back to the OAuth
/// redirect URI. It hands over exactly one redirect URL and is then torn down.
pub struct RedirectListener {
    listener: TcpListener,
    redirect_uri: Url,
}

#[derive(Clone)]
struct CallbackState {
    redirect_uri: Url,
    sender: Arc<Mutex<Option<oneshot::Sender<Url>>>>,
}

impl RedirectListener {
    pub async fn bind(redirect_uri: &str) -> Result<Self> {
        let redirect_uri = Url::parse(redirect_uri)
            .map_err(|e| AppError::Config(format!("Invalid redirect URI: {}", e)))?;

        let host = redirect_uri
            .host_str()
            .ok_or_else(|| AppError::Config("Redirect URI has no host".into()))?
            .to_string();
        let port = redirect_uri
            .port_or_known_default()
            .ok_or_else(|| AppError::Config("Redirect URI has no port".into()))?;

        let listener = TcpListener::bind((host.as_str(), port)).await?;
        debug!("Listening for OAuth redirect on {}:{}", host, port);

        Ok(Self {
            listener,
            redirect_uri,
        })
    }

    /// Wait until the browser hits the redirect path and return the full
    /// redirect URL it was sent to.
    pub async fn wait(self, deadline: Duration) -> Result<Url> {
        let (tx, rx) = oneshot::channel();
        let Self {
            listener,
            redirect_uri,
        } = self;

        let app = Router::new()
            .route(redirect_uri.path(), get(handle_callback))
            .with_state(CallbackState {
                redirect_uri: redirect_uri.clone(),
                sender: Arc::new(Mutex::new(Some(tx))),
            });

        let shutdown = CancellationToken::new();
        let stop = shutdown.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await
        });

        let outcome = tokio::time::timeout(deadline, rx).await;

        shutdown.cancel();
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
            Ok(Ok(Err(e))) => warn!("Callback server failed: {}", e),
            Ok(_) => {}
            Err(_) => server.abort(),
        }

        match outcome {
            Ok(Ok(url)) => {
                info!("Received OAuth redirect");
                Ok(url)
            }
            Ok(Err(_)) => Err(AppError::Auth("Callback listener stopped unexpectedly".into())),
            Err(_) => Err(AppError::Auth("Timed out waiting for browser login".into())),
        }
    }
}

async fn handle_callback(State(state): State<CallbackState>, uri: Uri) -> &'static str {
    let url = redirect_url(&state.redirect_uri, uri.query());

    if let Some(sender) = state.sender.lock().await.take() {
        sender.send(url).ok();
    } else {
        debug!("Ignoring repeated OAuth redirect");
    }

    LOGIN_COMPLETE_PAGE
}

/// The redirect URI as the browser was sent to it, query string included.
pub fn redirect_url(redirect_uri: &Url, query: Option<&str>) -> Url {
    let mut url = redirect_uri.clone();
    url.set_query(query);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpStream;

    fn free_port() -> u16 {
        let socket = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        socket.local_addr().unwrap().port()
    }

    #[test]
    fn test_redirect_url_keeps_query() {
        let base = Url::parse("http://127.0.0.1:8080/callback").unwrap();
        let url = redirect_url(&base, Some("code=abc123&state=xyz"));

        assert_eq!(url.as_str(), "http://127.0.0.1:8080/callback?code=abc123&state=xyz");
        let code = url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned());
        assert_eq!(code.as_deref(), Some("abc123"));

        assert_eq!(redirect_url(&base, None).as_str(), "http://127.0.0.1:8080/callback");
    }

    #[tokio::test]
    async fn test_listener_hands_over_single_redirect() {
        let port = free_port();
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let listener = RedirectListener::bind(&redirect_uri).await.unwrap();
        let waiter = tokio::spawn(listener.wait(Duration::from_secs(5)));

        let miss = reqwest::get(format!("http://127.0.0.1:{}/favicon.ico", port))
            .await
            .unwrap();
        assert_eq!(miss.status(), reqwest::StatusCode::NOT_FOUND);

        let hit = reqwest::get(format!("{}?code=c0de", redirect_uri)).await.unwrap();
        assert!(hit.status().is_success());
        assert_eq!(hit.text().await.unwrap(), LOGIN_COMPLETE_PAGE);

        let url = waiter.await.unwrap().unwrap();
        assert_eq!(url.query(), Some("code=c0de"));
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_redirect() {
        let port = free_port();
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let listener = RedirectListener::bind(&redirect_uri).await.unwrap();
        let waiter = tokio::spawn(listener.wait(Duration::from_secs(2)));

        // Browsers open speculative connections that never send a request.
        let _idle = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

        let hit = reqwest::get(format!("{}?code=c0de", redirect_uri)).await.unwrap();
        assert!(hit.status().is_success());

        let url = waiter.await.unwrap().unwrap();
        assert_eq!(url.query(), Some("code=c0de"));
    }

    #[tokio::test]
    async fn test_listener_times_out() {
        let port = free_port();
        let listener = RedirectListener::bind(&format!("http://127.0.0.1:{}/callback", port))
            .await
            .unwrap();
        let result = listener.wait(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
