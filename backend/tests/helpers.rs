// backend/tests/helpers.rs
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;

use backend::config::{AppConfig, IdentityConfig, SessionConfig, WebConfig};
use backend::identity::{AuthSession, IdentityBackend, IdentityError};
use backend::web_server::{create_router, AppState};
use common::UserProfile;

/// Scriptable identity backend: every operation succeeds with canned
/// data unless told to reject, so tests can drive each branch without
/// a network.
#[derive(Default)]
pub struct StubIdentity {
    pub reject_login: Option<String>,
    pub reject_register: Option<String>,
    pub reject_update: Option<String>,
    pub reject_password: Option<String>,
    /// When set, tokens no longer resolve to an account.
    pub user_gone: bool,
    pub fail_sign_out: bool,
    pub login_calls: AtomicU32,
    pub register_calls: AtomicU32,
    pub sign_out_calls: AtomicU32,
}

pub fn profile(email: &str) -> UserProfile {
    UserProfile {
        uid: "stub-uid".to_string(),
        email: email.to_string(),
        display_name: Some("Stub User".to_string()),
    }
}

#[async_trait]
impl IdentityBackend for StubIdentity {
    async fn login(&self, email: &str, _password: &str) -> Result<AuthSession, IdentityError> {
        self.login_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.reject_login {
            Some(message) => Err(IdentityError::Rejected(message.clone())),
            None => Ok(AuthSession {
                token: "stub-token".to_string(),
                user: profile(email),
            }),
        }
    }

    async fn register(&self, email: &str, _password: &str) -> Result<AuthSession, IdentityError> {
        self.register_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.reject_register {
            Some(message) => Err(IdentityError::Rejected(message.clone())),
            None => Ok(AuthSession {
                token: "stub-token".to_string(),
                user: profile(email),
            }),
        }
    }

    async fn current_user(&self, _token: &str) -> Result<Option<UserProfile>, IdentityError> {
        if self.user_gone {
            Ok(None)
        } else {
            Ok(Some(profile("stub@example.com")))
        }
    }

    async fn update_profile(
        &self,
        _token: &str,
        display_name: &str,
        email: &str,
    ) -> Result<UserProfile, IdentityError> {
        match &self.reject_update {
            Some(message) => Err(IdentityError::Rejected(message.clone())),
            None => Ok(UserProfile {
                uid: "stub-uid".to_string(),
                email: email.to_string(),
                display_name: Some(display_name.to_string()),
            }),
        }
    }

    async fn update_password(&self, _token: &str, _password: &str) -> Result<(), IdentityError> {
        match &self.reject_password {
            Some(message) => Err(IdentityError::Rejected(message.clone())),
            None => Ok(()),
        }
    }

    async fn sign_out(&self, _token: &str) -> Result<(), IdentityError> {
        self.sign_out_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_sign_out {
            Err(IdentityError::Rejected("sign-out failed".to_string()))
        } else {
            Ok(())
        }
    }
}

pub fn test_config(port: u16) -> AppConfig {
    AppConfig {
        web: WebConfig {
            addr: "127.0.0.1".to_string(),
            port,
        },
        identity: IdentityConfig {
            base_url: "http://identity.invalid".to_string(),
            api_key: "test-key".to_string(),
        },
        session: SessionConfig {
            inactivity_minutes: 30,
            secure_cookie: false,
        },
    }
}

/// Builds the router around a stub backend, for `oneshot` tests.
pub fn test_app(stub: StubIdentity) -> axum::Router {
    let state = AppState {
        config: test_config(0),
        identity: Arc::new(stub),
    };
    create_router(state)
}

/// Spawn a test server and return the address, a reqwest client with
/// redirects disabled, and a handle to the stub for assertions.
pub async fn spawn_app(stub: StubIdentity) -> (SocketAddr, reqwest::Client, Arc<StubIdentity>) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let stub = Arc::new(stub);
    let state = AppState {
        config: test_config(addr.port()),
        identity: stub.clone(),
    };
    let app = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    (addr, client, stub)
}

/// Extracts the session cookie pair (`name=value`) from a response.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|raw| raw.split(';').next().unwrap_or("").trim().to_string())
        .last()
}

/// GETs a path carrying the given session cookie.
pub async fn get_with_cookie(
    client: &reqwest::Client,
    addr: SocketAddr,
    path: &str,
    cookie: &str,
) -> reqwest::Response {
    client
        .get(format!("http://{addr}{path}"))
        .header(reqwest::header::COOKIE, cookie)
        .send()
        .await
        .expect("request failed")
}
