// Admin login backed by config credentials, with in-memory sessions.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Mutex;
use thiserror::Error;

use crate::config::CredentialsConfig;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("no admin credentials configured; add config/credentials.toml")]
    NotConfigured,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not logged in")]
    NotLoggedIn,
}

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Single-admin auth. Sessions live in memory only: a restart logs
/// everyone out, which matches the rest of the process-local workflow
/// state.
pub struct AuthService {
    email: Option<String>,
    password: Option<String>,
    session: Mutex<Option<Session>>,
}

impl AuthService {
    pub fn new(credentials: &CredentialsConfig) -> Self {
        AuthService {
            email: credentials.admin_email.clone(),
            password: credentials.admin_password.clone(),
            session: Mutex::new(None),
        }
    }

    /// Whether login is possible at all.
    pub fn is_configured(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let (Some(expected_email), Some(expected_password)) = (&self.email, &self.password) else {
            return Err(AuthError::NotConfigured);
        };
        if email != expected_email || password != expected_password {
            return Err(AuthError::InvalidCredentials);
        }
        let session = Session {
            token: generate_token(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        *self.session.lock().expect("session mutex poisoned") = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&self) {
        *self.session.lock().expect("session mutex poisoned") = None;
    }

    pub fn current_user(&self) -> Result<Session, AuthError> {
        self.session
            .lock()
            .expect("session mutex poisoned")
            .clone()
            .ok_or(AuthError::NotLoggedIn)
    }
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..32).map(|_| format!("{:x}", rng.gen_range(0..16))).collect()
}
