//! Shared-password gate for the event site.
//!
//! Guests type one password shared by everyone; on a match the browser keeps
//! a token derived from that password. This keeps the site out of casual
//! view and nothing more. It is not authentication and protects no data:
//! anyone who knows the password, or has seen a token, gets in.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fete_core::GateConfig;

const TOKEN_PREFIX: &str = "authenticated_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// No password configured
    Disabled,
    Granted { token: String },
    Denied,
}

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    password: Option<String>,
}

impl AccessGate {
    pub fn new(password: Option<String>) -> Self {
        Self { password }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.password.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn check(&self, attempt: &str) -> GateOutcome {
        match &self.password {
            None => GateOutcome::Disabled,
            Some(password) if password == attempt => GateOutcome::Granted {
                token: token_for(password),
            },
            Some(_) => GateOutcome::Denied,
        }
    }
}

/// Token the browser stores once the gate is passed.
pub fn token_for(password: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, STANDARD.encode(password))
}
