//! Operator authentication
//!
//! One [`SessionStore`] per process owns the signed-in operator. Signing in
//! hands out an [`AuthContext`] that workflows take explicitly; signing out
//! revokes every context issued for that sign-in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

use crate::error::CertError;

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {}", e))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// The one account allowed to operate the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorCredentials {
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub email: String,
}

/// Proof of a live sign-in.
#[derive(Debug, Clone)]
pub struct AuthContext {
    operator: Operator,
    active: Arc<AtomicBool>,
}

impl AuthContext {
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// `Unauthenticated` once the issuing sign-in has ended.
    pub fn ensure_active(&self) -> Result<(), CertError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CertError::Unauthenticated)
        }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    credentials: OperatorCredentials,
    current: Mutex<Option<AuthContext>>,
}

impl SessionStore {
    pub fn new(credentials: OperatorCredentials) -> Self {
        Self {
            credentials,
            current: Mutex::new(None),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AuthContext>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Verify the operator and start a new sign-in, ending any previous one.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthContext, CertError> {
        let email = email.trim();
        if !email.eq_ignore_ascii_case(self.credentials.email.trim())
            || !verify_password(password, &self.credentials.password_hash)
        {
            tracing::warn!("Rejected sign-in for {}", email);
            return Err(CertError::InvalidCredentials);
        }

        let context = AuthContext {
            operator: Operator {
                email: self.credentials.email.trim().to_string(),
            },
            active: Arc::new(AtomicBool::new(true)),
        };

        let mut slot = self.slot();
        if let Some(previous) = slot.replace(context.clone()) {
            previous.active.store(false, Ordering::SeqCst);
        }
        tracing::info!("Operator {} signed in", context.operator.email);
        Ok(context)
    }

    /// The current sign-in, or `Unauthenticated`.
    pub fn require(&self) -> Result<AuthContext, CertError> {
        self.slot().clone().ok_or(CertError::Unauthenticated)
    }

    pub fn current(&self) -> Option<Operator> {
        self.slot().as_ref().map(|ctx| ctx.operator.clone())
    }

    /// End the current sign-in. Safe to call when signed out.
    pub fn logout(&self) {
        if let Some(context) = self.slot().take() {
            context.active.store(false, Ordering::SeqCst);
            tracing::info!("Operator {} signed out", context.operator.email);
        }
    }
}
