//! # Admin Access
//!
//! One shared secret, sent as the `x-admin-password` header. The core never sees the secret:
//! handlers that take an [`Admin`] argument only run after the [`Authorizer`] said yes.
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{error::AppError, state::AppState};

pub const ADMIN_HEADER: &str = "x-admin-password";

pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, presented: Option<&str>) -> bool;
}

pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Authorizer for SharedSecret {
    fn is_authorized(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(presented) => presented.as_bytes().ct_eq(self.secret.as_bytes()).into(),
            None => false,
        }
    }
}

/// Proof that the request passed the admin check.
pub struct Admin;

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|value| value.to_str().ok());

        if state.authorizer.is_authorized(presented) {
            Ok(Admin)
        } else {
            warn!("Rejected admin request to {}", parts.uri.path());
            Err(AppError::Unauthorized)
        }
    }
}
