use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::{error::AppError, state::AppState};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Opaque per-request dedup key, the client address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoterId(pub String);

/// First hop of `X-Forwarded-For` when the proxy is trusted, the socket peer otherwise.
pub fn identify(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> Option<String> {
    if trust_proxy {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());

        if let Some(hop) = forwarded {
            return Some(hop.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}

impl FromRequestParts<Arc<AppState>> for VoterId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        identify(&parts.headers, peer, state.config.trust_proxy)
            .map(VoterId)
            .ok_or_else(|| AppError::InvalidRequest("cannot identify voter".to_string()))
    }
}
