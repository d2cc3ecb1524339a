use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const LOCAL_CLIENT: &str = "local";

/// Work out which client a request belongs to.
///
/// The first hop of `x-forwarded-for` wins, then the socket peer address,
/// then the literal `"local"`. An empty header counts as absent.
pub fn derive_client_id(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    if let Some(value) = forwarded_for.filter(|v| !v.is_empty()) {
        // split always yields at least one item
        return value.split(',').next().unwrap_or_default().trim().to_string();
    }

    match peer {
        Some(ip) => ip.to_string(),
        None => LOCAL_CLIENT.to_string(),
    }
}

pub fn client_id_from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    // non utf-8 header values are treated like a missing header
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok());

    derive_client_id(forwarded, peer.map(|addr| addr.ip()))
}

// Extractor so handlers can just take a `ClientId`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // ConnectInfo is only there when served with into_make_service_with_connect_info
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientId(client_id_from_parts(&parts.headers, peer)))
    }
}
