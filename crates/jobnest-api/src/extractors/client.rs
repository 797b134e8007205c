//! Client details recorded with refresh tokens.

use std::convert::Infallible;
use std::net::IpAddr;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use jobnest_auth::session::ClientInfo;

/// User agent and forwarded address of the caller.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta(pub ClientInfo);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Caller address from `X-Forwarded-For` (first hop) or `X-Real-IP`.
///
/// Values that do not parse as an IP address are dropped.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok());

    forwarded
        .or_else(|| header(headers, "x-real-ip").and_then(|ip| ip.parse::<IpAddr>().ok()))
        .map(|ip| ip.to_string())
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(ClientInfo {
            device_info: header(&parts.headers, "user-agent").map(String::from),
            ip_address: client_ip(&parts.headers),
        }))
    }
}
