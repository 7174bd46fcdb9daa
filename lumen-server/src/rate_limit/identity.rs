//! Client identity resolution for rate limiting

use axum::extract::ConnectInfo;
use axum::extract::Request;
use http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Identity used when nothing better is known
pub const LOOPBACK_IDENTITY: &str = "127.0.0.1";

/// Header set by the edge proxy with the real client address
const EDGE_CLIENT_IP: &str = "cf-connecting-ip";
const FORWARDED_FOR: &str = "x-forwarded-for";

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Resolve the client address
///
/// Order: edge-injected client IP, first hop of `X-Forwarded-For`, peer
/// address, loopback.
pub fn resolve_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(ip) = header_ip(headers, EDGE_CLIENT_IP) {
        return ip.to_string();
    }

    if let Some(forwarded) = headers.get(FORWARDED_FOR)
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
        && let Ok(ip) = first.trim().parse::<IpAddr>()
    {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| LOOPBACK_IDENTITY.to_owned())
}

/// Resolve the identity of an incoming request
pub fn request_identity(request: &Request) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    resolve_identity(request.headers(), peer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.9:51000".parse().unwrap())
    }

    #[test]
    fn test_edge_header_wins() {
        let h = headers(&[
            ("cf-connecting-ip", "203.0.113.7"),
            ("x-forwarded-for", "198.51.100.1, 10.0.0.1"),
        ]);
        assert_eq!(resolve_identity(&h, peer()), "203.0.113.7");
    }

    #[test]
    fn test_first_forwarded_hop() {
        let h = headers(&[("x-forwarded-for", " 198.51.100.1 , 10.0.0.1")]);
        assert_eq!(resolve_identity(&h, peer()), "198.51.100.1");
    }

    #[test]
    fn test_garbage_headers_are_skipped() {
        let h = headers(&[
            ("cf-connecting-ip", "not-an-ip"),
            ("x-forwarded-for", "unknown, 10.0.0.1"),
        ]);
        assert_eq!(resolve_identity(&h, peer()), "10.0.0.9");
    }

    #[test]
    fn test_loopback_fallback() {
        assert_eq!(resolve_identity(&HeaderMap::new(), None), LOOPBACK_IDENTITY);
    }

    #[test]
    fn test_ipv6_is_normalized() {
        let h = headers(&[("cf-connecting-ip", "2001:DB8::1")]);
        assert_eq!(resolve_identity(&h, None), "2001:db8::1");
    }
}
