use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::ConnectInfo,
    http::{HeaderMap, Request},
};
use rate_limit::ClientIdentity;

/// Derive the rate limit identity of a request from its network origin.
///
/// Forwarding headers are only consulted when `trust_forwarded_for` is set, because any
/// client can send them.
pub(crate) fn client_identity<B>(req: &Request<B>, trust_forwarded_for: bool) -> ClientIdentity {
    if trust_forwarded_for && let Some(ip) = forwarded_ip(req.headers()) {
        return ClientIdentity::Ip(ip);
    }

    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return ClientIdentity::Ip(connect_info.0.ip());
    }

    ClientIdentity::Unknown
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        // Take the first IP in the chain
        let ip = forwarded_for
            .to_str()
            .ok()
            .and_then(|value| value.split(',').next())
            .and_then(|ip| ip.trim().parse::<IpAddr>().ok());

        if ip.is_some() {
            return ip;
        }
    }

    let ip_str = headers.get("x-real-ip")?.to_str().ok()?;

    ip_str.trim().parse::<IpAddr>().ok()
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use axum::{extract::ConnectInfo, http::Request};
    use rate_limit::ClientIdentity;

    use super::client_identity;

    fn peer() -> ConnectInfo<SocketAddr> {
        ConnectInfo(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)), 51234))
    }

    #[test]
    fn socket_peer_by_default() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .extension(peer())
            .body(())
            .unwrap();

        assert_eq!(client_identity(&req, false).to_string(), "ip:10.0.0.7");
    }

    #[test]
    fn first_forwarded_address_when_trusted() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .extension(peer())
            .body(())
            .unwrap();

        assert_eq!(client_identity(&req, true).to_string(), "ip:203.0.113.9");
    }

    #[test]
    fn real_ip_header_when_forwarded_for_is_garbage() {
        let req = Request::builder()
            .header("x-forwarded-for", "not-an-ip")
            .header("x-real-ip", "2001:db8::1")
            .body(())
            .unwrap();

        assert_eq!(client_identity(&req, true).to_string(), "ip:2001:db8::1");
    }

    #[test]
    fn unknown_without_any_origin() {
        let req = Request::builder().body(()).unwrap();

        assert_eq!(client_identity(&req, true), ClientIdentity::Unknown);
    }
}
