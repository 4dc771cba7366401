//! Caller network origin for newly created submissions.
//!
//! The value is advisory. Both headers are client-controlled and can be
//! spoofed unless a trusted proxy overwrites them, so only values that
//! parse as an IP address are kept.

use std::net::IpAddr;

use actix_web::HttpRequest;

const FORWARDED_FOR: &str = "X-Forwarded-For";
const REAL_IP: &str = "X-Real-IP";

fn header_value<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse().ok()
}

/// Origin preferring the first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// the peer address. A header whose value is not an IP address is skipped.
pub fn client_ip(request: &HttpRequest) -> Option<String> {
    let forwarded = header_value(request, FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .and_then(parse_ip);

    forwarded
        .or_else(|| header_value(request, REAL_IP).and_then(parse_ip))
        .or_else(|| request.peer_addr().map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::{fixture, rstest};
    use std::net::SocketAddr;

    #[fixture]
    fn peer() -> SocketAddr {
        "192.0.2.10:5555".parse().expect("valid socket address")
    }

    #[rstest]
    fn prefers_first_forwarded_hop(peer: SocketAddr) {
        let request = TestRequest::default()
            .insert_header((FORWARDED_FOR, " 203.0.113.7 , 10.0.0.1"))
            .insert_header((REAL_IP, "198.51.100.2"))
            .peer_addr(peer)
            .to_http_request();

        assert_eq!(client_ip(&request).as_deref(), Some("203.0.113.7"));
    }

    #[rstest]
    fn falls_back_to_real_ip(peer: SocketAddr) {
        let request = TestRequest::default()
            .insert_header((FORWARDED_FOR, "  "))
            .insert_header((REAL_IP, "198.51.100.2"))
            .peer_addr(peer)
            .to_http_request();

        assert_eq!(client_ip(&request).as_deref(), Some("198.51.100.2"));
    }

    #[rstest]
    fn falls_back_to_peer_address(peer: SocketAddr) {
        let request = TestRequest::default().peer_addr(peer).to_http_request();

        assert_eq!(client_ip(&request).as_deref(), Some("192.0.2.10"));
    }

    #[rstest]
    #[case("unknown")]
    #[case("203.0.113.7; DROP TABLE form_submissions")]
    fn malformed_forwarded_hop_is_skipped(peer: SocketAddr, #[case] hop: &str) {
        let request = TestRequest::default()
            .insert_header((FORWARDED_FOR, hop))
            .insert_header((REAL_IP, "198.51.100.2"))
            .peer_addr(peer)
            .to_http_request();

        assert_eq!(client_ip(&request).as_deref(), Some("198.51.100.2"));
    }

    #[rstest]
    fn oversized_headers_fall_back_to_peer_address(peer: SocketAddr) {
        let padding = "9".repeat(200);
        let request = TestRequest::default()
            .insert_header((FORWARDED_FOR, padding.as_str()))
            .insert_header((REAL_IP, padding.as_str()))
            .peer_addr(peer)
            .to_http_request();

        let origin = client_ip(&request).expect("peer address");

        assert_eq!(origin, "192.0.2.10");
        assert!(origin.len() <= 64);
    }

    #[rstest]
    fn ipv6_hops_are_kept() {
        let request = TestRequest::default()
            .insert_header((FORWARDED_FOR, "2001:db8::1, 10.0.0.1"))
            .to_http_request();

        assert_eq!(client_ip(&request).as_deref(), Some("2001:db8::1"));
    }

    #[rstest]
    fn absent_everywhere_is_none() {
        let request = TestRequest::default().to_http_request();

        assert_eq!(client_ip(&request), None);
    }
}
