use crate::error::MediaLensError;
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Validate a user-supplied manifest URL before the server fetches it.
///
/// Accepts only `http://` and `https://` URLs with a host. Unless
/// `allow_private` is set, IP literals in loopback, private, link-local or
/// unspecified ranges are refused (SSRF protection). Hostnames are accepted
/// without DNS resolution, so DNS rebinding is not covered.
///
/// # Errors
/// Returns [`MediaLensError::InvalidOrigin`] for unparsable or relative URLs,
/// other schemes, and blocked addresses.
pub fn validate_manifest_url(url: &str, allow_private: bool) -> Result<Url, MediaLensError> {
    let parsed = Url::parse(url.trim())
        .map_err(|_| MediaLensError::InvalidOrigin(format!("Invalid URL: {url}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MediaLensError::InvalidOrigin(format!(
            "Scheme '{}' not allowed, only http/https permitted",
            parsed.scheme()
        )));
    }

    let blocked = match parsed.host() {
        None => {
            return Err(MediaLensError::InvalidOrigin(format!("No host in URL: {url}")));
        }
        Some(Host::Domain(_)) => None,
        Some(Host::Ipv4(ip)) => is_blocked_ipv4(ip).then(|| ip.to_string()),
        Some(Host::Ipv6(ip)) => is_blocked_ipv6(ip).then(|| ip.to_string()),
    };

    match blocked {
        Some(ip) if !allow_private => Err(MediaLensError::InvalidOrigin(format!(
            "Private or reserved address not allowed: {ip}"
        ))),
        _ => Ok(parsed),
    }
}

fn is_blocked_ipv4(ip: Ipv4Addr) -> bool {
    ip.octets()[0] == 0 // 0.0.0.0/8
        || ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local() // includes cloud metadata 169.254.169.254
}

fn is_blocked_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(mapped);
    }

    ip.is_loopback() || ip.is_unspecified() || ip.is_unique_local() || ip.is_unicast_link_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(url: &str) -> Result<Url, MediaLensError> {
        validate_manifest_url(url, false)
    }

    #[test]
    fn rejects_private_ipv4() {
        for url in [
            "http://127.0.0.1/live.m3u8",
            "http://10.1.2.3/live.m3u8",
            "http://172.16.0.1/live.m3u8",
            "http://172.31.255.255/live.m3u8",
            "http://192.168.1.1/live.m3u8",
            "http://169.254.169.254/latest/meta-data/",
            "http://0.1.2.3/live.m3u8",
        ] {
            assert!(check(url).is_err(), "{} should be blocked", url);
        }
    }

    #[test]
    fn rejects_private_ipv6() {
        for url in [
            "http://[::1]/live.m3u8",
            "http://[::]/live.m3u8",
            "http://[fe80::1]/live.m3u8",
            "http://[fd00::1]/live.m3u8",
            "http://[::ffff:127.0.0.1]/live.m3u8",
        ] {
            assert!(check(url).is_err(), "{} should be blocked", url);
        }
    }

    #[test]
    fn range_boundaries_are_public() {
        assert!(check("http://172.15.255.255/live.m3u8").is_ok());
        assert!(check("http://172.32.0.0/live.m3u8").is_ok());
    }

    #[test]
    fn allows_public_hosts() {
        assert!(check("https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8").is_ok());
        assert!(check("http://8.8.8.8/live.m3u8").is_ok());
        assert!(check("https://cdn.example.com/live.m3u8?token=abc").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        for url in [
            "ftp://cdn.example.com/live.m3u8",
            "file:///etc/passwd",
            "cdn.example.com/live.m3u8",
            "",
            "not-a-url",
        ] {
            assert!(check(url).is_err(), "{} should be rejected", url);
        }
    }

    #[test]
    fn private_addresses_allowed_when_opted_in() {
        let url = validate_manifest_url("http://127.0.0.1:8080/live.m3u8", true).unwrap();
        assert_eq!(url.port(), Some(8080));
    }
}
