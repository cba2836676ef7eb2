use std::net::IpAddr;

use thiserror::Error;
use url::Url;

/// Returns `true` if `ip` is a private, loopback, link-local, unspecified, or
/// broadcast address.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            matches!(
                o,
                [127, ..]
                    | [10, ..]
                    | [169, 254, ..]
                    | [192, 168, ..]
                    | [0, ..]
                    | [255, 255, 255, 255]
            ) || (o[0] == 172 && (16..=31).contains(&o[1]))
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00 == 0xfc00)
                || (v6.segments()[0] & 0xffc0 == 0xfe80)
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Only http/https URLs are supported")]
    UnsupportedScheme,

    #[error("URL has no host")]
    MissingHost,

    #[error("Could not resolve URL host: {0}")]
    Unresolvable(std::io::Error),

    #[error("URL resolves to a private or reserved address")]
    PrivateAddress,
}

/// Predicate deciding which resolved addresses a guarded fetch may not reach.
pub type AddressFilter = fn(IpAddr) -> bool;

/// Reject anything but plain http(s). Does not touch the network.
pub fn ensure_http_scheme(target: &Url) -> Result<(), GuardError> {
    match target.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(GuardError::UnsupportedScheme),
    }
}

/// Reject targets that are not plain http(s) or that resolve to an internal
/// address. Every resolved address must be public.
pub async fn ensure_public_target(target: &Url) -> Result<(), GuardError> {
    check_target(target, is_private_ip).await
}

pub(crate) async fn check_target(
    target: &Url,
    is_blocked: AddressFilter,
) -> Result<(), GuardError> {
    ensure_http_scheme(target)?;

    let host = target.host_str().ok_or(GuardError::MissingHost)?;
    let port = target.port_or_known_default().unwrap_or(80);

    // IPv6 literals arrive bracketed from host_str().
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(GuardError::Unresolvable)?;

    for addr in addrs {
        if is_blocked(addr.ip()) {
            tracing::warn!(host = %host, ip = %addr.ip(), "Blocked preview of internal address");
            return Err(GuardError::PrivateAddress);
        }
    }

    Ok(())
}
