//! Client identity extraction.

use axum::http::HeaderMap;

/// Fallback identity when no header yields a usable address.
///
/// Direct (proxyless) traffic all lands in one loopback bucket, which only
/// happens in local development.
const LOOPBACK: &str = "127.0.0.1";

/// Extract the client IP from trusted proxy headers.
///
/// Precedence, highest first: the edge/CDN header, the reverse-proxy
/// real-IP header, the first entry of the forwarded-for list. The first
/// non-empty value wins.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = header_value(headers, "cf-connecting-ip") {
        return ip;
    }
    if let Some(ip) = header_value(headers, "x-real-ip") {
        return ip;
    }
    if let Some(forwarded) = header_value(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    LOOPBACK.to_string()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
