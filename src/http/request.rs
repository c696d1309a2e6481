//! Inbound request extraction.
//!
//! # Responsibilities
//! - Collapse the Axum/hyper request parts into the transport-neutral
//!   [`RequestInfo`] the pipeline consumes
//! - Resolve the session identifier from the configured cookie, minting a
//!   fresh UUID when the cookie is absent
//! - Pick up the carrier subscriber headers legacy mobile gateways inject

use std::net::SocketAddr;

use axum::http::request::Parts;
use uuid::Uuid;

use crate::pipeline::RequestInfo;

/// Build a [`RequestInfo`] from the decomposed request head.
pub fn request_info(
    parts: &Parts,
    remote_addr: Option<SocketAddr>,
    session_cookie: &str,
) -> RequestInfo {
    let session_id = header(parts, "cookie")
        .and_then(|raw| cookie_value(raw, session_cookie))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let scheme = header(parts, "x-forwarded-scheme")
        .map(str::to_string)
        .or_else(|| parts.uri.scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    RequestInfo {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().unwrap_or_default().to_string(),
        scheme,
        host: header(parts, "host").unwrap_or_default().to_string(),
        user_agent: header(parts, "user-agent").unwrap_or_default().to_string(),
        referer: header(parts, "referer").unwrap_or_default().to_string(),
        au_uid: header(parts, "x-up-subno").unwrap_or_default().to_string(),
        softbank_uid: header(parts, "x-jphone-uid")
            .unwrap_or_default()
            .to_string(),
        remote_addr: remote_addr.map(|a| a.ip().to_string()).unwrap_or_default(),
        session_id,
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn cookie_value(cookie_header: &str, name: &str) -> Option<String> {
    for pair in cookie_header.split(';') {
        let mut it = pair.trim().splitn(2, '=');
        if it.next() == Some(name) {
            return it.next().map(str::to_string);
        }
    }
    None
}
