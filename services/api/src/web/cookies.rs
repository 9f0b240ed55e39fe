//! services/api/src/web/cookies.rs
//!
//! Cookie names and plumbing for the two cookies this service manages: the
//! session token and the one-shot notification flag.

use axum::http::{header, HeaderMap, HeaderName};

/// Identifies the visitor across requests. 30-day expiry.
pub const SESSION_COOKIE: &str = "session-token";

/// One-shot flag consumed by the client to show a toast exactly once.
pub const NOTIF_COOKIE: &str = "notif";

/// Notification value: the report is ready.
pub const NOTIF_REPORT_READY: &str = "00";

/// Notification value: the payment failed.
pub const NOTIF_PAYMENT_FAILED: &str = "01";

const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// A cookie mutation decided by a handler, turned into a `Set-Cookie`
/// header at the response boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieOp {
    SetSession(String),
    SetNotif(&'static str),
    DeleteNotif,
}

impl CookieOp {
    /// Renders the op as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        match self {
            CookieOp::SetSession(token) => format!(
                "{}={}; HttpOnly; Path=/; Max-Age={}",
                SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
            ),
            CookieOp::SetNotif(value) => {
                format!("{}={}; Path=/", NOTIF_COOKIE, value)
            }
            CookieOp::DeleteNotif => format!("{}=; Path=/; Max-Age=0", NOTIF_COOKIE),
        }
    }
}

/// Extracts a cookie value from the request headers.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|v| v.to_string())
    })
}

/// Converts cookie ops into `Set-Cookie` response header pairs.
pub fn set_cookie_headers(ops: &[CookieOp]) -> Vec<(HeaderName, String)> {
    ops.iter()
        .map(|op| (header::SET_COOKIE, op.to_header_value()))
        .collect()
}
