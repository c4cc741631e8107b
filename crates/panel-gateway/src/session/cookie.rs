//! `Cookie` / `Set-Cookie` helpers for the session cookie.

use panel_kernel::session::{SESSION_COOKIE, SESSION_TTL_SECS};

/// Find cookie `name` in a `Cookie` request header.
pub fn extract_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// `Set-Cookie` value establishing a session for one day.
pub fn session_cookie(token: &str, secure: bool) -> String {
    build(token, SESSION_TTL_SECS, secure)
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clear_cookie(secure: bool) -> String {
    build("", 0, secure)
}

fn build(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
