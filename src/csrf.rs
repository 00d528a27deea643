use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use sha2::{Digest, Sha512};

use crate::error::{AppError, AppResult};

pub const COOKIE_NAME: &str = "csrf_token";

/// Derives the cookie signing key from the app secret. An empty secret yields
/// a random key that only lives as long as the process.
pub fn signing_key(secret: &str) -> Key {
    if secret.is_empty() {
        tracing::warn!("no SECRET_KEY provided, form tokens will not survive a restart");
        return Key::generate();
    }
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

/// Returns the token for this browser, minting one when the cookie is absent.
pub fn issue(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(existing) = jar.get(COOKIE_NAME) {
        let token = existing.value().to_string();
        return (jar, token);
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    let cookie = Cookie::build((COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(12));
    (jar.add(cookie), token)
}

pub fn verify(jar: &SignedCookieJar, submitted: &str) -> AppResult<()> {
    match jar.get(COOKIE_NAME) {
        Some(cookie) if !submitted.is_empty() && cookie.value() == submitted => Ok(()),
        _ => Err(AppError::Csrf),
    }
}
