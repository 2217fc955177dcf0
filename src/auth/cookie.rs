// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed session cookie.
//!
//! The cookie value is `<session id>.<mac>` where `<mac>` is the unpadded
//! base64url HMAC-SHA256 of the id under the server's session secret. A value
//! whose MAC does not verify is ignored.

use axum::http::{header::COOKIE, HeaderMap};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE_NAME: &str = "seeder_session";

#[derive(Clone)]
pub struct SessionCookies {
    key: Vec<u8>,
    secure: bool,
}

impl SessionCookies {
    pub fn new(key: Vec<u8>, secure: bool) -> Self {
        Self { key, secure }
    }

    /// Build with a random per-process key. Sessions do not survive a restart.
    pub fn ephemeral(secure: bool) -> Self {
        let mut key = Vec::with_capacity(32);
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        Self::new(key, secure)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }

    /// Cookie value for a session id.
    pub fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        let tag = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());
        format!("{session_id}.{tag}")
    }

    /// Session id carried by a cookie value, if its MAC verifies.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (session_id, tag) = value.rsplit_once('.')?;
        let tag = Base64UrlUnpadded::decode_vec(tag).ok()?;
        let mut mac = self.mac();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&tag).ok()?;
        Some(session_id.to_string())
    }

    /// Verified session id from the request's `Cookie` headers.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == SESSION_COOKIE_NAME)
            .find_map(|(_, value)| self.verify(value))
    }

    /// `Set-Cookie` value establishing the session.
    pub fn set_cookie(&self, session_id: &str) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
            self.sign(session_id)
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that expires the session cookie.
    pub fn clear_cookie(&self) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
