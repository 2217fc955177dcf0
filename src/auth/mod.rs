// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! GitHub OAuth sign-in with server-side sessions.
//!
//! ## Auth Flow
//!
//! 1. `GET /auth/github` records a pending login holding a one-shot `state`
//!    and redirects to GitHub
//! 2. `GET /callback` checks `state`, exchanges the code for a token and
//!    opens a session holding the [`Principal`]
//! 3. Protected handlers take the [`Auth`] extractor, which resolves the
//!    signed session cookie to that principal
//!
//! ## Security
//!
//! - The session cookie is HMAC-signed and `HttpOnly`
//! - Access tokens never leave the server and are redacted in logs
//! - Sessions expire after a TTL and are bounded in number

pub mod cookie;
pub mod error;
pub mod extractor;
pub mod oauth;
pub mod principal;
pub mod session;

pub use cookie::SessionCookies;
pub use error::AuthError;
pub use extractor::{Auth, MaybeAuth};
pub use oauth::{GitHubOAuth, OAuthError};
pub use principal::{AccessToken, Principal};
pub use session::SessionStore;
