// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repo Seeder - GitHub repository provisioning service
//!
//! Signs a user in with GitHub OAuth, then creates a public repository on
//! their behalf, tags it with a fixed topic and commits an uploaded file.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - GitHub OAuth, server-side sessions, signed cookies
//! - `providers` - Repository hosting API seam and its GitHub client
//! - `provision` - The four-stage provisioning workflow

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod pages;
pub mod providers;
pub mod provision;
pub mod state;
