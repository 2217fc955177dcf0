// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory session store.
//!
//! Two bounded LRU maps keyed by the random id carried in the signed session
//! cookie (see [`super::cookie`]):
//!
//! - pending logins hold the one-shot OAuth `state` between `/auth/github`
//!   and `/callback`
//! - sessions hold a [`Principal`] and are only created once the callback
//!   succeeds
//!
//! Anonymous traffic can only evict pending logins, never a signed-in
//! session. Expired entries are dropped when read.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use uuid::Uuid;

use super::Principal;

/// Upper bound on how long an OAuth handshake may take.
const PENDING_LOGIN_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

pub struct SessionStore {
    pending: Mutex<LruCache<String, Entry<String>>>,
    sessions: Mutex<LruCache<String, Entry<Principal>>>,
    ttl: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Live entry for `id`; an expired one is removed.
fn live<'a, T>(cache: &'a mut LruCache<String, Entry<T>>, id: &str) -> Option<&'a mut Entry<T>> {
    let expired = match cache.peek(id) {
        Some(entry) => entry.expires_at <= Instant::now(),
        None => return None,
    };
    if expired {
        cache.pop(id);
        return None;
    }
    cache.get_mut(id)
}

impl SessionStore {
    /// Create a store holding at most `capacity` signed-in sessions (and as
    /// many pending logins), each session valid for `ttl`.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            pending: Mutex::new(LruCache::new(capacity)),
            sessions: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Record a pending login for `oauth_state` and return its id.
    pub fn start_login(&self, oauth_state: String) -> String {
        let id = new_id();
        let entry = Entry {
            value: oauth_state,
            expires_at: Instant::now() + self.ttl.min(PENDING_LOGIN_TTL),
        };
        lock(&self.pending).put(id.clone(), entry);
        id
    }

    /// Remove the pending login `id` and return its OAuth `state`. A value
    /// can be taken once.
    pub fn take_oauth_state(&self, id: &str) -> Option<String> {
        let mut pending = lock(&self.pending);
        live(&mut *pending, id)?;
        pending.pop(id).map(|entry| entry.value)
    }

    /// Whether `id` names a login that has not reached the callback yet.
    pub fn is_pending(&self, id: &str) -> bool {
        live(&mut *lock(&self.pending), id).is_some()
    }

    /// Open a signed-in session for `principal` and return its id.
    pub fn sign_in(&self, principal: Principal) -> String {
        let id = new_id();
        let entry = Entry {
            value: principal,
            expires_at: Instant::now() + self.ttl,
        };
        lock(&self.sessions).put(id.clone(), entry);
        id
    }

    /// Principal of the signed-in session `id`.
    pub fn principal(&self, id: &str) -> Option<Principal> {
        live(&mut *lock(&self.sessions), id).map(|entry| entry.value.clone())
    }

    /// Forget `id`, whether it is a session or a pending login.
    pub fn remove(&self, id: &str) {
        lock(&self.sessions).pop(id);
        lock(&self.pending).pop(id);
    }

    /// Number of signed-in sessions.
    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.pending).len()
    }
}
