// SPDX-License-Identifier: MIT
// Copyright (c) 2020 Austin Goudge
// Copyright (c) 2026 StarTuz

use crate::SearchError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Monotonic search counter shared by everything that can start a search.
#[derive(Debug, Clone, Default)]
pub struct GenerationToken {
    current: Arc<AtomicU64>,
}

impl GenerationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation; every older ticket becomes stale.
    pub fn begin(&self) -> Ticket {
        let id = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            id,
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Handed to one search and checked after every fetch.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    current: Arc<AtomicU64>,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.id
    }

    pub fn ensure_current(&self) -> Result<(), SearchError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(SearchError::Superseded(self.id))
        }
    }
}

/// Shared output written only by the newest live generation.
#[derive(Debug, Default)]
pub struct ResultSlot<T> {
    inner: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Stores `value` if `ticket` is still current and not older than what is stored.
    pub fn publish(&self, ticket: &Ticket, value: T) -> bool {
        if !ticket.is_current() {
            log::debug!("Discarding stale result — generation={}", ticket.id());
            return false;
        }
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((stored, _)) = guard.as_ref() {
            if *stored > ticket.id() {
                return false;
            }
        }
        *guard = Some((ticket.id(), value));
        true
    }

    pub fn latest(&self) -> Option<T> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|(_, v)| v.clone())
    }

    pub fn generation(&self) -> Option<u64> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|(g, _)| *g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ticket_supersedes_old() {
        let token = GenerationToken::new();
        let first = token.begin();
        assert!(first.is_current());
        let second = token.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.ensure_current(), Err(SearchError::Superseded(1)));
        assert_eq!(token.current(), 2);
    }

    #[test]
    fn test_stale_publish_discarded() {
        let token = GenerationToken::new();
        let slot = ResultSlot::new();
        let old = token.begin();
        let new = token.begin();

        assert!(!slot.publish(&old, "old"));
        assert_eq!(slot.latest(), None);

        assert!(slot.publish(&new, "new"));
        assert_eq!(slot.latest(), Some("new"));
        assert_eq!(slot.generation(), Some(2));
    }
}
