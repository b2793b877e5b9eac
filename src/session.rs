//! Per-chat session state: viewed-recipe history plus the one-shot "show" slot.

use crate::logic::LocalizedRecipe;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub recipe: LocalizedRecipe,
    pub viewed_at: DateTime<Utc>,
}

/// Append-only log of viewed recipes. Duplicates are kept; the display view
/// collapses them.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    /// Returns false (and stores nothing) for a recipe without an id.
    pub fn append(&mut self, recipe: LocalizedRecipe) -> bool {
        if recipe.id().is_none() {
            log::warn!("Recipe '{}' has no id; not added to history", recipe.recipe.title);
            return false;
        }
        self.entries.push(HistoryEntry { recipe, viewed_at: Utc::now() });
        true
    }

    /// Most recent first, first occurrence per id when walking backwards.
    pub fn unique_latest_first(&self) -> Vec<&HistoryEntry> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .rev()
            .filter(|e| e.recipe.id().map_or(false, |id| seen.insert(id)))
            .collect()
    }

    /// Latest stored version of a recipe.
    pub fn find(&self, id: i64) -> Option<&LocalizedRecipe> {
        self.entries
            .iter()
            .rev()
            .map(|e| &e.recipe)
            .find(|r| r.id() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub history: SessionHistory,
    pending: Option<LocalizedRecipe>,
}

impl Session {
    pub fn set_pending(&mut self, recipe: LocalizedRecipe) {
        self.pending = Some(recipe);
    }

    /// Reads and clears the selection.
    pub fn take_pending(&mut self) -> Option<LocalizedRecipe> {
        self.pending.take()
    }

    /// Queues the stored recipe with this id for display. False if unknown.
    pub fn select(&mut self, id: i64) -> bool {
        match self.history.find(id).cloned() {
            Some(recipe) => {
                self.pending = Some(recipe);
                true
            }
            None => false,
        }
    }
}

/// One [`Session`] per chat id. Callers must not hold the lock across `.await`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl SessionRegistry {
    pub fn with<R>(&self, chat: i64, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(sessions.entry(chat).or_default())
    }

    /// Like [`with`](Self::with) but never creates a session; `None` for unknown chats.
    pub fn with_existing<R>(&self, chat: i64, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(&chat).map(f)
    }

    /// Ends a chat's session, dropping its history.
    pub fn end(&self, chat: i64) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(&chat);
    }
}
