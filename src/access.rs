use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Privilege tiers of the interpreter, ordered `User < Root < Dev`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    User,
    Root,
    Dev,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessLevel::User => "USER",
            AccessLevel::Root => "ROOT",
            AccessLevel::Dev => "DEV",
        })
    }
}

/// Counts confirmation dialogs that are currently blocking the dispatching
/// thread. The supervisor reads it from the caller thread while the worker
/// owns the session, so it lives behind an `Arc` of its own.
#[derive(Debug, Clone, Default)]
pub struct PromptCounter(Arc<AtomicUsize>);

impl PromptCounter {
    pub fn outstanding(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    /// Marks a prompt as open until the returned guard drops.
    pub fn open(&self) -> PromptGuard {
        self.0.fetch_add(1, Ordering::AcqRel);
        PromptGuard(Arc::clone(&self.0))
    }
}

pub struct PromptGuard(Arc<AtomicUsize>);

impl Drop for PromptGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered() {
        assert!(AccessLevel::User < AccessLevel::Root);
        assert!(AccessLevel::Root < AccessLevel::Dev);
        assert_eq!(AccessLevel::default(), AccessLevel::User);
    }

    #[test]
    fn guard_releases_on_drop() {
        let counter = PromptCounter::default();
        let observer = counter.clone();
        {
            let _outer = counter.open();
            let _inner = counter.open();
            assert_eq!(observer.outstanding(), 2);
        }
        assert_eq!(observer.outstanding(), 0);
    }
}
