//! First-match strategy selection.
//!
//! Candidates are probed in order and the first one that reports itself
//! supported is used. Probing and use run under one lock so two setups
//! sharing a selector never negotiate concurrently.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ScrcpyError;

/// A provider that can tell whether it works in the current environment.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn is_supported(&self) -> bool;
}

pub struct StrategySelector<S: ?Sized> {
    kind: &'static str,
    candidates: Vec<Arc<S>>,
    negotiation: Mutex<()>,
}

impl<S: Strategy + ?Sized> StrategySelector<S> {
    /// `kind` names what is being selected, for error messages.
    pub fn new(kind: &'static str, candidates: Vec<Arc<S>>) -> Self {
        Self {
            kind,
            candidates,
            negotiation: Mutex::new(()),
        }
    }

    pub fn candidates(&self) -> &[Arc<S>] {
        &self.candidates
    }

    /// First supported candidate.
    pub async fn select(&self) -> Result<Arc<S>, ScrcpyError> {
        let _guard = self.negotiation.lock().await;
        self.first_supported().await
    }

    /// Select a candidate and run `f` with it while holding the lock.
    pub async fn negotiate<F, Fut, T>(&self, f: F) -> Result<T, ScrcpyError>
    where
        F: FnOnce(Arc<S>) -> Fut,
        Fut: Future<Output = Result<T, ScrcpyError>>,
    {
        let _guard = self.negotiation.lock().await;
        let chosen = self.first_supported().await?;
        f(chosen).await
    }

    async fn first_supported(&self) -> Result<Arc<S>, ScrcpyError> {
        for candidate in &self.candidates {
            if candidate.is_supported().await {
                info!(kind = self.kind, strategy = candidate.name(), "strategy selected");
                return Ok(Arc::clone(candidate));
            }
            debug!(kind = self.kind, strategy = candidate.name(), "strategy not supported");
        }

        let names: Vec<&str> = self.candidates.iter().map(|c| c.name()).collect();
        Err(ScrcpyError::UnsupportedStrategy {
            kind: self.kind,
            candidates: names.join(", "),
        })
    }
}
