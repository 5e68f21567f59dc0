//! CollectTarget: appends everything it receives to a shared buffer.
//!
//! The buffer handle can be cloned before the target is moved into the
//! pipeline, so the caller can inspect what arrived after each batch.

use crate::error::StageResult;
use crate::pipeline::batch::{BatchInput, Record};
use crate::pipeline::stage::{Stage, Target};
use std::sync::{Arc, Mutex};

/// Shared record buffer filled by a [`CollectTarget`].
pub type Collected = Arc<Mutex<Vec<Record>>>;

#[derive(Default)]
pub struct CollectTarget {
    collected: Collected,
}

impl CollectTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the buffer this target appends to.
    pub fn handle(&self) -> Collected {
        Arc::clone(&self.collected)
    }
}

impl Stage for CollectTarget {}

impl Target for CollectTarget {
    fn write(&mut self, input: &BatchInput) -> StageResult<()> {
        let mut collected = self
            .collected
            .lock()
            .map_err(|_| anyhow::anyhow!("collect buffer poisoned"))?;
        collected.extend(input.iter().cloned());
        Ok(())
    }
}
