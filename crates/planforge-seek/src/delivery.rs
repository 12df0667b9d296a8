//! Discovery delivery batching
//!
//! The first improving result of a run goes straight to the consumer so an
//! interactive caller sees progress immediately. Everything after that
//! accumulates on a pending stack and goes out in bursts on the session's
//! flush timer; a pending result whose score was displaced from the Top-K
//! while it waited is dropped instead of delivered.

use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use planforge_core::RuleWeightSet;

use crate::score::TopScores;

/// One improving result announced to the session's consumer.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Updated weight map per rule-set id, ready to re-apply.
    pub weight_sets: Vec<RuleWeightSet>,
    /// Raw KPI value the weights achieved.
    pub kpi_value: f64,
    /// Engineer-facing rendering of the value.
    pub kpi_text: String,
}

struct DeliveryState {
    delivered_any: bool,
    pending: Vec<Discovery>,
}

/// Batches [`Discovery`] events toward one unbounded consumer channel.
pub struct DeliveryQueue {
    sender: UnboundedSender<Discovery>,
    state: Mutex<DeliveryState>,
}

impl DeliveryQueue {
    pub fn new(sender: UnboundedSender<Discovery>) -> Self {
        Self {
            sender,
            state: Mutex::new(DeliveryState {
                delivered_any: false,
                pending: Vec::new(),
            }),
        }
    }

    /// Accepts an improving result.
    ///
    /// The first result of the run is sent immediately; later results wait
    /// on the pending stack for the next [`Self::flush`].
    pub fn offer(&self, discovery: Discovery) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.delivered_any {
            state.pending.push(discovery);
            return;
        }
        state.delivered_any = true;
        drop(state);
        // Receiver gone means the consumer stopped listening; fine.
        let _ = self.sender.send(discovery);
    }

    /// Drains the pending stack, newest first, delivering results whose
    /// scores are still retained in `top` and dropping the rest.
    pub fn flush(&self, top: &TopScores) {
        let pending = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut state.pending)
        };
        if pending.is_empty() {
            return;
        }
        let mut delivered = 0usize;
        let mut dropped = 0usize;
        for discovery in pending.into_iter().rev() {
            if top.contains_value(discovery.kpi_value) {
                let _ = self.sender.send(discovery);
                delivered += 1;
            } else {
                dropped += 1;
            }
        }
        debug!(event = "discoveries_flushed", delivered, dropped);
    }

    /// Number of results waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .len()
    }
}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("pending", &self.pending_len())
            .finish()
    }
}
