//! Namespace mutation events
//!
//! Tree mutations report what they changed through an injected [`MutationSink`]
//! rather than writing to a global audit log.

use crate::types::INodeId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationOperation {
    ChildAdded,
    ChildRemoved,
    ChildReplaced,
}

/// One structural change of a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationEvent {
    pub operation: MutationOperation,
    pub parent_id: INodeId,
    pub child_id: INodeId,
    pub child_name: String,
    /// Parent directory carries dataset metadata logging
    pub meta_enabled: bool,
}

pub trait MutationSink: Send + Sync {
    fn record(&self, event: &MutationEvent);
}

/// Emits each event as a structured `tracing` record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MutationSink for TracingSink {
    fn record(&self, event: &MutationEvent) {
        tracing::info!(
            target: "nsmeta::mutations",
            operation = ?event.operation,
            parent_id = event.parent_id,
            child_id = event.child_id,
            child_name = %event.child_name,
            meta_enabled = event.meta_enabled,
            "namespace mutation"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MutationSink for NullSink {
    fn record(&self, _event: &MutationEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MutationEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MutationEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<MutationEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl MutationSink for RecordingSink {
    fn record(&self, event: &MutationEvent) {
        self.events.lock().push(event.clone());
    }
}
