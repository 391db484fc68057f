use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{Message, MessageFilter};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

struct StoredMessage {
    /// Insertion order, breaks timestamp ties
    seq: u64,
    message: Arc<Message>,
}

/// In-memory append-only store
#[derive(Default)]
pub struct MessageStore {
    messages: DashMap<Uuid, StoredMessage>,
    next_seq: AtomicU64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, message: Message) -> StoreResult<Arc<Message>> {
        match self.messages.entry(message.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(message.id)),
            Entry::Vacant(slot) => {
                let message = Arc::new(message);
                slot.insert(StoredMessage {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    message: message.clone(),
                });
                Ok(message)
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> StoreResult<Arc<Message>> {
        self.messages
            .get(id)
            .map(|entry| entry.message.clone())
            .ok_or(StoreError::NotFound(*id))
    }

    /// Matching messages, newest submission first
    pub fn list(&self, filter: &MessageFilter, limit: usize) -> Vec<Arc<Message>> {
        let mut matched: Vec<(u64, Arc<Message>)> = self
            .messages
            .iter()
            .filter(|entry| filter.matches(&entry.message))
            .map(|entry| (entry.seq, entry.message.clone()))
            .collect();

        matched.sort_by(|(seq_a, a), (seq_b, b)| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| seq_b.cmp(seq_a))
        });

        matched.into_iter().take(limit).map(|(_, m)| m).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
