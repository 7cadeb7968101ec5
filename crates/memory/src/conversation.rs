use crate::record::{MemoryRecord, Retrieval, RetrievalFormat, RetrievalQuery, RetrievedMessage};
use crate::store::MemoryStore;

/// Shares Window's append/evict bounds, but `retrieve(..., format =
/// Messages)` forces strict user/assistant alternation instead of
/// replaying each record's own recorded role. A record whose status is
/// `"error"` is re-emitted as a `user`-role correction regardless of
/// where it falls in the alternation; everything else alternates
/// mechanically starting from `user`. Built for backing APIs that
/// reject three-role transcripts.
pub struct ConversationMemory {
    capacity: usize,
    records: Vec<MemoryRecord>,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, records: Vec::new() }
    }
}

impl MemoryStore for ConversationMemory {
    fn append(&mut self, record: MemoryRecord) {
        self.records.push(record);
    }

    fn retrieve(&self, query: &RetrievalQuery) -> Retrieval {
        let matched: Vec<&MemoryRecord> =
            self.records.iter().filter(|r| query.matches_role(&r.role) && query.matches_step(r.step_id)).collect();

        let mut result: Vec<(usize, &MemoryRecord)> = matched.into_iter().enumerate().collect();
        if let Some(max) = query.max_items {
            if result.len() > max {
                result = result.split_off(result.len() - max);
            }
        }

        match query.format {
            RetrievalFormat::Records => Retrieval::Records(result.into_iter().map(|(_, r)| r.clone()).collect()),
            RetrievalFormat::Messages => Retrieval::Messages(
                result
                    .into_iter()
                    .map(|(i, r)| {
                        let role = if r.status.as_deref() == Some("error") {
                            "user"
                        } else if i % 2 == 0 {
                            "user"
                        } else {
                            "assistant"
                        };
                        RetrievedMessage { role: role.into(), content: r.content.clone() }
                    })
                    .collect(),
            ),
        }
    }

    fn evict(&mut self) -> usize {
        if self.records.len() <= self.capacity {
            return 0;
        }
        let drop_count = self.records.len() - self.capacity;
        self.records.drain(0..drop_count);
        drop_count
    }

    fn reset(&mut self) {
        self.records.clear();
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
