use crate::record::{MemoryRecord, Retrieval, RetrievalFormat, RetrievalQuery, RetrievedMessage};
use crate::store::MemoryStore;

/// Keeps the last `capacity` records, dropping older ones on evict.
/// Retrieval applies role/step filtering and `max_items` on top, always
/// returning the matching slice in step-ascending order.
pub struct WindowMemory {
    capacity: usize,
    records: Vec<MemoryRecord>,
}

impl WindowMemory {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, records: Vec::new() }
    }

    fn filtered(&self, query: &RetrievalQuery) -> Vec<MemoryRecord> {
        let mut matched: Vec<MemoryRecord> = self
            .records
            .iter()
            .filter(|r| query.matches_role(&r.role) && query.matches_step(r.step_id))
            .cloned()
            .collect();
        if let Some(max) = query.max_items {
            if matched.len() > max {
                matched = matched.split_off(matched.len() - max);
            }
        }
        matched
    }
}

impl MemoryStore for WindowMemory {
    fn append(&mut self, record: MemoryRecord) {
        self.records.push(record);
    }

    fn retrieve(&self, query: &RetrievalQuery) -> Retrieval {
        let matched = self.filtered(query);
        match query.format {
            RetrievalFormat::Records => Retrieval::Records(matched),
            RetrievalFormat::Messages => {
                Retrieval::Messages(matched.into_iter().map(|r| RetrievedMessage { role: r.role, content: r.content }).collect())
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn push(mem: &mut WindowMemory, n: u64) {
        mem.append(MemoryRecord::new("user", format!("msg {n}"), n));
    }

    #[test]
    fn evict_drops_oldest_past_capacity() {
        let mut mem = WindowMemory::new(2);
        for i in 0..5 {
            push(&mut mem, i);
        }
        assert_eq!(mem.evict(), 3);
        assert_eq!(mem.len(), 2);
        let records = mem.retrieve(&RetrievalQuery::default()).into_records();
        assert_eq!(records[0].step_id, 3);
        assert_eq!(records[1].step_id, 4);
    }

    #[test]
    fn retrieve_does_not_mutate_store() {
        let mut mem = WindowMemory::new(10);
        for i in 0..3 {
            push(&mut mem, i);
        }
        mem.retrieve(&RetrievalQuery::default());
        assert_eq!(mem.len(), 3);
    }

    #[test]
    fn role_filter_and_max_items_apply_together() {
        let mut mem = WindowMemory::new(10);
        mem.append(MemoryRecord::new("user", "a", 0));
        mem.append(MemoryRecord::new("assistant", "b", 1));
        mem.append(MemoryRecord::new("user", "c", 2));
        let query = RetrievalQuery { roles: Some(vec!["user".into()]), max_items: Some(1), ..Default::default() };
        let records = mem.retrieve(&query).into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "c");
    }

    #[test]
    fn reset_clears_all_records() {
        let mut mem = WindowMemory::new(10);
        push(&mut mem, 0);
        mem.reset();
        assert!(mem.is_empty());
    }
}
