use crate::embedder::{similarity, BucketFoldEmbedder, Embedder};
use crate::record::{MemoryRecord, Retrieval, RetrievalFormat, RetrievalQuery, RetrievedMessage};
use crate::store::MemoryStore;

struct Entry {
    record: MemoryRecord,
    embedding: Vec<f32>,
}

/// Embeds every appended record and retrieves the top-K most similar to
/// the query text. Bounded only by the memory budget the caller
/// enforces externally (there is no automatic eviction — `evict` is a
/// no-op that always returns `0`, matching the "never" entry in the
/// strategy comparison this crate implements).
pub struct VectorMemory {
    embedder: Box<dyn Embedder>,
    entries: Vec<Entry>,
}

impl VectorMemory {
    pub fn new() -> Self {
        Self { embedder: Box::new(BucketFoldEmbedder), entries: Vec::new() }
    }

    pub fn with_embedder(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, entries: Vec::new() }
    }
}

impl Default for VectorMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore for VectorMemory {
    fn append(&mut self, record: MemoryRecord) {
        let embedding = self.embedder.embed(&record.content);
        self.entries.push(Entry { record, embedding });
    }

    fn retrieve(&self, query: &RetrievalQuery) -> Retrieval {
        let candidates: Vec<&Entry> =
            self.entries.iter().filter(|e| query.matches_role(&e.record.role) && query.matches_step(e.record.step_id)).collect();

        let mut selected: Vec<MemoryRecord> = if let Some(text) = &query.text {
            let query_embedding = self.embedder.embed(text);
            let mut scored: Vec<(f32, &Entry)> = candidates.into_iter().map(|e| (similarity(&query_embedding, &e.embedding), e)).collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            let k = query.top_k.unwrap_or(scored.len());
            let mut top: Vec<&Entry> = scored.into_iter().take(k).map(|(_, e)| e).collect();
            top.sort_by_key(|e| e.record.step_id);
            top.into_iter().map(|e| e.record.clone()).collect()
        } else {
            candidates.into_iter().map(|e| e.record.clone()).collect()
        };

        if let Some(max) = query.max_items {
            if selected.len() > max {
                selected = selected.split_off(selected.len() - max);
            }
        }

        match query.format {
            RetrievalFormat::Records => Retrieval::Records(selected),
            RetrievalFormat::Messages => Retrieval::Messages(
                selected
                    .into_iter()
                    .map(|r| RetrievedMessage { role: "user".into(), content: format!("Observation: {}", r.content) })
                    .collect(),
            ),
        }
    }

    fn evict(&mut self) -> usize {
        0
    }

    fn reset(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_orders_by_similarity_then_returns_in_step_order() {
        let mut mem = VectorMemory::new();
        mem.append(MemoryRecord::new("user", "bake a chocolate cake", 0));
        mem.append(MemoryRecord::new("user", "restart the database server", 1));
        mem.append(MemoryRecord::new("user", "restart the database service", 2));

        let query = RetrievalQuery { text: Some("restart the database now".into()), top_k: Some(2), ..Default::default() };
        let records = mem.retrieve(&query).into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].step_id, 1);
        assert_eq!(records[1].step_id, 2);
    }

    #[test]
    fn message_format_tags_hits_as_user_observations() {
        let mut mem = VectorMemory::new();
        mem.append(MemoryRecord::new("assistant", "the answer is 42", 0));
        let query = RetrievalQuery { text: Some("answer".into()), format: RetrievalFormat::Messages, ..Default::default() };
        let messages = mem.retrieve(&query).into_messages();
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "Observation: the answer is 42");
    }

    #[test]
    fn evict_never_drops_anything() {
        let mut mem = VectorMemory::new();
        mem.append(MemoryRecord::new("user", "x", 0));
        assert_eq!(mem.evict(), 0);
        assert_eq!(mem.len(), 1);
    }
}
