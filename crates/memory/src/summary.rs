use crate::record::{MemoryRecord, Retrieval, RetrievalFormat, RetrievalQuery, RetrievedMessage};
use crate::store::MemoryStore;

/// Keeps the last `keep_verbatim` records untouched and folds anything
/// older into a single rolling condensed summary record, replayed first
/// on every retrieval. The summary is a plain one-line-per-record
/// concatenation — good enough to keep the model oriented without
/// carrying the network dependency a real summarization call would need.
pub struct SummaryMemory {
    keep_verbatim: usize,
    recent: Vec<MemoryRecord>,
    summary: Option<String>,
    summarized_count: usize,
}

impl SummaryMemory {
    pub fn new(keep_verbatim: usize) -> Self {
        Self { keep_verbatim, recent: Vec::new(), summary: None, summarized_count: 0 }
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn condense(&mut self, dropped: &[MemoryRecord]) {
        if dropped.is_empty() {
            return;
        }
        let mut text = self.summary.clone().unwrap_or_default();
        for record in dropped {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!("[{}] {}: {}", record.step_id, record.role, record.content));
        }
        self.summarized_count += dropped.len();
        tracing::debug!(dropped = dropped.len(), total_summarized = self.summarized_count, "condensed records into rolling summary");
        self.summary = Some(text);
    }
}

impl MemoryStore for SummaryMemory {
    fn append(&mut self, record: MemoryRecord) {
        self.recent.push(record);
    }

    fn retrieve(&self, query: &RetrievalQuery) -> Retrieval {
        let mut records: Vec<MemoryRecord> = Vec::new();
        if let Some(summary) = &self.summary {
            // Tagged "user" rather than "system" so it survives the engine's
            // history_query, which filters to roles {user, assistant}; see
            // VectorMemory for the same convention.
            let summary_record = MemoryRecord::new("user", summary.clone(), 0);
            if query.matches_role(&summary_record.role) {
                records.push(summary_record);
            }
        }
        records.extend(self.recent.iter().filter(|r| query.matches_role(&r.role) && query.matches_step(r.step_id)).cloned());

        if let Some(max) = query.max_items {
            if records.len() > max {
                records = records.split_off(records.len() - max);
            }
        }

        match query.format {
            RetrievalFormat::Records => Retrieval::Records(records),
            RetrievalFormat::Messages => {
                Retrieval::Messages(records.into_iter().map(|r| RetrievedMessage { role: r.role, content: r.content }).collect())
            }
        }
    }

    fn evict(&mut self) -> usize {
        if self.recent.len() <= self.keep_verbatim {
            return 0;
        }
        let drop_count = self.recent.len() - self.keep_verbatim;
        let dropped: Vec<MemoryRecord> = self.recent.drain(0..drop_count).collect();
        self.condense(&dropped);
        drop_count
    }

    fn reset(&mut self) {
        self.recent.clear();
        self.summary = None;
        self.summarized_count = 0;
    }

    fn len(&self) -> usize {
        self.recent.len() + usize::from(self.summary.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_condenses_into_rolling_summary() {
        let mut mem = SummaryMemory::new(1);
        for i in 0..3 {
            mem.append(MemoryRecord::new("user", format!("turn {i}"), i));
        }
        assert_eq!(mem.evict(), 2);
        assert_eq!(mem.summarized_count, 2);
        let summary = mem.summary_text().unwrap();
        assert!(summary.contains("turn 0"));
        assert!(summary.contains("turn 1"));
        assert!(!summary.contains("turn 2"));
    }

    #[test]
    fn retrieval_places_summary_before_verbatim_records() {
        let mut mem = SummaryMemory::new(1);
        for i in 0..3 {
            mem.append(MemoryRecord::new("user", format!("turn {i}"), i));
        }
        mem.evict();
        let records = mem.retrieve(&RetrievalQuery::default()).into_records();
        assert_eq!(records[0].role, "user");
        assert!(records[0].content.contains("turn 0"));
        assert_eq!(records[1].content, "turn 2");
    }

    #[test]
    fn reset_drops_both_summary_and_recent() {
        let mut mem = SummaryMemory::new(1);
        mem.append(MemoryRecord::new("user", "x", 0));
        mem.append(MemoryRecord::new("user", "y", 1));
        mem.evict();
        mem.reset();
        assert!(mem.is_empty());
        assert!(mem.summary_text().is_none());
    }
}
