//! Memoizing frame cache with LRU eviction.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::dump::{ParseError, parse_dump};
use crate::schema::{CacheConfig, FrameTable};

struct CacheEntry {
    table: Arc<FrameTable>,
    /// Monotonic access tick; the smallest tick is the LRU victim.
    last_access: u64,
    approx_bytes: u64,
}

/// Snapshot of cache counters.
///
/// Counters track the cache's lifetime, not current residency: they
/// survive `flush` so a session can report scrubbing behavior end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Requests answered from a resident entry.
    pub hits: u64,
    /// Requests that parsed the backing file; each miss is exactly one
    /// parse.
    pub misses: u64,
    /// Entries currently resident.
    pub entries: usize,
    /// Approximate bytes currently resident.
    pub resident_bytes: u64,
}

impl CacheStats {
    /// Fraction of requests answered without parsing.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Memoizes parsed frame tables by frame index, bounded by entry count
/// and/or byte budget with least-recently-used eviction.
///
/// All access goes through `&mut self` in a synchronous session, so the
/// lookup-then-parse path is exclusive by construction: repeated rapid
/// requests for one frame — the timeline-scrubbing pattern — cost exactly
/// one parse.
pub struct FrameCache {
    config: CacheConfig,
    entries: HashMap<u64, CacheEntry>,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl FrameCache {
    /// Create an empty cache with the given bounds.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Fetch the table for `frame_index`, parsing `path` on first access.
    ///
    /// A hit returns the resident table and marks it most recently used;
    /// a miss parses, inserts, then evicts least-recently-used entries
    /// until the cache is back within bounds. A parse failure caches
    /// nothing.
    pub fn get_or_parse(
        &mut self,
        frame_index: u64,
        path: &Path,
    ) -> Result<Arc<FrameTable>, ParseError> {
        self.clock += 1;
        if let Some(entry) = self.entries.get_mut(&frame_index) {
            entry.last_access = self.clock;
            self.hits += 1;
            return Ok(Arc::clone(&entry.table));
        }

        self.misses += 1;
        let table = Arc::new(parse_dump(path, frame_index)?);
        self.entries.insert(
            frame_index,
            CacheEntry {
                table: Arc::clone(&table),
                last_access: self.clock,
                approx_bytes: table.approx_size() as u64,
            },
        );
        self.evict_to_bounds();
        Ok(table)
    }

    /// Whether a frame is resident.
    pub fn contains(&self, frame_index: u64) -> bool {
        self.entries.contains_key(&frame_index)
    }

    /// Drop a single entry, e.g. when its file changed on disk.
    /// Returns whether an entry was resident.
    pub fn invalidate(&mut self, frame_index: u64) -> bool {
        self.entries.remove(&frame_index).is_some()
    }

    /// Drop every entry, reclaiming memory before a heavy pass.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            resident_bytes: self.resident_bytes(),
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn resident_bytes(&self) -> u64 {
        self.entries.values().map(|entry| entry.approx_bytes).sum()
    }

    fn over_bounds(&self) -> bool {
        if let Some(max_entries) = self.config.max_entries
            && self.entries.len() > max_entries
        {
            return true;
        }
        if let Some(max_bytes) = self.config.max_bytes
            && self.resident_bytes() > max_bytes
        {
            return true;
        }
        false
    }

    fn evict_to_bounds(&mut self) {
        // The newest entry always stays resident, even when it alone
        // exceeds a byte budget: the caller is handed the table anyway.
        while self.over_bounds() && self.entries.len() > 1 {
            let victim = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(frame_index, _)| *frame_index);
            if let Some(frame_index) = victim {
                self.entries.remove(&frame_index);
                log::debug!("evicted frame {frame_index} from cache");
            }
        }
    }
}
