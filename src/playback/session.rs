//! Session orchestration: one open dump sequence, its cache, and the
//! optional reference frame.

use std::path::Path;
use std::sync::Arc;

use crate::dump::{FrameSequence, ParseError, SequenceError};
use crate::playback::{CacheStats, DisplacementTable, FrameCache, ReferenceFrame};
use crate::schema::{ConfigError, FrameTable, SessionConfig};

/// Errors surfaced by session operations.
///
/// Parser and resolver failures pass through unretried: malformed input
/// or naming usually needs human correction, so nothing is swallowed and
/// nothing is re-attempted automatically.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An operation needs an open sequence, but none is.
    #[error("no dump sequence is open")]
    NotOpened,
    /// The requested frame index is not in the open sequence.
    #[error("frame {frame_index} is not in the open sequence")]
    UnknownFrame { frame_index: u64 },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// What a navigation query hands back: the plain frame table, or the
/// table enriched with displacement once a reference is set.
#[derive(Debug, Clone)]
pub enum FrameView {
    Plain(Arc<FrameTable>),
    Displaced(DisplacementTable),
}

impl FrameView {
    /// Frame index of the viewed frame.
    pub fn frame_index(&self) -> u64 {
        self.table().frame_index()
    }

    /// The viewed frame's table (the target table for a displaced view).
    pub fn table(&self) -> &Arc<FrameTable> {
        match self {
            FrameView::Plain(table) => table,
            FrameView::Displaced(displaced) => displaced.table(),
        }
    }

    /// Number of particles in the viewed frame.
    pub fn particle_count(&self) -> usize {
        self.table().particle_count()
    }

    /// The displacement column, when a reference is set.
    pub fn displacement(&self) -> Option<&DisplacementTable> {
        match self {
            FrameView::Plain(_) => None,
            FrameView::Displaced(displaced) => Some(displaced),
        }
    }
}

/// One simulation run's playback state.
///
/// Holds the resolved frame sequence, the frame cache, the currently
/// displayed frame, and the optional reference frame. All operations are
/// synchronous; a cache miss (disk read plus parse) is the only blocking
/// work. Lifecycle: `Unopened → Opened(no reference) ⇄ Opened(with
/// reference)`; re-opening resets to a fresh sequence, an empty cache,
/// and no reference.
pub struct FrameSession {
    config: SessionConfig,
    cache: FrameCache,
    sequence: Option<FrameSequence>,
    current_frame: Option<u64>,
    reference: Option<ReferenceFrame>,
}

impl FrameSession {
    /// Create an unopened session with validated configuration.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = FrameCache::new(config.cache.clone());
        Ok(Self {
            config,
            cache,
            sequence: None,
            current_frame: None,
            reference: None,
        })
    }

    /// Open the sequence containing `path`, replacing any open one.
    ///
    /// Resolution runs once here; the sequence stays fixed until the next
    /// `open`. A duplicate frame index among the siblings degrades to a
    /// single-frame sequence holding just the sample file, with the
    /// conflict logged; other resolver errors propagate. The cache is
    /// flushed wholesale and any reference is dropped.
    pub fn open(&mut self, path: &Path) -> Result<&FrameSequence, SessionError> {
        let sequence = match FrameSequence::resolve(path) {
            Ok(sequence) => sequence,
            Err(conflict @ SequenceError::Conflict { .. }) => {
                log::warn!("{conflict}; falling back to a single-frame sequence");
                FrameSequence::single(path)
            }
            Err(other) => return Err(other.into()),
        };

        self.cache = FrameCache::new(self.config.cache.clone());
        self.current_frame = None;
        self.reference = None;
        let sequence = self.sequence.insert(sequence);
        log::info!(
            "opened sequence of {} frame(s) from {}",
            sequence.len(),
            path.display()
        );
        Ok(sequence)
    }

    /// Fetch the enriched view for a frame and make it current.
    ///
    /// Served from the cache when resident; otherwise the frame's file is
    /// parsed and cached. With a reference set the result carries the
    /// displacement column, else the plain table.
    pub fn goto_frame(&mut self, frame_index: u64) -> Result<FrameView, SessionError> {
        let sequence = self.sequence.as_ref().ok_or(SessionError::NotOpened)?;
        let path = sequence
            .path_for(frame_index)
            .ok_or(SessionError::UnknownFrame { frame_index })?;
        let table = self.cache.get_or_parse(frame_index, path)?;
        self.current_frame = Some(frame_index);
        Ok(self.view_of(table))
    }

    /// Make a frame the displacement baseline.
    ///
    /// The reference table is fetched through the cache and its id index
    /// is built exactly once, here. When a frame is currently displayed,
    /// its recomputed view is returned so the new baseline takes effect
    /// immediately, without another navigation event.
    pub fn set_reference(
        &mut self,
        frame_index: u64,
    ) -> Result<Option<FrameView>, SessionError> {
        let sequence = self.sequence.as_ref().ok_or(SessionError::NotOpened)?;
        let path = sequence
            .path_for(frame_index)
            .ok_or(SessionError::UnknownFrame { frame_index })?;
        let table = self.cache.get_or_parse(frame_index, path)?;
        self.reference = Some(ReferenceFrame::new(table));
        log::info!("reference frame set to {frame_index}");
        self.refresh_current()
    }

    /// Drop the reference, returning the current frame's plain view.
    pub fn clear_reference(&mut self) -> Result<Option<FrameView>, SessionError> {
        if self.sequence.is_none() {
            return Err(SessionError::NotOpened);
        }
        self.reference = None;
        self.refresh_current()
    }

    /// Drop every cached frame, reclaiming memory before a heavy pass.
    pub fn flush_cache(&mut self) {
        self.cache.flush();
    }

    /// Drop one cached frame, e.g. after its file changed on disk.
    pub fn invalidate_frame(&mut self, frame_index: u64) -> bool {
        self.cache.invalidate(frame_index)
    }

    /// Whether a sequence is open.
    pub fn is_open(&self) -> bool {
        self.sequence.is_some()
    }

    /// The open sequence, if any.
    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }

    /// Index of the currently displayed frame.
    pub fn current_frame(&self) -> Option<u64> {
        self.current_frame
    }

    /// Index of the reference frame, when one is set.
    pub fn reference_index(&self) -> Option<u64> {
        self.reference.as_ref().map(ReferenceFrame::frame_index)
    }

    /// Cache counters for this session.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Re-derive the current frame's view after a reference change.
    fn refresh_current(&mut self) -> Result<Option<FrameView>, SessionError> {
        let Some(frame_index) = self.current_frame else {
            return Ok(None);
        };
        let sequence = self.sequence.as_ref().ok_or(SessionError::NotOpened)?;
        let path = sequence
            .path_for(frame_index)
            .ok_or(SessionError::UnknownFrame { frame_index })?;
        let table = self.cache.get_or_parse(frame_index, path)?;
        Ok(Some(self.view_of(table)))
    }

    fn view_of(&self, table: Arc<FrameTable>) -> FrameView {
        match &self.reference {
            Some(reference) => {
                let displaced = reference.displace(table);
                if displaced.is_fully_unmatched() {
                    log::warn!(
                        "frame {} shares no particle ids with reference frame {}",
                        displaced.frame_index(),
                        displaced.reference_index()
                    );
                }
                FrameView::Displaced(displaced)
            }
            None => FrameView::Plain(table),
        }
    }
}
