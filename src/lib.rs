//! granuview - Displacement-aware playback of particle dump sequences.
//!
//! This crate ingests time-series particle-simulation dump files (one
//! text file per timestep) and exposes them as a navigable frame
//! sequence: per-frame tables of typed particle records, an LRU frame
//! cache for interactive timeline scrubbing, and displacement fields
//! joined by particle id against a chosen reference frame.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Particle records, frame tables, and configuration
//! - `dump`: Dump file parsing and frame sequence discovery
//! - `playback`: Frame cache, displacement engine, and the session
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use granuview::{
//!     playback::{FrameSession, FrameView},
//!     schema::SessionConfig,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // One sample file is enough to discover the whole run.
//! let mut session = FrameSession::new(SessionConfig::default())?;
//! session.open(Path::new("run/dump_100.liggghts"))?;
//!
//! // Measure displacement against the first timestep.
//! session.set_reference(100)?;
//!
//! if let FrameView::Displaced(table) = session.goto_frame(200)? {
//!     println!(
//!         "{} of {} particles matched the reference",
//!         table.matched_count(),
//!         table.len()
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod dump;
pub mod playback;
pub mod schema;

// Re-export commonly used types
pub use dump::{FrameSequence, ParseError, SequenceError, parse_dump};
pub use playback::{DisplacementTable, FrameCache, FrameSession, FrameView, ReferenceFrame};
pub use schema::{FrameTable, ParticleRecord, SessionConfig};
