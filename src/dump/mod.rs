//! On-disk concerns: dump file parsing and frame sequence discovery.
//!
//! # Dump File Format
//!
//! One file holds one timestep's particles as whitespace-separated text.
//! LIGGGHTS-style dumps carry `ITEM:` metadata sections ahead of the
//! column header:
//!
//! ```text
//! ITEM: TIMESTEP
//! 1000
//! ITEM: NUMBER OF ATOMS
//! 2
//! ITEM: BOX BOUNDS pp pp pp
//! 0.0 1.0
//! 0.0 1.0
//! 0.0 1.0
//! ITEM: ATOMS id type x y z radius
//! 1 1 0.1 0.2 0.3 0.05
//! 2 1 0.4 0.5 0.6 0.05
//! ```
//!
//! Bare tabular files are accepted too: the first non-comment line names
//! the columns, every following line is one particle. Columns may appear
//! in any order; `id x y z radius` are required, `fx fy fz` assemble into
//! a force vector, anything else is kept as a named extra attribute.
//!
//! # Filename Convention
//!
//! Sibling timesteps share a `<prefix><integer><suffix>` naming shape,
//! e.g. `dump_100.liggghts`, `dump_200.liggghts`. The sequence resolver
//! infers the shape from one sample name and collects the rest.

mod parser;
mod sequence;

pub use parser::{ParseError, REQUIRED_COLUMNS, parse_dump};
pub use sequence::{FrameSequence, SequenceEntry, SequenceError};
