//! Particle records and per-frame tables.

use std::collections::BTreeMap;
use std::mem;
use std::path::{Path, PathBuf};

/// One particle's attributes within a single frame.
///
/// Records are immutable once parsed. Every record in a table carries the
/// schema its file declared; unknown columns land in [`extras`].
///
/// [`extras`]: ParticleRecord::extras
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    /// Particle id, unique within a frame and stable across frames.
    pub id: u64,
    /// Position (x, y, z).
    pub position: [f64; 3],
    /// Particle radius. Non-positive values are accepted but flagged.
    pub radius: f64,
    /// Force vector (fx, fy, fz), present when the file declares all three
    /// force columns.
    pub force: Option<[f64; 3]>,
    /// Extra named numeric attributes beyond the known columns.
    pub extras: BTreeMap<String, f64>,
}

impl ParticleRecord {
    /// Whether the radius is degenerate (zero or negative).
    ///
    /// Upstream simulations legitimately report degenerate radii, so these
    /// are flagged rather than rejected at parse time.
    pub fn has_degenerate_radius(&self) -> bool {
        self.radius <= 0.0
    }

    /// Look up a named extra attribute.
    pub fn extra(&self, name: &str) -> Option<f64> {
        self.extras.get(name).copied()
    }

    fn approx_size(&self) -> usize {
        let extras: usize = self
            .extras
            .keys()
            .map(|name| name.len() + mem::size_of::<f64>())
            .sum();
        mem::size_of::<Self>() + extras
    }
}

/// All particle records for one timestep, plus frame metadata.
///
/// Invariants upheld by the parser: particle ids are unique within a table,
/// and every record carries exactly the declared column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    frame_index: u64,
    source_path: PathBuf,
    declared_columns: Vec<String>,
    records: Vec<ParticleRecord>,
}

impl FrameTable {
    pub(crate) fn new(
        frame_index: u64,
        source_path: PathBuf,
        declared_columns: Vec<String>,
        records: Vec<ParticleRecord>,
    ) -> Self {
        Self {
            frame_index,
            source_path,
            declared_columns,
            records,
        }
    }

    /// Timestep index this frame holds in its sequence.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// File this table was parsed from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Column names in header order.
    pub fn declared_columns(&self) -> &[String] {
        &self.declared_columns
    }

    /// Records in file order.
    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// Number of particles in this frame.
    pub fn particle_count(&self) -> usize {
        self.records.len()
    }

    /// Whether the frame holds no particles (a valid, empty timestep).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a record by particle id.
    ///
    /// Linear scan; callers joining many lookups should build a
    /// [`ReferenceFrame`](crate::playback::ReferenceFrame) index instead.
    pub fn record_by_id(&self, id: u64) -> Option<&ParticleRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Number of records flagged with a degenerate radius.
    pub fn degenerate_radius_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.has_degenerate_radius())
            .count()
    }

    /// Estimated resident size in bytes, used for cache byte budgets.
    pub fn approx_size(&self) -> usize {
        let columns: usize = self.declared_columns.iter().map(String::len).sum();
        let records: usize = self
            .records
            .iter()
            .map(ParticleRecord::approx_size)
            .sum();
        mem::size_of::<Self>() + self.source_path.as_os_str().len() + columns + records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, position: [f64; 3], radius: f64) -> ParticleRecord {
        ParticleRecord {
            id,
            position,
            radius,
            force: None,
            extras: BTreeMap::new(),
        }
    }

    fn columns() -> Vec<String> {
        ["id", "x", "y", "z", "radius"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_record_by_id() {
        let table = FrameTable::new(
            7,
            PathBuf::from("dump_7.txt"),
            columns(),
            vec![record(3, [1.0, 2.0, 3.0], 0.5), record(9, [0.0, 0.0, 0.0], 0.5)],
        );

        assert_eq!(table.record_by_id(9).unwrap().id, 9);
        assert!(table.record_by_id(4).is_none());
        assert_eq!(table.particle_count(), 2);
        assert_eq!(table.frame_index(), 7);
    }

    #[test]
    fn test_degenerate_radius_flagging() {
        let table = FrameTable::new(
            0,
            PathBuf::from("dump_0.txt"),
            columns(),
            vec![
                record(1, [0.0; 3], 0.5),
                record(2, [0.0; 3], 0.0),
                record(3, [0.0; 3], -1.0),
            ],
        );

        assert!(!table.records()[0].has_degenerate_radius());
        assert!(table.records()[1].has_degenerate_radius());
        assert!(table.records()[2].has_degenerate_radius());
        assert_eq!(table.degenerate_radius_count(), 2);
    }

    #[test]
    fn test_extras_lookup() {
        let mut extras = BTreeMap::new();
        extras.insert("omegax".to_string(), 0.25);
        let rec = ParticleRecord {
            id: 1,
            position: [0.0; 3],
            radius: 0.5,
            force: None,
            extras,
        };

        assert_eq!(rec.extra("omegax"), Some(0.25));
        assert_eq!(rec.extra("omegay"), None);
    }

    #[test]
    fn test_approx_size_grows_with_records() {
        let small = FrameTable::new(0, PathBuf::from("a"), columns(), vec![record(1, [0.0; 3], 0.5)]);
        let large = FrameTable::new(
            0,
            PathBuf::from("a"),
            columns(),
            (0..100).map(|i| record(i, [0.0; 3], 0.5)).collect(),
        );

        assert!(large.approx_size() > small.approx_size());
    }
}
