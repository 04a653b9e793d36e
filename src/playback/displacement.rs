//! Displacement fields joined by particle id against a reference frame.

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::{FrameTable, ParticleRecord};

/// A chosen frame whose particle positions are the zero-displacement
/// baseline for every other frame in the session.
///
/// The id-to-position index is built once at construction and reused for
/// every target frame navigated while this reference is set.
#[derive(Debug, Clone)]
pub struct ReferenceFrame {
    table: Arc<FrameTable>,
    positions: HashMap<u64, [f64; 3]>,
}

impl ReferenceFrame {
    /// Index a frame table as the displacement baseline.
    pub fn new(table: Arc<FrameTable>) -> Self {
        let positions = table
            .records()
            .iter()
            .map(|record| (record.id, record.position))
            .collect();
        Self { table, positions }
    }

    /// Frame index of the underlying table.
    pub fn frame_index(&self) -> u64 {
        self.table.frame_index()
    }

    /// The indexed frame table.
    pub fn table(&self) -> &Arc<FrameTable> {
        &self.table
    }

    /// Baseline position for a particle id.
    pub fn position_of(&self, id: u64) -> Option<[f64; 3]> {
        self.positions.get(&id).copied()
    }

    /// Number of indexed particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the reference frame holds no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Join `target` against this reference by particle id.
    ///
    /// A matched id gets the componentwise displacement
    /// `target.position - reference.position`; an id absent from the
    /// reference gets the unmatched sentinel (`None`), never a zero
    /// vector, so "unmoved" and "unmatched" stay distinguishable.
    /// Linear in the target's particle count.
    pub fn displace(&self, target: Arc<FrameTable>) -> DisplacementTable {
        let mut matched = 0usize;
        let displacements: Vec<Option<[f64; 3]>> = target
            .records()
            .iter()
            .map(|record| {
                self.position_of(record.id).map(|baseline| {
                    matched += 1;
                    [
                        record.position[0] - baseline[0],
                        record.position[1] - baseline[1],
                        record.position[2] - baseline[2],
                    ]
                })
            })
            .collect();

        DisplacementTable {
            reference_index: self.table.frame_index(),
            target,
            displacements,
            matched,
        }
    }
}

/// A target frame's records paired with per-particle displacement.
///
/// The record set is exactly the target frame's record set; the
/// displacement column runs parallel to it, with `None` marking
/// particles that have no counterpart in the reference frame.
#[derive(Debug, Clone)]
pub struct DisplacementTable {
    target: Arc<FrameTable>,
    displacements: Vec<Option<[f64; 3]>>,
    reference_index: u64,
    matched: usize,
}

impl DisplacementTable {
    /// Records paired with their displacement, in file order.
    pub fn records(&self) -> impl Iterator<Item = (&ParticleRecord, Option<[f64; 3]>)> {
        self.target
            .records()
            .iter()
            .zip(self.displacements.iter().copied())
    }

    /// Per-record displacements, parallel to [`table`](Self::table)'s
    /// records.
    pub fn displacements(&self) -> &[Option<[f64; 3]>] {
        &self.displacements
    }

    /// The target frame this table derives from.
    pub fn table(&self) -> &Arc<FrameTable> {
        &self.target
    }

    /// Frame index of the target frame.
    pub fn frame_index(&self) -> u64 {
        self.target.frame_index()
    }

    /// Frame index of the reference frame.
    pub fn reference_index(&self) -> u64 {
        self.reference_index
    }

    /// Number of particles matched in the reference.
    pub fn matched_count(&self) -> usize {
        self.matched
    }

    /// Number of particles carrying the unmatched sentinel.
    pub fn unmatched_count(&self) -> usize {
        self.displacements.len() - self.matched
    }

    /// Number of particles in the target frame.
    pub fn len(&self) -> usize {
        self.displacements.len()
    }

    /// Whether the target frame holds no particles.
    pub fn is_empty(&self) -> bool {
        self.displacements.is_empty()
    }

    /// Whether a non-empty target shares no particle ids with the
    /// reference. Not an error: the table is still returned, fully
    /// unmatched, and the session logs a warning.
    pub fn is_fully_unmatched(&self) -> bool {
        self.matched == 0 && !self.is_empty()
    }

    /// Largest displacement magnitude among matched particles.
    pub fn max_magnitude(&self) -> Option<f64> {
        self.displacements
            .iter()
            .flatten()
            .map(|d| (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt())
            .reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FrameTable;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn record(id: u64, position: [f64; 3]) -> ParticleRecord {
        ParticleRecord {
            id,
            position,
            radius: 0.5,
            force: None,
            extras: BTreeMap::new(),
        }
    }

    fn table(frame_index: u64, records: Vec<ParticleRecord>) -> Arc<FrameTable> {
        let columns = ["id", "x", "y", "z", "radius"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Arc::new(FrameTable::new(
            frame_index,
            PathBuf::from(format!("dump_{frame_index}.txt")),
            columns,
            records,
        ))
    }

    #[test]
    fn test_matched_and_unmatched_records() {
        // Reference holds id 1 only; target holds ids 1 and 2.
        let reference = ReferenceFrame::new(table(0, vec![record(1, [0.0, 0.0, 0.0])]));
        let target = table(
            100,
            vec![record(1, [0.0, 0.0, 0.0]), record(2, [1.0, 0.0, 0.0])],
        );

        let displaced = reference.displace(target);
        assert_eq!(displaced.displacements()[0], Some([0.0, 0.0, 0.0]));
        assert_eq!(displaced.displacements()[1], None);
        assert_eq!(displaced.matched_count(), 1);
        assert_eq!(displaced.unmatched_count(), 1);
        assert!(!displaced.is_fully_unmatched());
    }

    #[test]
    fn test_componentwise_subtraction() {
        let reference = ReferenceFrame::new(table(0, vec![record(7, [1.0, 2.0, 3.0])]));
        let target = table(50, vec![record(7, [1.5, 1.0, 3.0])]);

        let displaced = reference.displace(target);
        assert_eq!(displaced.displacements()[0], Some([0.5, -1.0, 0.0]));
        assert_eq!(displaced.reference_index(), 0);
        assert_eq!(displaced.frame_index(), 50);
    }

    #[test]
    fn test_record_set_equals_target() {
        let reference = ReferenceFrame::new(table(0, vec![record(1, [0.0; 3])]));
        let target = table(10, vec![record(2, [1.0, 0.0, 0.0]), record(1, [0.0; 3])]);

        let displaced = reference.displace(Arc::clone(&target));
        let ids: Vec<u64> = displaced.records().map(|(rec, _)| rec.id).collect();
        assert_eq!(ids, [2, 1]);
        assert_eq!(displaced.len(), target.particle_count());
    }

    #[test]
    fn test_zero_overlap_is_fully_unmatched() {
        let reference = ReferenceFrame::new(table(0, vec![record(1, [0.0; 3])]));
        let target = table(10, vec![record(2, [0.0; 3]), record(3, [0.0; 3])]);

        let displaced = reference.displace(target);
        assert!(displaced.is_fully_unmatched());
        assert_eq!(displaced.matched_count(), 0);
        assert!(displaced.displacements().iter().all(Option::is_none));
    }

    #[test]
    fn test_empty_target_is_not_fully_unmatched() {
        let reference = ReferenceFrame::new(table(0, vec![record(1, [0.0; 3])]));
        let displaced = reference.displace(table(10, vec![]));

        assert!(displaced.is_empty());
        assert!(!displaced.is_fully_unmatched());
        assert_eq!(displaced.max_magnitude(), None);
    }

    #[test]
    fn test_index_answers_position_lookups() {
        let reference = ReferenceFrame::new(table(
            0,
            vec![record(1, [1.0, 0.0, 0.0]), record(2, [0.0, 2.0, 0.0])],
        ));

        assert_eq!(reference.len(), 2);
        assert_eq!(reference.position_of(2), Some([0.0, 2.0, 0.0]));
        assert_eq!(reference.position_of(9), None);
    }

    #[test]
    fn test_one_reference_serves_many_targets() {
        let reference = ReferenceFrame::new(table(0, vec![record(1, [0.0; 3])]));

        for (index, x) in [(10u64, 1.0f64), (20, 2.0), (30, 3.0)] {
            let displaced = reference.displace(table(index, vec![record(1, [x, 0.0, 0.0])]));
            assert_eq!(displaced.displacements()[0], Some([x, 0.0, 0.0]));
        }
    }

    #[test]
    fn test_max_magnitude_ignores_unmatched() {
        let reference = ReferenceFrame::new(table(0, vec![record(1, [0.0; 3])]));
        let target = table(
            10,
            vec![record(1, [3.0, 4.0, 0.0]), record(2, [100.0, 0.0, 0.0])],
        );

        let displaced = reference.displace(target);
        assert_eq!(displaced.max_magnitude(), Some(5.0));
    }
}
