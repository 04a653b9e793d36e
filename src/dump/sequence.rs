//! Frame sequence discovery from dump file names.
//!
//! One sample file is enough to find its siblings: the name is split
//! around an integer timestep token, and every directory entry matching
//! the same `<prefix><integer><suffix>` shape contributes a frame. Only
//! names are inspected; file contents are never opened here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One discovered frame: extracted timestep index and its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    /// Integer timestep token extracted from the file name.
    pub frame_index: u64,
    /// File holding this frame's particle data.
    pub path: PathBuf,
}

/// Errors from resolving a frame sequence.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The sample file name holds no integer token.
    #[error("no frame number found in file name `{name}`")]
    NoFrameToken { name: String },
    /// Two files extract the same frame index.
    #[error("frame {frame_index} claimed by both `{first}` and `{second}`")]
    Conflict {
        frame_index: u64,
        first: String,
        second: String,
    },
    /// The containing directory could not be listed.
    #[error("failed to list dump directory")]
    Io(#[from] io::Error),
}

/// The ordered frames of one simulation run.
///
/// Built once per session and immutable thereafter; re-scanning the
/// directory is an explicit re-open, never automatic. Entries are
/// strictly ascending by frame index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    entries: Vec<SequenceEntry>,
}

impl FrameSequence {
    /// Discover the sequence containing `sample` by listing its directory.
    pub fn resolve(sample: &Path) -> Result<Self, SequenceError> {
        let name = sample_name(sample)?;
        let dir = match sample.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut listing = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if let Ok(file_name) = entry.file_name().into_string() {
                listing.push(file_name);
            }
        }

        Self::from_listing(&dir, &name, &listing)
    }

    /// Infer the sequence from a pre-fetched directory listing.
    ///
    /// Pure with respect to the filesystem, so pattern inference is
    /// testable in isolation. Every maximal digit run in the sample name
    /// is tried as the timestep token; the run matching the most listing
    /// entries wins, since the timestep is the token that varies across
    /// sibling files. Ties go to the leftmost run.
    pub fn from_listing(
        dir: &Path,
        sample_name: &str,
        listing: &[String],
    ) -> Result<Self, SequenceError> {
        let mut best: Option<Vec<(u64, &str)>> = None;
        for (prefix, digits, suffix) in digit_runs(sample_name) {
            // A token too wide for u64 cannot index the sample's own frame.
            if digits.parse::<u64>().is_err() {
                continue;
            }
            let matches: Vec<(u64, &str)> = listing
                .iter()
                .filter_map(|name| {
                    let token = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
                    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    Some((token.parse::<u64>().ok()?, name.as_str()))
                })
                .collect();
            if best.as_ref().is_none_or(|b| matches.len() > b.len()) {
                best = Some(matches);
            }
        }

        let Some(mut matches) = best else {
            return Err(SequenceError::NoFrameToken {
                name: sample_name.to_string(),
            });
        };

        matches.sort_by_key(|(frame_index, _)| *frame_index);
        for pair in matches.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(SequenceError::Conflict {
                    frame_index: pair[0].0,
                    first: pair[0].1.to_string(),
                    second: pair[1].1.to_string(),
                });
            }
        }

        let entries = matches
            .into_iter()
            .map(|(frame_index, name)| SequenceEntry {
                frame_index,
                path: dir.join(name),
            })
            .collect();
        Ok(Self { entries })
    }

    /// Degenerate sequence holding only the sample file.
    ///
    /// Used when sibling discovery finds a conflict. The frame index is
    /// the first integer token in the name, or 0 when none parses.
    pub fn single(sample: &Path) -> Self {
        let frame_index = sample
            .file_name()
            .and_then(|name| name.to_str())
            .into_iter()
            .flat_map(digit_runs)
            .find_map(|(_, digits, _)| digits.parse::<u64>().ok())
            .unwrap_or(0);

        Self {
            entries: vec![SequenceEntry {
                frame_index,
                path: sample.to_path_buf(),
            }],
        }
    }

    /// Entries in ascending frame order.
    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sequence holds no frames.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest frame index.
    pub fn first_index(&self) -> Option<u64> {
        self.entries.first().map(|entry| entry.frame_index)
    }

    /// Highest frame index.
    pub fn last_index(&self) -> Option<u64> {
        self.entries.last().map(|entry| entry.frame_index)
    }

    /// All frame indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().map(|entry| entry.frame_index)
    }

    /// File for a frame index, if the sequence holds it.
    pub fn path_for(&self, frame_index: u64) -> Option<&Path> {
        self.position(frame_index)
            .map(|position| self.entries[position].path.as_path())
    }

    /// Ordinal position of a frame index within the sequence.
    pub fn position(&self, frame_index: u64) -> Option<usize> {
        self.entries
            .binary_search_by_key(&frame_index, |entry| entry.frame_index)
            .ok()
    }

    /// Entry at an ordinal position, for hosts that page sequentially.
    pub fn nth(&self, position: usize) -> Option<&SequenceEntry> {
        self.entries.get(position)
    }
}

fn sample_name(sample: &Path) -> Result<String, SequenceError> {
    sample
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| SequenceError::NoFrameToken {
            name: sample.display().to_string(),
        })
}

/// Split `name` at each maximal digit run into (prefix, digits, suffix).
fn digit_runs(name: &str) -> Vec<(&str, &str, &str)> {
    let bytes = name.as_bytes();
    let mut runs = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start].is_ascii_digit() {
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            runs.push((&name[..start], &name[start..end], &name[end..]));
            start = end;
        } else {
            start += 1;
        }
    }
    runs
}
