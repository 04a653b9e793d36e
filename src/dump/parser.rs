//! Parser for per-timestep particle dump files.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::schema::{FrameTable, ParticleRecord};

/// Header line naming the per-particle columns in LIGGGHTS-style dumps.
const ATOMS_HEADER: &str = "ITEM: ATOMS";

/// Prefix of metadata sections preceding the atoms header.
const ITEM_PREFIX: &str = "ITEM:";

/// Columns every dump file must declare.
pub const REQUIRED_COLUMNS: [&str; 5] = ["id", "x", "y", "z", "radius"];

/// Errors from parsing a single dump file.
///
/// Any of these is fatal for the file at hand, but only for that file:
/// other frames in the sequence stay navigable.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A required column is absent from the declared header.
    #[error("required column `{column}` missing from dump header")]
    MissingColumn { column: &'static str },
    /// The header line is unusable (absent, empty, or repeats a column).
    #[error("malformed dump header: {reason}")]
    MalformedHeader { reason: String },
    /// A data row declares the wrong number of fields.
    #[error("line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A field failed numeric parsing.
    #[error("line {line}: column `{column}` holds non-numeric value `{value}`")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
    /// Two rows claim the same particle id.
    #[error("line {line}: duplicate particle id {id}")]
    DuplicateId { line: usize, id: u64 },
    /// The file could not be read.
    #[error("failed to read dump file")]
    Io(#[from] io::Error),
}

/// Where each known column sits in a data row.
struct ColumnLayout {
    width: usize,
    id: usize,
    x: usize,
    y: usize,
    z: usize,
    radius: usize,
    force: Option<[usize; 3]>,
    /// Remaining columns, kept as named extra attributes.
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_columns(columns: &[String]) -> Result<Self, ParseError> {
        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(columns.len());
        for (index, name) in columns.iter().enumerate() {
            if by_name.insert(name.as_str(), index).is_some() {
                return Err(ParseError::MalformedHeader {
                    reason: format!("column `{name}` declared twice"),
                });
            }
        }

        for column in REQUIRED_COLUMNS {
            if !by_name.contains_key(column) {
                return Err(ParseError::MissingColumn { column });
            }
        }

        let force = match (by_name.get("fx"), by_name.get("fy"), by_name.get("fz")) {
            (Some(&fx), Some(&fy), Some(&fz)) => Some([fx, fy, fz]),
            _ => None,
        };

        let mut consumed: HashSet<usize> = REQUIRED_COLUMNS
            .iter()
            .map(|column| by_name[column])
            .collect();
        if let Some(indices) = force {
            consumed.extend(indices);
        }

        // A partial fx/fy/fz subset stays in the extras, matching how the
        // columns were declared rather than guessing at intent.
        let extras = columns
            .iter()
            .enumerate()
            .filter(|(index, _)| !consumed.contains(index))
            .map(|(index, name)| (index, name.clone()))
            .collect();

        Ok(Self {
            width: columns.len(),
            id: by_name["id"],
            x: by_name["x"],
            y: by_name["y"],
            z: by_name["z"],
            radius: by_name["radius"],
            force,
            extras,
        })
    }
}

/// Parse one dump file into a [`FrameTable`].
///
/// `frame_index` is sequence metadata stamped onto the table; content
/// parsing never depends on it. The parser tolerates blank lines, `#`
/// comments and `ITEM:` metadata sections ahead of the column header,
/// matches values to columns by header name in any order, retains
/// unrecognized columns as extra attributes, and accepts empty frames.
/// Reading the file is its only side effect.
pub fn parse_dump(path: &Path, frame_index: u64) -> Result<FrameTable, ParseError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut columns: Option<Vec<String>> = None;
    let mut layout: Option<ColumnLayout> = None;
    let mut records: Vec<ParticleRecord> = Vec::new();
    let mut seen_ids: HashSet<u64> = HashSet::new();
    let mut degenerate_radii = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let trimmed = line.trim();

        let Some(layout) = &layout else {
            if let Some(header) = scan_for_header(trimmed)? {
                layout = Some(ColumnLayout::from_columns(&header)?);
                columns = Some(header);
            }
            continue;
        };

        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != layout.width {
            return Err(ParseError::RowWidth {
                line: line_number,
                expected: layout.width,
                found: fields.len(),
            });
        }

        let record = parse_row(fields.as_slice(), layout, line_number)?;
        if !seen_ids.insert(record.id) {
            return Err(ParseError::DuplicateId {
                line: line_number,
                id: record.id,
            });
        }
        if record.has_degenerate_radius() {
            degenerate_radii += 1;
        }
        records.push(record);
    }

    let columns = columns.ok_or_else(|| ParseError::MalformedHeader {
        reason: "no column header found".to_string(),
    })?;

    if degenerate_radii > 0 {
        log::warn!(
            "{}: {degenerate_radii} particle(s) with non-positive radius",
            path.display()
        );
    }
    log::debug!("parsed {} particle(s) from {}", records.len(), path.display());

    Ok(FrameTable::new(
        frame_index,
        path.to_path_buf(),
        columns,
        records,
    ))
}

/// Decide whether `line` is the column header, a pre-header line to skip,
/// or neither.
///
/// Pre-header lines are blanks, `#` comments, `ITEM:` metadata sections,
/// and their all-numeric value lines (timestep, atom count, box bounds).
/// The header is either `ITEM: ATOMS <columns...>` or, for bare tabular
/// files, the first remaining line, whose tokens name the columns.
fn scan_for_header(trimmed: &str) -> Result<Option<Vec<String>>, ParseError> {
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    if let Some(rest) = trimmed.strip_prefix(ATOMS_HEADER) {
        return header_columns(rest).map(Some);
    }
    if trimmed.starts_with(ITEM_PREFIX) {
        return Ok(None);
    }
    if trimmed
        .split_whitespace()
        .all(|token| token.parse::<f64>().is_ok())
    {
        return Ok(None);
    }
    header_columns(trimmed).map(Some)
}

fn header_columns(raw: &str) -> Result<Vec<String>, ParseError> {
    let columns: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(ParseError::MalformedHeader {
            reason: "header declares no columns".to_string(),
        });
    }
    Ok(columns)
}

fn parse_row(
    fields: &[&str],
    layout: &ColumnLayout,
    line: usize,
) -> Result<ParticleRecord, ParseError> {
    let float = |index: usize, column: &str| -> Result<f64, ParseError> {
        fields[index]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber {
                line,
                column: column.to_string(),
                value: fields[index].to_string(),
            })
    };

    let id = fields[layout.id]
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidNumber {
            line,
            column: "id".to_string(),
            value: fields[layout.id].to_string(),
        })?;

    let position = [
        float(layout.x, "x")?,
        float(layout.y, "y")?,
        float(layout.z, "z")?,
    ];
    let radius = float(layout.radius, "radius")?;

    let force = match layout.force {
        Some([fx, fy, fz]) => Some([float(fx, "fx")?, float(fy, "fy")?, float(fz, "fz")?]),
        None => None,
    };

    let mut extras = BTreeMap::new();
    for (index, name) in &layout.extras {
        extras.insert(name.clone(), float(*index, name)?);
    }

    Ok(ParticleRecord {
        id,
        position,
        radius,
        force,
        extras,
    })
}
