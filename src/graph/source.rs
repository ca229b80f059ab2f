use crate::error::GraphError;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
}

impl EdgeRecord {
    pub fn new(from: &str, to: &str) -> EdgeRecord {
        EdgeRecord {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Anything that can hand the loader a list of named edge records.
pub trait EdgeSource {
    fn read_edges(self) -> Result<Vec<EdgeRecord>, GraphError>;
}

/// Whitespace separated edge list on disk.
pub struct EdgeListFile {
    path: PathBuf,
}

impl EdgeListFile {
    pub fn new(path: impl AsRef<Path>) -> EdgeListFile {
        EdgeListFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl EdgeSource for EdgeListFile {
    fn read_edges(self) -> Result<Vec<EdgeRecord>, GraphError> {
        let file = File::open(&self.path)?;
        parse_edge_lines(BufReader::new(file))
    }
}

/// Edge list held in memory, mostly useful for tests and small inputs.
pub struct EdgeListText<'a>(pub &'a str);

impl<'a> EdgeSource for EdgeListText<'a> {
    fn read_edges(self) -> Result<Vec<EdgeRecord>, GraphError> {
        parse_edge_lines(self.0.as_bytes())
    }
}

impl EdgeSource for Vec<EdgeRecord> {
    fn read_edges(self) -> Result<Vec<EdgeRecord>, GraphError> {
        Ok(self)
    }
}

/// Blank lines and `#`/`%` comments are skipped, tokens past the second are
/// ignored.
pub fn parse_edge_lines(reader: impl BufRead) -> Result<Vec<EdgeRecord>, GraphError> {
    let mut records = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(from), Some(to)) => records.push(EdgeRecord::new(from, to)),
            _ => {
                return Err(GraphError::Parse {
                    line: i + 1,
                    found: line.to_string(),
                })
            }
        }
    }
    Ok(records)
}
