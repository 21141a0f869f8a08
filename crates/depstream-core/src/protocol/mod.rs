//! Wire types for the analyzer's line-delimited JSON protocol.
//!
//! Each stdout line is a two-element array `[file, outcome]` where the
//! outcome is either an error message string or an array of dependency
//! records with single-letter keys to keep lines short.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Opaque identifier for one unit submitted for analysis. Caller-supplied,
/// never validated by this layer.
pub type FileName = String;

/// One import/reference found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Numeric dependency-kind code assigned by the analyzer.
    #[serde(rename = "k")]
    pub kind: u8,

    /// Imported module name or specifier.
    #[serde(rename = "n")]
    pub name: String,

    /// Whether this is a dynamic import. Omitted on the wire when false.
    #[serde(rename = "d", default, skip_serializing_if = "is_false")]
    pub dynamic: bool,

    /// 1-based source line of the import.
    #[serde(rename = "l")]
    pub line: usize,

    /// 0-based source column of the import.
    #[serde(rename = "c")]
    pub column: usize,

    /// Re-exported names for `export ... from` declarations, as
    /// `exported:original` pairs. Omitted on the wire when empty.
    #[serde(rename = "e", default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Per-file result: an error message, or the (possibly empty) ordered list
/// of dependencies found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    /// Analysis of this one file failed; the message is analyzer-defined.
    Failure(String),
    /// Dependencies in source order.
    Dependencies(Vec<Dependency>),
}

impl AnalysisOutcome {
    /// True when this outcome is a per-file failure message.
    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisOutcome::Failure(_))
    }
}

/// One result unit: the file name paired with its outcome. Encoded on the
/// wire as a two-element JSON array, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub file: FileName,
    pub outcome: AnalysisOutcome,
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.file, &self.outcome).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (file, outcome) = <(FileName, AnalysisOutcome)>::deserialize(deserializer)?;
        Ok(Item { file, outcome })
    }
}

/// Decode one stdout line into an [`Item`].
///
/// Invalid JSON or a shape other than the two-element array is a protocol
/// violation, not a skippable line.
pub fn decode_line(line: &str) -> Result<Item, DriverError> {
    serde_json::from_str(line).map_err(|source| DriverError::Protocol {
        line: line.to_owned(),
        source,
    })
}
