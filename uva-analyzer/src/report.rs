//! JSON rendering of an analysis report.
//!
//! The document has the top-level keys `linter`, `declarations` and
//! `elapsed`, in that order, plus `faults` when fault reporting is enabled
//! and something was swallowed. Key order inside every object follows the
//! field order of the serialized structs below.

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use uva_core::SourcePosition;

use crate::lint::LintFinding;
use crate::resolve::{Declaration, Reference};

/// Everything produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub findings: Vec<LintFinding>,
    pub declarations: Vec<Declaration>,
    pub elapsed: Duration,
    /// Pipeline faults that were recovered from; left empty unless the
    /// caller asked for them to be surfaced.
    pub faults: Vec<String>,
}

impl Report {
    /// Serialize as a tab-indented JSON document without a trailing newline.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), serde_json::Error> {
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.document().serialize(&mut serializer)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn document(&self) -> ReportDocument<'_> {
        ReportDocument {
            linter: self.findings.iter().map(FindingEntry::from).collect(),
            declarations: self.declarations.iter().map(DeclarationEntry::from).collect(),
            elapsed: format!("{}ms", self.elapsed.as_millis()),
            faults: (!self.faults.is_empty()).then_some(self.faults.as_slice()),
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    linter: Vec<FindingEntry<'a>>,
    declarations: Vec<DeclarationEntry<'a>>,
    elapsed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    faults: Option<&'a [String]>,
}

#[derive(Serialize)]
struct FindingEntry<'a> {
    #[serde(rename = "type")]
    rule: &'a str,
    message: &'a str,
    location: Location<'a>,
}

impl<'a> From<&'a LintFinding> for FindingEntry<'a> {
    fn from(finding: &'a LintFinding) -> Self {
        Self {
            rule: finding.rule_id,
            message: finding.message,
            location: Location::new(&finding.origin_file, finding.position)
                .with_length(finding.length),
        }
    }
}

#[derive(Serialize)]
struct DeclarationEntry<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    location: Location<'a>,
    references: Vec<Location<'a>>,
}

impl<'a> From<&'a Declaration> for DeclarationEntry<'a> {
    fn from(declaration: &'a Declaration) -> Self {
        Self {
            kind: declaration.kind.as_str(),
            name: &declaration.name,
            location: Location::new(&declaration.origin_file, declaration.position),
            references: declaration.references.iter().map(Location::from).collect(),
        }
    }
}

#[derive(Serialize)]
struct Location<'a> {
    file: Cow<'a, str>,
    line: usize,
    column: usize,
    offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
}

impl<'a> Location<'a> {
    fn new(file: &'a Path, position: SourcePosition) -> Self {
        Self {
            file: file.to_string_lossy(),
            line: position.line,
            column: position.column,
            offset: position.offset,
            length: None,
        }
    }

    fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }
}

impl<'a> From<&'a Reference> for Location<'a> {
    fn from(reference: &'a Reference) -> Self {
        Self::new(&reference.origin_file, reference.position)
    }
}
