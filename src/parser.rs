//! Streaming reader for PIT `mutations.xml` reports.
//!
//! The document is scanned once, front to back. Structural problems (I/O failures, tags that
//! do not nest, a truncated document) abort the parse. Problems inside a single field (a line
//! number that is not a number, text that cannot be unescaped) are logged, the field falls
//! back to its default, and scanning continues with the rest of the report.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::{EscapeError, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Mutant, MutantStatus, Mutator};

/// Unrecoverable report errors.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The report could not be opened or read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The XML reader rejected the stream.
    #[error("XML is not valid (byte {position}): {source}")]
    Xml {
        /// Reader position when the error surfaced.
        position: u64,
        /// Underlying reader error.
        #[source]
        source: quick_xml::Error,
    },
    /// The stream is not a well-formed document.
    #[error("XML is not valid (byte {position}): {reason}")]
    Malformed {
        /// Reader position when the problem was detected.
        position: u64,
        /// What is wrong with the document.
        reason: String,
    },
}

/// Parse the report at `path`. The file handle is released on every return path.
pub fn parse_report_file(path: &Path) -> Result<Vec<Mutant>, ParseError> {
    let file = File::open(path)?;
    parse_report(BufReader::new(file))
}

/// Parse a report from any buffered reader.
pub fn parse_report<R: BufRead>(input: R) -> Result<Vec<Mutant>, ParseError> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut scanner = Scanner::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| ParseError::Xml {
                position: reader.buffer_position() as u64,
                source,
            })?;

        match event {
            Event::Start(start) => {
                if depth == 0 && saw_root {
                    return Err(malformed(&reader, "content after the root element"));
                }
                saw_root = true;
                depth += 1;
                let position = reader.buffer_position() as u64;
                let attributes = checked_attributes(&start, position)?;
                scanner.start_element(start.local_name().as_ref(), &attributes, position)?;
            }
            Event::Empty(start) => {
                if depth == 0 && saw_root {
                    return Err(malformed(&reader, "content after the root element"));
                }
                saw_root = true;
                let position = reader.buffer_position() as u64;
                let attributes = checked_attributes(&start, position)?;
                scanner.start_element(start.local_name().as_ref(), &attributes, position)?;
                scanner.end_element(start.local_name().as_ref());
            }
            Event::End(end) => {
                if depth == 0 {
                    return Err(malformed(&reader, "end tag without a matching start tag"));
                }
                depth -= 1;
                scanner.end_element(end.local_name().as_ref());
            }
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(malformed(&reader, "text outside the root element"));
            }
            Event::Text(text) => {
                let position = reader.buffer_position() as u64;
                let raw = checked_text(&text, position)?;
                let content = unescape(raw);
                if let Ok(value) = &content {
                    check_chars(value, position)?;
                }
                scanner.text(content);
            }
            Event::CData(data) => {
                let position = reader.buffer_position() as u64;
                scanner.text(Ok(Cow::Borrowed(checked_text(&data, position)?)));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(malformed(
            &reader,
            &format!("document ends with {depth} unclosed element(s)"),
        ));
    }
    if !saw_root {
        return Err(malformed(&reader, "document has no root element"));
    }

    Ok(scanner.mutants)
}

fn malformed<R>(reader: &Reader<R>, reason: &str) -> ParseError {
    ParseError::Malformed {
        position: reader.buffer_position() as u64,
        reason: reason.to_string(),
    }
}

/// XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_chars(text: &str, position: u64) -> Result<(), ParseError> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(ParseError::Malformed {
            position,
            reason: format!("character U+{:04X} is not allowed in XML", u32::from(c)),
        }),
        None => Ok(()),
    }
}

/// Raw markup content as UTF-8 made only of characters XML allows.
fn checked_text(bytes: &[u8], position: u64) -> Result<&str, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|err| ParseError::Malformed {
        position,
        reason: format!("invalid UTF-8: {err}"),
    })?;
    check_chars(text, position)?;
    Ok(text)
}

/// Attributes of a start tag. Syntax errors (unquoted or duplicated attributes) and
/// disallowed characters make the document invalid.
fn checked_attributes<'a>(
    start: &'a BytesStart<'_>,
    position: u64,
) -> Result<Vec<Attribute<'a>>, ParseError> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| ParseError::Malformed {
            position,
            reason: format!("invalid attribute: {err}"),
        })?;
        checked_text(&attribute.value, position)?;
        attributes.push(attribute);
    }
    Ok(attributes)
}

/// Child elements of `<mutation>` that carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    MutatedClass,
    MutatedMethod,
    LineNumber,
    SourceFile,
    Mutator,
    KillingTest,
    Description,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"mutatedClass" => Some(Self::MutatedClass),
            b"mutatedMethod" => Some(Self::MutatedMethod),
            b"lineNumber" => Some(Self::LineNumber),
            b"sourceFile" => Some(Self::SourceFile),
            b"mutator" => Some(Self::Mutator),
            b"killingTest" => Some(Self::KillingTest),
            b"description" => Some(Self::Description),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::MutatedClass => "mutatedClass",
            Self::MutatedMethod => "mutatedMethod",
            Self::LineNumber => "lineNumber",
            Self::SourceFile => "sourceFile",
            Self::Mutator => "mutator",
            Self::KillingTest => "killingTest",
            Self::Description => "description",
        }
    }
}

/// Text collected for the field element currently open.
#[derive(Debug)]
struct OpenField {
    field: Field,
    text: String,
    unreadable: bool,
}

/// Values gathered for the `<mutation>` currently open.
#[derive(Debug, Default)]
struct Record {
    detected: bool,
    status: MutantStatus,
    class_name: Option<String>,
    method: Option<String>,
    line_number: u32,
    source_file: Option<String>,
    killing_test: Option<String>,
    description: Option<String>,
    emitted: bool,
}

#[derive(Debug, Default)]
struct Scanner {
    mutants: Vec<Mutant>,
    record: Record,
    open: Option<OpenField>,
}

impl Scanner {
    fn start_element(
        &mut self,
        tag: &[u8],
        attributes: &[Attribute<'_>],
        position: u64,
    ) -> Result<(), ParseError> {
        if tag == b"mutation" {
            self.record = record_from_attributes(attributes, position)?;
            self.open = None;
            return Ok(());
        }
        match Field::from_tag(tag) {
            Some(field) => {
                self.open = Some(OpenField {
                    field,
                    text: String::new(),
                    unreadable: false,
                })
            }
            None => debug!(tag = %String::from_utf8_lossy(tag), "ignoring tag"),
        }
        Ok(())
    }

    fn text(&mut self, content: Result<Cow<'_, str>, EscapeError>) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        match content {
            Ok(text) => open.text.push_str(&text),
            Err(err) => {
                warn!(tag = open.field.tag(), error = %err, "caught unreadable text, ignoring");
                open.unreadable = true;
            }
        }
    }

    fn end_element(&mut self, tag: &[u8]) {
        if tag == b"mutation" {
            if !self.record.emitted {
                warn!("mutation closed without a mutator element, ignoring");
            }
            self.record = Record::default();
            self.open = None;
            return;
        }
        let Some(field) = Field::from_tag(tag) else {
            return;
        };
        match self.open.take() {
            Some(open) if open.field == field => self.complete(open),
            other => self.open = other,
        }
    }

    fn complete(&mut self, open: OpenField) {
        let value = (!open.unreadable).then_some(open.text);
        match open.field {
            Field::MutatedClass => self.record.class_name = value,
            Field::MutatedMethod => self.record.method = value,
            Field::SourceFile => self.record.source_file = value,
            Field::LineNumber => {
                self.record.line_number = value.as_deref().and_then(parse_line_number).unwrap_or(0)
            }
            Field::Mutator => self.emit(value.as_deref()),
            Field::KillingTest => {
                if let Some(test) = value.filter(|test| !test.is_empty()) {
                    match self.emitted_mutant() {
                        Some(mutant) => mutant.attach_killing_test(test),
                        None => self.record.killing_test = Some(test),
                    }
                }
            }
            Field::Description => {
                if let Some(description) = value.filter(|text| !text.is_empty()) {
                    match self.emitted_mutant() {
                        Some(mutant) => mutant.attach_description(description),
                        None => self.record.description = Some(description),
                    }
                }
            }
        }
    }

    fn emitted_mutant(&mut self) -> Option<&mut Mutant> {
        if self.record.emitted {
            self.mutants.last_mut()
        } else {
            None
        }
    }

    /// A closing `<mutator>` ends the record: build the mutant from what has been seen.
    fn emit(&mut self, mutator_key: Option<&str>) {
        let record = &self.record;
        let mut mutant = Mutant::new(
            record.detected,
            record.status,
            record.class_name.clone().unwrap_or_default(),
            record.line_number,
            Mutator::parse(mutator_key),
        );
        if let Some(source_file) = explicit_source_file(record.source_file.as_deref()) {
            mutant = mutant.with_source_file(source_file);
        }
        if let Some(method) = &record.method {
            mutant = mutant.with_method(method.clone());
        }
        if let Some(test) = &record.killing_test {
            mutant = mutant.with_killing_test(test.clone());
        }
        if let Some(description) = &record.description {
            mutant = mutant.with_description(description.clone());
        }
        self.mutants.push(mutant);
        self.record.emitted = true;
    }
}

fn record_from_attributes(
    attributes: &[Attribute<'_>],
    position: u64,
) -> Result<Record, ParseError> {
    let mut record = Record::default();
    for attribute in attributes {
        let value = match attribute.unescape_value() {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "caught unreadable mutation attribute, ignoring");
                continue;
            }
        };
        check_chars(&value, position)?;
        match attribute.key.local_name().as_ref() {
            b"detected" => record.detected = value.eq_ignore_ascii_case("true"),
            b"status" => record.status = MutantStatus::parse(&*value),
            _ => {}
        }
    }
    Ok(record)
}

fn parse_line_number(text: &str) -> Option<u32> {
    match text.trim().parse::<u32>() {
        Ok(line) => Some(line),
        Err(err) => {
            warn!(value = text, error = %err, "caught invalid lineNumber, using 0");
            None
        }
    }
}

/// Java sources are located through the class name; any other language keeps the
/// reported file name.
fn explicit_source_file(source_file: Option<&str>) -> Option<&str> {
    source_file.filter(|file| !file.is_empty() && !file.ends_with(".java"))
}
