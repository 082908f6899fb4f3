//! Assembles tip entries from classified lines
//!
//! The record under construction is an explicit [`Draft`] owned by the
//! builder. A `tip=` line finalizes it and starts a fresh one, so optional
//! fields never leak from one record into the next.

use tracing::{debug, warn};

use super::TipEntry;
use super::tokenizer::{Field, LineKind, Token};
use crate::error::{Diagnostic, SkipReason};

/// Result of parsing a whole resource
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub entries: Vec<TipEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    /// Number of records dropped while parsing
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_parse_skip()).count()
    }
}

#[derive(Debug)]
struct Draft {
    start_line: usize,
    /// None when optional fields arrived before any `tip=`
    text: Option<String>,
    command: Option<String>,
    min_version: Option<String>,
    image_url: Option<String>,
    /// Field that continuation lines append to
    open: Option<Field>,
}

impl Draft {
    fn new(start_line: usize, text: Option<&str>) -> Self {
        Self {
            start_line,
            text: text.map(str::to_string),
            command: None,
            min_version: None,
            image_url: None,
            open: text.map(|_| Field::Tip),
        }
    }

    /// Later occurrences of a field replace earlier ones
    fn set(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Tip => &mut self.text,
            Field::Cmd => &mut self.command,
            Field::Version => &mut self.min_version,
            Field::Img => &mut self.image_url,
        };
        *slot = Some(value.to_string());
        self.open = Some(field);
    }

    fn open_slot(&mut self) -> Option<&mut String> {
        match self.open? {
            Field::Tip => self.text.as_mut(),
            Field::Cmd => self.command.as_mut(),
            Field::Version => self.min_version.as_mut(),
            Field::Img => self.image_url.as_mut(),
        }
    }

    fn finish(self) -> Result<TipEntry, Diagnostic> {
        let skip = |reason| Diagnostic::ParseSkip { line: self.start_line, reason };
        let text = match self.text {
            None => return Err(skip(SkipReason::MissingTip)),
            Some(text) if text.trim().is_empty() => return Err(skip(SkipReason::EmptyText)),
            Some(text) => text,
        };

        Ok(TipEntry {
            text,
            command: non_blank(self.command),
            min_version: non_blank(self.min_version),
            image_url: non_blank(self.image_url),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Streaming builder; feed tokens in order, then call [`EntryBuilder::finish`]
#[derive(Debug, Default)]
pub struct EntryBuilder {
    current: Option<Draft>,
    report: ParseReport,
}

impl EntryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token<'_>) {
        match token.kind {
            LineKind::Comment | LineKind::Blank => {}
            LineKind::Field { field: Field::Tip, value } => {
                self.finalize_current();
                self.current = Some(Draft::new(token.line, Some(value)));
            }
            LineKind::Field { field, value } => {
                let draft = self
                    .current
                    .get_or_insert_with(|| Draft::new(token.line, None));
                draft.set(field, value);
            }
            LineKind::Continuation(text) => {
                match self.current.as_mut().and_then(Draft::open_slot) {
                    Some(slot) => {
                        slot.push('\n');
                        slot.push_str(text);
                    }
                    None => debug!(line = token.line, "Discarding continuation with no open field"),
                }
            }
        }
    }

    pub fn finish(mut self) -> ParseReport {
        self.finalize_current();
        self.report
    }

    fn finalize_current(&mut self) {
        let Some(draft) = self.current.take() else {
            return;
        };
        match draft.finish() {
            Ok(entry) => self.report.entries.push(entry),
            Err(diagnostic) => {
                warn!(diagnostic = %diagnostic, "Dropping tip record");
                self.report.diagnostics.push(diagnostic);
            }
        }
    }
}

impl<'a> Extend<Token<'a>> for EntryBuilder {
    fn extend<I: IntoIterator<Item = Token<'a>>>(&mut self, iter: I) {
        for token in iter {
            self.push(token);
        }
    }
}

/// Parse a whole resource in one go
pub fn parse(text: &str) -> ParseReport {
    let mut builder = EntryBuilder::new();
    builder.extend(super::tokenizer::tokenize(text));
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let report = parse("tip=A\ncmd=B\nversion=1.2\nimg=C");
        assert_eq!(report.entries.len(), 1);
        assert!(report.diagnostics.is_empty());

        let entry = &report.entries[0];
        assert_eq!(entry.text, "A");
        assert_eq!(entry.command.as_deref(), Some("B"));
        assert_eq!(entry.min_version.as_deref(), Some("1.2"));
        assert_eq!(entry.image_url.as_deref(), Some("C"));
    }

    #[test]
    fn test_new_tip_resets_optional_fields() {
        let report = parse("tip=A\ncmd=B\ntip=C");
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].command.as_deref(), Some("B"));
        assert_eq!(report.entries[1].text, "C");
        assert_eq!(report.entries[1].command, None);
        assert_eq!(report.entries[1].min_version, None);
        assert_eq!(report.entries[1].image_url, None);
    }

    #[test]
    fn test_continuation_of_text() {
        let report = parse("tip=Line1\nLine2");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].text, "Line1\nLine2");
    }

    #[test]
    fn test_continuation_follows_most_recent_field() {
        let report = parse("tip=Draw a box\ncmd=rect 0 0 1cm 1cm\nstroke red\nimg=http://x/y.png");
        let entry = &report.entries[0];
        assert_eq!(entry.text, "Draw a box");
        assert_eq!(entry.command.as_deref(), Some("rect 0 0 1cm 1cm\nstroke red"));
        assert_eq!(entry.image_url.as_deref(), Some("http://x/y.png"));
    }

    #[test]
    fn test_later_field_overwrites_earlier() {
        let report = parse("tip=A\ncmd=first\ncmd=second\nversion=1.0\nversion=2.0");
        let entry = &report.entries[0];
        assert_eq!(entry.command.as_deref(), Some("second"));
        assert_eq!(entry.min_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_comments_never_join_values() {
        let report = parse("tip=A\n# note to editors\nB\ncmd=x\n  # another\ny");
        let entry = &report.entries[0];
        assert_eq!(entry.text, "A\nB");
        assert_eq!(entry.command.as_deref(), Some("x\ny"));
    }

    #[test]
    fn test_blank_lines_do_not_end_record() {
        let report = parse("tip=A\n\ncmd=B\n\n\ntip=C\n");
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].command.as_deref(), Some("B"));
    }

    #[test]
    fn test_blank_lines_are_not_appended() {
        let report = parse("tip=A\n\nB");
        assert_eq!(report.entries[0].text, "A\nB");
    }

    #[test]
    fn test_leading_continuation_discarded() {
        let report = parse("# header\nstray line\n\ntip=A");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].text, "A");
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_text_skipped() {
        let report = parse("tip=\ncmd=B\ntip=   \ntip=C");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].text, "C");
        assert_eq!(report.skipped(), 2);
        assert_eq!(
            report.diagnostics[0],
            Diagnostic::ParseSkip { line: 1, reason: SkipReason::EmptyText }
        );
        assert_eq!(
            report.diagnostics[1],
            Diagnostic::ParseSkip { line: 3, reason: SkipReason::EmptyText }
        );
    }

    #[test]
    fn test_empty_tip_rescued_by_continuation() {
        let report = parse("tip=\nActual text");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].text, "\nActual text");
    }

    #[test]
    fn test_fields_before_tip_are_skipped() {
        let report = parse("cmd=orphan\nversion=1.0\ntip=A");
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].command, None);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::ParseSkip { line: 1, reason: SkipReason::MissingTip }]
        );
    }

    #[test]
    fn test_malformed_version_kept_verbatim() {
        let report = parse("tip=A\nversion=abc");
        assert_eq!(report.entries[0].min_version.as_deref(), Some("abc"));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_blank_optional_field_is_absent() {
        let report = parse("tip=A\ncmd=\nimg= ");
        assert_eq!(report.entries[0].command, None);
        assert_eq!(report.entries[0].image_url, None);
    }

    #[test]
    fn test_unknown_key_continues_current_field() {
        let report = parse("tip=A\nurl=http://x");
        assert_eq!(report.entries[0].text, "A\nurl=http://x");
    }

    #[test]
    fn test_empty_input() {
        let report = parse("");
        assert!(report.entries.is_empty());
        assert!(report.diagnostics.is_empty());
    }
}
