//! Rendering diagnostics for the terminal.
//!
//! The core hands out structured [`Diagnostic`]s; this is the only place
//! that turns them into text.

use std::io::{self, Write};
use std::ops::Range;

use arend_diagnostic::{Diagnostic, Severity};
use arend_ir::{ModulePath, Span};
use ariadne::{Color, Label, Report, ReportKind, Source};
use rustc_hash::FxHashMap;

/// Source text of a module and the name to show for it.
struct SourceEntry {
    name: String,
    text: String,
}

/// Renders diagnostics against the sources they point into.
#[derive(Default)]
pub struct Renderer {
    sources: FxHashMap<ModulePath, SourceEntry>,
    color: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn add_source(&mut self, module: ModulePath, name: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(
            module,
            SourceEntry {
                name: name.into(),
                text: text.into(),
            },
        );
    }

    pub fn render(&self, diagnostic: &Diagnostic, out: &mut dyn Write) -> io::Result<()> {
        let Some(source) = self.sources.get(&diagnostic.anchor.module) else {
            return writeln!(
                out,
                "{}[{}] {}: {}",
                diagnostic.severity,
                diagnostic.kind,
                diagnostic.anchor.module,
                diagnostic.message
            );
        };
        let name = source.name.clone();
        let primary = char_range(&source.text, diagnostic.anchor.span);
        let config = ariadne::Config::default().with_color(self.color);
        let mut report = Report::build(report_kind(diagnostic.severity), name.clone(), primary.start)
            .with_config(config)
            .with_code(diagnostic.kind)
            .with_message(&diagnostic.message)
            .with_label(
                Label::new((name.clone(), primary))
                    .with_message(&diagnostic.message)
                    .with_color(Color::Red),
            );
        for (span, message) in &diagnostic.related {
            report = report.with_label(
                Label::new((name.clone(), char_range(&source.text, *span)))
                    .with_message(message)
                    .with_color(Color::Blue),
            );
        }
        for note in &diagnostic.notes {
            report = report.with_note(note);
        }
        report
            .finish()
            .write((name, Source::from(source.text.clone())), out)
    }

    pub fn render_all(&self, diagnostics: &[Diagnostic], out: &mut dyn Write) -> io::Result<()> {
        for diagnostic in diagnostics {
            self.render(diagnostic, out)?;
        }
        Ok(())
    }
}

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    }
}

/// Byte span to the character range the renderer counts in.
fn char_range(text: &str, span: Span) -> Range<usize> {
    let to_chars = |offset: u32| {
        let offset = offset as usize;
        text.get(..offset)
            .map_or(offset, |prefix| prefix.chars().count())
    };
    let start = to_chars(span.start);
    start..to_chars(span.end).max(start)
}
