//! Utilities for producing human-readable diagnostics out of errors.
//!
//! # Examples
//!
//! ```
//! # extern crate failure;
//! # extern crate lsystems;
//! # fn main() -> Result<(), failure::Error> {
//! let source = "set axiom = \"F\"\nset recursionCount = 2 - \"x\"\n";
//!
//! let mut lsystems = lsystems::LSystems::new();
//! let program = lsystems.load("plant.ls", source)?;
//!
//! // Subtracting a string is a type error:
//! let error = program.compile(Box::new(lsystems::lsystem::random::Fixed(0.0))).unwrap_err();
//!
//! // Emit the error as a diagnostic string without colors:
//! let diagnostic_string = lsystems::diagnostic::to_string(lsystems.codemap(), &error);
//! assert!(diagnostic_string.starts_with("error: "));
//! # Ok(())
//! # }
//! ```
use std::io;
use std::mem;

use crate::syntax;

/// A trait for types that have the ability to emit diagnostic information.
pub trait Diagnostics {
    /// Emits diagnostics from an instance of this type.
    fn to_diagnostics(&self, builder: &mut DiagnosticsBuilder);
}

/// A builder for creating structured diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticsBuilder {
    file: Option<codespan::ByteSpan>,
    message: Option<String>,
    labels: Vec<codespan_reporting::Label>,
    result: Vec<codespan_reporting::Diagnostic>,
}

/// Writes the specified [`Diagnostics`] to a string.
///
/// The resulting string is not color coded.  This is a convenience method; you can use
/// `Diagnostics::to_diagnostics` for lower-level control over how diagnostics are captured.
pub fn to_string<D>(code_map: &codespan::CodeMap, diagnostics: &D) -> String
where
    D: Diagnostics,
{
    let mut output = Vec::new();
    if let Err(error) = emit(
        codespan_reporting::termcolor::NoColor::new(&mut output),
        code_map,
        diagnostics,
    ) {
        warn!("could not render diagnostics: {}", error);
    }
    String::from_utf8_lossy(&output).into_owned()
}

/// Writes the specified [`Diagnostics`] to standard error.
///
/// This is a convenience method; you can use `Diagnostics::to_diagnostics` for lower-level control
/// over how diagnostics are captured.
pub fn emit_to_stderr<D>(
    color_choice: codespan_reporting::termcolor::ColorChoice,
    code_map: &codespan::CodeMap,
    diagnostics: &D,
) -> io::Result<()>
where
    D: Diagnostics,
{
    let stderr = codespan_reporting::termcolor::StandardStream::stderr(color_choice);
    let stderr = stderr.lock();

    emit(stderr, code_map, diagnostics)
}

/// Emits the specified [`Diagnostics`] to an output that potentially supports color.
///
/// Use `termcolor::NoColor::new(...)` to wrap an ordinary `Write` if color is not desired.
pub fn emit<W, D>(mut writer: W, code_map: &codespan::CodeMap, diagnostics: &D) -> io::Result<()>
where
    D: Diagnostics,
    W: codespan_reporting::termcolor::WriteColor,
{
    let mut builder = DiagnosticsBuilder::new();
    diagnostics.to_diagnostics(&mut builder);
    for diagnostic in builder.result {
        codespan_reporting::emit(&mut writer, code_map, &diagnostic)?;
    }
    Ok(())
}

impl DiagnosticsBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        let file = None;
        let message = None;
        let labels = Vec::new();
        let result = Vec::new();

        DiagnosticsBuilder {
            file,
            message,
            labels,
            result,
        }
    }

    /// Sets the span of the source file that text regions of the following diagnostics refer to.
    pub fn set_file(&mut self, file: codespan::ByteSpan) {
        self.file = Some(file);
    }

    /// Add a label to be added to the following diagnostic.
    pub fn add_label(&mut self, label: codespan_reporting::Label) {
        self.labels.push(label);
    }

    /// Add a label pointing at a region of the current source file.
    ///
    /// Nothing is added if no source file has been set.
    pub fn add_region_label(
        &mut self,
        region: syntax::TextRegion,
        message: Option<String>,
        style: codespan_reporting::LabelStyle,
    ) {
        if let Some(span) = self.file.map(|file| region_span(file, region)) {
            self.add_label(codespan_reporting::Label {
                span,
                message,
                style,
            });
        }
    }

    /// Add a message to be added to the following diagnostic.
    pub fn add_message(&mut self, message: String) {
        let message = Some(match self.message.take() {
            Some(old_msg) => format!("{}: {}", old_msg, message),
            None => message,
        });
        self.message = message;
    }

    /// Add a new diagnostic, using the labels and messages accumulated so far.
    pub fn add_diagnostic(
        &mut self,
        severity: codespan_reporting::Severity,
        code: Option<String>,
        message: &str,
    ) {
        let message = self.message.as_ref().map_or_else(
            || message.to_owned(),
            |old_msg| format!("{}: {}", old_msg, message),
        );
        let labels = mem::replace(&mut self.labels, Vec::new());
        let diagnostic = codespan_reporting::Diagnostic {
            severity,
            code,
            message,
            labels,
        };
        self.result.push(diagnostic)
    }

    /// Builds a sequence of diagnostics out of this builder.
    pub fn build(self) -> Vec<codespan_reporting::Diagnostic> {
        self.result
    }
}

fn region_span(file: codespan::ByteSpan, region: syntax::TextRegion) -> codespan::ByteSpan {
    let length = codespan::RawOffset::from(file.end().0 - file.start().0);
    let start = (region.start() as codespan::RawOffset).min(length);
    let end = (region.end() as codespan::RawOffset).min(length).max(start);

    file.subspan(codespan::ByteOffset(start), codespan::ByteOffset(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_relative_to_the_file() {
        let _ = env_logger::try_init();

        let mut code_map = codespan::CodeMap::new();
        code_map.add_filemap(codespan::FileName::virtual_("a.ls"), "set a = 1\n".to_owned());
        let file = code_map
            .add_filemap(codespan::FileName::virtual_("b.ls"), "set b = 2\n".to_owned())
            .span();

        let mut builder = DiagnosticsBuilder::new();
        builder.set_file(file);
        builder.add_region_label(
            syntax::TextRegion::new(4, 1),
            None,
            codespan_reporting::LabelStyle::Primary,
        );
        builder.add_diagnostic(codespan_reporting::Severity::Error, None, "bad name");

        let diagnostics = builder.build();
        assert_eq!(1, diagnostics.len());
        assert_eq!(
            file.subspan(codespan::ByteOffset(4), codespan::ByteOffset(5)),
            diagnostics[0].labels[0].span
        );
    }

    #[test]
    fn messages_are_prefixed() {
        let _ = env_logger::try_init();

        let mut builder = DiagnosticsBuilder::new();
        builder.add_message("validation failed".to_owned());
        builder.add_region_label(
            syntax::TextRegion::new(0, 3),
            None,
            codespan_reporting::LabelStyle::Primary,
        );
        builder.add_diagnostic(codespan_reporting::Severity::Error, None, "missing axiom");

        let diagnostics = builder.build();
        assert_eq!("validation failed: missing axiom", diagnostics[0].message);
        assert!(diagnostics[0].labels.is_empty());
    }
}
