/* Copyright (c) 2022-2023 Jeremy Davis (jeremydavis519@gmail.com)
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the "Software"), to deal in the Software without restriction,
 * including without limitation the rights to use, copy, modify, merge, publish, distribute,
 * sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
 * NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 */

//! Every error the crate can produce. Syntax errors are always located; the only error a caller
//! sees from a parse is an [`AggregateSyntaxError`], which carries every located error found in
//! the file, in the order they were found.

use {
    std::fmt,
    thiserror::Error,
    crate::extensions::ExtensionKind,
};

/// The error type that extension constructors are allowed to return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The place in a source file where something happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub filename: String,
    /// 1-based.
    pub line: u32,
    /// 1-based.
    pub col: u32,
    /// The full text of the line, without its newline.
    pub line_text: String,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A malformed token.
    Lex,
    /// The tokens didn't match the grammar.
    Grammar,
    /// A valid construct that the parser's [`Options`](crate::Options) don't allow.
    Feature,
    /// A known extension was given arguments of the wrong shape.
    ExtensionShape,
    /// A known extension was used somewhere it isn't allowed.
    ExtensionLocation,
    /// A registered extension constructor rejected the extension. The original error is
    /// available through [`std::error::Error::source`].
    ExtensionConstruction,
}

/// One located problem in an IDL file.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub location: SourceLocation,
    #[source]
    pub source: Option<BoxError>,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            source: None,
        }
    }

    /// Wraps an error returned by an extension's constructor.
    pub fn extension(error: BoxError, location: SourceLocation) -> Self {
        Self {
            kind: SyntaxErrorKind::ExtensionConstruction,
            message: error.to_string(),
            location,
            source: Some(error),
        }
    }

    /// Renders the error the way a compiler would: the location and message, then the offending
    /// line with a caret under the column.
    pub fn report(&self) -> String {
        // Tabs are kept so the caret lines up with the source in a terminal.
        let padding: String = self.location.line_text.chars()
            .take(self.location.col.saturating_sub(1) as usize)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("{}: {}\n{}\n{}^", self.location, self.message, self.location.line_text, padding)
    }
}

/// The failure result of a parse. It always holds at least one error; the first one is the first
/// problem found in the file and is the one this error displays as.
#[derive(Debug, Error)]
#[error("{}", primary(.inner_errors))]
pub struct AggregateSyntaxError {
    pub inner_errors: Vec<SyntaxError>,
}

fn primary(errors: &[SyntaxError]) -> &str {
    errors.first().map_or("", |e| e.message.as_str())
}

impl AggregateSyntaxError {
    /// Returns `None` if there are no errors to aggregate.
    pub fn new(inner_errors: Vec<SyntaxError>) -> Option<Self> {
        if inner_errors.is_empty() {
            None
        } else {
            Some(Self { inner_errors })
        }
    }

    pub fn message(&self) -> &str {
        primary(&self.inner_errors)
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.inner_errors.first().map(|e| &e.location)
    }

    /// Renders every error, one [`SyntaxError::report`] after another.
    pub fn report(&self) -> String {
        self.inner_errors.iter()
            .map(SyntaxError::report)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("Unknown feature(s) given: {0}")]
    UnknownFeature(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Multiple extensions named [{name}] accept the {kind} form")]
    Duplicate {
        name: String,
        kind: ExtensionKind,
    },
}

/// Anything that can go wrong in [`parse`](crate::parse).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Syntax(#[from] AggregateSyntaxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(col: u32) -> SourceLocation {
        SourceLocation {
            filename: String::from("file.idl"),
            line: 3,
            col,
            line_text: String::from("\tlong foo bar;"),
        }
    }

    #[test]
    fn report_points_at_column() {
        let error = SyntaxError::new(SyntaxErrorKind::Grammar, "Expecting ;, got identifier \"bar\"", location(11));
        assert_eq!(
            error.report(),
            "file.idl:3:11: Expecting ;, got identifier \"bar\"\n\tlong foo bar;\n\t         ^"
        );
    }

    #[test]
    fn aggregate_displays_first_error() {
        let aggregate = AggregateSyntaxError::new(vec![
            SyntaxError::new(SyntaxErrorKind::Grammar, "first", location(2)),
            SyntaxError::new(SyntaxErrorKind::Feature, "second", location(7)),
        ]).unwrap();
        assert_eq!(aggregate.to_string(), "first");
        assert_eq!(aggregate.message(), "first");
        assert_eq!(aggregate.location().unwrap().col, 2);
        assert_eq!(aggregate.inner_errors.len(), 2);
    }

    #[test]
    fn aggregate_needs_errors() {
        assert!(AggregateSyntaxError::new(Vec::new()).is_none());
    }

    #[test]
    fn extension_errors_keep_their_source() {
        use std::error::Error;

        let inner: BoxError = "My error".into();
        let error = SyntaxError::extension(inner, location(2));
        assert_eq!(error.kind, SyntaxErrorKind::ExtensionConstruction);
        assert_eq!(error.to_string(), "My error");
        assert_eq!(error.source().unwrap().to_string(), "My error");
    }
}
