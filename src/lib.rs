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

//! This crate parses dictionaries written in [Web IDL](https://webidl.spec.whatwg.org/) into a
//! syntax tree that code generators can walk.
//!
//! Only the dictionary subset of the language is supported so far: dictionaries (including
//! partial dictionaries and inheritance), their members, the full type grammar that members can
//! use, default values, and extended attributes.
//!
//! ## Extensions
//! Extended attributes are called extensions here. The parser rejects any extension that the
//! caller hasn't registered with an [`ExtensionDescriptor`], which also says what shapes of
//! arguments the extension takes and where it may appear.
//!
//! ## Features
//! [`Options`] say which parts of the grammar are allowed. Using a construct that isn't allowed is
//! a syntax error, reported where the construct appears.
//!
//! ## Errors
//! A parse doesn't stop at the first error if it can avoid it. If a dictionary's body is broken,
//! the parser skips to the end of that dictionary and keeps going, so one [`AggregateSyntaxError`]
//! can describe problems all through the file.
//!
//! ```
//! use webidl_dict::{ExtensionDescriptor, ExtensionKind, Options};
//!
//! let extensions = vec![ExtensionDescriptor::anywhere("Exposed", [ExtensionKind::Ident])];
//! let defs = webidl_dict::parse(
//!     "config.idl",
//!     "[Exposed=Window] dictionary Config { required DOMString name; long retries = 3; };",
//!     Options::all(),
//!     extensions,
//! ).unwrap();
//!
//! let config = defs.get("Config").and_then(|def| def.as_dictionary()).unwrap();
//! assert_eq!(config.members[1].ty.name, "long");
//! ```

pub mod ast;
pub mod error;
pub mod extensions;
pub mod lexer;
pub mod literal;
pub mod options;
pub mod parser;

pub use {
    ast::*,
    error::{AggregateSyntaxError, Error, OptionsError, RegistryError, SourceLocation, SyntaxError, SyntaxErrorKind},
    extensions::{Extension, ExtensionArgs, ExtensionDescriptor, ExtensionKind, ExtensionLocation},
    options::{Feature, Options},
    parser::Parser,
};

/// Parses one IDL file with a parser that's only used once.
///
/// Use a [`Parser`] directly to parse several files with the same options and extensions.
pub fn parse(
    filename: &str,
    contents: &str,
    options: Options,
    extensions: Vec<ExtensionDescriptor>,
) -> Result<Definitions, Error> {
    Ok(Parser::new(options, extensions)?.parse(filename, contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_once() {
        let defs = parse("test.idl", "dictionary Foo { long x; };", Options::default(), Vec::new()).unwrap();
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn errors_are_wrapped() {
        match parse("test.idl", "[Foo] dictionary Foo {};", Options::all(), Vec::new()) {
            Err(Error::Syntax(e)) => assert_eq!(e.to_string(), "Unknown extension [Foo]"),
            other => panic!("expected a syntax error, got {:?}", other),
        };

        let twice = vec![
            ExtensionDescriptor::anywhere("Foo", [ExtensionKind::NoArgs]),
            ExtensionDescriptor::anywhere("Foo", [ExtensionKind::NoArgs]),
        ];
        assert!(matches!(
            parse("test.idl", "", Options::all(), twice),
            Err(Error::Registry(RegistryError::Duplicate { .. })),
        ));
    }
}
