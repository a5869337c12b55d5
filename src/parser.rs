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

//! This module defines the parser that powers the whole crate. It's a hand-written recursive
//! descent parser over the tokens from [`Lexer`], following the grammar at
//! [https://webidl.spec.whatwg.org/] for the parts of it that are supported.
//!
//! Errors don't stop the parse if there's a sensible place to pick up again. A broken dictionary
//! body is skipped up to its closing brace, and a broken extension list up to its closing
//! bracket, so one parse can report problems in several definitions at once.

// NOTE: Extensions are parsed before we know what they're attached to. Each production that reads
//       an extension list decides afterward where the extensions belong and reports the ones that
//       aren't allowed there.

use {
    crate::{
        ast::*,
        error::{AggregateSyntaxError, RegistryError, SyntaxError, SyntaxErrorKind},
        extensions::{
            Extension, ExtensionArgs, ExtensionDescriptor, ExtensionError, ExtensionLocation,
            ExtensionRegistry,
        },
        lexer::{Keyword, Lexer, Token, TokenKind, TokenValue},
        options::{Feature, Options},
    },
};

/// A reusable IDL parser.
///
/// Each call to [`Parser::parse`] starts from scratch, so one parser can be used for any number
/// of files, one at a time.
#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    options: Options,
    registry: ExtensionRegistry,
}

impl Parser {
    pub fn new(options: Options, extensions: Vec<ExtensionDescriptor>) -> Result<Self, RegistryError> {
        Ok(Self {
            lexer: Lexer::new(),
            options,
            registry: ExtensionRegistry::new(extensions)?,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Parses one IDL file. If anything is wrong with it, every problem that was found is
    /// returned, in the order it was found.
    pub fn parse(&mut self, filename: &str, contents: &str) -> Result<Definitions, AggregateSyntaxError> {
        log::debug!("Parsing {}", filename);
        self.lexer.set_contents(filename, contents);

        let mut session = Session {
            lexer: &mut self.lexer,
            options: &self.options,
            registry: &self.registry,
            errors: Vec::new(),
        };
        let defs = session.definitions();
        let errors = session.errors;

        log::debug!("Parsed {}: {} definitions, {} errors", filename, defs.len(), errors.len());
        match AggregateSyntaxError::new(errors) {
            Some(e) => Err(e),
            None => Ok(defs),
        }
    }
}

/// The state of one call to [`Parser::parse`].
struct Session<'p> {
    lexer: &'p mut Lexer,
    options: &'p Options,
    registry: &'p ExtensionRegistry,
    errors: Vec<SyntaxError>,
}

/// An extension along with where its name was, for reporting it if it turns out to be in the
/// wrong place.
struct Spanned {
    extension: Extension,
    span: DebugInfo,
}

/// Everything that can come before the keyword that says what kind of definition this is.
struct Prelude {
    doc: Option<String>,
    doc_debug: Option<DebugInfo>,
    extensions: Vec<Extension>,
    partial: Option<Token>,
}

impl<'p> Session<'p> {
    // https://webidl.spec.whatwg.org/#index-prod-Definitions
    fn definitions(&mut self) -> Definitions {
        let mut defs = Vec::new();
        loop {
            match self.definition() {
                Ok(Some(def)) => defs.push(def),
                Ok(None) => break,
                Err(e) => {
                    log::debug!("{}: giving up: {}", e.location, e.message);
                    self.push(e);
                    break;
                },
            };
        }
        self.report_stray_docs();
        Definitions { defs }
    }

    // https://webidl.spec.whatwg.org/#index-prod-Definition
    fn definition(&mut self) -> Result<Option<Definition>, SyntaxError> {
        if self.lexer.peek()?.is_none() {
            return Ok(None);
        }
        let (doc, doc_debug) = self.claim_doc()?;
        let extensions = self.extension_list()?;
        let extensions = self.place(extensions, &[ExtensionLocation::Definition]);
        let partial = if self.lexer.peek_is(TokenKind::Keyword(Keyword::Partial))? {
            self.lexer.next()?
        } else {
            None
        };
        let prelude = Prelude { doc, doc_debug, extensions, partial };

        // Each kind of definition is introduced by its own keyword.
        let def = match self.lexer.peek_kind()? {
            Some(TokenKind::Keyword(Keyword::Dictionary)) => self.dictionary(prelude).map(Definition::Dictionary),
            Some(_) => {
                let token = self.next_token("definition")?;
                let message = format!("Invalid top-level token \"{}\"", token.text);
                Err(self.error_at(SyntaxErrorKind::Grammar, message, &token.span))
            },
            None => Err(self.unexpected("definition")),
        };
        def.map(Some)
    }

    // https://webidl.spec.whatwg.org/#index-prod-Dictionary
    // https://webidl.spec.whatwg.org/#index-prod-PartialDictionary
    fn dictionary(&mut self, prelude: Prelude) -> Result<Dictionary, SyntaxError> {
        let keyword = self.lexer.expect(TokenKind::Keyword(Keyword::Dictionary))?;
        self.require(Feature::Dictionary, &keyword.span);
        if let Some(partial) = &prelude.partial {
            self.require(Feature::DictionaryPartial, &partial.span);
        }
        let name = self.identifier()?;

        // https://webidl.spec.whatwg.org/#index-prod-Inheritance
        let base = if self.lexer.peek_is(TokenKind::Colon)? {
            let colon = self.lexer.expect(TokenKind::Colon)?;
            self.require(Feature::DictionaryInherit, &colon.span);
            if prelude.partial.is_some() {
                self.record(SyntaxErrorKind::Grammar, "Partial dictionaries cannot inherit", &colon.span);
            }
            Some(self.identifier()?)
        } else {
            None
        };

        self.lexer.expect(TokenKind::LBrace)?;
        let members = match self.dictionary_members() {
            Ok(members) => members,
            Err(e) => {
                self.recover(e, TokenKind::LBrace, TokenKind::RBrace, "dictionary body")?;
                Vec::new()
            },
        };
        self.lexer.expect(TokenKind::Semicolon)?;

        Ok(Dictionary {
            name,
            members,
            base,
            is_partial: prelude.partial.is_some(),
            extensions: prelude.extensions,
            doc: prelude.doc,
            debug: keyword.span,
            doc_debug: prelude.doc_debug,
        })
    }

    // https://webidl.spec.whatwg.org/#index-prod-DictionaryMembers
    // Consumes the closing brace.
    fn dictionary_members(&mut self) -> Result<Vec<DictMember>, SyntaxError> {
        let mut members = Vec::new();
        while !self.lexer.read_if(TokenKind::RBrace)? {
            members.push(self.dictionary_member()?);
        }
        Ok(members)
    }

    // https://webidl.spec.whatwg.org/#index-prod-DictionaryMember
    // https://webidl.spec.whatwg.org/#index-prod-DictionaryMemberRest
    fn dictionary_member(&mut self) -> Result<DictMember, SyntaxError> {
        let (doc, doc_debug) = self.claim_doc()?;
        let extensions = self.extension_list()?;
        let debug = self.peek_span("dictionary member")?;

        let (ty, name, default, is_required, extensions) = if self.lexer.read_if(TokenKind::Keyword(Keyword::Required))? {
            self.require(Feature::DictionaryRequired, &debug);
            let extensions = self.place(extensions, &[ExtensionLocation::DictionaryMember]);
            let ty = self.type_with_extensions()?;
            let name = self.identifier()?;
            (ty, name, None, true, extensions)
        } else {
            let (extensions, type_extensions) = self.split(extensions, &[ExtensionLocation::DictionaryMember]);
            let mut ty = self.ty()?;
            ty.extensions = type_extensions;
            let name = self.identifier()?;
            let default = if self.lexer.peek_is(TokenKind::Equals)? {
                let equals = self.lexer.expect(TokenKind::Equals)?;
                self.require(Feature::DictionaryDefault, &equals.span);
                Some(self.default_value()?)
            } else {
                None
            };
            (ty, name, default, false, extensions)
        };
        self.lexer.expect(TokenKind::Semicolon)?;

        Ok(DictMember { name, ty, default, is_required, extensions, doc, debug, doc_debug })
    }

    // https://webidl.spec.whatwg.org/#index-prod-TypeWithExtendedAttributes
    fn type_with_extensions(&mut self) -> Result<IdlType, SyntaxError> {
        let extensions = self.extension_list()?;
        let extensions = self.place(extensions, &[ExtensionLocation::Type]);
        let mut ty = self.ty()?;
        ty.extensions = extensions;
        Ok(ty)
    }

    // https://webidl.spec.whatwg.org/#index-prod-Type
    // https://webidl.spec.whatwg.org/#index-prod-SingleType
    // Union types aren't supported.
    fn ty(&mut self) -> Result<IdlType, SyntaxError> {
        if self.lexer.read_if(TokenKind::Keyword(Keyword::Any))? {
            Ok(IdlType::named("any"))
        } else {
            self.non_any_type()
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-NonAnyType
    // Named types like `object` and `symbol` are left to the generic identifier case.
    fn non_any_type(&mut self) -> Result<IdlType, SyntaxError> {
        let kind = match self.lexer.peek_kind()? {
            Some(kind) => kind,
            None => return Err(self.unexpected("type")),
        };
        let mut ty = match kind {
            TokenKind::Keyword(Keyword::Promise) => {
                self.lexer.next()?;
                self.lexer.expect(TokenKind::LAngle)?;
                let inner = self.return_type()?;
                self.lexer.expect(TokenKind::RAngle)?;
                return Ok(parameterized("Promise", ElementType::Single(Box::new(inner))));
            },
            TokenKind::Keyword(keyword @ (Keyword::Sequence | Keyword::FrozenArray)) => {
                self.lexer.next()?;
                self.lexer.expect(TokenKind::LAngle)?;
                let inner = self.type_with_extensions()?;
                self.lexer.expect(TokenKind::RAngle)?;
                parameterized(keyword.as_str(), ElementType::Single(Box::new(inner)))
            },
            TokenKind::Keyword(Keyword::Record) => {
                self.lexer.next()?;
                self.lexer.expect(TokenKind::LAngle)?;
                let key = self.string_type()?;
                self.lexer.expect(TokenKind::Comma)?;
                let value = self.type_with_extensions()?;
                self.lexer.expect(TokenKind::RAngle)?;
                parameterized("record", ElementType::Record { key: Box::new(key), value: Box::new(value) })
            },
            TokenKind::Keyword(keyword) if keyword.is_string_type() => self.string_type()?,
            TokenKind::Identifier => IdlType::named(self.identifier()?),
            _ => match self.primitive_type()? {
                Some(name) => IdlType::named(name),
                None => return Err(self.unexpected("type")),
            },
        };
        ty.nullable = self.null()?;
        Ok(ty)
    }

    // https://webidl.spec.whatwg.org/#index-prod-Null
    fn null(&mut self) -> Result<bool, SyntaxError> {
        self.lexer.read_if(TokenKind::Question)
    }

    // https://webidl.spec.whatwg.org/#index-prod-PromiseType
    fn return_type(&mut self) -> Result<IdlType, SyntaxError> {
        if self.lexer.read_if(TokenKind::Keyword(Keyword::Void))? {
            Ok(IdlType::named("void"))
        } else {
            self.ty()
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-PrimitiveType
    // Returns `None` without consuming anything if the next token can't start a primitive type.
    fn primitive_type(&mut self) -> Result<Option<String>, SyntaxError> {
        let keyword = match self.lexer.peek_kind()? {
            Some(TokenKind::Keyword(keyword)) => keyword,
            _ => return Ok(None),
        };
        let name = match keyword {
            Keyword::Boolean | Keyword::Byte | Keyword::Octet => {
                self.lexer.next()?;
                String::from(keyword.as_str())
            },
            Keyword::Unrestricted => {
                self.lexer.next()?;
                format!("unrestricted {}", self.float_type()?)
            },
            Keyword::Float | Keyword::Double => String::from(self.float_type()?),
            Keyword::Unsigned => {
                self.lexer.next()?;
                format!("unsigned {}", self.integer_type()?)
            },
            Keyword::Short | Keyword::Long => String::from(self.integer_type()?),
            _ => return Ok(None),
        };
        Ok(Some(name))
    }

    // https://webidl.spec.whatwg.org/#index-prod-FloatType
    fn float_type(&mut self) -> Result<&'static str, SyntaxError> {
        if self.lexer.read_if(TokenKind::Keyword(Keyword::Float))? {
            Ok("float")
        } else if self.lexer.read_if(TokenKind::Keyword(Keyword::Double))? {
            Ok("double")
        } else {
            Err(self.unexpected("float or double"))
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-IntegerType
    fn integer_type(&mut self) -> Result<&'static str, SyntaxError> {
        if self.lexer.read_if(TokenKind::Keyword(Keyword::Short))? {
            return Ok("short");
        }
        self.lexer.expect(TokenKind::Keyword(Keyword::Long))?;
        if self.lexer.read_if(TokenKind::Keyword(Keyword::Long))? {
            Ok("long long")
        } else {
            Ok("long")
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-StringType
    fn string_type(&mut self) -> Result<IdlType, SyntaxError> {
        match self.lexer.peek_kind()? {
            Some(TokenKind::Keyword(keyword)) if keyword.is_string_type() => {
                self.lexer.next()?;
                Ok(IdlType::named(keyword.as_str()))
            },
            _ => Err(self.unexpected("string type")),
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-ArgumentList
    fn argument_list(&mut self) -> Result<Vec<Argument>, SyntaxError> {
        self.lexer.expect(TokenKind::LParen)?;
        let mut args: Vec<Argument> = Vec::new();
        if self.lexer.read_if(TokenKind::RParen)? {
            return Ok(args);
        }
        loop {
            let start = self.peek_span("argument")?;
            let arg = self.argument()?;
            match args.last() {
                Some(prev) if prev.optional && !arg.optional => {
                    self.record(SyntaxErrorKind::Grammar, "Optional arguments must be last", &start);
                },
                Some(prev) if prev.is_variadic => {
                    self.record(SyntaxErrorKind::Grammar, "Variadic argument must be last", &start);
                },
                _ => {},
            };
            args.push(arg);
            if !self.lexer.read_if(TokenKind::Comma)? {
                break;
            }
        }
        self.lexer.expect(TokenKind::RParen)?;
        Ok(args)
    }

    // https://webidl.spec.whatwg.org/#index-prod-Argument
    // https://webidl.spec.whatwg.org/#index-prod-ArgumentRest
    fn argument(&mut self) -> Result<Argument, SyntaxError> {
        let extensions = self.extension_list()?;

        if self.lexer.read_if(TokenKind::Keyword(Keyword::Optional))? {
            let extensions = self.place(extensions, &[ExtensionLocation::Argument]);
            let ty = self.type_with_extensions()?;
            if self.lexer.peek_is(TokenKind::Ellipsis)? {
                let ellipsis = self.lexer.expect(TokenKind::Ellipsis)?;
                self.record(SyntaxErrorKind::Grammar, "Cannot use \"...\" with optional arguments", &ellipsis.span);
            }
            let name = self.argument_name()?;
            let default = if self.lexer.read_if(TokenKind::Equals)? {
                Some(self.default_value()?)
            } else {
                None
            };
            Ok(Argument { name, ty, optional: true, is_variadic: false, default, extensions })
        } else {
            let (extensions, type_extensions) = self.split(extensions, &[ExtensionLocation::Argument]);
            let mut ty = self.ty()?;
            ty.extensions = type_extensions;
            let is_variadic = self.lexer.read_if(TokenKind::Ellipsis)?;
            let name = self.argument_name()?;
            if self.lexer.peek_is(TokenKind::Equals)? {
                let equals = self.lexer.expect(TokenKind::Equals)?;
                self.record(
                    SyntaxErrorKind::Grammar,
                    "Cannot have default values with non-optional argument",
                    &equals.span,
                );
                self.default_value()?;
            }
            Ok(Argument { name, ty, optional: false, is_variadic, default: None, extensions })
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-ArgumentName
    // https://webidl.spec.whatwg.org/#index-prod-ArgumentNameKeyword
    fn argument_name(&mut self) -> Result<String, SyntaxError> {
        match self.lexer.peek_kind()? {
            Some(TokenKind::Identifier) => self.identifier(),
            Some(TokenKind::Keyword(keyword)) if keyword.is_argument_name() => {
                self.lexer.next()?;
                Ok(String::from(keyword.as_str()))
            },
            _ => Err(self.unexpected("argument name")),
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-DefaultValue
    // https://webidl.spec.whatwg.org/#index-prod-ConstValue
    fn default_value(&mut self) -> Result<ConstValue, SyntaxError> {
        let token = match self.lexer.peek()? {
            Some(token) => token.clone(),
            None => return Err(self.unexpected("default value")),
        };
        let value = match (token.kind, &token.value) {
            (TokenKind::Keyword(Keyword::True), _) => ConstValue::Bool(true),
            (TokenKind::Keyword(Keyword::False), _) => ConstValue::Bool(false),
            (TokenKind::Keyword(Keyword::Null), _) => ConstValue::Null,
            (TokenKind::IntegerLiteral, &TokenValue::Int(i)) => ConstValue::Int(i),
            (TokenKind::FloatLiteral, &TokenValue::Float(f)) => ConstValue::Float(f),
            (TokenKind::StringLiteral, TokenValue::Str(s)) => ConstValue::Str(s.clone()),
            (TokenKind::LBracket, _) => {
                self.lexer.next()?;
                self.lexer.expect(TokenKind::RBracket)?;
                return Ok(ConstValue::EmptyList);
            },
            (TokenKind::Minus, _) => {
                self.lexer.next()?;
                return match self.lexer.peek()? {
                    Some(token) if token.kind == TokenKind::FloatLiteral && token.text == "Infinity" => {
                        self.lexer.next()?;
                        Ok(ConstValue::Float(f64::NEG_INFINITY))
                    },
                    _ => Err(self.unexpected("Infinity")),
                };
            },
            _ => return Err(self.unexpected("default value")),
        };
        self.lexer.next()?;
        Ok(value)
    }

    // https://webidl.spec.whatwg.org/#index-prod-ExtendedAttributeList
    // The extensions aren't checked against any location yet. See `place` and `split`.
    fn extension_list(&mut self) -> Result<Vec<Spanned>, SyntaxError> {
        if !self.lexer.read_if(TokenKind::LBracket)? {
            return Ok(Vec::new());
        }
        match self.extensions() {
            Ok(extensions) => Ok(extensions),
            Err(e) => {
                self.recover(e, TokenKind::LBracket, TokenKind::RBracket, "extension list")?;
                Ok(Vec::new())
            },
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-ExtendedAttributes
    // Consumes the closing bracket.
    fn extensions(&mut self) -> Result<Vec<Spanned>, SyntaxError> {
        let mut extensions = Vec::new();
        loop {
            if let Some(extension) = self.extension()? {
                extensions.push(extension);
            }
            if !self.lexer.read_if(TokenKind::Comma)? {
                break;
            }
        }
        self.lexer.expect(TokenKind::RBracket)?;
        Ok(extensions)
    }

    // https://webidl.spec.whatwg.org/#index-prod-ExtendedAttribute
    // Returns `None` if the extension was well-formed but didn't match a registered descriptor.
    // That error is recorded and the rest of the list is still read.
    fn extension(&mut self) -> Result<Option<Spanned>, SyntaxError> {
        let name = self.lexer.expect(TokenKind::Identifier)?;

        let args = if self.lexer.read_if(TokenKind::Equals)? {
            if self.lexer.read_if(TokenKind::LParen)? {
                ExtensionArgs::IdentList { args: self.identifier_list()? }
            } else {
                let arg = self.identifier()?;
                if self.lexer.peek_is(TokenKind::LParen)? {
                    ExtensionArgs::NamedArgList { args_name: arg, args: self.argument_list()? }
                } else {
                    ExtensionArgs::Ident { arg }
                }
            }
        } else if self.lexer.peek_is(TokenKind::LParen)? {
            ExtensionArgs::ArgList { args: self.argument_list()? }
        } else {
            ExtensionArgs::NoArgs
        };

        match self.registry.resolve(&name.text, args) {
            Ok(extension) => Ok(Some(Spanned { extension, span: name.span })),
            Err(ExtensionError::Construction(e)) => {
                let location = self.lexer.location_of(&name.span);
                self.push(SyntaxError::extension(e, location));
                Ok(None)
            },
            Err(e) => {
                self.record(e.syntax_kind(), e.to_string(), &name.span);
                Ok(None)
            },
        }
    }

    // https://webidl.spec.whatwg.org/#index-prod-IdentifierList
    // The opening parenthesis has already been read. Consumes the closing one.
    fn identifier_list(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut idents = vec![self.identifier()?];
        while self.lexer.read_if(TokenKind::Comma)? {
            idents.push(self.identifier()?);
        }
        self.lexer.expect(TokenKind::RParen)?;
        Ok(idents)
    }

    /// Keeps the extensions that are allowed at one of the given locations and reports the rest.
    fn place(&mut self, extensions: Vec<Spanned>, locations: &[ExtensionLocation]) -> Vec<Extension> {
        let mut placed = Vec::with_capacity(extensions.len());
        for Spanned { extension, span } in extensions {
            if self.registry.allowed_in(&extension, locations) {
                placed.push(extension);
            } else {
                self.not_valid_here(&extension, &span);
            }
        }
        placed
    }

    /// Divides an extension list that could belong either to a type or to the thing that has the
    /// type. Extensions that can go on a type do; the rest must be allowed at one of the given
    /// locations. Returns `(others, type_extensions)`.
    fn split(&mut self, extensions: Vec<Spanned>, locations: &[ExtensionLocation]) -> (Vec<Extension>, Vec<Extension>) {
        let mut others = Vec::new();
        let mut type_extensions = Vec::new();
        for Spanned { extension, span } in extensions {
            if self.registry.allowed_in(&extension, &[ExtensionLocation::Type]) {
                type_extensions.push(extension);
            } else if self.registry.allowed_in(&extension, locations) {
                others.push(extension);
            } else {
                self.not_valid_here(&extension, &span);
            }
        }
        (others, type_extensions)
    }

    fn not_valid_here(&mut self, extension: &Extension, span: &DebugInfo) {
        let message = format!("[{}] is not valid in this context", extension.name);
        self.record(SyntaxErrorKind::ExtensionLocation, message, span);
    }

    fn identifier(&mut self) -> Result<String, SyntaxError> {
        Ok(self.lexer.expect(TokenKind::Identifier)?.text)
    }

    fn next_token(&mut self, what: &str) -> Result<Token, SyntaxError> {
        match self.lexer.next()? {
            Some(token) => Ok(token),
            None => Err(self.unexpected(what)),
        }
    }

    fn peek_span(&mut self, what: &str) -> Result<DebugInfo, SyntaxError> {
        let span = self.lexer.peek()?.map(|t| t.span.clone());
        match span {
            Some(span) => Ok(span),
            None => Err(self.unexpected(what)),
        }
    }

    fn claim_doc(&mut self) -> Result<(Option<String>, Option<DebugInfo>), SyntaxError> {
        Ok(self.lexer.claim_doc()?.map_or((None, None), |(doc, span)| (Some(doc), Some(span))))
    }

    /// Doc comments only mean something before a definition or a member. Anywhere else they're
    /// reported rather than dropped.
    fn report_stray_docs(&mut self) {
        for span in self.lexer.take_stray_docs() {
            let error = self.error_at(SyntaxErrorKind::Grammar, STRAY_DOC, &span);
            self.errors.push(error);
        }
    }

    fn push(&mut self, error: SyntaxError) {
        self.report_stray_docs();
        self.errors.push(error);
    }

    /// Makes an error for when the next token isn't what the grammar needs.
    fn unexpected(&mut self, what: &str) -> SyntaxError {
        let found = match self.lexer.peek() {
            Ok(found) => found.map(|t| (t.describe(), t.span.clone())),
            Err(e) => return e,
        };
        match found {
            Some((description, span)) => {
                let message = format!("Expecting {}, got {}", what, description);
                self.error_at(SyntaxErrorKind::Grammar, message, &span)
            },
            None => SyntaxError::new(
                SyntaxErrorKind::Grammar,
                format!("Unexpected EOF looking for {}", what),
                self.lexer.location(),
            ),
        }
    }

    fn error_at(&self, kind: SyntaxErrorKind, message: impl Into<String>, span: &DebugInfo) -> SyntaxError {
        SyntaxError::new(kind, message, self.lexer.location_of(span))
    }

    fn record(&mut self, kind: SyntaxErrorKind, message: impl Into<String>, span: &DebugInfo) {
        let error = self.error_at(kind, message, span);
        self.push(error);
    }

    fn require(&mut self, feature: Feature, span: &DebugInfo) {
        if !self.options.has_feature(feature) {
            self.record(
                SyntaxErrorKind::Feature,
                format!("Feature \"{}\" is not allowed by options", feature),
                span,
            );
        }
    }

    /// Records an error and skips everything up to and including the `close` token that matches
    /// an `open` token that's already been read. Lexer errors and errors at the end of the file
    /// can't be recovered from, so they're returned instead.
    fn recover(&mut self, error: SyntaxError, open: TokenKind, close: TokenKind, what: &str) -> Result<(), SyntaxError> {
        if error.kind == SyntaxErrorKind::Lex || self.lexer.peek()?.is_none() {
            return Err(error);
        }
        log::debug!("{}: skipping the rest of the {} after error: {}", error.location, what, error.message);
        self.push(error);

        // Docs on skipped tokens aren't reported.
        let mut depth = 0usize;
        loop {
            self.lexer.claim_doc()?;
            match self.lexer.next()? {
                Some(token) if token.kind == open => depth += 1,
                Some(token) if token.kind == close => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                },
                Some(_) => {},
                None => return Err(self.unexpected(&close.to_string())),
            };
        }
    }
}

const STRAY_DOC: &str = "Doc comments (/** */) are only allowed before definitions or members";

fn parameterized(name: &str, element_type: ElementType) -> IdlType {
    IdlType {
        name: String::from(name),
        nullable: false,
        element_type: Some(element_type),
        extensions: Vec::new(),
    }
}
