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

//! Extended attributes, which this crate calls extensions.
//!
//! The parser doesn't know what any extension means. The code that consumes the syntax tree
//! registers an [`ExtensionDescriptor`] for each extension it understands, saying what shapes of
//! arguments it takes and where it may appear. Anything else in brackets is an error.

use {
    std::{fmt, sync::Arc},
    thiserror::Error,
    crate::{
        ast::Argument,
        error::{BoxError, RegistryError, SyntaxErrorKind},
    },
};

/// The shape of an extension's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtensionKind {
    /// `[Name]`
    NoArgs,
    /// `[Name(long x, optional DOMString y)]`
    ArgList,
    /// `[Name=Ident(long x)]`
    NamedArgList,
    /// `[Name=Ident]`
    Ident,
    /// `[Name=(Ident1, Ident2)]`
    IdentList,
}

impl ExtensionKind {
    pub const ALL: [ExtensionKind; 5] = [
        Self::NoArgs, Self::ArgList, Self::NamedArgList, Self::Ident, Self::IdentList,
    ];

    /// How the shape is described in error messages.
    pub fn description(self) -> &'static str {
        match self {
            Self::NoArgs => "no arguments",
            Self::ArgList => "an argument list",
            Self::NamedArgList => "a named argument list",
            Self::Ident => "an identifier",
            Self::IdentList => "an identifier list",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The kinds of places where an extension can appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtensionLocation {
    Definition,
    Type,
    Member,
    MixinMember,
    NamespaceMember,
    DictionaryMember,
    Argument,
}

impl ExtensionLocation {
    pub const ALL: [ExtensionLocation; 7] = [
        Self::Definition, Self::Type, Self::Member, Self::MixinMember, Self::NamespaceMember,
        Self::DictionaryMember, Self::Argument,
    ];
}

/// The arguments an extension was given, one variant per [`ExtensionKind`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtensionArgs {
    NoArgs,
    ArgList {
        args: Vec<Argument>,
    },
    NamedArgList {
        args_name: String,
        args: Vec<Argument>,
    },
    Ident {
        arg: String,
    },
    IdentList {
        args: Vec<String>,
    },
}

impl ExtensionArgs {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Self::NoArgs => ExtensionKind::NoArgs,
            Self::ArgList { .. } => ExtensionKind::ArgList,
            Self::NamedArgList { .. } => ExtensionKind::NamedArgList,
            Self::Ident { .. } => ExtensionKind::Ident,
            Self::IdentList { .. } => ExtensionKind::IdentList,
        }
    }
}

/// One extension as it appeared in the source, after it's been matched to a descriptor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Extension {
    pub name: String,
    pub args: ExtensionArgs,
}

impl Extension {
    pub fn kind(&self) -> ExtensionKind {
        self.args.kind()
    }

    /// The identifier of an `Ident` extension.
    pub fn ident(&self) -> Option<&str> {
        match &self.args {
            ExtensionArgs::Ident { arg } => Some(arg),
            _ => None,
        }
    }

    /// The identifiers of an `IdentList` extension.
    pub fn idents(&self) -> Option<&[String]> {
        match &self.args {
            ExtensionArgs::IdentList { args } => Some(args),
            _ => None,
        }
    }

    /// The arguments of an `ArgList` or `NamedArgList` extension.
    pub fn arguments(&self) -> Option<&[Argument]> {
        match &self.args {
            ExtensionArgs::ArgList { args } | ExtensionArgs::NamedArgList { args, .. } => Some(args),
            _ => None,
        }
    }
}

/// Called once for every extension that matches a descriptor. Returning an error rejects the
/// extension; the error is reported at the extension's name.
pub type ExtensionConstructor = Arc<dyn Fn(&Extension) -> Result<(), BoxError> + Send + Sync>;

/// Describes one extension that the parser should accept.
#[derive(Clone)]
pub struct ExtensionDescriptor {
    pub name: String,
    pub kinds: Vec<ExtensionKind>,
    pub locations: Vec<ExtensionLocation>,
    constructor: Option<ExtensionConstructor>,
}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("name", &self.name)
            .field("kinds", &self.kinds)
            .field("locations", &self.locations)
            .field("constructor", &self.constructor.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ExtensionDescriptor {
    pub fn new(
        name: impl Into<String>,
        kinds: impl IntoIterator<Item = ExtensionKind>,
        locations: impl IntoIterator<Item = ExtensionLocation>,
    ) -> Self {
        Self {
            name: name.into(),
            kinds: kinds.into_iter().collect(),
            locations: locations.into_iter().collect(),
            constructor: None,
        }
    }

    /// An extension that's allowed in every location.
    pub fn anywhere(name: impl Into<String>, kinds: impl IntoIterator<Item = ExtensionKind>) -> Self {
        Self::new(name, kinds, ExtensionLocation::ALL)
    }

    pub fn with_constructor<F>(mut self, constructor: F) -> Self
            where F: Fn(&Extension) -> Result<(), BoxError> + Send + Sync + 'static {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn accepts(&self, kind: ExtensionKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Whether the extension may appear at a site that could be any of the given locations.
    pub fn allowed_in(&self, locations: &[ExtensionLocation]) -> bool {
        locations.iter().any(|l| self.locations.contains(l))
    }

    fn construct(&self, extension: &Extension) -> Result<(), BoxError> {
        match &self.constructor {
            Some(constructor) => constructor(extension),
            None => Ok(()),
        }
    }
}

/// The ways an extension can fail to match the registered descriptors.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Unknown extension [{0}]")]
    Unknown(String),
    #[error("[{name}] should have {} but was given {}", .expected.description(), .given.description())]
    WrongKind {
        name: String,
        expected: ExtensionKind,
        given: ExtensionKind,
    },
    #[error("[{0}] is not in an allowed form")]
    NotAllowedForm(String),
    #[error(transparent)]
    Construction(BoxError),
}

impl ExtensionError {
    pub fn syntax_kind(&self) -> SyntaxErrorKind {
        match self {
            Self::Unknown(_) | Self::WrongKind { .. } | Self::NotAllowedForm(_) => SyntaxErrorKind::ExtensionShape,
            Self::Construction(_) => SyntaxErrorKind::ExtensionConstruction,
        }
    }
}

/// All the extensions a parser knows about.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    descriptors: Vec<ExtensionDescriptor>,
}

impl ExtensionRegistry {
    /// Fails if two descriptors with the same name accept the same kind, since there would be no
    /// way to tell which one an extension was meant to match.
    pub fn new(descriptors: Vec<ExtensionDescriptor>) -> Result<Self, RegistryError> {
        for (i, descriptor) in descriptors.iter().enumerate() {
            let duplicate = descriptors[.. i].iter()
                .filter(|other| other.name == descriptor.name)
                .find_map(|other| descriptor.kinds.iter().find(|&&k| other.accepts(k)));
            if let Some(&kind) = duplicate {
                return Err(RegistryError::Duplicate { name: descriptor.name.clone(), kind });
            }
        }
        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[ExtensionDescriptor] {
        &self.descriptors
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Finds the descriptor an extension with this name and kind should match. If none of the
    /// descriptors with this name accept the kind, one of them is still returned, so the error
    /// can say what was expected.
    fn find(&self, name: &str, kind: ExtensionKind) -> Option<&ExtensionDescriptor> {
        let mut named = self.named(name).peekable();
        let first = named.peek().copied();
        named.find(|d| d.accepts(kind)).or(first)
    }

    fn named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a ExtensionDescriptor> + use<'a, 'n> {
        self.descriptors.iter().filter(move |d| d.name == name)
    }

    fn any_accepts(&self, name: &str, kind: ExtensionKind) -> bool {
        self.named(name).any(|d| d.accepts(kind))
    }

    /// The descriptor that the given extension matched.
    pub fn descriptor_of(&self, extension: &Extension) -> Option<&ExtensionDescriptor> {
        self.find(&extension.name, extension.kind()).filter(|d| d.accepts(extension.kind()))
    }

    /// Matches an extension against the registered descriptors and runs its constructor.
    ///
    /// A lone identifier is accepted as a one-item list by a descriptor that takes an identifier
    /// list but not a single identifier.
    pub fn resolve(&self, name: &str, args: ExtensionArgs) -> Result<Extension, ExtensionError> {
        let args = match args {
            ExtensionArgs::Ident { arg }
                    if !self.any_accepts(name, ExtensionKind::Ident)
                        && self.any_accepts(name, ExtensionKind::IdentList) => {
                ExtensionArgs::IdentList { args: vec![arg] }
            },
            args => args,
        };

        let descriptor = self.find(name, args.kind())
            .ok_or_else(|| ExtensionError::Unknown(String::from(name)))?;

        let given = args.kind();
        if !descriptor.accepts(given) {
            return Err(match descriptor.kinds.as_slice() {
                &[expected] => ExtensionError::WrongKind { name: String::from(name), expected, given },
                _ => ExtensionError::NotAllowedForm(String::from(name)),
            });
        }

        let extension = Extension { name: String::from(name), args };
        descriptor.construct(&extension).map_err(ExtensionError::Construction)?;
        Ok(extension)
    }

    /// Whether a resolved extension may appear at a site that could be any of the given locations.
    pub fn allowed_in(&self, extension: &Extension, locations: &[ExtensionLocation]) -> bool {
        self.descriptor_of(extension).map_or(false, |d| d.allowed_in(locations))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    fn registry() -> ExtensionRegistry {
        ExtensionRegistry::new(vec![
            ExtensionDescriptor::anywhere("NoArgs", [ExtensionKind::NoArgs]),
            ExtensionDescriptor::anywhere("Ident", [ExtensionKind::Ident]),
            ExtensionDescriptor::anywhere("IdentList", [ExtensionKind::IdentList]),
            ExtensionDescriptor::anywhere("My", [ExtensionKind::NoArgs, ExtensionKind::Ident]),
            ExtensionDescriptor::new("Type", [ExtensionKind::NoArgs], [ExtensionLocation::Type]),
        ]).unwrap()
    }

    fn ident(arg: &str) -> ExtensionArgs {
        ExtensionArgs::Ident { arg: String::from(arg) }
    }

    mod registration {
        use super::*;

        #[test]
        fn duplicate_kinds_are_rejected() {
            let error = ExtensionRegistry::new(vec![
                ExtensionDescriptor::anywhere("Foo", [ExtensionKind::NoArgs, ExtensionKind::Ident]),
                ExtensionDescriptor::anywhere("Foo", [ExtensionKind::Ident]),
            ]).unwrap_err();
            assert_eq!(error, RegistryError::Duplicate { name: String::from("Foo"), kind: ExtensionKind::Ident });
            assert_eq!(error.to_string(), "Multiple extensions named [Foo] accept the Ident form");
        }

        #[test]
        fn same_name_different_kinds() {
            let registry = ExtensionRegistry::new(vec![
                ExtensionDescriptor::new("Foo", [ExtensionKind::NoArgs], [ExtensionLocation::Type]),
                ExtensionDescriptor::new("Foo", [ExtensionKind::Ident], [ExtensionLocation::Definition]),
            ]).unwrap();
            let bare = registry.resolve("Foo", ExtensionArgs::NoArgs).unwrap();
            assert!(registry.allowed_in(&bare, &[ExtensionLocation::Type]));
            assert!(!registry.allowed_in(&bare, &[ExtensionLocation::Definition]));
            let with_ident = registry.resolve("Foo", ident("Bar")).unwrap();
            assert!(registry.allowed_in(&with_ident, &[ExtensionLocation::Definition]));
        }

        #[test]
        fn empty_registry() {
            let registry = ExtensionRegistry::default();
            assert!(registry.is_empty());
            assert_eq!(
                registry.resolve("Foo", ExtensionArgs::NoArgs).unwrap_err().to_string(),
                "Unknown extension [Foo]",
            );
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn matching_kinds() {
            let registry = registry();
            assert_eq!(registry.resolve("NoArgs", ExtensionArgs::NoArgs).unwrap().kind(), ExtensionKind::NoArgs);
            assert_eq!(registry.resolve("Ident", ident("Foo")).unwrap().ident(), Some("Foo"));
            assert_eq!(registry.resolve("My", ident("Foo")).unwrap().ident(), Some("Foo"));
            assert_eq!(registry.resolve("My", ExtensionArgs::NoArgs).unwrap().ident(), None);
        }

        #[test]
        fn ident_becomes_ident_list() {
            let extension = registry().resolve("IdentList", ident("Foo")).unwrap();
            assert_eq!(extension.kind(), ExtensionKind::IdentList);
            assert_eq!(extension.idents(), Some(&[String::from("Foo")][..]));
        }

        #[test]
        fn ident_finds_list_descriptor_among_same_name() {
            let registry = ExtensionRegistry::new(vec![
                ExtensionDescriptor::anywhere("Foo", [ExtensionKind::NoArgs]),
                ExtensionDescriptor::anywhere("Foo", [ExtensionKind::IdentList]),
            ]).unwrap();
            let extension = registry.resolve("Foo", ident("Bar")).unwrap();
            assert_eq!(extension.idents(), Some(&[String::from("Bar")][..]));
            assert!(registry.allowed_in(&extension, &[ExtensionLocation::Definition]));
            assert_eq!(registry.resolve("Foo", ExtensionArgs::NoArgs).unwrap().kind(), ExtensionKind::NoArgs);
        }

        #[test]
        fn wrong_kind_names_both_shapes() {
            let error = registry().resolve("NoArgs", ident("foo")).unwrap_err();
            assert_eq!(error.to_string(), "[NoArgs] should have no arguments but was given an identifier");
            assert_eq!(error.syntax_kind(), SyntaxErrorKind::ExtensionShape);

            let error = registry().resolve("IdentList", ExtensionArgs::ArgList { args: Vec::new() }).unwrap_err();
            assert_eq!(error.to_string(), "[IdentList] should have an identifier list but was given an argument list");
        }

        #[test]
        fn several_kinds_give_a_general_message() {
            let error = registry().resolve("My", ExtensionArgs::IdentList { args: Vec::new() }).unwrap_err();
            assert_eq!(error.to_string(), "[My] is not in an allowed form");
        }

        #[test]
        fn locations() {
            let registry = registry();
            let ty = registry.resolve("Type", ExtensionArgs::NoArgs).unwrap();
            assert!(registry.allowed_in(&ty, &[ExtensionLocation::Type]));
            assert!(registry.allowed_in(&ty, &[ExtensionLocation::Argument, ExtensionLocation::Type]));
            assert!(!registry.allowed_in(&ty, &[ExtensionLocation::Definition]));
            assert!(!registry.allowed_in(&ty, &[]));
        }
    }

    mod constructors {
        use super::*;

        #[test]
        fn constructor_is_called() {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let registry = ExtensionRegistry::new(vec![
                ExtensionDescriptor::anywhere("Counted", [ExtensionKind::Ident])
                    .with_constructor(move |ext| {
                        assert_eq!(ext.ident(), Some("x"));
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }),
            ]).unwrap();
            registry.resolve("Counted", ident("x")).unwrap();
            registry.resolve("Counted", ident("x")).unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }

        #[test]
        fn constructor_errors_are_kept() {
            let registry = ExtensionRegistry::new(vec![
                ExtensionDescriptor::anywhere("My", [ExtensionKind::NoArgs])
                    .with_constructor(|_| Err("My error".into())),
            ]).unwrap();
            let error = registry.resolve("My", ExtensionArgs::NoArgs).unwrap_err();
            assert_eq!(error.syntax_kind(), SyntaxErrorKind::ExtensionConstruction);
            assert!(matches!(&error, ExtensionError::Construction(e) if e.to_string() == "My error"));
        }

        #[test]
        fn shape_is_checked_before_constructing() {
            let registry = ExtensionRegistry::new(vec![
                ExtensionDescriptor::anywhere("My", [ExtensionKind::NoArgs])
                    .with_constructor(|_| panic!("should not be constructed")),
            ]).unwrap();
            assert!(matches!(
                registry.resolve("My", ident("x")),
                Err(ExtensionError::WrongKind { .. }),
            ));
        }

        #[test]
        fn descriptors_are_debuggable() {
            let descriptor = ExtensionDescriptor::anywhere("My", [ExtensionKind::NoArgs])
                .with_constructor(|_| Ok(()));
            assert!(format!("{:?}", descriptor).contains("\"My\""));
        }
    }
}
