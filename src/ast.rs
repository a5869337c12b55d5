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

//! The syntax tree produced by the parser. Every node is built once, during a single parse, and
//! never changes afterward. Code generators walk this tree to produce their bindings.

use crate::extensions::Extension;

/// The names of the types that take type parameters.
pub const PARAMETERIZED_TYPES: [&str; 4] = ["sequence", "FrozenArray", "Promise", "record"];

/// The names of the string types. These are the only types allowed as the key of a `record`.
pub const STRING_TYPES: [&str; 3] = ["ByteString", "DOMString", "USVString"];

/// Where a node came from, for diagnostics and for generated code that wants to point back at
/// the IDL.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DebugInfo {
    pub line: u32,
    pub col: u32,
    pub line_text: String,
}

/// Everything defined in one IDL file, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Definitions {
    pub defs: Vec<Definition>,
}

impl Definitions {
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Definition> {
        self.defs.iter()
    }

    /// Finds the first definition with the given name.
    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.defs.iter().find(|def| def.name() == name)
    }
}

impl IntoIterator for Definitions {
    type Item = Definition;
    type IntoIter = std::vec::IntoIter<Definition>;

    fn into_iter(self) -> Self::IntoIter {
        self.defs.into_iter()
    }
}

impl<'a> IntoIterator for &'a Definitions {
    type Item = &'a Definition;
    type IntoIter = core::slice::Iter<'a, Definition>;

    fn into_iter(self) -> Self::IntoIter {
        self.defs.iter()
    }
}

// https://webidl.spec.whatwg.org/#index-prod-Definition
// Only dictionaries are supported so far. Other kinds of definitions get their own variants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Definition {
    Dictionary(Dictionary),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Self::Dictionary(d) => &d.name,
        }
    }

    /// The IDL keyword that introduced the definition.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dictionary(_) => "dictionary",
        }
    }

    pub fn extensions(&self) -> &[Extension] {
        match self {
            Self::Dictionary(d) => &d.extensions,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Self::Dictionary(d) => d.doc.as_deref(),
        }
    }

    pub fn debug(&self) -> &DebugInfo {
        match self {
            Self::Dictionary(d) => &d.debug,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(d) => Some(d),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dictionary {
    pub name: String,
    pub members: Vec<DictMember>,
    /// The dictionary this one inherits from.
    pub base: Option<String>,
    pub is_partial: bool,
    pub extensions: Vec<Extension>,
    pub doc: Option<String>,
    /// Points at the `dictionary` keyword.
    pub debug: DebugInfo,
    /// Points at the start of the doc comment.
    pub doc_debug: Option<DebugInfo>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DictMember {
    pub name: String,
    pub ty: IdlType,
    pub default: Option<ConstValue>,
    pub is_required: bool,
    pub extensions: Vec<Extension>,
    pub doc: Option<String>,
    pub debug: DebugInfo,
    pub doc_debug: Option<DebugInfo>,
}

/// A type, as written in IDL.
///
/// `name` is either a built-in type name (with multi-word names like `unsigned long long`
/// joined by single spaces) or an identifier that the generator is expected to resolve. It is
/// one of [`PARAMETERIZED_TYPES`] exactly when `element_type` is present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IdlType {
    pub name: String,
    pub nullable: bool,
    pub element_type: Option<ElementType>,
    pub extensions: Vec<Extension>,
}

impl IdlType {
    /// A non-nullable type with no parameters and no extensions.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            element_type: None,
            extensions: Vec::new(),
        }
    }

    pub fn is_parameterized(&self) -> bool {
        PARAMETERIZED_TYPES.contains(&self.name.as_str())
    }

    pub fn is_string(&self) -> bool {
        STRING_TYPES.contains(&self.name.as_str())
    }

    /// The single type parameter of a `sequence`, `FrozenArray`, or `Promise`.
    pub fn inner(&self) -> Option<&IdlType> {
        match &self.element_type {
            Some(ElementType::Single(ty)) => Some(ty),
            _ => None,
        }
    }

    /// The key and value types of a `record`.
    pub fn record_types(&self) -> Option<(&IdlType, &IdlType)> {
        match &self.element_type {
            Some(ElementType::Record { key, value }) => Some((key, value)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElementType {
    Single(Box<IdlType>),
    Record {
        key: Box<IdlType>,
        value: Box<IdlType>,
    },
}

// https://webidl.spec.whatwg.org/#index-prod-Argument
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Argument {
    pub name: String,
    pub ty: IdlType,
    pub optional: bool,
    pub is_variadic: bool,
    pub default: Option<ConstValue>,
    pub extensions: Vec<Extension>,
}

/// A literal value given as a default.
///
/// `Null` is the IDL literal `null`. A missing default is represented by the `Option` around this
/// type, never by `Null`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConstValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Null,
    EmptyList,
}

impl ConstValue {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(f) => Some(f),
            Self::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(*self, Self::Float(f) if f.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence_of(inner: IdlType) -> IdlType {
        IdlType {
            name: String::from("sequence"),
            nullable: false,
            element_type: Some(ElementType::Single(Box::new(inner))),
            extensions: Vec::new(),
        }
    }

    #[test]
    fn parameterized_names() {
        assert!(sequence_of(IdlType::named("long")).is_parameterized());
        assert!(!IdlType::named("unsigned long").is_parameterized());
        assert!(IdlType::named("USVString").is_string());
        assert!(!IdlType::named("Foo").is_string());
    }

    #[test]
    fn element_accessors() {
        let seq = sequence_of(IdlType::named("Foo"));
        assert_eq!(seq.inner().unwrap().name, "Foo");
        assert!(seq.record_types().is_none());

        let record = IdlType {
            name: String::from("record"),
            nullable: true,
            element_type: Some(ElementType::Record {
                key: Box::new(IdlType::named("DOMString")),
                value: Box::new(IdlType::named("double")),
            }),
            extensions: Vec::new(),
        };
        let (key, value) = record.record_types().unwrap();
        assert_eq!(key.name, "DOMString");
        assert_eq!(value.name, "double");
        assert!(record.inner().is_none());
    }

    #[test]
    fn const_values() {
        assert!(ConstValue::Float(f64::NAN).is_nan());
        assert!(!ConstValue::Null.is_nan());
        assert_eq!(ConstValue::Int(83).as_f64(), Some(83.0));
        assert_eq!(ConstValue::Str(String::new()).as_f64(), None);
        assert_ne!(ConstValue::Null, ConstValue::EmptyList);
    }
}
