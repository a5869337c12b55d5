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

//! Which parts of the grammar a parser accepts.
//!
//! A code generator that can't handle, say, default values can leave that feature out, and the
//! parser will report every default value as an error at the point where it appears instead of
//! the generator having to check the tree afterward.

use {
    std::{collections::BTreeSet, fmt, str::FromStr},
    crate::error::OptionsError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Feature {
    /// Dictionaries can appear at all.
    Dictionary,
    /// Dictionary members can be marked `required`.
    DictionaryRequired,
    /// Dictionary members can have default values.
    DictionaryDefault,
    /// Dictionaries can inherit from other dictionaries.
    DictionaryInherit,
    /// Dictionaries can be declared `partial`.
    DictionaryPartial,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Self::Dictionary, Self::DictionaryRequired, Self::DictionaryDefault,
        Self::DictionaryInherit, Self::DictionaryPartial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dictionary => "dictionary",
            Self::DictionaryRequired => "dictionary-required",
            Self::DictionaryDefault => "dictionary-default",
            Self::DictionaryInherit => "dictionary-inherit",
            Self::DictionaryPartial => "dictionary-partial",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| OptionsError::UnknownFeature(String::from(s)))
    }
}

/// A feature whose name starts with the prefix implies the other feature.
pub const IMPLIED_BY_PREFIX: &[(&str, Feature)] = &[
    ("dictionary-", Feature::Dictionary),
];

/// The set of features a parser accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    features: BTreeSet<Feature>,
}

impl Options {
    /// Builds options from feature names, like `["dictionary-required", "dictionary-default"]`.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, OptionsError> {
        let mut features = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match name.parse::<Feature>() {
                Ok(feature) => features.push(feature),
                Err(_) => unknown.push(name),
            };
        }
        if unknown.is_empty() {
            Ok(Self::from_features(features))
        } else {
            Err(OptionsError::UnknownFeature(unknown.join(",")))
        }
    }

    pub fn from_features(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut features: BTreeSet<Feature> = features.into_iter().collect();
        for &(prefix, implied) in IMPLIED_BY_PREFIX {
            if features.iter().any(|f| f.as_str().starts_with(prefix)) {
                features.insert(implied);
            }
        }
        Self { features }
    }

    /// Every feature the parser supports.
    pub fn all() -> Self {
        Self::from_features(Feature::ALL)
    }

    /// Nothing at all. Any definition is an error.
    pub fn none() -> Self {
        Self::from_features([])
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! implies {
        ($name:ident, [$($given:expr),*] => [$($expected:expr),*]) => {
            #[test]
            fn $name() {
                let options = Options::new([$($given),*]).unwrap();
                let expected: Vec<Feature> = vec![$($expected),*];
                assert_eq!(options.features().collect::<Vec<_>>(), expected);
            }
        };
    }

    implies!(empty, [] => []);
    implies!(bare_dictionary, ["dictionary"] => [Feature::Dictionary]);
    implies!(required_implies_dictionary, ["dictionary-required"] => [Feature::Dictionary, Feature::DictionaryRequired]);
    implies!(
        several,
        ["dictionary-partial", "dictionary-default"]
            => [Feature::Dictionary, Feature::DictionaryDefault, Feature::DictionaryPartial]
    );
    implies!(repeated, ["dictionary", "dictionary"] => [Feature::Dictionary]);

    #[test]
    fn unknown_features() {
        assert_eq!(
            Options::new(["dictionary", "interface", "foo"]),
            Err(OptionsError::UnknownFeature(String::from("interface,foo"))),
        );
        assert_eq!(
            Options::new(["interface"]).unwrap_err().to_string(),
            "Unknown feature(s) given: interface",
        );
        assert!("Dictionary".parse::<Feature>().is_err());
    }

    #[test]
    fn names_round_trip() {
        for &feature in Feature::ALL.iter() {
            assert_eq!(feature.to_string().parse::<Feature>(), Ok(feature));
        }
    }

    #[test]
    fn all_and_default() {
        for &feature in Feature::ALL.iter() {
            assert!(Options::all().has_feature(feature));
            assert!(!Options::none().has_feature(feature));
        }
        assert_eq!(Options::default(), Options::all());
    }
}
