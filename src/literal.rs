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

//! This module converts the text of IDL numeric literals into values. The lexer decides where a
//! literal starts and ends; everything here works on a single, already-delimited word.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit0, digit1, hex_digit1, oct_digit0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{pair, preceded, separated_pair, tuple},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

/// Converts a whole word into a number, or returns `None` if the word isn't exactly one valid
/// numeric literal.
pub fn parse_number(word: &str) -> Option<Number> {
    match word {
        "NaN" => return Some(Number::Float(f64::NAN)),
        "Infinity" => return Some(Number::Float(f64::INFINITY)),
        "-Infinity" => return Some(Number::Float(f64::NEG_INFINITY)),
        _ => {},
    };

    // The order matters: each alternative must not be a prefix of a later one, since
    // `all_consuming` doesn't backtrack into `alt`.
    all_consuming(alt((hexadecimal, decimal, octal, integer)))(word)
        .ok()
        .map(|(_, n)| n)
}

/// Whether `name` is one of the identifiers that the lexer turns into a number.
pub fn is_numeric_word(name: &str) -> bool {
    matches!(name, "NaN" | "Infinity")
}

fn negate_if(sign: Option<char>, value: i128) -> i128 {
    if sign.is_some() { -value } else { value }
}

// https://webidl.spec.whatwg.org/#prod-integer
fn hexadecimal(input: &str) -> IResult<&str, Number> {
    map_res(
        pair(opt(char('-')), preceded(tag_no_case("0x"), hex_digit1)),
        |(sign, digits)| i128::from_str_radix(digits, 16)
            .map(|v| Number::Int(negate_if(sign, v))),
    )(input)
}

fn octal(input: &str) -> IResult<&str, Number> {
    map_res(
        pair(opt(char('-')), preceded(char('0'), oct_digit0)),
        |(sign, digits): (Option<char>, &str)| {
            if digits.is_empty() {
                Ok(Number::Int(0))
            } else {
                i128::from_str_radix(digits, 8).map(|v| Number::Int(negate_if(sign, v)))
            }
        },
    )(input)
}

fn integer(input: &str) -> IResult<&str, Number> {
    map_res(
        recognize(pair(opt(char('-')), pair(one_of("123456789"), digit0))),
        |s: &str| s.parse::<i128>().map(Number::Int),
    )(input)
}

// https://webidl.spec.whatwg.org/#prod-decimal
fn decimal(input: &str) -> IResult<&str, Number> {
    map_res(
        recognize(pair(
            opt(char('-')),
            alt((
                recognize(pair(
                    alt((
                        recognize(separated_pair(digit1, char('.'), digit0)),
                        recognize(preceded(char('.'), digit1)),
                    )),
                    opt(tuple((one_of("Ee"), opt(one_of("+-")), digit1))),
                )),
                recognize(tuple((digit1, one_of("Ee"), opt(one_of("+-")), digit1))),
            )),
        )),
        |s: &str| s.parse::<f64>().map(Number::Float),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! number_test {
        ($name:ident, $($word:expr => $expected:expr),* $(,)?) => {
            #[test]
            fn $name() {
                $(
                    assert_eq!(parse_number($word), Some($expected), "parsing {:?}", $word);
                )*
            }
        };
    }

    number_test!(integers,
        "0" => Number::Int(0),
        "1234" => Number::Int(1234),
        "-999" => Number::Int(-999),
    );

    number_test!(hex,
        "0x777" => Number::Int(0x777),
        "0XabcDEF" => Number::Int(0xabcdef),
        "-0x345" => Number::Int(-0x345),
    );

    number_test!(octal_integers,
        "0123" => Number::Int(0o123),
        "-0123" => Number::Int(-0o123),
        "00" => Number::Int(0),
    );

    number_test!(floats,
        "3e5" => Number::Float(3e5),
        "7e-3" => Number::Float(7e-3),
        ".123" => Number::Float(0.123),
        "-.901" => Number::Float(-0.901),
        "1.2345e12" => Number::Float(1.2345e12),
        "5." => Number::Float(5.0),
        "Infinity" => Number::Float(f64::INFINITY),
        "-Infinity" => Number::Float(f64::NEG_INFINITY),
    );

    #[test]
    fn nan() {
        match parse_number("NaN") {
            Some(Number::Float(f)) => assert!(f.is_nan()),
            other => panic!("expected NaN, got {:?}", other),
        }
    }

    #[test]
    fn invalid_numbers() {
        let bad = [
            "--2", "3-3", "5abc", "093", "3ee34", "3.4.2", "3x52", "24yz", "1.2.3", "0b123",
            "0x3g2", "-", ".", "0x", "InfinityFoo", "-NaN",
        ];
        for word in bad.iter() {
            assert_eq!(parse_number(word), None, "parsing {:?}", word);
        }
    }

    #[test]
    fn overflow_is_invalid() {
        assert_eq!(parse_number("0xffffffffffffffffffffffffffffffffff"), None);
    }

    #[test]
    fn numeric_words() {
        assert!(is_numeric_word("NaN"));
        assert!(is_numeric_word("Infinity"));
        assert!(!is_numeric_word("InfinityFoo"));
        assert!(!is_numeric_word("-Infinity"));
    }
}
