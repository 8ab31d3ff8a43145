//! # Text Tools
//!
//! String converters behind the text pages: text to binary/decimal/hex/octal
//! and back, text reversal (including the upside-down flip), and the counters
//! used by the word and character counter pages.
//!
//! Encoding works on UTF-16 code units, the unit a browser reports for each
//! character of a form field, so a decoded string is always identical to the
//! one that was encoded.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::schema::{ToolError, ToolOptions};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinaryFormat {
    #[default]
    Binary,
    Decimal,
    Hex,
    Octal,
}

impl BinaryFormat {
    pub fn radix(self) -> u32 {
        match self {
            BinaryFormat::Binary => 2,
            BinaryFormat::Decimal => 10,
            BinaryFormat::Hex => 16,
            BinaryFormat::Octal => 8,
        }
    }

    fn encode_unit(self, unit: u16) -> String {
        match self {
            BinaryFormat::Binary => format!("{unit:08b}"),
            BinaryFormat::Decimal => unit.to_string(),
            BinaryFormat::Hex => format!("{unit:02X}"),
            BinaryFormat::Octal => format!("{unit:03o}"),
        }
    }

    fn strip_prefix(self, token: &str) -> &str {
        let prefixes: &[&str] = match self {
            BinaryFormat::Binary => &["0b", "0B"],
            BinaryFormat::Hex => &["0x", "0X"],
            BinaryFormat::Octal => &["0o", "0O"],
            BinaryFormat::Decimal => &[],
        };
        prefixes
            .iter()
            .find_map(|p| token.strip_prefix(p))
            .unwrap_or(token)
    }
}

fn default_separator() -> String {
    " ".into()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EncodeInput {
    pub text: String,
    #[serde(default)]
    pub format: BinaryFormat,
    #[serde(default = "default_separator")]
    pub separator: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EncodeResult {
    pub output: String,
    pub format: BinaryFormat,
    pub code_units: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DecodeInput {
    pub encoded: String,
    #[serde(default)]
    pub format: BinaryFormat,
    /// Separator used when the text was encoded. Whitespace and commas always
    /// separate tokens as well.
    #[serde(default)]
    pub separator: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DecodeResult {
    pub text: String,
}

/// A separator must be non-empty and must not contain anything a token can
/// contain, otherwise the encoded units cannot be told apart.
fn check_separator(separator: &str) -> Result<(), ToolError> {
    let ambiguous = separator
        .chars()
        .any(|c| c.is_ascii_alphanumeric() || c == '+');
    if separator.is_empty() || ambiguous {
        return Err(ToolError::InvalidInput(format!(
            "separator {separator:?} must be non-empty and contain no letters, digits or '+'"
        )));
    }
    Ok(())
}

/// Encodes every UTF-16 code unit of `text` in `format`, joined by `separator`.
pub fn encode_text(text: &str, format: BinaryFormat, separator: &str) -> String {
    text.encode_utf16()
        .map(|unit| format.encode_unit(unit))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Inverse of [`encode_text`]. Tokens may be separated by whitespace or commas.
pub fn decode_text(encoded: &str, format: BinaryFormat) -> Result<String, ToolError> {
    decode_text_with_separator(encoded, format, None)
}

/// Like [`decode_text`], additionally splitting on `separator`.
pub fn decode_text_with_separator(
    encoded: &str,
    format: BinaryFormat,
    separator: Option<&str>,
) -> Result<String, ToolError> {
    let pieces: Vec<&str> = match separator {
        Some(sep) => {
            check_separator(sep)?;
            encoded.split(sep).collect()
        }
        None => vec![encoded],
    };

    let units = pieces
        .into_iter()
        .flat_map(|piece| piece.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|t| !t.is_empty())
        .map(|token| decode_token(token, format))
        .collect::<Result<Vec<u16>, ToolError>>()?;

    String::from_utf16(&units).map_err(|e| ToolError::Decode(e.to_string()))
}

fn decode_token(token: &str, format: BinaryFormat) -> Result<u16, ToolError> {
    let digits = format.strip_prefix(token);
    let invalid = || ToolError::Decode(format!("'{token}' is not a valid {format:?} value"));
    // from_str_radix alone would let a leading '+' through
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(format.radix())) {
        return Err(invalid());
    }
    u16::from_str_radix(digits, format.radix()).map_err(|_| invalid())
}

pub fn run_encode(input: &EncodeInput) -> Result<EncodeResult, ToolError> {
    check_separator(&input.separator)?;
    let output = encode_text(&input.text, input.format, &input.separator);
    debug!("encoded {} chars as {:?}", input.text.len(), input.format);
    Ok(EncodeResult {
        output,
        format: input.format,
        code_units: input.text.encode_utf16().count(),
    })
}

pub fn run_decode(input: &DecodeInput) -> Result<DecodeResult, ToolError> {
    let separator = input.separator.as_deref();
    Ok(DecodeResult {
        text: decode_text_with_separator(&input.encoded, input.format, separator)?,
    })
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReverseMode {
    /// Whole text, character by character.
    #[default]
    Characters,
    /// Word order within each line.
    Words,
    /// Line order.
    Lines,
    /// Letters inside each word, word positions kept.
    EachWord,
    /// Flipped glyphs read upside down.
    UpsideDown,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReverseInput {
    pub text: String,
    #[serde(default)]
    pub mode: ReverseMode,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ReverseResult {
    pub output: String,
    pub mode: ReverseMode,
}

pub fn reverse_text(text: &str, mode: ReverseMode) -> String {
    match mode {
        ReverseMode::Characters => text.chars().rev().collect(),
        ReverseMode::Words => text
            .split('\n')
            .map(|line| line.split_whitespace().rev().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n"),
        ReverseMode::Lines => text.split('\n').rev().collect::<Vec<_>>().join("\n"),
        ReverseMode::EachWord => reverse_each_word(text),
        ReverseMode::UpsideDown => text.chars().rev().map(flip_char).collect(),
    }
}

pub fn run_reverse(input: &ReverseInput) -> ReverseResult {
    ReverseResult {
        output: reverse_text(&input.text, input.mode),
        mode: input.mode,
    }
}

fn reverse_each_word(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word: Vec<char> = Vec::new();
    for c in text.chars() {
        if c.is_whitespace() {
            out.extend(word.drain(..).rev());
            out.push(c);
        } else {
            word.push(c);
        }
    }
    out.extend(word.drain(..).rev());
    out
}

/// Upside-down counterpart of `c`; characters without one are kept.
pub fn flip_char(c: char) -> char {
    match c {
        'a' => 'ɐ',
        'b' => 'q',
        'c' => 'ɔ',
        'd' => 'p',
        'e' => 'ǝ',
        'f' => 'ɟ',
        'g' => 'ƃ',
        'h' => 'ɥ',
        'i' => 'ᴉ',
        'j' => 'ɾ',
        'k' => 'ʞ',
        'm' => 'ɯ',
        'n' => 'u',
        'p' => 'd',
        'q' => 'b',
        'r' => 'ɹ',
        't' => 'ʇ',
        'u' => 'n',
        'v' => 'ʌ',
        'w' => 'ʍ',
        'y' => 'ʎ',
        'A' => '∀',
        'B' => 'ᗺ',
        'C' => 'Ɔ',
        'D' => 'ᗡ',
        'E' => 'Ǝ',
        'F' => 'Ⅎ',
        'G' => '⅁',
        'J' => 'ſ',
        'K' => 'ꓘ',
        'L' => '˥',
        'M' => 'W',
        'P' => 'Ԁ',
        'Q' => 'Ό',
        'R' => 'ᴚ',
        'T' => '⊥',
        'U' => '∩',
        'V' => 'Λ',
        'W' => 'M',
        'Y' => '⅄',
        '1' => 'Ɩ',
        '2' => 'ᄅ',
        '3' => 'Ɛ',
        '4' => 'ㄣ',
        '5' => 'ϛ',
        '6' => '9',
        '7' => 'ㄥ',
        '9' => '6',
        '.' => '˙',
        ',' => '\'',
        '\'' => ',',
        '?' => '¿',
        '!' => '¡',
        '"' => '„',
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '&' => '⅋',
        '_' => '‾',
        ';' => '؛',
        other => other,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatsInput {
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TextStats {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub words: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub lines: usize,
    /// At 200 words per minute.
    pub reading_time_minutes: f64,
}

pub fn text_stats(text: &str, options: &ToolOptions) -> TextStats {
    let words = text.split_whitespace().count();
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();

    let mut paragraphs = 0;
    let mut in_paragraph = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            paragraphs += 1;
            in_paragraph = true;
        }
    }

    TextStats {
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        words,
        sentences,
        paragraphs,
        lines: text.lines().count(),
        reading_time_minutes: options.round(words as f64 / 200.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_code_units_in_every_format() {
        assert_eq!(encode_text("Hi", BinaryFormat::Binary, " "), "01001000 01101001");
        assert_eq!(encode_text("Hi", BinaryFormat::Decimal, ","), "72,105");
        assert_eq!(encode_text("Hi", BinaryFormat::Hex, " "), "48 69");
        assert_eq!(encode_text("Hi", BinaryFormat::Octal, " "), "110 151");
        assert_eq!(encode_text("", BinaryFormat::Binary, " "), "");
    }

    #[test]
    fn decoding_reconstructs_original_code_units() {
        let samples = ["Hello, World!", "naïve café", "emoji 🎉 ok", "tab\tand\nnewline"];
        for format in [
            BinaryFormat::Binary,
            BinaryFormat::Decimal,
            BinaryFormat::Hex,
            BinaryFormat::Octal,
        ] {
            for text in samples {
                let encoded = encode_text(text, format, " ");
                assert_eq!(decode_text(&encoded, format).unwrap(), text, "{format:?}");
            }
        }
    }

    #[test]
    fn decode_accepts_prefixes_and_commas() {
        assert_eq!(decode_text("0x48, 0x69", BinaryFormat::Hex).unwrap(), "Hi");
        assert_eq!(decode_text("0b1001000 0b1101001", BinaryFormat::Binary).unwrap(), "Hi");
    }

    #[test]
    fn decode_rejects_bad_tokens_and_lone_surrogates() {
        assert!(matches!(
            decode_text("0102", BinaryFormat::Binary),
            Err(ToolError::Decode(_))
        ));
        assert!(decode_text("55357", BinaryFormat::Decimal).is_err());
    }

    #[test]
    fn decode_rejects_signed_tokens() {
        assert!(matches!(
            decode_text("+72 +105", BinaryFormat::Decimal),
            Err(ToolError::Decode(_))
        ));
        assert!(decode_text("0x+48", BinaryFormat::Hex).is_err());
    }

    #[test]
    fn round_trip_holds_for_custom_separators() {
        for separator in [" ", "-", "|", " | ", ", ", "\n", "::"] {
            for format in [BinaryFormat::Binary, BinaryFormat::Hex, BinaryFormat::Decimal] {
                let encoded = run_encode(&EncodeInput {
                    text: "Hi 🎉".into(),
                    format,
                    separator: separator.into(),
                })
                .unwrap();
                let decoded = run_decode(&DecodeInput {
                    encoded: encoded.output,
                    format,
                    separator: Some(separator.into()),
                })
                .unwrap();
                assert_eq!(decoded.text, "Hi 🎉", "{separator:?} {format:?}");
            }
        }
    }

    #[test]
    fn separators_that_cannot_round_trip_are_rejected() {
        for separator in ["", "0", "x", "+"] {
            let encoded = run_encode(&EncodeInput {
                text: "Hi".into(),
                format: BinaryFormat::Binary,
                separator: separator.into(),
            });
            assert!(matches!(encoded, Err(ToolError::InvalidInput(_))), "{separator:?}");
        }
        let decoded = run_decode(&DecodeInput {
            encoded: "0100100001101001".into(),
            format: BinaryFormat::Binary,
            separator: Some(String::new()),
        });
        assert!(matches!(decoded, Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn reversing_characters_twice_is_identity() {
        for text in ["", "abc", "Grüße, 世界 🎉", "line1\nline2"] {
            let once = reverse_text(text, ReverseMode::Characters);
            assert_eq!(reverse_text(&once, ReverseMode::Characters), text);
        }
        assert_eq!(reverse_text("abc", ReverseMode::Characters), "cba");
    }

    #[test]
    fn word_and_line_modes() {
        assert_eq!(
            reverse_text("the quick fox\njumps high", ReverseMode::Words),
            "fox quick the\nhigh jumps"
        );
        assert_eq!(reverse_text("a\nb\nc", ReverseMode::Lines), "c\nb\na");
        assert_eq!(reverse_text("hello  world", ReverseMode::EachWord), "olleh  dlrow");
    }

    #[test]
    fn upside_down_flips_then_reverses() {
        assert_eq!(reverse_text("hello", ReverseMode::UpsideDown), "ollǝɥ");
        assert_eq!(reverse_text("Hi!", ReverseMode::UpsideDown), "¡ᴉH");
    }

    #[test]
    fn stats_count_words_sentences_paragraphs() {
        let text = "One two three. Four five!\n\nSecond paragraph here?\n";
        let stats = text_stats(text, &ToolOptions::default());
        assert_eq!(stats.words, 8);
        assert_eq!(stats.sentences, 3);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.characters, text.chars().count());
        assert_eq!(stats.reading_time_minutes, 0.0);
    }
}
