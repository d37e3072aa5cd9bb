//! Pattern facet support
//!
//! Patterns are compiled through a [`RegexEngine`] supplied by the
//! validation context. The default engine translates XML Schema regular
//! expressions into `regex` crate syntax: the expression is implicitly
//! anchored, `^` and `$` are ordinary characters, the `\i \c` name escapes
//! and `\p{IsBlock}` block escapes are expanded, and class subtraction
//! `[a-z-[aeiou]]` becomes `[a-z--[aeiou]]`.

use crate::names::{NAME_CHAR_EXTRA_CLASS, NAME_START_CLASS};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A compiled pattern
pub trait PatternMatcher: Send + Sync + fmt::Debug {
    /// Whether the whole of `text` matches the pattern
    fn matches(&self, text: &str) -> bool;
}

/// Compiles pattern facet values
pub trait RegexEngine: Send + Sync {
    /// Compile an XML Schema regular expression.
    ///
    /// The error is a human readable reason, reported with `InvalidRegex`.
    fn compile(
        &self,
        pattern: &str,
        locale: Option<&str>,
    ) -> std::result::Result<Arc<dyn PatternMatcher>, String>;
}

/// Default engine backed by the `regex` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct XsdRegexEngine;

/// Engine used when a context does not provide one
pub static DEFAULT_REGEX_ENGINE: XsdRegexEngine = XsdRegexEngine;

#[derive(Debug)]
struct CompiledPattern {
    regex: Regex,
}

impl PatternMatcher for CompiledPattern {
    fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl RegexEngine for XsdRegexEngine {
    fn compile(
        &self,
        pattern: &str,
        _locale: Option<&str>,
    ) -> std::result::Result<Arc<dyn PatternMatcher>, String> {
        let translated = translate(pattern)?;
        let regex = Regex::new(&translated).map_err(|e| e.to_string())?;
        Ok(Arc::new(CompiledPattern { regex }))
    }
}

/// Unicode blocks accepted in `\p{Is...}` escapes
const BLOCKS: &[(&str, u32, u32)] = &[
    ("BasicLatin", 0x0000, 0x007F),
    ("Latin-1Supplement", 0x0080, 0x00FF),
    ("LatinExtended-A", 0x0100, 0x017F),
    ("LatinExtended-B", 0x0180, 0x024F),
    ("IPAExtensions", 0x0250, 0x02AF),
    ("SpacingModifierLetters", 0x02B0, 0x02FF),
    ("CombiningDiacriticalMarks", 0x0300, 0x036F),
    ("Greek", 0x0370, 0x03FF),
    ("Cyrillic", 0x0400, 0x04FF),
    ("Armenian", 0x0530, 0x058F),
    ("Hebrew", 0x0590, 0x05FF),
    ("Arabic", 0x0600, 0x06FF),
    ("Devanagari", 0x0900, 0x097F),
    ("Thai", 0x0E00, 0x0E7F),
    ("Georgian", 0x10A0, 0x10FF),
    ("HangulJamo", 0x1100, 0x11FF),
    ("LatinExtendedAdditional", 0x1E00, 0x1EFF),
    ("GreekExtended", 0x1F00, 0x1FFF),
    ("GeneralPunctuation", 0x2000, 0x206F),
    ("SuperscriptsandSubscripts", 0x2070, 0x209F),
    ("CurrencySymbols", 0x20A0, 0x20CF),
    ("LetterlikeSymbols", 0x2100, 0x214F),
    ("NumberForms", 0x2150, 0x218F),
    ("Arrows", 0x2190, 0x21FF),
    ("MathematicalOperators", 0x2200, 0x22FF),
    ("BoxDrawing", 0x2500, 0x257F),
    ("GeometricShapes", 0x25A0, 0x25FF),
    ("MiscellaneousSymbols", 0x2600, 0x26FF),
    ("CJKSymbolsandPunctuation", 0x3000, 0x303F),
    ("Hiragana", 0x3040, 0x309F),
    ("Katakana", 0x30A0, 0x30FF),
    ("CJKUnifiedIdeographs", 0x4E00, 0x9FFF),
    ("HangulSyllables", 0xAC00, 0xD7A3),
    ("PrivateUse", 0xE000, 0xF8FF),
    ("AlphabeticPresentationForms", 0xFB00, 0xFB4F),
    ("HalfwidthandFullwidthForms", 0xFF00, 0xFFEF),
    ("Specials", 0xFFF0, 0xFFFD),
];

fn push_class(out: &mut String, body: &str, negated: bool) {
    out.push('[');
    if negated {
        out.push('^');
    }
    out.push_str(body);
    out.push(']');
}

fn push_property(out: &mut String, name: &str, negated: bool) -> std::result::Result<(), String> {
    if let Some(block) = name.strip_prefix("Is") {
        let (_, start, end) = BLOCKS
            .iter()
            .find(|(b, _, _)| *b == block)
            .ok_or_else(|| format!("unknown block name '{}'", name))?;
        push_class(out, &format!(r"\x{{{:X}}}-\x{{{:X}}}", start, end), negated);
    } else {
        out.push_str(if negated { r"\P{" } else { r"\p{" });
        out.push_str(name);
        out.push('}');
    }
    Ok(())
}

/// Translate an XML Schema regular expression into anchored `regex` syntax
pub fn translate(pattern: &str) -> std::result::Result<String, String> {
    let name_char_class = format!("{}{}", NAME_START_CLASS, NAME_CHAR_EXTRA_CLASS);
    let mut out = String::with_capacity(pattern.len() + 16);
    out.push_str(r"\A(?:");

    let mut chars = pattern.chars().peekable();
    // nesting of character classes, subtractions included
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let esc = chars
                    .next()
                    .ok_or_else(|| "pattern ends with a lone '\\'".to_string())?;
                match esc {
                    'i' => push_class(&mut out, NAME_START_CLASS, false),
                    'I' => push_class(&mut out, NAME_START_CLASS, true),
                    'c' => push_class(&mut out, &name_char_class, false),
                    'C' => push_class(&mut out, &name_char_class, true),
                    's' => out.push_str(r"[\x20\t\n\r]"),
                    'S' => out.push_str(r"[^\x20\t\n\r]"),
                    'w' => out.push_str(r"[^\p{P}\p{Z}\p{C}]"),
                    'W' => out.push_str(r"[\p{P}\p{Z}\p{C}]"),
                    'd' => out.push_str(r"\p{Nd}"),
                    'D' => out.push_str(r"\P{Nd}"),
                    'p' | 'P' => {
                        if chars.next() != Some('{') {
                            return Err(format!("expected '{{' after '\\{}'", esc));
                        }
                        let mut name = String::new();
                        loop {
                            match chars.next() {
                                Some('}') => break,
                                Some(ch) => name.push(ch),
                                None => return Err("unterminated property escape".to_string()),
                            }
                        }
                        push_property(&mut out, &name, esc == 'P')?;
                    }
                    'n' | 'r' | 't' | '\\' | '|' | '.' | '-' | '^' | '$' | '?' | '*' | '+'
                    | '{' | '}' | '(' | ')' | '[' | ']' => {
                        out.push('\\');
                        out.push(esc);
                    }
                    other => return Err(format!("invalid escape '\\{}'", other)),
                }
            }
            '[' if depth == 0 => {
                depth += 1;
                out.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    out.push('^');
                }
            }
            '[' => return Err("'[' must be escaped inside a character class".to_string()),
            '-' if depth > 0 && chars.peek() == Some(&'[') => {
                chars.next();
                depth += 1;
                out.push_str("--[");
                if chars.peek() == Some(&'^') {
                    chars.next();
                    out.push('^');
                }
            }
            ']' if depth > 0 => {
                depth -= 1;
                out.push(']');
            }
            '&' | '~' | ':' if depth > 0 => {
                out.push('\\');
                out.push(c);
            }
            '.' if depth == 0 => out.push_str(r"[^\n\r]"),
            '^' | '$' if depth == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    if depth != 0 {
        return Err("unterminated character class".to_string());
    }

    out.push_str(r")\z");
    Ok(out)
}
