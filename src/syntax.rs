//! Lexical rules shared by the preprocessor and the section toggler
//!
//! A tune marks its structure with two conventions:
//! - a section label at the start of a line (`bass:`), optionally preceded by
//!   a mute marker (`_bass:`) which disables the whole block
//! - placeholder tags (`<bass>`) which the preprocessor resolves away
//!
//! The exact tokens belong to the pattern language, so they are configurable.
//! `LexicalRules` is the user-facing, serde-friendly form and `SectionSyntax`
//! is the compiled form every transform works from.

use crate::error::{DeckError, DeckResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Identifier accepted inside placeholder tags
const TAG_IDENT: &str = r"[A-Za-z_][A-Za-z0-9_]*";

/// Identifier accepted as a section label
const LABEL_IDENT: &str = r"[A-Za-z][A-Za-z0-9_]*";

lazy_static! {
    /// Compiled form of `LexicalRules::default()`
    pub static ref DEFAULT_SYNTAX: SectionSyntax = SectionSyntax::new(&LexicalRules::default())
        .expect("default lexical rules are valid");
}

/// Token conventions for labels, mute markers and tags
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalRules {
    /// Prefix placed before a label to disable its block
    pub mute_marker: String,
    /// Text terminating a section label (`bass:`)
    pub label_suffix: String,
    /// Opening delimiter of a placeholder tag
    pub tag_open: String,
    /// Closing delimiter of a placeholder tag
    pub tag_close: String,
}

impl Default for LexicalRules {
    fn default() -> Self {
        Self {
            mute_marker: "_".to_string(),
            label_suffix: ":".to_string(),
            tag_open: "<".to_string(),
            tag_close: ">".to_string(),
        }
    }
}

/// A line recognized as a section label
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelLine<'a> {
    /// Section identifier without marker or suffix
    pub id: &'a str,
    /// Whether the mute marker is present
    pub muted: bool,
    /// Byte length of the leading blanks
    pub indent: usize,
    /// Byte range of the mute marker (empty at the end of the indent when unmuted)
    pub marker: Range<usize>,
}

/// Compiled lexical rules
#[derive(Clone, Debug)]
pub struct SectionSyntax {
    rules: LexicalRules,
    label_re: Regex,
    tag_re: Regex,
}

impl SectionSyntax {
    /// Compile a set of rules, rejecting ones the transforms cannot honor
    pub fn new(rules: &LexicalRules) -> DeckResult<Self> {
        for (name, value) in [
            ("mute_marker", &rules.mute_marker),
            ("label_suffix", &rules.label_suffix),
            ("tag_open", &rules.tag_open),
            ("tag_close", &rules.tag_close),
        ] {
            if value.is_empty() {
                return Err(DeckError::Config(format!("{} must not be empty", name)));
            }
        }

        // A marker starting with an identifier character would make `xbass:`
        // ambiguous between a muted `bass` and an unmuted `xbass`.
        if rules
            .mute_marker
            .starts_with(|c: char| c.is_ascii_alphanumeric())
        {
            return Err(DeckError::Config(format!(
                "mute_marker '{}' must not start with a letter or digit",
                rules.mute_marker
            )));
        }
        if rules.mute_marker.starts_with([' ', '\t']) {
            return Err(DeckError::Config(
                "mute_marker must not start with whitespace".to_string(),
            ));
        }

        let label_re = Regex::new(&format!(
            r"^(?P<indent>[ \t]*)(?P<mute>{})?(?P<id>{}){}(?:[^/]|$)",
            regex::escape(&rules.mute_marker),
            LABEL_IDENT,
            regex::escape(&rules.label_suffix),
        ))
        .map_err(|e| DeckError::Config(format!("invalid label rule: {}", e)))?;

        let tag_re = Regex::new(&format!(
            r"^{}(?P<id>{}){}",
            regex::escape(&rules.tag_open),
            TAG_IDENT,
            regex::escape(&rules.tag_close),
        ))
        .map_err(|e| DeckError::Config(format!("invalid tag rule: {}", e)))?;

        Ok(Self {
            rules: rules.clone(),
            label_re,
            tag_re,
        })
    }

    pub fn rules(&self) -> &LexicalRules {
        &self.rules
    }

    pub fn mute_marker(&self) -> &str {
        &self.rules.mute_marker
    }

    /// Recognize a section label at the start of `line` (without terminator)
    pub fn parse_label<'a>(&self, line: &'a str) -> Option<LabelLine<'a>> {
        let caps = self.label_re.captures(line)?;
        let indent = caps.name("indent").map(|m| m.end()).unwrap_or(0);
        let id = caps.name("id")?.as_str();
        let marker = match caps.name("mute") {
            Some(m) => m.range(),
            None => indent..indent,
        };

        Some(LabelLine {
            id,
            muted: !marker.is_empty(),
            indent,
            marker,
        })
    }

    /// Recognize a well-formed tag at the start of `text`.
    /// Returns the tag identifier and the tag's byte length.
    pub fn match_tag<'a>(&self, text: &'a str) -> Option<(&'a str, usize)> {
        let caps = self.tag_re.captures(text)?;
        let whole = caps.get(0)?;
        Some((caps.name("id")?.as_str(), whole.end()))
    }

    pub fn tag_open(&self) -> &str {
        &self.rules.tag_open
    }
}

impl Default for SectionSyntax {
    fn default() -> Self {
        DEFAULT_SYNTAX.clone()
    }
}

/// Where a scan stands relative to strings and comments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum LexState {
    #[default]
    Code,
    LineComment,
    BlockComment,
    Double,
    Single,
    Backtick,
}

impl LexState {
    pub(crate) fn is_code(self) -> bool {
        self == LexState::Code
    }

    /// Step over the token at the start of `rest`, returning its byte length
    pub(crate) fn advance(&mut self, rest: &str) -> usize {
        let Some(c) = rest.chars().next() else {
            return 0;
        };

        match *self {
            LexState::Code => {
                if rest.starts_with("//") {
                    *self = LexState::LineComment;
                    return 2;
                }
                if rest.starts_with("/*") {
                    *self = LexState::BlockComment;
                    return 2;
                }
                *self = match c {
                    '"' => LexState::Double,
                    '\'' => LexState::Single,
                    '`' => LexState::Backtick,
                    _ => LexState::Code,
                };
                c.len_utf8()
            }
            LexState::LineComment => c.len_utf8(),
            LexState::BlockComment => {
                if rest.starts_with("*/") {
                    *self = LexState::Code;
                    2
                } else {
                    c.len_utf8()
                }
            }
            LexState::Double | LexState::Single | LexState::Backtick => {
                let close = match *self {
                    LexState::Double => '"',
                    LexState::Single => '\'',
                    _ => '`',
                };
                if c == '\\' {
                    1 + rest[1..].chars().next().map_or(0, char::len_utf8)
                } else {
                    if c == close {
                        *self = LexState::Code;
                    }
                    c.len_utf8()
                }
            }
        }
    }

    /// Close what ends at a line break. Template literals and block comments
    /// carry over to the next line.
    pub(crate) fn end_line(&mut self) {
        if matches!(
            *self,
            LexState::LineComment | LexState::Double | LexState::Single
        ) {
            *self = LexState::Code;
        }
    }

    pub(crate) fn scan_line(&mut self, line: &str) {
        let mut i = 0;
        while i < line.len() {
            i += self.advance(&line[i..]);
        }
        self.end_line();
    }
}

/// Split text into `(body, terminator)` pairs, keeping `\r\n`, `\n` or no
/// terminator on the final line so transforms can reassemble byte-exactly.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split_inclusive('\n').map(|segment| {
        if let Some(body) = segment.strip_suffix("\r\n") {
            (body, "\r\n")
        } else if let Some(body) = segment.strip_suffix('\n') {
            (body, "\n")
        } else {
            (segment, "")
        }
    })
}
