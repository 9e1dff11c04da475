//! Tag preprocessing for annotated tunes
//!
//! The preprocessor runs BEFORE the pattern-language evaluator, turning an
//! annotated tune into a plain script:
//! - `<name>` tags bound to a value are replaced by that value
//! - `<name>` tags naming a section become the mute marker when the section
//!   is disabled, and nothing when it is enabled
//! - any other well-formed tag is stripped
//!
//! Tags inside string literals and comments (`//` and `/* */`) are left
//! alone, since the pattern language uses angle brackets in its own
//! mini-notation strings. Malformed tags pass through unchanged.

use crate::syntax::{split_lines, LexState, SectionSyntax};
use std::collections::HashMap;
use tracing::debug;

/// Values and section states tags resolve against
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreprocessContext {
    /// Section id -> enabled
    pub sections: HashMap<String, bool>,
    /// Tag id -> literal replacement
    pub bindings: HashMap<String, String>,
    /// Drop muted blocks entirely instead of leaving them to the evaluator
    pub strip_muted: bool,
}

impl PreprocessContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, id: &str, enabled: bool) -> Self {
        self.sections.insert(id.to_string(), enabled);
        self
    }

    pub fn bind(mut self, id: &str, value: impl Into<String>) -> Self {
        self.bindings.insert(id.to_string(), value.into());
        self
    }

    pub fn strip_muted(mut self, strip: bool) -> Self {
        self.strip_muted = strip;
        self
    }

    fn resolve<'a>(&'a self, id: &str, mute_marker: &'a str) -> &'a str {
        if let Some(value) = self.bindings.get(id) {
            return value;
        }
        match self.sections.get(id) {
            Some(false) => mute_marker,
            _ => "",
        }
    }
}

/// Turns annotated tunes into evaluator-ready scripts
#[derive(Clone, Debug, Default)]
pub struct Preprocessor {
    syntax: SectionSyntax,
}

impl Preprocessor {
    pub fn new(syntax: SectionSyntax) -> Self {
        Self { syntax }
    }

    /// Resolve all tags in `annotated` against `ctx`
    pub fn process(&self, annotated: &str, ctx: &PreprocessContext) -> String {
        let mut state = LexState::default();
        let mut resolved_tags = 0usize;
        let mut lines: Vec<(String, &str, bool)> = Vec::new();

        for (body, terminator) in split_lines(annotated) {
            let starts_in_code = state.is_code();
            let mut line = String::with_capacity(body.len());
            resolved_tags += self.resolve_line(body, ctx, &mut state, &mut line);
            lines.push((line, terminator, starts_in_code));
        }

        let mut result = String::with_capacity(annotated.len());
        let mut dropped = 0usize;
        let mut muted_indent: Option<usize> = None;

        for (line, terminator, starts_in_code) in &lines {
            if ctx.strip_muted {
                if let Some(indent) = muted_indent {
                    if is_continuation(line, indent) {
                        dropped += 1;
                        continue;
                    }
                    muted_indent = None;
                }
                let label = if *starts_in_code {
                    self.syntax.parse_label(line)
                } else {
                    None
                };
                if let Some(label) = label {
                    if label.muted {
                        muted_indent = Some(label.indent);
                        dropped += 1;
                        continue;
                    }
                }
            }
            result.push_str(line);
            result.push_str(terminator);
        }

        debug!(resolved_tags, dropped, "preprocessed tune");
        result
    }

    /// Copy one line into `out`, resolving tags outside strings and comments.
    /// Returns the number of tags resolved.
    fn resolve_line(
        &self,
        line: &str,
        ctx: &PreprocessContext,
        state: &mut LexState,
        out: &mut String,
    ) -> usize {
        let tag_open = self.syntax.tag_open();
        let marker = self.syntax.mute_marker();
        let mut copied = 0;
        let mut i = 0;
        let mut count = 0;

        while i < line.len() {
            let rest = &line[i..];
            if state.is_code() && rest.starts_with(tag_open) {
                if let Some((id, len)) = self.syntax.match_tag(rest) {
                    let mut replacement = ctx.resolve(id, marker);
                    // A label muted in the source stays singly muted
                    if replacement == marker && rest[len..].starts_with(marker) {
                        replacement = "";
                    }
                    out.push_str(&line[copied..i]);
                    out.push_str(replacement);
                    i += len;
                    copied = i;
                    count += 1;
                    continue;
                }
            }
            i += state.advance(rest);
        }

        out.push_str(&line[copied..]);
        state.end_line();
        count
    }
}

/// A line continuing a block labelled at `label_indent`
fn is_continuation(line: &str, label_indent: usize) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return false;
    }
    let indent = line.len() - trimmed.len();
    indent > label_indent || trimmed.starts_with('.')
}

/// Preprocess with the default lexical rules and no bindings:
/// section tags are stripped and everything else is kept verbatim.
pub fn preprocess(annotated: &str) -> String {
    Preprocessor::default().process(annotated, &PreprocessContext::default())
}
