//! Section muting by rewriting label lines
//!
//! Muting a section inserts the mute marker in front of every label line for
//! that section (`bass:` -> `_bass:`); unmuting removes it. Both directions
//! are idempotent and every other line is copied byte-for-byte. Lines that
//! begin inside a multi-line string or block comment are never labels.

use crate::syntax::{split_lines, LabelLine, LexState, SectionSyntax};
use serde::Serialize;
use tracing::debug;

/// A section label found in a tune
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    pub id: String,
    pub muted: bool,
    /// 1-based line number of the label
    pub line: usize,
}

/// Rewrites label lines according to a `SectionSyntax`
#[derive(Clone, Debug, Default)]
pub struct SectionToggler {
    syntax: SectionSyntax,
}

impl SectionToggler {
    pub fn new(syntax: SectionSyntax) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> &SectionSyntax {
        &self.syntax
    }

    /// Enable or disable every label line of `section_id`.
    ///
    /// An id with no matching label returns the input unchanged.
    pub fn toggle(&self, text: &str, section_id: &str, enabled: bool) -> String {
        let marker = self.syntax.mute_marker();
        let mut result = String::with_capacity(text.len() + marker.len() * 4);
        let mut rewritten = 0usize;

        for (body, terminator, label) in self.scan(text) {
            match label {
                Some(label) if label.id == section_id && label.muted == enabled => {
                    if enabled {
                        result.push_str(&body[..label.marker.start]);
                        result.push_str(&body[label.marker.end..]);
                    } else {
                        result.push_str(&body[..label.indent]);
                        result.push_str(marker);
                        result.push_str(&body[label.indent..]);
                    }
                    rewritten += 1;
                }
                _ => result.push_str(body),
            }
            result.push_str(terminator);
        }

        debug!(
            section = section_id,
            enabled, rewritten, "toggled section labels"
        );
        result
    }

    /// List section labels in source order
    pub fn sections(&self, text: &str) -> Vec<SectionInfo> {
        self.scan(text)
            .enumerate()
            .filter_map(|(i, (_, _, label))| {
                label.map(|label| SectionInfo {
                    id: label.id.to_string(),
                    muted: label.muted,
                    line: i + 1,
                })
            })
            .collect()
    }

    /// Whether any label line of `section_id` carries the mute marker
    pub fn is_muted(&self, text: &str, section_id: &str) -> bool {
        self.scan(text).any(|(_, _, label)| {
            label
                .map(|label| label.id == section_id && label.muted)
                .unwrap_or(false)
        })
    }

    /// Lines with their terminators and, for lines starting in code, the label
    fn scan<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str, Option<LabelLine<'a>>)> + 'a {
        split_lines(text).scan(LexState::default(), move |state, (body, terminator)| {
            let label = if state.is_code() {
                self.syntax.parse_label(body)
            } else {
                None
            };
            state.scan_line(body);
            Some((body, terminator, label))
        })
    }
}

/// Toggle a section using the default lexical rules
pub fn toggle_section_prefix(text: &str, section_id: &str, enabled: bool) -> String {
    SectionToggler::default().toggle(text, section_id, enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUNE: &str = "setcps(120/60/4)\n\nbass: note(\"c2 g1\")\n  .s(\"sawtooth\")\n_drums: s(\"bd sd\")\n";

    #[test]
    fn test_mute_adds_marker() {
        let out = toggle_section_prefix(TUNE, "bass", false);
        assert!(out.contains("\n_bass: note"));
        assert!(out.contains("  .s(\"sawtooth\")\n"));
    }

    #[test]
    fn test_unmute_removes_marker() {
        let out = toggle_section_prefix(TUNE, "drums", true);
        assert!(out.contains("\ndrums: s(\"bd sd\")\n"));
        assert!(!out.contains("_drums"));
    }

    #[test]
    fn test_idempotent() {
        let once = toggle_section_prefix(TUNE, "bass", false);
        assert_eq!(toggle_section_prefix(&once, "bass", false), once);

        let on = toggle_section_prefix(TUNE, "drums", true);
        assert_eq!(toggle_section_prefix(&on, "drums", true), on);
    }

    #[test]
    fn test_unknown_section_unchanged() {
        assert_eq!(toggle_section_prefix(TUNE, "nonexistent", false), TUNE);
        assert_eq!(toggle_section_prefix(TUNE, "nonexistent", true), TUNE);
    }

    #[test]
    fn test_prefix_of_other_id_not_matched() {
        let text = "bassline: note(\"c1\")\nbass: note(\"c2\")";
        let out = toggle_section_prefix(text, "bass", false);
        assert_eq!(out, "bassline: note(\"c1\")\n_bass: note(\"c2\")");
    }

    #[test]
    fn test_crlf_preserved() {
        let text = "bass: x\r\ndrums: y\r\n";
        assert_eq!(
            toggle_section_prefix(text, "drums", false),
            "bass: x\r\n_drums: y\r\n"
        );
    }

    #[test]
    fn test_indented_label_keeps_indent() {
        let text = "\t  lead: n(\"0 2 4\")";
        assert_eq!(
            toggle_section_prefix(text, "lead", false),
            "\t  _lead: n(\"0 2 4\")"
        );
    }

    #[test]
    fn test_labels_inside_template_literal_untouched() {
        let text = "lead: n(`0 2\nbass: 4`)\nbass: note(\"c2\")";
        assert_eq!(
            toggle_section_prefix(text, "bass", false),
            "lead: n(`0 2\nbass: 4`)\n_bass: note(\"c2\")"
        );
        let toggler = SectionToggler::default();
        assert_eq!(toggler.sections(text).len(), 2);
        assert!(!toggler.is_muted("/*\n_bass: x\n*/", "bass"));
    }

    #[test]
    fn test_sections_listing() {
        let toggler = SectionToggler::default();
        let sections = toggler.sections(TUNE);
        assert_eq!(
            sections,
            vec![
                SectionInfo {
                    id: "bass".to_string(),
                    muted: false,
                    line: 3
                },
                SectionInfo {
                    id: "drums".to_string(),
                    muted: true,
                    line: 5
                },
            ]
        );
        assert!(toggler.is_muted(TUNE, "drums"));
        assert!(!toggler.is_muted(TUNE, "bass"));
    }
}
