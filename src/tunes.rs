//! Bundled tunes

/// Default tune loaded by a new session.
///
/// Sections are the labelled blocks; `<volume>` is bound by the session.
pub const DEFAULT_TUNE: &str = r#"setcps(120/60/4)

samples('github:tidalcycles/dirt-samples')

bass: note("<c2 c2 eb2 [g1 bb1]>*2")
  .s("sawtooth")
  .lpf(sine.range(300, 1200).slow(8))
  .gain(0.6)

arp: n("0 2 4 <7 9>".add("<0 3>"))
  .scale("C4:minor")
  .s("triangle")
  .room(0.4)
  .gain(0.35)

drums: s("bd*2 [~ sd] bd [sd cp]")
  .bank("RolandTR909")
  .gain(0.9)

_hats: s("hh*8")
  .gain("[0.25 0.4]*4")

all(x => x.gain(<volume>).log())
"#;

/// Section ids in `DEFAULT_TUNE`
pub const DEFAULT_SECTIONS: [&str; 4] = ["bass", "arp", "drums", "hats"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mute::SectionToggler;

    #[test]
    fn test_default_tune_sections() {
        let ids: Vec<String> = SectionToggler::default()
            .sections(DEFAULT_TUNE)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, DEFAULT_SECTIONS.to_vec());
    }
}
