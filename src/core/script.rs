/// Inline tags the generation server renders as sound effects, not speakers.
const SOUND_EFFECT_TAGS: &[&str] = &[
    "laugh",
    "humming start",
    "humming end",
    "music start",
    "music end",
    "music",
    "sing start",
    "sing end",
    "applause",
    "cheering",
    "cough",
];

const SETTING_MARKER: &str = "SETTING:";

/// What a dialogue script looks like before it is uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub scene: Option<String>,
    /// Distinct speaker tags in order of first appearance.
    pub speakers: Vec<String>,
    pub turns: usize,
    pub has_text: bool,
}

impl ScriptSummary {
    pub fn inspect(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let (scene, body_start) = match lines.iter().position(|l| *l == SETTING_MARKER) {
            Some(start) => {
                let end = lines[start + 1..]
                    .iter()
                    .position(|l| l.is_empty())
                    .map(|offset| start + 1 + offset)
                    .unwrap_or(lines.len());
                let scene = lines[start + 1..end].join("\n").trim().to_string();
                ((!scene.is_empty()).then_some(scene), end)
            }
            None => (None, 0),
        };

        let mut summary = ScriptSummary {
            scene,
            ..Default::default()
        };

        for line in &lines[body_start..] {
            if line.is_empty() {
                continue;
            }
            let rest = match speaker_tag(line) {
                Some((tag, rest)) => {
                    summary.turns += 1;
                    if !summary.speakers.iter().any(|s| s == tag) {
                        summary.speakers.push(tag.to_string());
                    }
                    rest
                }
                None => line,
            };
            if !rest.trim().is_empty() {
                summary.has_text = true;
            }
        }

        summary
    }

    pub fn suggested_actor_count(&self) -> usize {
        self.speakers.len().max(1)
    }
}

/// Splits `[NAME] rest` into the tag name and the rest of the line.
fn speaker_tag(line: &str) -> Option<(&str, &str)> {
    let inner = line.strip_prefix('[')?;
    let close = inner.find(']')?;
    let tag = inner[..close].trim();
    if tag.is_empty() || SOUND_EFFECT_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
        return None;
    }
    Some((tag, &inner[close + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_collects_speakers_in_order() {
        let script = "[SPEAKER2] Where were you?\n\
                      [SPEAKER1] Out. [laugh]\n\
                      [SPEAKER2] Out where?\n";
        let summary = ScriptSummary::inspect(script);
        assert_eq!(summary.speakers, vec!["SPEAKER2", "SPEAKER1"]);
        assert_eq!(summary.turns, 3);
        assert!(summary.has_text);
        assert_eq!(summary.scene, None);
        assert_eq!(summary.suggested_actor_count(), 2);
    }

    #[test]
    fn test_inspect_extracts_setting_block() {
        let script = "SETTING:\nA castle at night.\nThunder outside.\n\n[Macbeth]\nIs this a dagger?\n";
        let summary = ScriptSummary::inspect(script);
        assert_eq!(
            summary.scene.as_deref(),
            Some("A castle at night.\nThunder outside.")
        );
        assert_eq!(summary.speakers, vec!["Macbeth"]);
        assert_eq!(summary.turns, 1);
        assert!(summary.has_text);
    }

    #[test]
    fn test_sound_effects_are_not_speakers() {
        let summary = ScriptSummary::inspect("[music start] la la\n[applause]\n");
        assert!(summary.speakers.is_empty());
        assert_eq!(summary.turns, 0);
        assert_eq!(summary.suggested_actor_count(), 1);
    }

    #[test]
    fn test_blank_script_has_no_text() {
        let summary = ScriptSummary::inspect("  \n\n[SPEAKER1]\n");
        assert!(!summary.has_text);
        assert_eq!(summary.speakers, vec!["SPEAKER1"]);
    }
}
