use anyhow::{anyhow, Result};
use std::num::IntErrorKind;

pub const DEFAULT_ACTOR_COUNT: usize = 1;
pub const MAX_ACTOR_COUNT: usize = 16;

pub const INFO_LABEL_HIDDEN: &str = "Hark! What file type can I upload? ▼";
pub const INFO_LABEL_SHOWN: &str = "Away, away, ye file type instructions! ▲";

/// Body of the info panel: what the generation server accepts as a script.
pub const FILE_INFO: &str = "\
Upload a plain UTF-8 text file (.txt) containing your script.
Start each line of dialogue with a speaker tag such as [SPEAKER1] or [SPEAKER2].
An optional scene can be described in a block that starts with a line reading SETTING:
and ends at the first blank line.
Sound effects can be written inline: [laugh], [music], [applause], [cheering], [cough],
[humming start] / [humming end], [music start] / [music end], [sing start] / [sing end].";

/// Parses the "number of actors" input the way the page always did: leading
/// digits after trimming. Empty, signed or zero input is 1; anything above
/// `MAX_ACTOR_COUNT`, overflow included, is capped.
pub fn parse_actor_count(raw: &str) -> usize {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    match trimmed[..digits_end].parse::<u64>() {
        Ok(0) => DEFAULT_ACTOR_COUNT,
        Ok(n) => usize::try_from(n).map_or(MAX_ACTOR_COUNT, |n| n.min(MAX_ACTOR_COUNT)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => MAX_ACTOR_COUNT,
        Err(_) => DEFAULT_ACTOR_COUNT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorField {
    pub index: usize,
    pub label: String,
    pub name: String,
    pub placeholder: String,
    pub value: String,
}

impl ActorField {
    fn blank(index: usize) -> Self {
        Self {
            index,
            label: format!("Actor {} Description:", index),
            name: format!("actor{}", index),
            placeholder: format!("e.g. Actor {}: calm female voice", index),
            value: String::new(),
        }
    }
}

/// The variable-length list of actor description fields.
///
/// The number of fields always equals the actor count; every regeneration
/// throws away what was typed before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceForm {
    fields: Vec<ActorField>,
}

impl Default for VoiceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceForm {
    pub fn new() -> Self {
        let mut form = Self { fields: Vec::new() };
        form.regenerate(DEFAULT_ACTOR_COUNT);
        form
    }

    /// Change handler for the actor count input.
    pub fn update_voice_inputs(&mut self, raw_count: &str) {
        self.regenerate(parse_actor_count(raw_count));
    }

    pub fn regenerate(&mut self, count: usize) {
        let count = count.clamp(DEFAULT_ACTOR_COUNT, MAX_ACTOR_COUNT);
        self.fields.clear();
        self.fields.extend((1..=count).map(ActorField::blank));
        log::debug!("Regenerated {} actor description fields", count);
    }

    pub fn actor_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[ActorField] {
        &self.fields
    }

    pub fn set_description(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let count = self.fields.len();
        let field = index
            .checked_sub(1)
            .and_then(|i| self.fields.get_mut(i))
            .ok_or_else(|| anyhow!("Actor {} does not exist (form has {} actors)", index, count))?;
        field.value = text.into();
        Ok(())
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }
}

/// Show/hide switch for the file type instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoPanel {
    shown: bool,
}

impl InfoPanel {
    pub fn toggle(&mut self) {
        self.shown = !self.shown;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Label for the toggle control, naming what the next click does.
    pub fn label(&self) -> &'static str {
        if self.shown {
            INFO_LABEL_SHOWN
        } else {
            INFO_LABEL_HIDDEN
        }
    }
}
