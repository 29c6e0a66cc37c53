pub const LABEL_GENERATE: &str = "Generate Audio";
pub const LABEL_LOADING: &str = "Loading...";
pub const LABEL_REGENERATE: &str = "Regenerate Audio";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed {
        /// Audio from an earlier generation is still loaded.
        has_output: bool,
    },
}

impl SubmissionState {
    pub fn button_label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => LABEL_GENERATE,
            SubmissionState::Submitting => LABEL_LOADING,
            SubmissionState::Succeeded => LABEL_REGENERATE,
            SubmissionState::Failed { has_output: true } => LABEL_REGENERATE,
            SubmissionState::Failed { has_output: false } => LABEL_GENERATE,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_labels() {
        assert_eq!(SubmissionState::Idle.button_label(), "Generate Audio");
        assert_eq!(SubmissionState::Submitting.button_label(), "Loading...");
        assert_eq!(SubmissionState::Succeeded.button_label(), "Regenerate Audio");
        assert_eq!(
            SubmissionState::Failed { has_output: true }.button_label(),
            "Regenerate Audio"
        );
        assert_eq!(
            SubmissionState::Failed { has_output: false }.button_label(),
            "Generate Audio"
        );
    }

    #[test]
    fn test_only_submitting_is_busy() {
        assert!(SubmissionState::Submitting.is_busy());
        assert!(!SubmissionState::Idle.is_busy());
        assert!(!SubmissionState::Succeeded.is_busy());
        assert!(!SubmissionState::Failed { has_output: false }.is_busy());
    }
}
