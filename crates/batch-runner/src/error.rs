use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    /// Every scenario in the batch failed. The message is what the user sees.
    #[error("Failed to run simulation. Please try again.")]
    AllFailed { attempted: usize },

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for RunnerError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        RunnerError::ProgressBarTemplate(error.to_string())
    }
}
