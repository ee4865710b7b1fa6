use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CleanerError {
    #[error("Input is empty after cleaning")]
    EmptyInput,
}

pub struct Cleaner;

impl Cleaner {
    /// Collapses every whitespace run (newlines included) into one space.
    pub fn clean(input: &str) -> Result<String, CleanerError> {
        let cleaned = input
            .split_whitespace()
            .filter(|word| word.chars().any(|c| !c.is_control()))
            .collect::<Vec<_>>()
            .join(" ");

        if cleaned.is_empty() {
            return Err(CleanerError::EmptyInput);
        }

        Ok(cleaned)
    }
}
