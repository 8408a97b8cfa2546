use thiserror::Error;

use super::view::EditForm;

/// Prefix of every suggested branch name.
pub const BRANCH_PREFIX: &str = "ai-edit-";

/// Number of instruction words carried into a suggested branch name.
const BRANCH_WORDS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("No example #{index}; pick one of 1..={count}")]
    OutOfRange { index: usize, count: usize },
}

/// A canned instruction the user can start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    pub title: &'static str,
    pub instruction: &'static str,
}

pub const EXAMPLES: &[Example] = &[
    Example {
        title: "Docstrings",
        instruction: "Add docstrings to all Python functions that are missing them",
    },
    Example {
        title: "Type hints",
        instruction: "Add type hints to function signatures in the main module",
    },
    Example {
        title: "Error handling",
        instruction: "Improve error handling by replacing bare except clauses with specific exceptions",
    },
    Example {
        title: "Input validation",
        instruction: "Add input validation to login and registration forms",
    },
    Example {
        title: "README",
        instruction: "Update the README with installation and usage instructions",
    },
    Example {
        title: "Logging",
        instruction: "Replace print statements with structured logging",
    },
];

/// Look up an example by its 1-based position in [`EXAMPLES`].
pub fn example(index: usize) -> Result<&'static Example, PickerError> {
    index
        .checked_sub(1)
        .and_then(|i| EXAMPLES.get(i))
        .ok_or(PickerError::OutOfRange {
            index,
            count: EXAMPLES.len(),
        })
}

/// Copy the example into the form and suggest a branch for it.
pub fn apply_example(form: &mut EditForm, example: &Example) {
    form.instruction = example.instruction.to_string();
    form.branch_name = suggest_branch_name(example.instruction);
}

/// Derive a branch name from free text: lowercase, drop everything that is
/// neither ASCII alphanumeric nor whitespace, keep the first three words and
/// join them with hyphens under [`BRANCH_PREFIX`].
pub fn suggest_branch_name(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().take(BRANCH_WORDS).collect();
    format!("{BRANCH_PREFIX}{}", words.join("-"))
}
