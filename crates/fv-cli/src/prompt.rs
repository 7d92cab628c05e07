//! Bounded interactive prompting for missing settings

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

/// Empty answers tolerated before giving up
pub(crate) const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Ask for `label` until a non-empty answer is given.
///
/// Fails after [`MAX_PROMPT_ATTEMPTS`] empty answers, or immediately when
/// input is closed.
pub(crate) fn prompt_value<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String> {
    for attempt in 1..=MAX_PROMPT_ATTEMPTS {
        write!(output, "Enter {}: ", label)?;
        output.flush()?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .with_context(|| format!("Failed to read {}", label))?;
        if read == 0 {
            bail!("Input closed while reading {}", label);
        }

        let value = line.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        tracing::warn!(
            "{} must not be empty (attempt {}/{})",
            label,
            attempt,
            MAX_PROMPT_ATTEMPTS
        );
    }

    bail!(
        "No {} given after {} attempts",
        label,
        MAX_PROMPT_ATTEMPTS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_first_answer_is_used() {
        let mut input = Cursor::new("  prod.duckdb \n");
        let mut output = Vec::new();
        let value = prompt_value(&mut input, &mut output, "database path").unwrap();
        assert_eq!(value, "prod.duckdb");
        assert_eq!(String::from_utf8(output).unwrap(), "Enter database path: ");
    }

    #[test]
    fn test_empty_answers_are_retried() {
        let mut input = Cursor::new("\n   \nprod.duckdb\n");
        let mut output = Vec::new();
        let value = prompt_value(&mut input, &mut output, "database path").unwrap();
        assert_eq!(value, "prod.duckdb");
        assert_eq!(
            String::from_utf8(output).unwrap().matches("Enter").count(),
            3
        );
    }

    #[test]
    fn test_gives_up_after_attempt_limit() {
        let mut input = Cursor::new("\n\n\nprod.duckdb\n");
        let mut output = Vec::new();
        let err = prompt_value(&mut input, &mut output, "database path").unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[test]
    fn test_closed_input_fails_immediately() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let err = prompt_value(&mut input, &mut output, "database path").unwrap_err();
        assert!(err.to_string().contains("Input closed"));
    }
}
