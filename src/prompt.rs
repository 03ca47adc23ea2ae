use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Only an explicit "yes" or "y" counts as agreement.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}

/// Writes `question` and reads a single line answer.
///
/// End of input is treated as a decline.
pub async fn confirm<R, W>(input: &mut R, output: &mut W, question: &str) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(output, "{question} (yes/no): ")?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .await
        .context("Failed to read confirmation")?;

    Ok(is_affirmative(&answer))
}
