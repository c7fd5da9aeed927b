use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin, stdin};

/// Line-oriented terminal input.
#[derive(Debug)]
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for Prompt {
    fn default() -> Self {
        Self { lines: BufReader::new(stdin()).lines() }
    }
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints `question` and reads one trimmed, lowercased answer. `None` on end of input.
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        print!("{question} ");
        std::io::stdout().flush().context("Failed to flush stdout")?;
        let line = self.lines.next_line().await.context("Failed to read from stdin")?;
        Ok(line.map(|l| l.trim().to_lowercase()))
    }

    /// Yes/no question defaulting to no.
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} [y/N]")).await?;
        Ok(answer.as_deref().is_some_and(is_yes))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer, "y" | "yes")
}
