//! Line-oriented stdin shared by prompts and the interactive loops.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` at end of input.
    pub async fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        print!("{message}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.prompt(&format!("{question} [y/N] ")).await?;
        Ok(answer.is_some_and(|a| is_yes(&a)))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
