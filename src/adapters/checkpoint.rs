use crate::domain::ports::Checkpoint;
use crate::utils::error::{CmError, Result};
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// Waits for the operator to press Enter. `q` or end of input aborts.
pub struct StdinCheckpoint;

impl Checkpoint for StdinCheckpoint {
    fn confirm(&self, prompt: &str) -> Result<()> {
        let stdin = io::stdin();
        prompt_line(prompt, &mut stdin.lock(), &mut io::stdout())
    }
}

fn prompt_line<R: BufRead, W: Write>(prompt: &str, input: &mut R, output: &mut W) -> Result<()> {
    write!(output, "{} [Enter to continue, q to abort] ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 || line.trim().eq_ignore_ascii_case("q") {
        tracing::warn!("🛑 Operator aborted at: {}", prompt);
        return Err(CmError::AbortedError {
            step: prompt.to_string(),
        });
    }
    Ok(())
}

/// Accepts every checkpoint, for `--yes` and tests. Remembers the prompts it saw.
#[derive(Default)]
pub struct AutoConfirm {
    seen: Mutex<Vec<String>>,
}

impl AutoConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl Checkpoint for AutoConfirm {
    fn confirm(&self, prompt: &str) -> Result<()> {
        println!("{} [auto-confirmed]", prompt);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(prompt.to_string());
        }
        Ok(())
    }
}
