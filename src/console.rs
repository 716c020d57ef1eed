//! Line-oriented terminal interaction.
//!
//! `Console` wraps any buffered reader and writer so the REPL and the profile
//! interview can run against stdin/stdout in production and against in-memory
//! buffers in tests.

use crate::constants::BOT_DISPLAY_NAME;
use crate::errors::{AppError, AppResult};
use std::io::{self, BufRead, Write};

/// Source of the user's answers during the profile interview.
pub trait AnswerSource {
    /// Shows `question` and blocks until the user answers it.
    fn answer(&mut self, question: &str) -> AppResult<String>;
}

/// A prompt-and-read terminal over arbitrary streams.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Creates a console over the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes one line.
    pub fn say(&mut self, text: &str) -> AppResult<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    /// Writes a line spoken by the bot.
    pub fn say_as_bot(&mut self, text: &str) -> AppResult<()> {
        self.say(&format!("{}: {}", BOT_DISPLAY_NAME, text))
    }

    /// Shows `prompt` without a newline and reads one line.
    ///
    /// Returns `None` at end of input. The trailing newline is removed;
    /// other whitespace is kept.
    pub fn prompt(&mut self, prompt: &str) -> AppResult<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Borrow of the output stream.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Gives the streams back.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> AnswerSource for Console<R, W> {
    fn answer(&mut self, question: &str) -> AppResult<String> {
        self.say_as_bot(question)?;
        match self.prompt("You: ")? {
            Some(answer) => Ok(answer.trim().to_string()),
            None => Err(AppError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the question was answered",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn written(console: &Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.output().clone()).unwrap()
    }

    #[test]
    fn test_prompt_reads_lines_then_eof() {
        let mut console = console("first\r\nsecond\n");
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("first"));
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("second"));
        assert_eq!(console.prompt("> ").unwrap(), None);
        assert_eq!(written(&console), "> > > ");
    }

    #[test]
    fn test_answer_shows_question_and_trims() {
        let mut console = console("  31 years  \n");
        let answer = console.answer("How old are you? 🎂").unwrap();
        assert_eq!(answer, "31 years");
        assert_eq!(written(&console), "MotivateBot: How old are you? 🎂\nYou: ");
    }

    #[test]
    fn test_answer_at_eof_is_an_error() {
        let mut console = console("");
        let err = console.answer("Anything?").unwrap_err();
        match err {
            AppError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
