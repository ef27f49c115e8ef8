//! Keyboard input read line by line from stdin.
//!
//! `f` plays, `j` passes, an empty line continues, `q` quits. Any other line
//! is taken as registration: `<id> <name...>`.

use async_trait::async_trait;
use igt_core::ports::{Input, InputSource};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl InputSource for StdinInput {
    async fn next_input(&mut self) -> Option<Input> {
        // next_line is cancel safe, so losing a select! race drops no input
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(parse_line(&line)),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "stdin read failed");
                None
            }
        }
    }
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" | "c" => Input::Continue,
        "f" | "play" => Input::Play,
        "j" | "pass" => Input::Pass,
        "q" | "quit" => Input::Quit,
        _ => {
            let (id, name) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            Input::Register {
                id: id.to_string(),
                name: name.trim().to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_inputs() {
        assert_eq!(parse_line("f"), Input::Play);
        assert_eq!(parse_line(" J "), Input::Pass);
        assert_eq!(parse_line(""), Input::Continue);
        assert_eq!(parse_line("quit"), Input::Quit);
    }

    #[test]
    fn other_lines_register() {
        assert_eq!(
            parse_line("p-01 Ada Lovelace"),
            Input::Register {
                id: "p-01".into(),
                name: "Ada Lovelace".into()
            }
        );
        assert_eq!(
            parse_line("p-01"),
            Input::Register {
                id: "p-01".into(),
                name: String::new()
            }
        );
    }
}
