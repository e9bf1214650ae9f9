use crate::error::{Error, Result};
use crate::players::PlayerKind;
use std::str::FromStr;

/// One line typed at the `Input command:` prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start { x: PlayerKind, o: PlayerKind },
    /// Continue from a 9-character board encoding.
    Resume {
        x: PlayerKind,
        o: PlayerKind,
        encoding: String,
    },
    /// Export the opening strategy table.
    Dump,
    Exit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["exit"] => Ok(Command::Exit),
            ["dump"] => Ok(Command::Dump),
            ["start", x, o] => Ok(Command::Start {
                x: x.parse()?,
                o: o.parse()?,
            }),
            ["resume", x, o, encoding] => Ok(Command::Resume {
                x: x.parse()?,
                o: o.parse()?,
                encoding: encoding.to_string(),
            }),
            _ => Err(Error::BadParameters),
        }
    }
}
