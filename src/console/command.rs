//! Console Commands
//!
//! Parses one input line into a [`Command`].

use std::time::Duration;

use thiserror::Error;

/// Usage lines, also printed by `HELP`.
pub const USAGE: &[&str] = &[
    "PUT <key> <value> [ttl_ms]",
    "GET <key>",
    "DEL <key>",
    "LEN",
    "SWEEP",
    "SCAN",
    "STATS",
    "HELP",
    "QUIT",
];

// == Command Error ==
/// Malformed console input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("wrong number of arguments, usage: {0}")]
    Arity(&'static str),

    #[error("invalid ttl '{0}', expected milliseconds")]
    InvalidTtl(String),
}

// == Command ==
/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a value; `ttl` of `None` means the configured default
    Put {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Get {
        key: String,
    },
    Del {
        key: String,
    },
    Len,
    Sweep,
    Scan,
    Stats,
    Help,
    Quit,
}

impl Command {
    /// Parses a line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_uppercase();
        let args: Vec<&str> = parts.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("PUT", [key, value]) => Command::Put {
                key: key.to_string(),
                value: value.to_string(),
                ttl: None,
            },
            ("PUT", [key, value, ttl]) => Command::Put {
                key: key.to_string(),
                value: value.to_string(),
                ttl: Some(parse_ttl(ttl)?),
            },
            ("PUT", _) => return Err(CommandError::Arity(USAGE[0])),
            ("GET", [key]) => Command::Get {
                key: key.to_string(),
            },
            ("GET", _) => return Err(CommandError::Arity(USAGE[1])),
            ("DEL", [key]) => Command::Del {
                key: key.to_string(),
            },
            ("DEL", _) => return Err(CommandError::Arity(USAGE[2])),
            ("LEN", []) => Command::Len,
            ("SWEEP", []) => Command::Sweep,
            ("SCAN", []) => Command::Scan,
            ("STATS", []) => Command::Stats,
            ("HELP", []) => Command::Help,
            ("QUIT" | "EXIT", []) => Command::Quit,
            ("LEN" | "SWEEP" | "SCAN" | "STATS" | "HELP" | "QUIT" | "EXIT", _) => {
                return Err(CommandError::Arity(bare_usage(&verb)))
            }
            _ => return Err(CommandError::Unknown(verb)),
        };
        Ok(Some(command))
    }
}

fn parse_ttl(raw: &str) -> Result<Duration, CommandError> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| CommandError::InvalidTtl(raw.to_string()))
}

fn bare_usage(verb: &str) -> &'static str {
    USAGE
        .iter()
        .find(|usage| **usage == verb)
        .copied()
        .unwrap_or("QUIT")
}
