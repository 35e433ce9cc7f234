//! Console Session
//!
//! Reads commands line by line, runs them against a [`SharedCache`] and writes
//! one reply per command.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::cache::Clock;
use crate::console::command::{Command, USAGE};
use crate::shared::SharedCache;

// == Reply ==
/// Result of one command, rendered with `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    Value(String),
    Nil,
    Integer(usize),
    Lines(Vec<String>),
    Error(String),
    Bye,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Value(value) => write!(f, "{}", value),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Lines(lines) if lines.is_empty() => write!(f, "(empty)"),
            Reply::Lines(lines) => write!(f, "{}", lines.join("\n")),
            Reply::Error(msg) => write!(f, "ERR {}", msg),
            Reply::Bye => write!(f, "BYE"),
        }
    }
}

// == Execute ==
/// Runs a single command.
pub async fn execute<C: Clock>(
    cache: &SharedCache<String, String, C>,
    command: Command,
    default_ttl: Duration,
) -> Reply {
    match command {
        Command::Put { key, value, ttl } => {
            cache.put(key, value, ttl.unwrap_or(default_ttl)).await;
            Reply::Ok
        }
        Command::Get { key } => match cache.get(&key).await {
            Some(value) => Reply::Value(value),
            None => Reply::Nil,
        },
        Command::Del { key } => match cache.delete(&key).await {
            Some(_) => Reply::Integer(1),
            None => Reply::Integer(0),
        },
        Command::Len => Reply::Integer(cache.len().await),
        Command::Sweep => Reply::Integer(cache.sweep().await),
        Command::Scan => scan(cache).await,
        Command::Stats => match serde_json::to_string(&cache.stats().await) {
            Ok(json) => Reply::Value(json),
            Err(err) => Reply::Error(err.to_string()),
        },
        Command::Help => Reply::Lines(USAGE.iter().map(|u| u.to_string()).collect()),
        Command::Quit => Reply::Bye,
    }
}

/// Lists entries in cursor order with their wall-clock expiry.
async fn scan<C: Clock>(cache: &SharedCache<String, String, C>) -> Reply {
    let now = cache.with(|inner| inner.clock().now()).await;
    let wall_now = Utc::now();

    let lines = cache
        .snapshot()
        .await
        .into_iter()
        .enumerate()
        .map(|(pos, entry)| {
            format!(
                "{}) {} {} {}",
                pos,
                entry.key,
                entry.value,
                describe_deadline(entry.expire_at, now, wall_now)
            )
        })
        .collect();
    Reply::Lines(lines)
}

fn describe_deadline(expire_at: Instant, now: Instant, wall_now: DateTime<Utc>) -> String {
    if expire_at <= now {
        return "expired".to_string();
    }
    chrono::Duration::from_std(expire_at - now)
        .ok()
        .and_then(|remaining| wall_now.checked_add_signed(remaining))
        .map(|at| format!("expires {}", at.to_rfc3339()))
        .unwrap_or_else(|| "expires never".to_string())
}

// == Run ==
/// Processes commands from `reader` until end of input or `QUIT`.
///
/// Malformed lines produce an `ERR` reply and the session continues.
pub async fn run<R, W, C>(
    reader: R,
    mut writer: W,
    cache: SharedCache<String, String, C>,
    default_ttl: Duration,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    C: Clock,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await? {
        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                debug!(?command, "executing command");
                execute(&cache, command, default_ttl).await
            }
            Err(err) => {
                warn!(%err, "rejected console input");
                Reply::Error(err.to_string())
            }
        };

        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
        writer.flush().await?;
        handled += 1;

        if reply == Reply::Bye {
            break;
        }
    }

    info!(handled, "console session finished");
    Ok(())
}
