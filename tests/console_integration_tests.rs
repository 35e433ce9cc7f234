//! Integration Tests for the Console
//!
//! Drives full sessions through `console::run` with scripted input.

use std::time::Duration;

use expiring_map::{console, CacheError, Config, ExpiringCache, SharedCache};
use tokio::io::BufReader;
use tokio_test::io::Builder;

// == Helper Functions ==

fn create_test_cache(capacity: usize) -> SharedCache<String, String> {
    SharedCache::new(ExpiringCache::new(capacity).unwrap())
}

async fn run_script(cache: SharedCache<String, String>, mock: tokio_test::io::Mock) -> Vec<String> {
    let mut output = Vec::new();
    console::run(BufReader::new(mock), &mut output, cache, Duration::from_secs(60))
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// == Basic Commands ==

#[tokio::test]
async fn test_put_get_delete_session() {
    let mock = Builder::new()
        .read(b"PUT user alice\n")
        .read(b"GET user\n")
        .read(b"DEL user\n")
        .read(b"DEL user\n")
        .read(b"GET user\n")
        .read(b"LEN\n")
        .build();

    let replies = run_script(create_test_cache(10), mock).await;
    assert_eq!(replies, vec!["OK", "alice", "1", "0", "(nil)", "0"]);
}

#[tokio::test]
async fn test_commands_split_across_reads() {
    let mock = Builder::new()
        .read(b"PU")
        .read(b"T k v\nGE")
        .read(b"T k\n")
        .build();

    let replies = run_script(create_test_cache(10), mock).await;
    assert_eq!(replies, vec!["OK", "v"]);
}

#[tokio::test]
async fn test_malformed_lines_do_not_end_session() {
    let mock = Builder::new()
        .read(b"PUT onlykey\n")
        .read(b"PUT k v soon\n")
        .read(b"FLUSHALL\n")
        .read(b"PUT k v\n")
        .read(b"GET k\n")
        .build();

    let replies = run_script(create_test_cache(10), mock).await;
    assert_eq!(replies.len(), 5);
    assert!(replies[0].starts_with("ERR wrong number of arguments"));
    assert_eq!(replies[1], "ERR invalid ttl 'soon', expected milliseconds");
    assert_eq!(replies[2], "ERR unknown command 'FLUSHALL'");
    assert_eq!(replies[3], "OK");
    assert_eq!(replies[4], "v");
}

#[tokio::test]
async fn test_help_lists_commands() {
    let mock = Builder::new().read(b"HELP\n").build();

    let replies = run_script(create_test_cache(10), mock).await;
    assert!(replies.iter().any(|l| l.starts_with("PUT <key> <value>")));
    assert!(replies.iter().any(|l| l == "QUIT"));
}

// == Expiry and Eviction ==

#[tokio::test]
async fn test_entry_expires_between_commands() {
    let mock = Builder::new()
        .read(b"PUT k v 1\n")
        .wait(Duration::from_millis(20))
        .read(b"LEN\n")
        .read(b"GET k\n")
        .read(b"LEN\n")
        .build();

    let replies = run_script(create_test_cache(10), mock).await;
    // LEN does not sweep, GET does.
    assert_eq!(replies, vec!["OK", "1", "(nil)", "0"]);
}

#[tokio::test]
async fn test_update_replaces_deadline() {
    let mock = Builder::new()
        .read(b"PUT k v1 100000\n")
        .read(b"PUT k v2 5\n")
        .wait(Duration::from_millis(20))
        .read(b"GET k\n")
        .build();

    let replies = run_script(create_test_cache(10), mock).await;
    assert_eq!(replies, vec!["OK", "OK", "(nil)"]);
}

#[tokio::test]
async fn test_capacity_evicts_soonest_to_expire() {
    let mock = Builder::new()
        .read(b"PUT a 1 100000\n")
        .read(b"PUT b 2 10000\n")
        .read(b"PUT c 3 50000\n")
        .read(b"GET b\nGET a\nGET c\n")
        .read(b"STATS\n")
        .build();

    let replies = run_script(create_test_cache(2), mock).await;
    assert_eq!(&replies[..6], &["OK", "OK", "OK", "(nil)", "1", "3"]);

    let stats: serde_json::Value = serde_json::from_str(&replies[6]).unwrap();
    assert_eq!(stats["evictions"], 1);
    assert_eq!(stats["hits"], 2);
    assert_eq!(stats["misses"], 1);
}

#[tokio::test]
async fn test_scan_starts_with_soonest() {
    let mock = Builder::new()
        .read(b"PUT late x 90000\n")
        .read(b"PUT early y 1000\n")
        .read(b"PUT mid z 30000\n")
        .read(b"SCAN\n")
        .build();

    let replies = run_script(create_test_cache(10), mock).await;
    assert_eq!(replies.len(), 6);
    assert!(replies[3].starts_with("0) early y expires "));
}

#[tokio::test]
async fn test_quit_stops_reading() {
    let cache = create_test_cache(10);
    let input = b"PUT a 1\nQUIT\nPUT b 2\n";
    let mut output = Vec::new();

    console::run(&input[..], &mut output, cache.clone(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "OK\nBYE\n");
    assert_eq!(cache.len().await, 1);
}

// == Construction ==

#[test]
fn test_invalid_capacity_rejected() {
    for capacity in [0, -1] {
        let config = Config {
            capacity,
            ..Config::default()
        };
        let err = SharedCache::<String, String>::from_config(&config).unwrap_err();
        assert_eq!(err, CacheError::InvalidCapacity(capacity.to_string()));
    }
}
