//! Shared test utilities for the integration suite.
//!
//! Mirrors the teacher's `tests/common` pattern of a unique-path generator
//! plus a small setup helper, so each test gets its own on-disk SQLite file
//! instead of fighting over a shared one.

use std::sync::atomic::{AtomicU64, Ordering};

use bankbot_engine::config::EngineConfig;
use bankbot_engine::database::Database;
use bankbot_engine::processor::MessageProcessor;
use tempfile::TempDir;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A `MessageProcessor` backed by a fresh on-disk SQLite database inside a
/// `TempDir`. The `TempDir` is kept alive on the struct so the file isn't
/// removed out from under the test.
pub struct TestEngine {
    pub processor: MessageProcessor,
    _dir: TempDir,
}

impl TestEngine {
    /// Build a processor against a fresh temp-file database with the
    /// default coefficient table and reward amounts from spec.md §6.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir for test database");
        let n = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_path = dir.path().join(format!("bankbot-test-{n}.db"));

        let database = Database::new(&db_path.to_string_lossy()).expect("open test database");
        let config = EngineConfig::defaults();
        let processor = MessageProcessor::new(database, &config);

        Self {
            processor,
            _dir: dir,
        }
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}
