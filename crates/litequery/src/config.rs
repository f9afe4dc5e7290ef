use crate::error::{SqlError, SqlResult};
use rusqlite::OpenFlags;
use std::time::Duration;

/// SQLite journal mode applied when a database is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Wal,
    Memory,
}

impl JournalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Wal => "WAL",
            JournalMode::Memory => "MEMORY",
        }
    }
}

/// Configuration for [`Database`](crate::Database).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Option<Duration>,
    /// Enforce `FOREIGN KEY` constraints (`PRAGMA foreign_keys`).
    pub foreign_keys: bool,
    /// Open the database read-only.
    pub read_only: bool,
    /// Create the database file if it does not exist.
    pub create_if_missing: bool,
    /// Journal mode to switch to after opening. `None` keeps SQLite's default.
    pub journal_mode: Option<JournalMode>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Some(Duration::from_secs(5)),
            foreign_keys: true,
            read_only: false,
            create_if_missing: true,
            journal_mode: None,
        }
    }
}

impl DatabaseConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Fail immediately on a locked database.
    pub fn no_busy_timeout(mut self) -> Self {
        self.busy_timeout = None;
        self
    }

    /// Enable or disable foreign key enforcement.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Open read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Whether a missing database file is created.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set the journal mode.
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = Some(mode);
        self
    }

    /// Check that the options can be applied together.
    pub fn validate(&self) -> SqlResult<()> {
        if self.read_only && self.journal_mode.is_some() {
            return Err(SqlError::config(
                "journal_mode cannot be changed on a read-only database",
            ));
        }
        Ok(())
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let mut flags = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        if self.create_if_missing && !self.read_only {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }
        flags | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }
}
