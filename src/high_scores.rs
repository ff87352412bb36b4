use crate::app_dirs::AppDirs;
use crate::session::SessionSummary;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Key the high score for `difficulty` is stored under
pub fn high_score_key(difficulty: &str) -> String {
    format!("highScore_{}", difficulty)
}

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "score database error: {}", e),
            StoreError::Io(e) => write!(f, "io error: {}", e),
            StoreError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            StoreError::Io(e) => Some(e),
            StoreError::Csv(e) => Some(e),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Csv(e)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One finished game as kept in the history table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub difficulty: String,
    pub result: String,
    pub score: u32,
    pub target: i64,
    pub attempts_used: u32,
    pub time_taken: u32,
    pub finished_at: DateTime<Local>,
}

impl SessionRecord {
    pub fn from_summary(summary: &SessionSummary, finished_at: DateTime<Local>) -> Self {
        Self {
            difficulty: summary.difficulty.clone(),
            result: summary.result.to_string(),
            score: summary.score,
            target: summary.target,
            attempts_used: summary.attempts_used,
            time_taken: summary.time_taken,
            finished_at,
        }
    }

    pub fn is_win(&self) -> bool {
        self.result == "won"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayCounts {
    pub played: u32,
    pub won: u32,
}

/// Best score per difficulty plus the log of finished games
pub trait HighScoreStore {
    /// Stored best for `difficulty`, 0 when none has been recorded
    fn high_score(&self, difficulty: &str) -> Result<u32>;

    /// Replace the best for `difficulty` if `score` is strictly greater.
    /// Returns whether it was replaced.
    fn submit_score(&mut self, difficulty: &str, score: u32) -> Result<bool>;

    fn record_session(&mut self, record: &SessionRecord) -> Result<()>;

    fn play_counts(&self, difficulty: &str) -> Result<PlayCounts>;
}

/// SQLite backed store under $HOME/.local/state/guessr
#[derive(Debug)]
pub struct SqliteHighScoreStore {
    conn: Connection,
}

impl SqliteHighScoreStore {
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("guessr_scores.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS high_scores (
                key TEXT PRIMARY KEY,
                score INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                difficulty TEXT NOT NULL,
                result TEXT NOT NULL,
                score INTEGER NOT NULL,
                target INTEGER NOT NULL,
                attempts_used INTEGER NOT NULL,
                time_taken INTEGER NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_difficulty ON sessions(difficulty)",
            [],
        )?;

        Ok(Self { conn })
    }

    /// All recorded games, oldest first
    pub fn sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT difficulty, result, score, target, attempts_used, time_taken, finished_at
            FROM sessions
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let finished_at: String = row.get(6)?;
            let finished_at = DateTime::parse_from_rfc3339(&finished_at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        6,
                        "finished_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(SessionRecord {
                difficulty: row.get(0)?,
                result: row.get(1)?,
                score: row.get(2)?,
                target: row.get(3)?,
                attempts_used: row.get(4)?,
                time_taken: row.get(5)?,
                finished_at,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    /// Write the full history as CSV
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let records = self.sessions()?;
        let mut writer = csv::Writer::from_path(path)?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(records.len())
    }

    /// Forget every high score; the history stays
    pub fn clear_high_scores(&mut self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM high_scores", [])?)
    }
}

impl HighScoreStore for SqliteHighScoreStore {
    fn high_score(&self, difficulty: &str) -> Result<u32> {
        let score = self
            .conn
            .query_row(
                "SELECT score FROM high_scores WHERE key = ?1",
                [high_score_key(difficulty)],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;
        Ok(score.unwrap_or(0))
    }

    fn submit_score(&mut self, difficulty: &str, score: u32) -> Result<bool> {
        if score == 0 {
            return Ok(false);
        }
        // only a strictly greater score replaces the stored one
        let changed = self.conn.execute(
            r#"
            INSERT INTO high_scores (key, score) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET score = excluded.score
            WHERE excluded.score > high_scores.score
            "#,
            params![high_score_key(difficulty), score],
        )?;
        Ok(changed > 0)
    }

    fn record_session(&mut self, record: &SessionRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO sessions
            (difficulty, result, score, target, attempts_used, time_taken, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.difficulty,
                record.result,
                record.score,
                record.target,
                record.attempts_used,
                record.time_taken,
                record.finished_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn play_counts(&self, difficulty: &str) -> Result<PlayCounts> {
        let counts = self.conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN result = 'won' THEN 1 ELSE 0 END), 0)
            FROM sessions
            WHERE difficulty = ?1
            "#,
            [difficulty],
            |row| {
                Ok(PlayCounts {
                    played: row.get(0)?,
                    won: row.get(1)?,
                })
            },
        )?;
        Ok(counts)
    }
}

/// Non-persistent store, used when the database cannot be opened and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryHighScoreStore {
    scores: HashMap<String, u32>,
    sessions: Vec<SessionRecord>,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn high_score(&self, difficulty: &str) -> Result<u32> {
        Ok(self
            .scores
            .get(&high_score_key(difficulty))
            .copied()
            .unwrap_or(0))
    }

    fn submit_score(&mut self, difficulty: &str, score: u32) -> Result<bool> {
        let best = self.scores.entry(high_score_key(difficulty)).or_insert(0);
        if score > *best {
            *best = score;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn record_session(&mut self, record: &SessionRecord) -> Result<()> {
        self.sessions.push(record.clone());
        Ok(())
    }

    fn play_counts(&self, difficulty: &str) -> Result<PlayCounts> {
        let mine = self.sessions.iter().filter(|r| r.difficulty == difficulty);
        let (played, won) = mine.fold((0, 0), |(p, w), r| (p + 1, w + u32::from(r.is_win())));
        Ok(PlayCounts { played, won })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameResult;
    use tempfile::tempdir;

    fn record(difficulty: &str, result: GameResult, score: u32) -> SessionRecord {
        let summary = SessionSummary {
            difficulty: difficulty.to_string(),
            result,
            score,
            target: 42,
            attempts_used: 3,
            time_taken: 7,
        };
        SessionRecord::from_summary(&summary, Local::now())
    }

    fn check_monotonic(store: &mut dyn HighScoreStore) {
        assert_eq!(store.high_score("easy").unwrap(), 0);
        assert!(store.submit_score("easy", 300).unwrap());
        assert!(!store.submit_score("easy", 300).unwrap());
        assert!(!store.submit_score("easy", 120).unwrap());
        assert_eq!(store.high_score("easy").unwrap(), 300);
        assert!(store.submit_score("easy", 301).unwrap());
        assert_eq!(store.high_score("easy").unwrap(), 301);
        // difficulties are independent
        assert_eq!(store.high_score("hard").unwrap(), 0);
    }

    #[test]
    fn key_uses_prefix() {
        assert_eq!(high_score_key("hard"), "highScore_hard");
    }

    #[test]
    fn sqlite_high_score_never_decreases() {
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        check_monotonic(&mut store);
    }

    #[test]
    fn memory_high_score_never_decreases() {
        let mut store = MemoryHighScoreStore::new();
        check_monotonic(&mut store);
    }

    #[test]
    fn zero_score_is_never_a_record() {
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        assert!(!store.submit_score("easy", 0).unwrap());
        assert_eq!(store.high_score("easy").unwrap(), 0);
    }

    #[test]
    fn scores_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.db");
        {
            let mut store = SqliteHighScoreStore::open(&path).unwrap();
            store.submit_score("medium", 245).unwrap();
            store
                .record_session(&record("medium", GameResult::Won, 245))
                .unwrap();
        }
        let store = SqliteHighScoreStore::open(&path).unwrap();
        assert_eq!(store.high_score("medium").unwrap(), 245);
        assert_eq!(store.sessions().unwrap().len(), 1);
    }

    #[test]
    fn play_counts_per_difficulty() {
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        assert_eq!(store.play_counts("easy").unwrap(), PlayCounts::default());

        store.record_session(&record("easy", GameResult::Won, 500)).unwrap();
        store
            .record_session(&record("easy", GameResult::LostTimeout, 0))
            .unwrap();
        store
            .record_session(&record("hard", GameResult::LostExhausted, 0))
            .unwrap();

        assert_eq!(
            store.play_counts("easy").unwrap(),
            PlayCounts { played: 2, won: 1 }
        );
        assert_eq!(
            store.play_counts("hard").unwrap(),
            PlayCounts { played: 1, won: 0 }
        );
    }

    #[test]
    fn memory_play_counts_match_sqlite() {
        let mut store = MemoryHighScoreStore::new();
        store.record_session(&record("easy", GameResult::Won, 500)).unwrap();
        store
            .record_session(&record("easy", GameResult::LostExhausted, 0))
            .unwrap();
        assert_eq!(
            store.play_counts("easy").unwrap(),
            PlayCounts { played: 2, won: 1 }
        );
    }

    #[test]
    fn sessions_roundtrip_fields() {
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        let rec = record("hard", GameResult::LostTimeout, 0);
        store.record_session(&rec).unwrap();

        let loaded = store.sessions().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].result, "timeout");
        assert_eq!(loaded[0].target, 42);
        assert_eq!(loaded[0].attempts_used, 3);
        assert_eq!(loaded[0].time_taken, 7);
        assert_eq!(loaded[0].finished_at.timestamp(), rec.finished_at.timestamp());
    }

    #[test]
    fn export_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("history.csv");
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        store.record_session(&record("easy", GameResult::Won, 612)).unwrap();
        store
            .record_session(&record("easy", GameResult::LostExhausted, 0))
            .unwrap();

        assert_eq!(store.export_csv(&out).unwrap(), 2);

        let text = std::fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("difficulty,result,score,target,attempts_used,time_taken,finished_at")
        );
        assert!(lines.next().unwrap().starts_with("easy,won,612,42,3,7,"));
        assert!(lines.next().unwrap().starts_with("easy,exhausted,0,42,3,7,"));
    }

    #[test]
    fn clearing_scores_keeps_history() {
        let mut store = SqliteHighScoreStore::open_in_memory().unwrap();
        store.submit_score("easy", 400).unwrap();
        store.record_session(&record("easy", GameResult::Won, 400)).unwrap();

        assert_eq!(store.clear_high_scores().unwrap(), 1);
        assert_eq!(store.high_score("easy").unwrap(), 0);
        assert_eq!(store.sessions().unwrap().len(), 1);
    }
}
