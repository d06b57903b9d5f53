//! Leaderboard collaborator.
//!
//! The service is a trait so hosts can plug in their own transport. `LocalLeaderboard`
//! keeps scores in a JSON file; `BrowserLeaderboard` keeps them in `localStorage`.

use serde::{Deserialize, Serialize};

use crate::components::MAX_NAME_LEN;
#[cfg(target_arch = "wasm32")]
use crate::components::LEADERBOARD_KEY;
use crate::error::LeaderboardError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    /// Trim and cap the name; blank names are rejected.
    pub fn new(name: &str, score: u32) -> Result<Self, LeaderboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeaderboardError::BlankName);
        }
        Ok(Self {
            name: name.chars().take(MAX_NAME_LEN).collect(),
            score,
        })
    }
}

pub trait Leaderboard {
    /// Best scores first.
    fn top_scores(&mut self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError>;
    fn submit(&mut self, entry: &ScoreEntry) -> Result<(), LeaderboardError>;
}

/// One displayed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedEntry<'a> {
    /// 1-indexed.
    pub rank: usize,
    pub name: &'a str,
    pub score: u32,
}

pub fn ranked(entries: &[ScoreEntry]) -> Vec<RankedEntry<'_>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| RankedEntry {
            rank: i + 1,
            name: &e.name,
            score: e.score,
        })
        .collect()
}

/// Sorted, capped score table, optionally mirrored to a JSON file.
#[derive(Debug, Clone, Default)]
pub struct LocalLeaderboard {
    entries: Vec<ScoreEntry>,
    capacity: usize,
    path: Option<std::path::PathBuf>,
}

impl LocalLeaderboard {
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            path: None,
        }
    }

    /// In-memory table seeded from a stored JSON list.
    pub fn from_json(contents: &str, capacity: usize) -> Result<Self, LeaderboardError> {
        let entries = serde_json::from_str(contents).map_err(|e| LeaderboardError::Malformed(e.to_string()))?;
        let mut board = Self {
            entries,
            capacity,
            path: None,
        };
        board.sort_and_truncate();
        Ok(board)
    }

    /// Open a file-backed table. A missing file starts empty; an unreadable one is an error.
    pub fn open(path: impl Into<std::path::PathBuf>, capacity: usize) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let mut board = match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents, capacity)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::in_memory(capacity),
            Err(e) => return Err(LeaderboardError::Unavailable(e.to_string())),
        };
        board.path = Some(path);
        Ok(board)
    }

    pub fn to_json(&self) -> Result<String, LeaderboardError> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| LeaderboardError::Malformed(e.to_string()))
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    fn sort_and_truncate(&mut self) {
        // Stable sort keeps earlier entries ahead on ties.
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }

    fn persist(&self) -> Result<(), LeaderboardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| LeaderboardError::Unavailable(e.to_string()))?;
        }
        let contents = self.to_json()?;
        std::fs::write(path, contents).map_err(|e| LeaderboardError::Unavailable(e.to_string()))
    }
}

impl Leaderboard for LocalLeaderboard {
    fn top_scores(&mut self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }

    fn submit(&mut self, entry: &ScoreEntry) -> Result<(), LeaderboardError> {
        self.entries.push(entry.clone());
        self.sort_and_truncate();
        self.persist()
    }
}

/// Score table in browser `localStorage` under [`LEADERBOARD_KEY`].
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct BrowserLeaderboard {
    table: LocalLeaderboard,
}

#[cfg(target_arch = "wasm32")]
impl BrowserLeaderboard {
    pub fn open(capacity: usize) -> Result<Self, LeaderboardError> {
        let stored = crate::storage::local_storage()
            .and_then(|storage| {
                storage
                    .get_item(LEADERBOARD_KEY)
                    .map_err(|e| crate::error::Error::Storage(format!("{:?}", e)))
            })
            .map_err(|e| LeaderboardError::Unavailable(e.to_string()))?;
        let table = match stored {
            Some(contents) => LocalLeaderboard::from_json(&contents, capacity)?,
            None => LocalLeaderboard::in_memory(capacity),
        };
        Ok(Self { table })
    }

    pub fn empty(capacity: usize) -> Self {
        Self {
            table: LocalLeaderboard::in_memory(capacity),
        }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        self.table.entries()
    }
}

#[cfg(target_arch = "wasm32")]
impl Leaderboard for BrowserLeaderboard {
    fn top_scores(&mut self, limit: usize) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        self.table.top_scores(limit)
    }

    fn submit(&mut self, entry: &ScoreEntry) -> Result<(), LeaderboardError> {
        self.table.submit(entry)?;
        let contents = self.table.to_json()?;
        crate::storage::local_storage()
            .and_then(|storage| {
                storage
                    .set_item(LEADERBOARD_KEY, &contents)
                    .map_err(|e| crate::error::Error::Storage(format!("{:?}", e)))
            })
            .map_err(|e| LeaderboardError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_capped() {
        let entry = ScoreEntry::new("  Poring Fan  ", 10).unwrap();
        assert_eq!(entry.name, "Poring Fan");

        let long = "x".repeat(80);
        assert_eq!(ScoreEntry::new(&long, 1).unwrap().name.chars().count(), 50);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(ScoreEntry::new("   ", 10), Err(LeaderboardError::BlankName));
        assert_eq!(ScoreEntry::new("", 10), Err(LeaderboardError::BlankName));
    }

    #[test]
    fn keeps_best_scores_in_order() {
        let mut board = LocalLeaderboard::in_memory(3);
        for (name, score) in [("a", 10), ("b", 50), ("c", 30), ("d", 40)] {
            board.submit(&ScoreEntry::new(name, score).unwrap()).unwrap();
        }
        let top = board.top_scores(10).unwrap();
        let scores: Vec<_> = top.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![50, 40, 30]);
        assert_eq!(board.top_scores(1).unwrap().len(), 1);
    }

    #[test]
    fn ranking_is_one_indexed() {
        let entries = vec![
            ScoreEntry::new("first", 90).unwrap(),
            ScoreEntry::new("second", 80).unwrap(),
        ];
        let rows = ranked(&entries);
        assert_eq!(rows[0], RankedEntry { rank: 1, name: "first", score: 90 });
        assert_eq!(rows[1].rank, 2);
        assert_eq!(
            serde_json::to_string(&rows).unwrap(),
            r#"[{"rank":1,"name":"first","score":90},{"rank":2,"name":"second","score":80}]"#
        );
    }

    #[test]
    fn stored_table_is_sorted_and_capped() {
        let mut board = LocalLeaderboard::from_json(
            r#"[{"name":"low","score":5},{"name":"high","score":70},{"name":"mid","score":40}]"#,
            2,
        )
        .unwrap();
        let names: Vec<_> = board.top_scores(10).unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["high", "mid"]);

        let reloaded = LocalLeaderboard::from_json(&board.to_json().unwrap(), 2).unwrap();
        assert_eq!(reloaded.entries(), board.entries());
        assert!(matches!(
            LocalLeaderboard::from_json("{}", 2),
            Err(LeaderboardError::Malformed(_))
        ));
    }

    #[test]
    fn file_backed_table_survives_reopen() {
        let path = std::env::temp_dir()
            .join(format!("match3-leaderboard-test-{}", std::process::id()))
            .join("scores.json");
        let _ = std::fs::remove_file(&path);

        let mut board = LocalLeaderboard::open(&path, 10).unwrap();
        board.submit(&ScoreEntry::new("kafra", 300).unwrap()).unwrap();

        let mut reopened = LocalLeaderboard::open(&path, 10).unwrap();
        assert_eq!(reopened.top_scores(10).unwrap(), vec![ScoreEntry::new("kafra", 300).unwrap()]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_table_is_reported() {
        let dir = std::env::temp_dir().join(format!("match3-leaderboard-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scores.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            LocalLeaderboard::open(&path, 10),
            Err(LeaderboardError::Malformed(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
