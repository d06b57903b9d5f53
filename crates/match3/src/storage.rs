//! Save-game persistence behind a single fixed key.

use serde::{Deserialize, Serialize};

use crate::components::SAVE_KEY;
use crate::error::{Error, Result};
use crate::grid::Grid;

/// Key-value store holding one serialized game under [`SAVE_KEY`].
pub trait SaveStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, contents: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// The persisted record. Field names match the browser build's saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    #[serde(rename = "board")]
    pub grid: Grid,
    pub score: u32,
    /// Absent in older saves; means the default starting budget.
    #[serde(
        rename = "moveCount",
        alias = "movesRemaining",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub moves_remaining: Option<i32>,
}

impl SavedGame {
    pub fn new(grid: Grid, score: u32, moves_remaining: i32) -> Self {
        Self {
            grid,
            score,
            moves_remaining: Some(moves_remaining),
        }
    }

    /// Playable only with the expected dimensions and moves left.
    /// Fills in the default budget for records that predate move counts.
    pub fn validate(mut self, width: usize, height: usize, default_moves: i32) -> Option<Self> {
        if !self.grid.has_dimensions(width, height) {
            return None;
        }
        match self.moves_remaining {
            Some(moves) if moves <= 0 => None,
            Some(_) => Some(self),
            None => {
                self.moves_remaining = Some(default_moves);
                Some(self)
            }
        }
    }

    pub fn moves(&self) -> i32 {
        self.moves_remaining.unwrap_or_default()
    }
}

/// Load and validate the stored game. Corrupt, mismatched or exhausted records
/// are deleted and reported as no save.
pub fn load_saved_game(
    store: &mut dyn SaveStore,
    width: usize,
    height: usize,
    default_moves: i32,
) -> Option<SavedGame> {
    let raw = match store.load() {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("could not read save: {}", e);
            return None;
        }
    };

    let valid = serde_json::from_str::<SavedGame>(&raw)
        .map_err(|e| log::warn!("discarding unreadable save: {}", e))
        .ok()
        .and_then(|saved| saved.validate(width, height, default_moves));

    if valid.is_none() {
        log::info!("discarding invalid or finished save");
        if let Err(e) = store.clear() {
            log::error!("could not delete save: {}", e);
        }
    }
    valid
}

/// In-memory store, for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub contents: Option<String>,
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        self.contents = Some(contents.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.contents = None;
        Ok(())
    }
}

/// JSON file store, by default in the platform data directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Option<Self> {
        directories::ProjectDirs::from("com", "match3", "match3")
            .map(|dirs| Self::new(dirs.data_dir().join(format!("{}.json", SAVE_KEY))))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("failed to read {}: {}", self.path.display(), e))),
        }
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::Storage(format!("failed to create {}: {}", dir.display(), e)))?;
        }
        std::fs::write(&self.path, contents)
            .map_err(|e| Error::Storage(format!("failed to write {}: {}", self.path.display(), e)))
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("failed to remove {}: {}", self.path.display(), e))),
        }
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
pub(crate) fn local_storage() -> Result<web_sys::Storage> {
    web_sys::window()
        .ok_or_else(|| Error::Storage("no window".to_string()))?
        .local_storage()
        .map_err(|e| Error::Storage(format!("{:?}", e)))?
        .ok_or_else(|| Error::Storage("localStorage unavailable".to_string()))
}

#[cfg(target_arch = "wasm32")]
impl SaveStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>> {
        local_storage()?
            .get_item(SAVE_KEY)
            .map_err(|e| Error::Storage(format!("{:?}", e)))
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        local_storage()?
            .set_item(SAVE_KEY, contents)
            .map_err(|e| Error::Storage(format!("{:?}", e)))
    }

    fn clear(&mut self) -> Result<()> {
        local_storage()?
            .remove_item(SAVE_KEY)
            .map_err(|e| Error::Storage(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::grid_from_str;

    fn board_json() -> String {
        serde_json::to_string(&grid_from_str(&["ab", "ba"])).unwrap()
    }

    #[test]
    fn round_trips_through_memory_store() {
        let mut store = MemoryStore::default();
        let saved = SavedGame::new(grid_from_str(&["ab", "ba"]), 120, 7);
        store.save(&serde_json::to_string(&saved).unwrap()).unwrap();

        let loaded = load_saved_game(&mut store, 2, 2, 20).unwrap();
        assert_eq!(loaded, saved);
        assert!(store.contents.is_some());
    }

    #[test]
    fn missing_move_count_defaults_to_starting_budget() {
        let mut store = MemoryStore {
            contents: Some(format!(r#"{{"board":{},"score":50}}"#, board_json())),
        };
        let loaded = load_saved_game(&mut store, 2, 2, 20).unwrap();
        assert_eq!(loaded.moves_remaining, Some(20));
        assert_eq!(loaded.score, 50);
    }

    #[test]
    fn accepts_moves_remaining_alias() {
        let mut store = MemoryStore {
            contents: Some(format!(
                r#"{{"board":{},"score":0,"movesRemaining":3}}"#,
                board_json()
            )),
        };
        assert_eq!(load_saved_game(&mut store, 2, 2, 20).unwrap().moves(), 3);
    }

    #[test]
    fn exhausted_save_is_deleted() {
        let mut store = MemoryStore {
            contents: Some(format!(r#"{{"board":{},"score":10,"moveCount":0}}"#, board_json())),
        };
        assert!(load_saved_game(&mut store, 2, 2, 20).is_none());
        assert!(store.contents.is_none());
    }

    #[test]
    fn wrong_dimensions_are_deleted() {
        let mut store = MemoryStore {
            contents: Some(format!(r#"{{"board":{},"score":10,"moveCount":5}}"#, board_json())),
        };
        assert!(load_saved_game(&mut store, 8, 8, 20).is_none());
        assert!(store.contents.is_none());
    }

    #[test]
    fn corrupt_save_is_deleted() {
        let mut store = MemoryStore {
            contents: Some("{not json".to_string()),
        };
        assert!(load_saved_game(&mut store, 2, 2, 20).is_none());
        assert!(store.contents.is_none());

        let mut store = MemoryStore {
            contents: Some(r#"{"board":[["poring"],[]],"score":1}"#.to_string()),
        };
        assert!(load_saved_game(&mut store, 1, 2, 20).is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_store_saves_loads_and_clears() {
        let path = std::env::temp_dir()
            .join(format!("match3-save-test-{}", std::process::id()))
            .join("save.json");
        let mut store = FileStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        store.save("{\"score\":1}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"score\":1}"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
