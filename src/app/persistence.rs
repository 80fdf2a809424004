// src/app/persistence.rs
//! 設定・成績・途中のゲームを localStorage に保存するよ。💾
//!
//! エンジン (logic) からは直接呼ばない。`GameSession` が状態の変化を見て呼ぶ。
//! 保存したゲームは 24 時間で期限切れ。壊れたデータは読んだ時点で消す。

use std::cell::RefCell;
use std::collections::HashMap;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use web_sys::Storage;

use crate::components::game_state::{GameSettings, GameState, GameStats, HistoryEntry, Pile};
use crate::config::game::{GAME_STATE_KEY, PERSISTED_HISTORY, SAVE_EXPIRY_MS, SETTINGS_KEY, STATS_KEY};
use crate::error::StorageError;
use crate::logic::rules::update_draggable;

/// 文字列のキー・バリューストア。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// ブラウザの localStorage。プライベートモードなどで使えない時は中身なしとして振る舞う。
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage: Some(storage) }
    }

    pub fn from_window() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("[Storage] localStorage is unavailable; nothing will be saved");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(None);
        };
        storage.get_item(key).map_err(|e| StorageError::Access(format!("{:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Access(format!("{:?}", e)))
    }
}

/// メモリ上のストア。テストや localStorage の代わりに。
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// 保存する途中のゲーム。選択状態は保存しない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub tableau_piles: Vec<Pile>,
    pub foundation_piles: Vec<Pile>,
    pub stock_pile: Pile,
    pub waste_pile: Pile,
    pub moves: u32,
    pub score: i32,
    pub is_game_won: bool,
    pub stock_cycles: u32,
    /// 最新から最大 10 件。
    pub history: Vec<HistoryEntry>,
    pub history_index: i32,
    /// 保存した時刻。
    pub timestamp: f64,
    pub game_start_time: f64,
}

impl SavedGame {
    pub fn capture(state: &GameState, now_ms: f64) -> Self {
        // カーソルより先 (アンドゥで戻した分) は保存しない
        let end = usize::try_from(state.history_index + 1).unwrap_or(0).min(state.history.len());
        let start = end.saturating_sub(PERSISTED_HISTORY);
        let history = state.history[start..end].to_vec();
        let history_index = i32::try_from(history.len()).unwrap_or(i32::MAX) - 1;
        Self {
            tableau_piles: state.tableau_piles.clone(),
            foundation_piles: state.foundation_piles.clone(),
            stock_pile: state.stock_pile.clone(),
            waste_pile: state.waste_pile.clone(),
            moves: state.moves,
            score: state.score,
            is_game_won: state.is_game_won,
            stock_cycles: state.stock_cycles,
            history,
            history_index,
            timestamp: now_ms,
            game_start_time: state.game_start_time,
        }
    }

    pub fn card_count(&self) -> usize {
        self.tableau_piles
            .iter()
            .chain(self.foundation_piles.iter())
            .map(Vec::len)
            .sum::<usize>()
            + self.stock_pile.len()
            + self.waste_pile.len()
    }

    /// 盤面として使える形か (7 列、組札 4 つ、52 枚)。
    pub fn is_well_formed(&self) -> bool {
        let cursor_ok = self.history_index >= -1
            && usize::try_from(self.history_index + 1).map_or(false, |len| len <= self.history.len());
        self.tableau_piles.len() == 7 && self.foundation_piles.len() == 4 && self.card_count() == 52 && cursor_ok
    }

    pub fn into_game_state(self, settings: GameSettings, stats: GameStats) -> GameState {
        let mut state = GameState::empty(settings, stats);
        state.tableau_piles = self.tableau_piles;
        state.foundation_piles = self.foundation_piles;
        state.stock_pile = self.stock_pile;
        state.waste_pile = self.waste_pile;
        state.moves = self.moves;
        state.score = self.score;
        state.is_game_won = self.is_game_won;
        state.stock_cycles = self.stock_cycles;
        state.history = self.history;
        state.history_index = self.history_index;
        state.game_start_time = self.game_start_time;
        update_draggable(&mut state);
        state
    }
}

/// 保存先を包んで、型付きで読み書きする。
pub struct GamePersistence<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> GamePersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    /// 読めなかったら None。中身が壊れていたら消してから None。
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("[Storage] failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("[Storage] discarding corrupt {}: {}", key, e);
                self.clear(key);
                None
            }
        }
    }

    fn clear(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("[Storage] failed to remove {}: {}", key, e);
        }
    }

    pub fn save_settings(&self, settings: &GameSettings) -> Result<(), StorageError> {
        self.save_json(SETTINGS_KEY, settings)
    }

    pub fn load_settings(&self) -> Option<GameSettings> {
        self.load_json(SETTINGS_KEY)
    }

    pub fn save_stats(&self, stats: &GameStats) -> Result<(), StorageError> {
        self.save_json(STATS_KEY, stats)
    }

    pub fn load_stats(&self) -> Option<GameStats> {
        self.load_json(STATS_KEY)
    }

    pub fn save_game_state(&self, state: &GameState, now_ms: f64) -> Result<(), StorageError> {
        let saved = SavedGame::capture(state, now_ms);
        debug!("[Storage] saving game (moves={}, history={})", saved.moves, saved.history.len());
        self.save_json(GAME_STATE_KEY, &saved)
    }

    /// 保存したゲームを読む。24 時間より古いものと、形のおかしいものは消す。
    pub fn load_game_state(&self, now_ms: f64) -> Option<SavedGame> {
        let saved: SavedGame = self.load_json(GAME_STATE_KEY)?;
        if now_ms - saved.timestamp > SAVE_EXPIRY_MS {
            info!("[Storage] saved game expired; clearing");
            self.clear_game_state();
            return None;
        }
        if !saved.is_well_formed() {
            warn!("[Storage] saved game is malformed ({} cards); clearing", saved.card_count());
            self.clear_game_state();
            return None;
        }
        Some(saved)
    }

    pub fn clear_game_state(&self) {
        self.clear(GAME_STATE_KEY);
    }
}
