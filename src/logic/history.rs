// src/logic/history.rs
//! アンドゥ用の履歴管理だよ。⏪
//!
//! 履歴は「盤面スナップショットの列」と「今どこにいるか」のカーソルだけ。
//! 保存するたびに、カーソルより先 (アンドゥで戻った分) は捨てる。長さは最大 50。

use log::{debug, warn};

use crate::components::game_state::{GameSnapshot, GameState, HistoryEntry};
use crate::config::game::MAX_HISTORY;

/// `save_state` の結果。呼び出し側が GameState に書き戻す。
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryUpdate {
    pub history: Vec<HistoryEntry>,
    pub history_index: i32,
}

/// 今の盤面を履歴に積む。
///
/// スナップショットには選択状態が入らないので、アンドゥで古い選択が戻ってくることはない。
pub fn save_state(
    action: &str,
    current_state: &GameState,
    history: &[HistoryEntry],
    history_index: i32,
    timestamp: f64,
) -> HistoryUpdate {
    // カーソルより先の「未来」は捨てる
    let keep = usize::try_from(history_index + 1).unwrap_or(0).min(history.len());
    let mut next: Vec<HistoryEntry> = history[..keep].to_vec();

    next.push(HistoryEntry {
        action: action.to_string(),
        state: Some(GameSnapshot::of(current_state)),
        timestamp,
    });
    if next.len() > MAX_HISTORY {
        let overflow = next.len() - MAX_HISTORY;
        next.drain(..overflow);
    }

    let history_index = i32::try_from(next.len()).unwrap_or(i32::MAX) - 1;
    debug!("[History] saved '{}' (len={}, index={})", action, next.len(), history_index);
    HistoryUpdate { history: next, history_index }
}

/// 履歴込みで新しい GameState を作るヘルパー。
pub fn with_saved_state(action: &str, state: GameState, timestamp: f64) -> GameState {
    let update = save_state(action, &state, &state.history, state.history_index, timestamp);
    GameState { history: update.history, history_index: update.history_index, ..state }
}

pub fn can_undo(state: &GameState) -> bool {
    state.history_index > 0 && !state.history.is_empty()
}

/// 一つ前のスナップショットに戻した盤面を作る。戻せなければ None。
///
/// 壊れたエントリ (state が無い) に当たったら None。変なデータを盤面に流さない。
pub fn undo_state(state: &GameState) -> Option<GameState> {
    if !can_undo(state) {
        return None;
    }
    let target_index = state.history_index - 1;
    let entry = state.history.get(usize::try_from(target_index).ok()?)?;
    let Some(snapshot) = entry.state.as_ref() else {
        warn!("[History] entry {} ('{}') has no state; refusing to undo", target_index, entry.action);
        return None;
    };
    let mut restored = state.restored_from(snapshot, target_index);
    crate::logic::rules::update_draggable(&mut restored);
    debug!("[History] undo to index {} ('{}')", target_index, entry.action);
    Some(restored)
}

/// アンドゥ。戻せたら `set_state` を呼んで true、戻せなければ何も呼ばずに false。
pub fn undo<F>(state: &GameState, set_state: F) -> bool
where
    F: FnOnce(GameState),
{
    match undo_state(state) {
        Some(restored) => {
            set_state(restored);
            true
        }
        None => false,
    }
}
