// src/app/state_getter.rs
//! Gets the current session/drag state and converts it to JSON for the UI.

use std::sync::{Arc, Mutex};

use log::{debug, error};
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::app::audio::CuePlayer;
use crate::app::drag_handler::{DragController, HitTester};
use crate::app::persistence::KeyValueStore;
use crate::app::state_handler::GameSession;

/// 値を JSON 文字列にして JsValue で返す。
pub(crate) fn to_json_value<T: Serialize>(value: &T, what: &str) -> Result<JsValue, JsValue> {
    match serde_json::to_string(value) {
        Ok(json_string) => Ok(JsValue::from_str(&json_string)),
        Err(e) => {
            let error_msg = format!("Failed to serialize {}: {}", what, e);
            error!("{}", error_msg);
            Err(JsValue::from_str(&error_msg))
        }
    }
}

fn lock_error(what: &str, e: impl std::fmt::Display) -> JsValue {
    let error_msg = format!("Failed to lock {} for reading: {}", what, e);
    error!("{}", error_msg);
    JsValue::from_str(&error_msg)
}

/// 盤面全体を JSON で返す。描画側はこれだけ見れば描ける。
pub fn get_game_state_json<S, P>(session_arc: &Arc<Mutex<GameSession<S, P>>>) -> Result<JsValue, JsValue>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    let session = session_arc.try_lock().map_err(|e| lock_error("session", e))?;
    debug!("Getting game state (moves={})", session.state().moves);
    to_json_value(session.state(), "game state")
}

pub fn get_stats_json<S, P>(session_arc: &Arc<Mutex<GameSession<S, P>>>) -> Result<JsValue, JsValue>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    let session = session_arc.try_lock().map_err(|e| lock_error("session", e))?;
    to_json_value(session.stats(), "stats")
}

/// ヒントを JSON で返す。ヒントが無ければ `null`。
pub fn get_hint_json<S, P>(session_arc: &Arc<Mutex<GameSession<S, P>>>) -> Result<JsValue, JsValue>
where
    S: KeyValueStore,
    P: CuePlayer,
{
    let session = session_arc.try_lock().map_err(|e| lock_error("session", e))?;
    to_json_value(&session.hint(), "hint")
}

/// ドラッグの状態 (掴んでいるカード、位置、スナップバック中か) とホバー中のゾーン。
pub fn get_drag_state_json<H: HitTester>(drag_arc: &Arc<Mutex<DragController<H>>>) -> Result<JsValue, JsValue> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct DragView<'a> {
        #[serde(flatten)]
        state: &'a crate::components::dragging_info::DragState,
        hovered_zone: Option<crate::components::dragging_info::DropZone>,
    }

    let drag = drag_arc.try_lock().map_err(|e| lock_error("drag controller", e))?;
    to_json_value(&DragView { state: drag.state(), hovered_zone: drag.hovered_zone() }, "drag state")
}
