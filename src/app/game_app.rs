// src/app/game_app.rs
//! JS から使う窓口 (`GameApp`)。中身は `GameSession` と `DragController` と `Animator` に任せて、
//! ここでは JSON の出し入れとロックだけをする。

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Element;

use crate::app::animation::{AnimationOptions, AnimationType, CompleteCallback, ErrorCallback, SequenceItem};
use crate::app::browser_event_manager::{self, DragContext, DragListeners};
use crate::app::dom_probe::BrowserElement;
use crate::app::init_handler::{self, BrowserAnimator, BrowserDragController, BrowserSession};
use crate::app::state_getter;
use crate::components::card::Card;
use crate::components::game_state::{GameSettings, GameState};
use crate::components::position::Point;
use crate::components::stack::CardPosition;
use crate::error::MoveError;

/// `move_cards` などの返り値。`{ success, error, state }`。
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveResponse<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a GameState>,
}

fn parse_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| {
        let error_msg = format!("Failed to deserialize {}: {}. JSON: {}", what, e, json);
        error!("{}", error_msg);
        JsValue::from_str(&error_msg)
    })
}

fn random_seed() -> u32 {
    // Math.random() は [0, 1)
    (js_sys::Math::random() * f64::from(u32::MAX)) as u32
}

fn call_js(callback: &js_sys::Function, arg: Option<&str>) {
    let result = match arg {
        Some(message) => callback.call1(&JsValue::NULL, &JsValue::from_str(message)),
        None => callback.call0(&JsValue::NULL),
    };
    if let Err(e) = result {
        error!("JS callback threw: {:?}", e);
    }
}

// --- ゲーム全体のアプリケーション状態を管理する構造体 ---
#[wasm_bindgen]
pub struct GameApp {
    session: Arc<Mutex<BrowserSession>>,
    drag: Arc<Mutex<BrowserDragController>>,
    on_change: Arc<Mutex<Option<js_sys::Function>>>,
    // ドラッグ中だけ window に付けるリスナー
    listeners: DragListeners,
    // 位置検出とオーバーレイ。document が無ければ None で、animate は reject する
    animator: Option<Rc<BrowserAnimator>>,
}

// JS には出さない内部ヘルパー
impl GameApp {
    fn context(&self) -> DragContext {
        DragContext {
            session: Arc::clone(&self.session),
            drag: Arc::clone(&self.drag),
            on_change: Arc::clone(&self.on_change),
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut BrowserSession) -> R) -> Result<R, JsValue> {
        match self.session.lock() {
            Ok(mut session) => Ok(f(&mut session)),
            Err(e) => {
                let error_msg = format!("Failed to lock session: {}", e);
                error!("{}", error_msg);
                Err(JsValue::from_str(&error_msg))
            }
        }
    }

    fn with_drag<R>(&self, f: impl FnOnce(&mut BrowserDragController) -> R) -> Result<R, JsValue> {
        match self.drag.lock() {
            Ok(mut drag) => Ok(f(&mut drag)),
            Err(e) => {
                let error_msg = format!("Failed to lock drag controller: {}", e);
                error!("{}", error_msg);
                Err(JsValue::from_str(&error_msg))
            }
        }
    }

    /// 手の結果を `{ success, error, state }` にする。
    fn respond(&self, result: Result<(), MoveError>) -> Result<JsValue, JsValue> {
        let session = self.session.try_lock().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let response = match &result {
            Ok(()) => MoveResponse { success: true, error: None, state: Some(session.state()) },
            Err(e) => MoveResponse { success: false, error: Some(e.to_string()), state: None },
        };
        state_getter::to_json_value(&response, "move response")
    }
}

#[wasm_bindgen]
impl GameApp {
    /// 保存済みのゲームがあれば再開、無ければ `seed` (省略時はランダム) で配る。
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> Result<GameApp, JsValue> {
        info!("GameApp: 初期化中...");
        let seed = seed.unwrap_or_else(random_seed);
        let session = init_handler::create_session(seed, js_sys::Date::now());
        let drag = init_handler::create_drag_controller().ok_or("Failed to get document for drag controller")?;
        let animator = match init_handler::create_animator() {
            Ok(animator) => Some(Rc::new(animator)),
            Err(e) => {
                warn!("GameApp: animations disabled: {}", e);
                None
            }
        };
        info!("GameApp: 初期化完了。");
        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            drag: Arc::new(Mutex::new(drag)),
            on_change: Arc::new(Mutex::new(None)),
            listeners: DragListeners::default(),
            animator,
        })
    }

    /// 盤面・ドラッグ状態が listener 経由で変わった時に呼ばれる関数を登録する。
    pub fn set_on_change(&self, callback: Option<js_sys::Function>) {
        match self.on_change.lock() {
            Ok(mut guard) => *guard = callback,
            Err(e) => error!("Failed to lock on_change: {}", e),
        }
    }

    pub fn new_game(&self, seed: Option<u32>) -> Result<(), JsValue> {
        let seed = seed.unwrap_or_else(random_seed);
        self.with_session(|session| session.new_game(seed, js_sys::Date::now()))
    }

    pub fn get_state_json(&self) -> Result<JsValue, JsValue> {
        state_getter::get_game_state_json(&self.session)
    }

    pub fn get_stats_json(&self) -> Result<JsValue, JsValue> {
        state_getter::get_stats_json(&self.session)
    }

    /// `cards_json` は移動するカードの配列、`from_json` / `to_json` は CardPosition。
    pub fn move_cards(&self, from_json: &str, to_json: &str, cards_json: &str) -> Result<JsValue, JsValue> {
        let from: CardPosition = parse_json(from_json, "from position")?;
        let to: CardPosition = parse_json(to_json, "to position")?;
        let cards: Vec<Card> = parse_json(cards_json, "cards")?;
        let result = self.with_session(|session| session.move_cards(&from, &to, &cards, js_sys::Date::now()))?;
        self.respond(result)
    }

    pub fn flip_stock(&self) -> Result<JsValue, JsValue> {
        let result = self.with_session(|session| session.flip_stock(js_sys::Date::now()))?;
        self.respond(result)
    }

    /// ダブルクリックされたカードを組札へ送る。
    pub fn auto_move(&self, card_json: &str) -> Result<JsValue, JsValue> {
        let card: Card = parse_json(card_json, "card")?;
        let result = self.with_session(|session| session.auto_move(&card, js_sys::Date::now()))?;
        self.respond(result)
    }

    pub fn undo(&self) -> Result<bool, JsValue> {
        self.with_session(|session| session.undo(js_sys::Date::now()))
    }

    pub fn can_undo(&self) -> Result<bool, JsValue> {
        self.with_session(|session| session.can_undo())
    }

    pub fn select_cards(&self, position_json: &str) -> Result<JsValue, JsValue> {
        let position: CardPosition = parse_json(position_json, "position")?;
        let result = self.with_session(|session| session.select(&position))?;
        self.respond(result)
    }

    pub fn clear_selection(&self) -> Result<(), JsValue> {
        self.with_session(|session| session.clear_selection())
    }

    pub fn get_hint_json(&self) -> Result<JsValue, JsValue> {
        state_getter::get_hint_json(&self.session)
    }

    pub fn get_settings_json(&self) -> Result<JsValue, JsValue> {
        let session = self.session.try_lock().map_err(|e| JsValue::from_str(&e.to_string()))?;
        state_getter::to_json_value(session.settings(), "settings")
    }

    pub fn update_settings(&self, settings_json: &str) -> Result<(), JsValue> {
        let settings: GameSettings = parse_json(settings_json, "settings")?;
        self.with_session(|session| session.update_settings(settings))
    }

    // --- ドラッグ & ドロップ ---

    /// ドラッグ開始。受け付けたら window にリスナーを付けて true。
    ///
    /// `center_x` / `center_y` は掴んだカード要素の矩形の中心。
    pub fn start_drag(
        &self,
        cards_json: &str,
        source_json: &str,
        pointer_x: f64,
        pointer_y: f64,
        center_x: f64,
        center_y: f64,
    ) -> Result<bool, JsValue> {
        let cards: Vec<Card> = parse_json(cards_json, "dragged cards")?;
        let source: CardPosition = parse_json(source_json, "drag source")?;
        let started = self.with_drag(|drag| {
            drag.start_drag(
                cards,
                source,
                Point::new(pointer_x, pointer_y),
                Point::new(center_x, center_y),
                js_sys::Date::now(),
            )
        })?;
        if started {
            browser_event_manager::attach_drag_listeners(&self.context(), &self.listeners)?;
        }
        Ok(started)
    }

    pub fn update_drag(&self, pointer_x: f64, pointer_y: f64) -> Result<(), JsValue> {
        self.with_drag(|drag| drag.update_drag(Point::new(pointer_x, pointer_y), js_sys::Date::now()))
    }

    /// ドロップ。手が受理されたら true、スナップバックなら false。
    pub fn end_drag(&self, pointer_x: f64, pointer_y: f64) -> Result<bool, JsValue> {
        let outcome =
            browser_event_manager::end_drag(&self.context(), Some(Point::new(pointer_x, pointer_y)));
        browser_event_manager::detach_drag_listeners(&self.listeners)?;
        Ok(matches!(outcome, crate::app::drag_handler::DragOutcome::Accepted { .. }))
    }

    pub fn cancel_drag(&self) -> Result<(), JsValue> {
        browser_event_manager::cancel_drag(&self.context());
        browser_event_manager::detach_drag_listeners(&self.listeners)
    }

    pub fn get_drag_state_json(&self) -> Result<JsValue, JsValue> {
        state_getter::get_drag_state_json(&self.drag)
    }

    // --- アニメーション ---

    /// `from` の見た目を `to` の位置まで飛ばす。Promise は必ず resolve か reject する。
    ///
    /// `type_name` は "move" / "flip" / "shuffle"。`card_json` は flip の時に元のカードの向きを見るため。
    #[allow(clippy::too_many_arguments)]
    pub fn animate(
        &self,
        from: Element,
        to: Element,
        type_name: &str,
        duration_ms: Option<u32>,
        card_json: Option<String>,
        on_complete: Option<js_sys::Function>,
        on_error: Option<js_sys::Function>,
    ) -> js_sys::Promise {
        let mut options = match AnimationOptions::named(type_name) {
            Ok(options) => options,
            Err(e) => {
                let message = e.to_string();
                warn!("[Animation] {}", message);
                if let Some(callback) = &on_error {
                    call_js(callback, Some(&message));
                }
                return js_sys::Promise::reject(&JsValue::from_str(&message));
            }
        };
        if let Some(duration_ms) = duration_ms {
            options = options.with_duration(duration_ms);
        }
        if let Some(json) = card_json.as_deref() {
            match parse_json::<Card>(json, "card") {
                Ok(card) => options = options.with_card(card),
                Err(e) => {
                    if let Some(callback) = &on_error {
                        call_js(callback, e.as_string().as_deref());
                    }
                    return js_sys::Promise::reject(&e);
                }
            }
        }
        if let Some(callback) = on_complete {
            options = options.on_complete(move || call_js(&callback, None));
        }
        if let Some(callback) = on_error {
            options = options.on_error(move |message| call_js(&callback, Some(&message)));
        }

        let Some(animator) = self.animator.clone() else {
            return js_sys::Promise::reject(&JsValue::from_str("animations are unavailable"));
        };
        future_to_promise(async move {
            let (from, to) = (BrowserElement::new(from), BrowserElement::new(to));
            animator
                .animate_element(&from, &to, options)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    /// `froms[i]` → `tos[i]` を `stagger_ms` ずつずらして同時に飛ばす。
    /// 結果は `{ completed, failed }` の JSON で resolve する。要素でないものが混ざっていたら reject。
    #[allow(clippy::too_many_arguments)]
    pub fn animate_sequence(
        &self,
        froms: js_sys::Array,
        tos: js_sys::Array,
        type_name: &str,
        duration_ms: Option<u32>,
        stagger_ms: u32,
        on_complete: Option<js_sys::Function>,
        on_error: Option<js_sys::Function>,
    ) -> js_sys::Promise {
        let reject = |message: String| {
            warn!("[Animation] {}", message);
            if let Some(callback) = &on_error {
                call_js(callback, Some(&message));
            }
            js_sys::Promise::reject(&JsValue::from_str(&message))
        };
        let animation_type: AnimationType = match type_name.parse() {
            Ok(animation_type) => animation_type,
            Err(e) => return reject(e.to_string()),
        };
        if froms.length() != tos.length() {
            return reject(format!("sequence length mismatch: {} from vs {} to", froms.length(), tos.length()));
        }
        let mut pairs: Vec<(BrowserElement, BrowserElement)> = Vec::with_capacity(froms.length() as usize);
        for (index, (from, to)) in froms.iter().zip(tos.iter()).enumerate() {
            match (from.dyn_into::<Element>(), to.dyn_into::<Element>()) {
                (Ok(from), Ok(to)) => pairs.push((BrowserElement::new(from), BrowserElement::new(to))),
                _ => return reject(format!("sequence item {} is not a pair of elements", index)),
            }
        }
        let Some(animator) = self.animator.clone() else {
            return reject("animations are unavailable".to_string());
        };
        let on_complete = on_complete.map(|callback| Box::new(move || call_js(&callback, None)) as CompleteCallback);
        let on_error = on_error
            .map(|callback| Box::new(move |message: String| call_js(&callback, Some(&message))) as ErrorCallback);

        future_to_promise(async move {
            let items = pairs
                .iter()
                .map(|(from, to)| {
                    let mut options = AnimationOptions::new(animation_type);
                    if let Some(duration_ms) = duration_ms {
                        options = options.with_duration(duration_ms);
                    }
                    SequenceItem { from, to, options }
                })
                .collect();
            let report = animator.animate_element_sequence(items, stagger_ms, on_complete, on_error).await;
            state_getter::to_json_value(&report, "sequence report")
        })
    }
}
