// src/app/init_handler.rs
//! GameApp の初期化まわり。ロガーの設置と、ブラウザ用のセッション・サービスを組み立てる。

use log::{info, warn, Level, LevelFilter, Log, Metadata, Record};

use crate::app::animation::Animator;
use crate::app::audio::{AudioService, HtmlAudioPlayer};
use crate::app::dom_probe::BrowserEnvironment;
use crate::app::drag_handler::{BrowserHitTester, DragController};
use crate::app::overlay::BrowserOverlayHost;
use crate::app::persistence::{GamePersistence, LocalStorageStore};
use crate::app::state_handler::GameSession;
use crate::error::AnimationError;

pub type BrowserSession = GameSession<LocalStorageStore, HtmlAudioPlayer>;
pub type BrowserAnimator = Animator<BrowserOverlayHost, BrowserEnvironment>;
pub type BrowserDragController = DragController<BrowserHitTester>;

/// `log` のレコードをブラウザのコンソールに流すロガー。
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}", record.level(), record.args());
        let line = wasm_bindgen::JsValue::from_str(&line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// ロガーを設置する。二回目以降はレベルだけ変える。
pub fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::set_max_level(level);
        return;
    }
    log::set_max_level(level);
    info!("App::Init: console logger installed (level={})", level);
}

/// 保存済みのゲームがあれば再開、無ければ `seed` で配ったセッションを作る。
pub(crate) fn create_session(seed: u32, now_ms: f64) -> BrowserSession {
    let persistence = GamePersistence::new(LocalStorageStore::from_window());
    let mut audio = AudioService::new(HtmlAudioPlayer, true);
    let loaded = audio.init();
    if loaded == 0 {
        warn!("App::Init: no sound cues could be loaded");
    }
    GameSession::restore_or_new(persistence, audio, seed, now_ms)
}

pub(crate) fn create_animator() -> Result<BrowserAnimator, AnimationError> {
    let host = BrowserOverlayHost::from_window()?;
    Ok(Animator::new(host, BrowserEnvironment))
}

pub(crate) fn create_drag_controller() -> Option<BrowserDragController> {
    let document = web_sys::window().and_then(|window| window.document())?;
    Some(DragController::new(BrowserHitTester::new(document)))
}
