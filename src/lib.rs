// src/lib.rs

// WASM と JavaScript を繋ぐための基本！
use wasm_bindgen::prelude::*;

// 自分で作ったモジュールたち！ これでコードを整理してるんだ。
pub mod app; // ブラウザとつなぐ部分 (GameApp, ドラッグ, アニメーション, 保存, 効果音)
pub mod components; // 盤面のデータ型
pub mod config; // 定数
pub mod error; // エラー型
pub mod logic; // ソリティアのルール (純粋関数)

pub use app::game_app::GameApp;

// main 関数の代わりに、Wasm がロードされた時に最初に実行される関数だよ。
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    app::init_handler::init_logging(level);
}
