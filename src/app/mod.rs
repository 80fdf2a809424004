// src/app/mod.rs
//! ブラウザ側のロジックを役割ごとに分割して置くモジュールだよ！
//! logic (純粋なルール) と JS の間をつなぐ。

pub mod animation;
pub mod audio;
pub mod browser_event_manager;
pub mod dom_probe;
pub mod drag_handler;
pub mod game_app;
pub mod init_handler;
pub mod overlay;
pub mod persistence;
pub mod position_detector;
pub mod state_getter;
pub mod state_handler;
