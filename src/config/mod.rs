// src/config/mod.rs
//! 定数を置く場所。

pub mod game;
pub mod layout;
