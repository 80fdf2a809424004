// src/logic/mod.rs
//! ゲームのルールと盤面の計算をまとめるモジュール。DOM には一切触らない純粋な世界だよ！

pub mod auto_move;
pub mod deck;
pub mod hint;
pub mod history;
pub mod rules;
pub mod selection;
