// src/components/mod.rs

// 盤面と UI が共有するデータ型をここに集めるよ！
pub mod card;
pub mod stack;
pub mod game_state;
pub mod position;
pub mod dragging_info;

pub use card::{Card, Rank, Suit};
pub use dragging_info::{DragState, DropZone};
pub use game_state::{GameSettings, GameSnapshot, GameState, GameStats, HistoryEntry, Pile};
pub use position::{Confidence, ElementPosition, ElementPositions, Point, PositionResolution, PositionSource, Rect};
pub use stack::{CardPosition, PileType};
