// src/error.rs
//! エラー型をまとめるよ。エンジンの外には例外じゃなくて値として返す！

use thiserror::Error;

use crate::components::stack::PileType;

/// 手の検証・実行で起きる失敗。`to_string()` がそのまま UI に出すメッセージになる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no cards to move")]
    NoCards,
    #[error("invalid {pile_type} pile index {pile_index}")]
    InvalidPile { pile_type: PileType, pile_index: usize },
    #[error("cards do not match the top of the {0} pile")]
    CardsNotAtSource(PileType),
    #[error("cannot move face-down card {0}")]
    FaceDownCard(String),
    #[error("cards do not form a valid sequence")]
    InvalidSequence,
    #[error("source and destination are the same pile")]
    SamePile,
    #[error("cards cannot be moved onto the {0} pile")]
    InvalidDestination(PileType),
    #[error("only one card can move to a foundation at a time")]
    MultipleCardsToFoundation,
    #[error("{card} cannot be placed on {pile_type} {pile_index}")]
    IllegalPlacement { card: String, pile_type: PileType, pile_index: usize },
    #[error("stock and waste are both empty")]
    StockAndWasteEmpty,
    #[error("deck cycling limit reached ({0})")]
    CyclingLimitReached(u32),
    #[error("card {0} is not at a movable position")]
    CardNotMovable(String),
    #[error("no foundation accepts {0}")]
    NoFoundationTarget(String),
}

/// DOM を読んだときの失敗。位置検出の中で吸収されて、外には出ない。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("element is not attached to the document")]
    Detached,
    #[error("window or document is unavailable")]
    NoDocument,
    #[error("computed style unavailable: {0}")]
    ComputedStyle(String),
}

/// アニメーションの失敗。盤面には影響しない。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    #[error("unknown animation type: {0}")]
    UnknownType(String),
    #[error("failed to create animation overlay: {0}")]
    Overlay(String),
    #[error("failed to apply style {property}: {reason}")]
    Style { property: String, reason: String },
}

/// 保存まわりの失敗。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage access failed: {0}")]
    Access(String),
    #[error("failed to encode or decode saved data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// 効果音の再生の失敗。鳴らなくてもゲームは続く。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("audio service is not initialized")]
    NotInitialized,
    #[error("failed to play {cue}: {reason}")]
    Playback { cue: &'static str, reason: String },
}
