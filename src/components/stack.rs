// src/components/stack.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// カードが置かれる場所の種類を示す Enum だよ。
/// 場札 (Tableau) は 7 列、組札 (Foundation) は 4 つ、山札 (Stock) と捨て札 (Waste) は 1 つずつ。
/// 何列目かは `CardPosition::pile_index` で持つ。
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PileType {
    Tableau,
    Foundation,
    Waste,
    Stock,
}

impl PileType {
    /// data 属性などから読んだ文字列を PileType に変換する。
    pub fn parse(name: &str) -> Option<PileType> {
        match name {
            "tableau" => Some(PileType::Tableau),
            "foundation" => Some(PileType::Foundation),
            "waste" => Some(PileType::Waste),
            "stock" => Some(PileType::Stock),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PileType::Tableau => "tableau",
            PileType::Foundation => "foundation",
            PileType::Waste => "waste",
            PileType::Stock => "stock",
        }
    }
}

impl fmt::Display for PileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// UI とエンジンの間でカードの場所を指す共通の座標だよ！📍
/// 移動・選択・ドラッグの API は全部これを使う。
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CardPosition {
    pub pile_type: PileType,
    pub pile_index: usize,
    pub card_index: usize,
}

impl CardPosition {
    pub fn new(pile_type: PileType, pile_index: usize, card_index: usize) -> Self {
        Self { pile_type, pile_index, card_index }
    }

    /// 移動先を指すとき用。card_index は使わないので 0。
    pub fn pile(pile_type: PileType, pile_index: usize) -> Self {
        Self::new(pile_type, pile_index, 0)
    }

    /// 同じ山を指しているか (card_index は無視)。
    pub fn same_pile(&self, other: &CardPosition) -> bool {
        self.pile_type == other.pile_type && self.pile_index == other.pile_index
    }
}
