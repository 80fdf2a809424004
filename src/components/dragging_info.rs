// src/components/dragging_info.rs

use serde::{Deserialize, Serialize};

use crate::components::card::Card;
use crate::components::position::Point;
use crate::components::stack::{CardPosition, PileType};

/// ドロップできる場所 (場札 7 列 + 組札 4 つ) を表すよ。
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct DropZone {
    pub pile_type: PileType,
    pub pile_index: usize,
}

impl DropZone {
    pub fn new(pile_type: PileType, pile_index: usize) -> Self {
        Self { pile_type, pile_index }
    }

    pub fn as_target(&self) -> CardPosition {
        CardPosition::pile(self.pile_type, self.pile_index)
    }
}

/// ドラッグ中の状態だよ！🖱️➡️🃏
///
/// 描画側はこれを読んで、指に追従するカードやスナップバックを描く。
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DragState {
    pub is_dragging: bool,
    pub dragged_cards: Vec<Card>,
    pub drag_source: Option<CardPosition>,
    /// ポインタ位置とカード中心とのずれ。
    pub drag_offset: Point,
    /// 今のポインタ位置。
    pub drag_position: Point,
    pub is_animating: bool,
    pub is_snap_back: bool,
}

impl DragState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// カードを描く位置 (中心)。
    pub fn card_center(&self) -> Point {
        Point::new(
            self.drag_position.x - self.drag_offset.x,
            self.drag_position.y - self.drag_offset.y,
        )
    }
}
