//! `draggable` フラグを盤面から計算し直すよ。フラグは意図じゃなくて結果！

use crate::components::game_state::{GameState, Pile};
use super::tableau::get_movable_cards_from_tableau;

/// 全部の山の全部のカードについて `draggable` を付け直す。
///
/// - 場札: そこから末尾までが正しい表向きの列なら掴める
/// - 捨て札・組札: 一番上だけ
/// - 山札: 掴めない (クリックでめくる)
pub fn update_draggable(state: &mut GameState) {
    for pile in state.tableau_piles.iter_mut() {
        let flags: Vec<bool> = (0..pile.len())
            .map(|index| !get_movable_cards_from_tableau(pile, index).is_empty())
            .collect();
        for (card, draggable) in pile.iter_mut().zip(flags) {
            card.draggable = draggable;
        }
    }
    for pile in state.foundation_piles.iter_mut() {
        mark_top_only(pile);
    }
    mark_top_only(&mut state.waste_pile);
    for card in state.stock_pile.iter_mut() {
        card.draggable = false;
    }
}

fn mark_top_only(pile: &mut Pile) {
    let last = pile.len().saturating_sub(1);
    for (index, card) in pile.iter_mut().enumerate() {
        card.draggable = index == last && card.is_face_up;
    }
}
