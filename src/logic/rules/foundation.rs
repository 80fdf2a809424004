//! 組札 (Foundation) へのカード移動ルールを定義するよ。

use log::trace;

use crate::components::card::{Card, Rank};
use crate::components::game_state::GameState;
use super::common::{foundation_index_for_suit, top_card};

/// 指定されたカードが、組札の一番上に置けるかチェックする。
///
/// 空なら A だけ。カードがあれば同じスートで一つ上のランクだけ。
pub fn can_place_on_foundation(card: &Card, target_pile: &[Card]) -> bool {
    let result = match top_card(target_pile) {
        None => card.rank == Rank::Ace,
        Some(top) => card.suit == top.suit && card.rank.value() == top.rank.value() + 1,
    };
    trace!("[Foundation Rule] {} onto {:?} -> {}", card, target_pile.last().map(Card::label), result);
    result
}

/// カードを置ける組札のインデックスを探す。
///
/// 組札はスートで場所が決まっているので (❤️=0, ♦️=1, ♣️=2, ♠️=3)、見るのはそこだけ。
pub fn find_valid_foundation_pile(card: &Card, state: &GameState) -> Option<usize> {
    let index = foundation_index_for_suit(card.suit);
    let pile = state.foundation_piles.get(index)?;
    can_place_on_foundation(card, pile).then_some(index)
}
