//! 場札 (Tableau) へのカード移動ルールを定義するよ。

use itertools::Itertools;
use log::trace;

use crate::components::card::{Card, Rank};
use super::common::{top_card, CardColor};

/// 指定されたカードが、場札の一番上に置けるかチェックする。
///
/// 空の列には K だけ。カードがある列には「色違いでランクが一つ下」のカードだけ。
pub fn can_place_on_tableau(card: &Card, target_pile: &[Card]) -> bool {
    let result = match top_card(target_pile) {
        None => card.rank == Rank::King,
        Some(top) => {
            let colors_different = CardColor::of(card) != CardColor::of(top);
            let rank_is_one_less = card.rank.value() + 1 == top.rank.value();
            colors_different && rank_is_one_less
        }
    };
    trace!("[Tableau Rule] {} onto {:?} -> {}", card, target_pile.last().map(Card::label), result);
    result
}

/// 連続するカードが「色が交互」かつ「ランクがちょうど 1 ずつ下がる」列になっているか。
/// 1 枚や空の列は常に OK。
pub fn is_valid_card_sequence(cards: &[Card]) -> bool {
    cards.iter().tuple_windows().all(|(upper, lower)| {
        CardColor::of(upper) != CardColor::of(lower) && lower.rank.value() + 1 == upper.rank.value()
    })
}

/// `start_index` から末尾までの表向きの列を返す。
///
/// 途中に裏向きが混ざっていたり、列が正しく並んでいなかったら空 (一部だけ選ぶことはしない)。
pub fn get_movable_cards_from_tableau(pile: &[Card], start_index: usize) -> Vec<Card> {
    let Some(run) = pile.get(start_index..) else {
        return Vec::new();
    };
    if run.is_empty() || !run.iter().all(|card| card.is_face_up) || !is_valid_card_sequence(run) {
        return Vec::new();
    }
    run.to_vec()
}
