//! 山札 (Stock) と捨て札 (Waste) に関するルールを定義するよ。

use log::{debug, info};

use crate::components::game_state::GameState;
use crate::error::MoveError;
use super::draggable::update_draggable;
use super::move_validation::MoveResult;

/// ストック（山札）からウェスト（捨て札）にカードを配れるかチェックする。
pub fn can_deal_from_stock(stock_is_empty: bool) -> bool {
    !stock_is_empty
}

/// ストックが空のときに、ウェストからストックにカードを戻せるかチェックする。
pub fn can_reset_stock_from_waste(stock_is_empty: bool, waste_is_empty: bool) -> bool {
    stock_is_empty && !waste_is_empty
}

/// 戻せる回数の上限に達しているか。上限 0 は無制限。
pub fn cycling_limit_reached(deck_cycling_limit: u32, stock_cycles: u32) -> bool {
    deck_cycling_limit > 0 && stock_cycles >= deck_cycling_limit
}

/// 山札をクリックした時の処理だよ！
///
/// - 山札にカードがあれば、一番上の 1 枚を表にして捨て札の上へ。
///   (設定の `draw_count` に関係なく今は常に 1 枚)
/// - 山札が空なら、捨て札を全部裏返して順番を逆にして山札へ戻す。`stock_cycles` が 1 増える。
/// - どちらも空、または戻せる回数の上限なら失敗。
pub fn flip_stock(state: &GameState) -> MoveResult {
    let stock_is_empty = state.stock_pile.is_empty();
    let waste_is_empty = state.waste_pile.is_empty();
    let mut next = state.clone();

    if can_deal_from_stock(stock_is_empty) {
        if let Some(card) = next.stock_pile.pop() {
            debug!("[Stock] drew {}", card);
            next.waste_pile.push(card.face_up());
        }
    } else if !can_reset_stock_from_waste(stock_is_empty, waste_is_empty) {
        return Err(MoveError::StockAndWasteEmpty);
    } else if cycling_limit_reached(state.settings.deck_cycling_limit, state.stock_cycles) {
        return Err(MoveError::CyclingLimitReached(state.settings.deck_cycling_limit));
    } else {
        let recycled: Vec<_> = next.waste_pile.drain(..).rev().map(|card| card.face_down()).collect();
        info!("[Stock] recycled {} waste cards (cycle {})", recycled.len(), next.stock_cycles + 1);
        next.stock_pile = recycled;
        next.stock_cycles += 1;
    }

    next.moves += 1;
    update_draggable(&mut next);
    next.clear_selection();
    Ok(next)
}
