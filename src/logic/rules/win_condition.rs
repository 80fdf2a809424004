//! ゲームの勝利条件判定ロジックを定義するよ。

use crate::components::game_state::{Pile, FOUNDATION_PILE_COUNT};

/// 4 つの組札が全部 13 枚ずつになったらクリア！🏆
pub fn check_win_condition(foundation_piles: &[Pile]) -> bool {
    foundation_piles.len() == FOUNDATION_PILE_COUNT && foundation_piles.iter().all(|pile| pile.len() == 13)
}
