// src/logic/rules/move_validation.rs
//! カード移動の検証と実行をまとめて行う。盤面を変えていいのはここだけ！

use log::{debug, info};

use crate::components::card::Card;
use crate::components::game_state::GameState;
use crate::components::stack::{CardPosition, PileType};
use crate::config::game::{FOUNDATION_MOVE_POINTS, WASTE_TO_TABLEAU_POINTS};
use crate::error::MoveError;
use super::common::foundation_index_for_suit;
use super::draggable::update_draggable;
use super::foundation::can_place_on_foundation;
use super::tableau::{can_place_on_tableau, is_valid_card_sequence};
use super::win_condition::check_win_condition;

/// 手の結果。成功なら新しい盤面、失敗なら理由。元の盤面はどちらでも変わらない。
pub type MoveResult = Result<GameState, MoveError>;

/// 一手分のスコア。
///
/// 組札に乗れば +10、捨て札から場札なら +5、複数枚をまとめて動かしたら +(枚数-1)。
pub fn score_for_move(from: PileType, to: PileType, count: usize) -> i32 {
    let mut score = 0;
    if to == PileType::Foundation {
        score += FOUNDATION_MOVE_POINTS;
    }
    if from == PileType::Waste && to == PileType::Tableau {
        score += WASTE_TO_TABLEAU_POINTS;
    }
    if count > 1 {
        score += i32::try_from(count - 1).unwrap_or(i32::MAX);
    }
    score
}

/// カードの移動を検証して、OK なら実行した新しい盤面を返すよ！
///
/// # 処理の流れ
/// 1. `cards` が空なら即却下
/// 2. 盤面を丸ごとコピー (失敗しても呼び出し元の盤面は無傷)
/// 3. `cards` が移動元の山の末尾と ID・順番まで一致するか確認 (古い UI 状態対策)
/// 4. 移動先のルールチェック。組札の場合はスートで決まる正しい組札に差し替える
/// 5. 移動元を切り詰め、場札で裏向きのカードが一番上に出たら表にする。移動先には表向きで積む
/// 6. 手数・スコア・クリア判定を更新
/// 7. `draggable` を全部計算し直す
/// 8. 選択状態をクリア
pub fn validate_and_execute_move(
    state: &GameState,
    from: &CardPosition,
    to: &CardPosition,
    cards: &[Card],
) -> MoveResult {
    // --- 1. 空チェック ---
    let first_card = cards.first().ok_or(MoveError::NoCards)?;
    debug!("[Move] {} card(s) from {:?} to {:?}", cards.len(), from, to);

    // --- 2. 盤面をコピー ---
    let mut next = state.clone();

    // --- 3. 移動元の末尾と照合 ---
    let source = next
        .pile(from.pile_type, from.pile_index)
        .ok_or(MoveError::InvalidPile { pile_type: from.pile_type, pile_index: from.pile_index })?;
    let split_at = source
        .len()
        .checked_sub(cards.len())
        .ok_or(MoveError::CardsNotAtSource(from.pile_type))?;
    let tail = &source[split_at..];
    if tail.iter().zip(cards).any(|(actual, requested)| actual.id != requested.id) {
        return Err(MoveError::CardsNotAtSource(from.pile_type));
    }
    if let Some(hidden) = tail.iter().find(|card| !card.is_face_up) {
        return Err(MoveError::FaceDownCard(hidden.label()));
    }
    if cards.len() > 1 && !is_valid_card_sequence(tail) {
        return Err(MoveError::InvalidSequence);
    }
    let moving: Vec<Card> = tail.to_vec();

    // --- 4. 移動先のルールチェック ---
    let destination = resolve_destination(&next, from, to, first_card, moving.len())?;

    // --- 5. 実行！ ---
    if let Some(source) = next.pile_mut(from.pile_type, from.pile_index) {
        source.truncate(split_at);
        if from.pile_type == PileType::Tableau {
            if let Some(top) = source.last_mut() {
                if !top.is_face_up {
                    *top = top.face_up();
                }
            }
        }
    }
    let target = next
        .pile_mut(destination.pile_type, destination.pile_index)
        .ok_or(MoveError::InvalidPile { pile_type: destination.pile_type, pile_index: destination.pile_index })?;
    target.extend(moving.iter().map(Card::face_up));

    // --- 6. カウンタ更新 ---
    next.moves += 1;
    next.score += score_for_move(from.pile_type, destination.pile_type, moving.len());
    next.is_game_won = check_win_condition(&next.foundation_piles);

    // --- 7, 8. 派生フラグと選択状態 ---
    update_draggable(&mut next);
    next.clear_selection();

    info!(
        "[Move] accepted: {} x{} {:?}({}) -> {:?}({}) score={} won={}",
        first_card,
        moving.len(),
        from.pile_type,
        from.pile_index,
        destination.pile_type,
        destination.pile_index,
        next.score,
        next.is_game_won
    );
    Ok(next)
}

/// 移動先が合法か調べて、実際に積む場所を返す。
fn resolve_destination(
    state: &GameState,
    from: &CardPosition,
    to: &CardPosition,
    first_card: &Card,
    count: usize,
) -> Result<CardPosition, MoveError> {
    match to.pile_type {
        PileType::Tableau => {
            if from.same_pile(to) {
                return Err(MoveError::SamePile);
            }
            let target = state
                .pile(PileType::Tableau, to.pile_index)
                .ok_or(MoveError::InvalidPile { pile_type: PileType::Tableau, pile_index: to.pile_index })?;
            if !can_place_on_tableau(first_card, target) {
                return Err(MoveError::IllegalPlacement {
                    card: first_card.label(),
                    pile_type: PileType::Tableau,
                    pile_index: to.pile_index,
                });
            }
            Ok(CardPosition::pile(PileType::Tableau, to.pile_index))
        }
        PileType::Foundation => {
            if count != 1 {
                return Err(MoveError::MultipleCardsToFoundation);
            }
            // 呼び出し元の番号は参考程度。スートで決まる組札に差し替える。
            let index = foundation_index_for_suit(first_card.suit);
            if from.pile_type == PileType::Foundation && from.pile_index == index {
                return Err(MoveError::SamePile);
            }
            let target = state
                .pile(PileType::Foundation, index)
                .ok_or(MoveError::InvalidPile { pile_type: PileType::Foundation, pile_index: index })?;
            if !can_place_on_foundation(first_card, target) {
                return Err(MoveError::IllegalPlacement {
                    card: first_card.label(),
                    pile_type: PileType::Foundation,
                    pile_index: index,
                });
            }
            if index != to.pile_index {
                debug!("[Move] foundation target redirected {} -> {}", to.pile_index, index);
            }
            Ok(CardPosition::pile(PileType::Foundation, index))
        }
        PileType::Waste | PileType::Stock => Err(MoveError::InvalidDestination(to.pile_type)),
    }
}
