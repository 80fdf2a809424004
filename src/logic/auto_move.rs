// src/logic/auto_move.rs
//! カードの自動移動に関するロジックをまとめるモジュールだよ！🪄✨
//! ダブルクリックされたカードを組札に送ったり、設定が ON なら手が終わるたびに送れるカードを探したりする。

use log::{debug, info};

use crate::components::card::Card;
use crate::components::game_state::GameState;
use crate::components::stack::{CardPosition, PileType};
use crate::error::MoveError;
use crate::logic::rules::{self, MoveResult};

/// カードが「一番上にあって動かせる場所」にあれば、その座標を返す。
///
/// 見る順番は 捨て札の一番上 → 場札 0..6 の一番上。組札にあるカードはもう「家」にいるので対象外。
pub fn locate_movable_top_card(state: &GameState, card: &Card) -> Option<CardPosition> {
    if let Some(top) = state.waste_pile.last() {
        if top.id == card.id {
            return Some(CardPosition::new(PileType::Waste, 0, state.waste_pile.len() - 1));
        }
    }
    state.tableau_piles.iter().enumerate().find_map(|(pile_index, pile)| {
        pile.last()
            .filter(|top| top.id == card.id && top.is_face_up)
            .map(|_| CardPosition::new(PileType::Tableau, pile_index, pile.len() - 1))
    })
}

/// 指定されたカードを受け入れられる組札を 4 つ全部から探す。
pub fn find_automatic_foundation_move(state: &GameState, card: &Card) -> Option<usize> {
    state
        .foundation_piles
        .iter()
        .position(|pile| rules::can_place_on_foundation(card, pile))
}

/// カードを組札へ自動で送るよ！ 実際の移動は `validate_and_execute_move` に任せる。
pub fn auto_move_to_foundation(state: &GameState, card: &Card) -> MoveResult {
    debug!("[AutoMove] trying {}", card);
    let from = locate_movable_top_card(state, card).ok_or_else(|| MoveError::CardNotMovable(card.label()))?;

    let current = state
        .pile(from.pile_type, from.pile_index)
        .and_then(|pile| pile.last())
        .cloned()
        .ok_or_else(|| MoveError::CardNotMovable(card.label()))?;
    let foundation_index =
        find_automatic_foundation_move(state, &current).ok_or_else(|| MoveError::NoFoundationTarget(card.label()))?;

    info!("[AutoMove] {} -> foundation {}", current, foundation_index);
    rules::validate_and_execute_move(
        state,
        &from,
        &CardPosition::pile(PileType::Foundation, foundation_index),
        &[current],
    )
}

/// 今すぐ組札に送れるカードを一枚探す (捨て札が先、次に場札)。自動移動の掃除用。
pub fn find_auto_move_candidate(state: &GameState) -> Option<Card> {
    state
        .waste_pile
        .last()
        .into_iter()
        .chain(state.tableau_piles.iter().filter_map(|pile| pile.last()))
        .filter(|card| card.is_face_up)
        .find(|card| find_automatic_foundation_move(state, card).is_some())
        .cloned()
}
