// src/logic/hint.rs
//! ヒント機能 💡 次に打てる「意味のある手」を一つだけ探す。
//!
//! 優先順位:
//! 1. 組札に送れるカード
//! 2. 捨て札から場札へ
//! 3. 場札の列を移して裏向きのカードをめくれる (または列を空けられる) 手
//! 4. どれも無ければ山札をめくる

use serde::Serialize;

use crate::components::card::{Card, Rank};
use crate::components::game_state::GameState;
use crate::components::stack::{CardPosition, PileType};
use crate::logic::rules::{
    can_place_on_tableau, cycling_limit_reached, find_valid_foundation_pile, get_movable_cards_from_tableau,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Hint {
    Move { from: CardPosition, to: CardPosition, cards: Vec<Card> },
    DrawFromStock,
}

pub fn find_hint(state: &GameState) -> Option<Hint> {
    find_foundation_hint(state)
        .or_else(|| find_waste_to_tableau_hint(state))
        .or_else(|| find_tableau_hint(state))
        .or_else(|| find_draw_hint(state))
}

/// 捨て札と場札の一番上から、各ソース位置を列挙する。
fn top_sources(state: &GameState) -> impl Iterator<Item = (CardPosition, &Card)> {
    let waste = state
        .waste_pile
        .last()
        .map(|card| (CardPosition::new(PileType::Waste, 0, state.waste_pile.len() - 1), card));
    let tableau = state.tableau_piles.iter().enumerate().filter_map(|(index, pile)| {
        pile.last()
            .filter(|card| card.is_face_up)
            .map(|card| (CardPosition::new(PileType::Tableau, index, pile.len() - 1), card))
    });
    waste.into_iter().chain(tableau)
}

fn find_foundation_hint(state: &GameState) -> Option<Hint> {
    top_sources(state).find_map(|(from, card)| {
        find_valid_foundation_pile(card, state).map(|index| Hint::Move {
            from,
            to: CardPosition::new(PileType::Foundation, index, state.foundation_piles[index].len()),
            cards: vec![card.clone()],
        })
    })
}

fn tableau_target(state: &GameState, card: &Card, skip: Option<usize>) -> Option<CardPosition> {
    state
        .tableau_piles
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .find(|(_, pile)| can_place_on_tableau(card, pile))
        .map(|(index, pile)| CardPosition::new(PileType::Tableau, index, pile.len()))
}

fn find_waste_to_tableau_hint(state: &GameState) -> Option<Hint> {
    let card = state.waste_pile.last()?;
    let to = tableau_target(state, card, None)?;
    Some(Hint::Move {
        from: CardPosition::new(PileType::Waste, 0, state.waste_pile.len() - 1),
        to,
        cards: vec![card.clone()],
    })
}

fn find_tableau_hint(state: &GameState) -> Option<Hint> {
    state.tableau_piles.iter().enumerate().find_map(|(index, pile)| {
        let start = pile.iter().position(|card| card.is_face_up)?;
        let run = get_movable_cards_from_tableau(pile, start);
        let lead = run.first()?;
        // 一番下にいる K を空き列に動かしても何も変わらない
        if start == 0 && lead.rank == Rank::King {
            return None;
        }
        let to = tableau_target(state, lead, Some(index))?;
        Some(Hint::Move { from: CardPosition::new(PileType::Tableau, index, start), to, cards: run })
    })
}

fn find_draw_hint(state: &GameState) -> Option<Hint> {
    let can_recycle = !state.waste_pile.is_empty()
        && !cycling_limit_reached(state.settings.deck_cycling_limit, state.stock_cycles);
    (!state.stock_pile.is_empty() || can_recycle).then_some(Hint::DrawFromStock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::card::Suit;
    use crate::components::game_state::{GameSettings, GameStats};

    fn up(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank).face_up()
    }

    fn state() -> GameState {
        GameState::empty(GameSettings::default(), GameStats::default())
    }

    #[test]
    fn foundation_moves_come_first() {
        let mut state = state();
        state.waste_pile = vec![up(Suit::Hearts, Rank::Queen)];
        state.tableau_piles[0] = vec![up(Suit::Spades, Rank::King)];
        state.tableau_piles[2] = vec![up(Suit::Clubs, Rank::Ace)];

        match find_hint(&state) {
            Some(Hint::Move { from, to, cards }) => {
                assert_eq!(from, CardPosition::new(PileType::Tableau, 2, 0));
                assert_eq!(to.pile_type, PileType::Foundation);
                assert_eq!(to.pile_index, 2);
                assert_eq!(cards[0].id, "clubs-1");
            }
            other => panic!("unexpected hint: {:?}", other),
        }
    }

    #[test]
    fn waste_to_tableau_before_tableau_runs() {
        let mut state = state();
        state.waste_pile = vec![up(Suit::Hearts, Rank::Queen)];
        state.tableau_piles[0] = vec![up(Suit::Spades, Rank::King)];
        let hint = find_hint(&state).unwrap();
        assert_eq!(
            hint,
            Hint::Move {
                from: CardPosition::new(PileType::Waste, 0, 0),
                to: CardPosition::new(PileType::Tableau, 0, 1),
                cards: vec![up(Suit::Hearts, Rank::Queen)],
            }
        );
    }

    #[test]
    fn tableau_run_that_reveals_a_card() {
        let mut state = state();
        state.tableau_piles[1] = vec![Card::new(Suit::Diamonds, Rank::Four), up(Suit::Hearts, Rank::Queen)];
        state.tableau_piles[5] = vec![up(Suit::Clubs, Rank::King)];
        match find_hint(&state) {
            Some(Hint::Move { from, to, .. }) => {
                assert_eq!(from, CardPosition::new(PileType::Tableau, 1, 1));
                assert_eq!(to.pile_index, 5);
            }
            other => panic!("unexpected hint: {:?}", other),
        }
    }

    #[test]
    fn bottom_king_is_never_shuffled_around() {
        let mut state = state();
        state.tableau_piles[0] = vec![up(Suit::Spades, Rank::King)];
        assert_eq!(find_hint(&state), None);

        state.stock_pile = vec![Card::new(Suit::Hearts, Rank::Two)];
        assert_eq!(find_hint(&state), Some(Hint::DrawFromStock));
    }

    #[test]
    fn no_draw_hint_when_cycling_limit_reached() {
        let mut state = state();
        state.settings.deck_cycling_limit = 1;
        state.stock_cycles = 1;
        state.waste_pile = vec![up(Suit::Hearts, Rank::Nine)];
        assert_eq!(find_hint(&state), None);
    }
}
