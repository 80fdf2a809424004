// src/logic/selection.rs
//! クリックでカードを選ぶ (選択状態) ロジック。👆
//! 選べるのは「そこから動かせるカード」だけ。場札なら正しい列、捨て札と組札なら一番上。

use log::debug;

use crate::components::card::Card;
use crate::components::game_state::GameState;
use crate::components::stack::{CardPosition, PileType};
use crate::error::MoveError;
use crate::logic::rules::get_movable_cards_from_tableau;

/// `position` から動かせるカード列を返す。動かせなければ理由付きで失敗。
pub fn movable_cards_at(state: &GameState, position: &CardPosition) -> Result<Vec<Card>, MoveError> {
    let pile = state.pile(position.pile_type, position.pile_index).ok_or(MoveError::InvalidPile {
        pile_type: position.pile_type,
        pile_index: position.pile_index,
    })?;
    let card = pile
        .get(position.card_index)
        .ok_or(MoveError::CardsNotAtSource(position.pile_type))?;
    if !card.is_face_up {
        return Err(MoveError::FaceDownCard(card.label()));
    }

    match position.pile_type {
        PileType::Tableau => {
            let run = get_movable_cards_from_tableau(pile, position.card_index);
            if run.is_empty() {
                return Err(MoveError::InvalidSequence);
            }
            Ok(run)
        }
        PileType::Waste | PileType::Foundation if position.card_index + 1 == pile.len() => Ok(vec![card.clone()]),
        _ => Err(MoveError::CardNotMovable(card.label())),
    }
}

/// カードを選択した新しい盤面を返す。
pub fn select_cards(state: &GameState, position: &CardPosition) -> Result<GameState, MoveError> {
    let cards = movable_cards_at(state, position)?;
    debug!("[Select] {} card(s) at {:?}", cards.len(), position);
    let mut next = state.clone();
    next.selected_cards = cards;
    next.selected_pile_type = Some(position.pile_type);
    next.selected_pile_index = Some(position.pile_index);
    Ok(next)
}

pub fn clear_selection(state: &GameState) -> GameState {
    let mut next = state.clone();
    next.clear_selection();
    next
}

/// 今選択中のカードの元の座標。選択がなければ None。
pub fn selection_source(state: &GameState) -> Option<CardPosition> {
    let pile_type = state.selected_pile_type?;
    let pile_index = state.selected_pile_index?;
    let pile = state.pile(pile_type, pile_index)?;
    let card_index = pile.len().checked_sub(state.selected_cards.len())?;
    state.has_selection().then(|| CardPosition::new(pile_type, pile_index, card_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::card::{Rank, Suit};
    use crate::components::game_state::{GameSettings, GameStats};

    fn up(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank).face_up()
    }

    fn board() -> GameState {
        let mut state = GameState::empty(GameSettings::default(), GameStats::default());
        state.tableau_piles[0] = vec![
            Card::new(Suit::Clubs, Rank::Nine),
            up(Suit::Spades, Rank::King),
            up(Suit::Hearts, Rank::Queen),
        ];
        state.waste_pile = vec![up(Suit::Clubs, Rank::Two), up(Suit::Diamonds, Rank::Five)];
        state
    }

    #[test]
    fn selects_tableau_run() {
        let state = board();
        let next = select_cards(&state, &CardPosition::new(PileType::Tableau, 0, 1)).unwrap();
        assert_eq!(next.selected_cards.len(), 2);
        assert_eq!(next.selected_pile_type, Some(PileType::Tableau));
        assert_eq!(next.selected_pile_index, Some(0));
        assert_eq!(selection_source(&next), Some(CardPosition::new(PileType::Tableau, 0, 1)));
        assert!(!state.has_selection(), "元の盤面は変わらない");
    }

    #[test]
    fn rejects_face_down_and_buried_cards() {
        let state = board();
        assert!(matches!(
            select_cards(&state, &CardPosition::new(PileType::Tableau, 0, 0)),
            Err(MoveError::FaceDownCard(_))
        ));
        assert!(matches!(
            select_cards(&state, &CardPosition::new(PileType::Waste, 0, 0)),
            Err(MoveError::CardNotMovable(_))
        ));
        assert!(select_cards(&state, &CardPosition::new(PileType::Waste, 0, 1)).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let state = board();
        assert!(matches!(
            select_cards(&state, &CardPosition::new(PileType::Tableau, 9, 0)),
            Err(MoveError::InvalidPile { .. })
        ));
        assert!(matches!(
            select_cards(&state, &CardPosition::new(PileType::Tableau, 3, 0)),
            Err(MoveError::CardsNotAtSource(PileType::Tableau))
        ));
    }

    #[test]
    fn clear_selection_resets_fields() {
        let state = board();
        let selected = select_cards(&state, &CardPosition::new(PileType::Waste, 0, 1)).unwrap();
        let cleared = clear_selection(&selected);
        assert!(!cleared.has_selection());
        assert_eq!(cleared.selected_pile_type, None);
        assert_eq!(selection_source(&cleared), None);
    }
}
