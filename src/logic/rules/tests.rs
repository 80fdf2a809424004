// src/logic/rules/tests.rs
//! rules モジュール内の関数のユニットテスト。

use super::*;
use crate::components::card::{Card, Rank, Suit};
use crate::components::game_state::{GameSettings, GameState, GameStats};
use crate::components::stack::{CardPosition, PileType};
use crate::error::MoveError;

// --- テスト用ヘルパー関数 ---
/// 表向きのカードを作るヘルパー。
fn up(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank).face_up()
}

fn empty_state() -> GameState {
    GameState::empty(GameSettings::default(), GameStats::default())
}

fn ids(cards: &[Card]) -> Vec<String> {
    cards.iter().map(|c| c.id.clone()).collect()
}

// --- 述語のテスト ---

#[test]
fn test_card_color() {
    assert_eq!(CardColor::from_suit(Suit::Hearts), CardColor::Red);
    assert_eq!(CardColor::from_suit(Suit::Diamonds), CardColor::Red);
    assert_eq!(CardColor::from_suit(Suit::Clubs), CardColor::Black);
    assert_eq!(CardColor::from_suit(Suit::Spades), CardColor::Black);
}

#[test]
fn test_foundation_suit_mapping() {
    for index in 0..4 {
        let suit = foundation_suit(index).unwrap();
        assert_eq!(foundation_index_for_suit(suit), index);
    }
    assert_eq!(foundation_suit(4), None);
}

#[test]
fn test_can_place_on_tableau() {
    assert!(can_place_on_tableau(&up(Suit::Spades, Rank::King), &[]), "空の列に K は置けるはず");
    assert!(!can_place_on_tableau(&up(Suit::Hearts, Rank::Queen), &[]), "空の列に Q は置けないはず");
    assert!(
        can_place_on_tableau(&up(Suit::Hearts, Rank::Queen), &[up(Suit::Spades, Rank::King)]),
        "K♠ に Q♥ は置けるはず"
    );
    assert!(
        !can_place_on_tableau(&up(Suit::Diamonds, Rank::Queen), &[up(Suit::Hearts, Rank::King)]),
        "K♥ に Q♦ は同色なので置けないはず"
    );
    assert!(
        !can_place_on_tableau(&up(Suit::Spades, Rank::Ten), &[up(Suit::Hearts, Rank::Queen)]),
        "ランクが二つ違うと置けないはず"
    );
}

#[test]
fn test_can_place_on_foundation() {
    assert!(can_place_on_foundation(&up(Suit::Hearts, Rank::Ace), &[]));
    assert!(!can_place_on_foundation(&up(Suit::Hearts, Rank::Two), &[]));
    assert!(can_place_on_foundation(&up(Suit::Hearts, Rank::Two), &[up(Suit::Hearts, Rank::Ace)]));
    assert!(!can_place_on_foundation(&up(Suit::Diamonds, Rank::Two), &[up(Suit::Hearts, Rank::Ace)]));
    assert!(!can_place_on_foundation(&up(Suit::Hearts, Rank::Three), &[up(Suit::Hearts, Rank::Ace)]));
}

#[test]
fn test_is_valid_card_sequence() {
    let good = [up(Suit::Spades, Rank::King), up(Suit::Hearts, Rank::Queen), up(Suit::Clubs, Rank::Jack)];
    let same_color = [up(Suit::Spades, Rank::King), up(Suit::Spades, Rank::Queen), up(Suit::Clubs, Rank::Jack)];
    assert!(is_valid_card_sequence(&good));
    assert!(!is_valid_card_sequence(&same_color));
    assert!(is_valid_card_sequence(&[up(Suit::Hearts, Rank::Five)]));
    assert!(is_valid_card_sequence(&[]));
}

#[test]
fn test_get_movable_cards_from_tableau() {
    let pile = vec![
        Card::new(Suit::Clubs, Rank::Two),
        up(Suit::Spades, Rank::King),
        up(Suit::Hearts, Rank::Queen),
        up(Suit::Clubs, Rank::Jack),
    ];
    assert_eq!(ids(&get_movable_cards_from_tableau(&pile, 1)), ids(&pile[1..]));
    assert_eq!(ids(&get_movable_cards_from_tableau(&pile, 3)), ids(&pile[3..]));
    assert!(get_movable_cards_from_tableau(&pile, 0).is_empty(), "裏向きを含む列は動かせない");
    assert!(get_movable_cards_from_tableau(&pile, 4).is_empty());

    let broken = vec![up(Suit::Spades, Rank::King), up(Suit::Clubs, Rank::Queen)];
    assert!(get_movable_cards_from_tableau(&broken, 0).is_empty(), "一部だけ選ぶことはしない");
}

#[test]
fn test_stock_waste_predicates() {
    assert!(can_deal_from_stock(false), "ストックがあれば配れるはず");
    assert!(!can_reset_stock_from_waste(false, true), "ストックがある場合はリセットできないはず");
    assert!(!can_deal_from_stock(true), "ストックが空なら配れないはず");
    assert!(can_reset_stock_from_waste(true, false), "ストックが空でウェストにあればリセットできるはず");
    assert!(!can_reset_stock_from_waste(true, true), "ストックもウェストも空ならリセットできないはず");
    assert!(!cycling_limit_reached(0, 100), "0 は無制限");
    assert!(cycling_limit_reached(3, 3));
}

#[test]
fn test_win_condition() {
    let full: Vec<Vec<Card>> = crate::components::card::ALL_SUITS
        .iter()
        .map(|&suit| crate::components::card::ALL_RANKS.iter().map(|&rank| up(suit, rank)).collect())
        .collect();
    assert!(check_win_condition(&full), "全部 13 枚ならクリアなはず！🏆");

    let mut almost = full.clone();
    almost[2].pop();
    assert!(!check_win_condition(&almost));
    assert!(!check_win_condition(&empty_state().foundation_piles));
}

#[test]
fn test_score_for_move() {
    assert_eq!(score_for_move(PileType::Waste, PileType::Foundation, 1), 10);
    assert_eq!(score_for_move(PileType::Waste, PileType::Tableau, 1), 5);
    assert_eq!(score_for_move(PileType::Tableau, PileType::Tableau, 3), 2);
    assert_eq!(score_for_move(PileType::Tableau, PileType::Tableau, 1), 0);
    assert_eq!(score_for_move(PileType::Tableau, PileType::Foundation, 1), 10);
}

// --- validate_and_execute_move のテスト ---

#[test]
fn test_waste_king_to_empty_tableau() {
    let mut state = empty_state();
    let king = up(Suit::Hearts, Rank::King);
    state.waste_pile = vec![up(Suit::Clubs, Rank::Four), king.clone()];
    update_draggable(&mut state);

    let from = CardPosition::new(PileType::Waste, 0, 1);
    let to = CardPosition::pile(PileType::Tableau, 0);
    let next = validate_and_execute_move(&state, &from, &to, &[king.clone()]).unwrap();

    assert_eq!(ids(&next.tableau_piles[0]), vec![king.id.clone()]);
    assert!(next.tableau_piles[0][0].is_face_up);
    assert_eq!(next.waste_pile.len(), 1);
    assert_eq!(next.moves, 1);
    assert_eq!(next.score, 5);
    assert!(next.waste_pile[0].draggable, "新しい捨て札の一番上が掴めるようになる");
}

#[test]
fn test_rejected_move_leaves_state_untouched() {
    let mut state = empty_state();
    state.tableau_piles[0] = vec![up(Suit::Hearts, Rank::Queen)];
    let wrong = up(Suit::Spades, Rank::Ten);
    state.waste_pile = vec![wrong.clone()];
    let before = state.clone();

    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Tableau, 0),
        &[wrong],
    );
    assert!(matches!(result, Err(MoveError::IllegalPlacement { .. })));
    assert_eq!(state, before);
}

#[test]
fn test_empty_cards_rejected() {
    let state = empty_state();
    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Tableau, 0),
        &[],
    );
    assert_eq!(result, Err(MoveError::NoCards));
}

#[test]
fn test_stale_cards_rejected() {
    let mut state = empty_state();
    state.waste_pile = vec![up(Suit::Spades, Rank::King), up(Suit::Hearts, Rank::Two)];
    // UI が古い情報で「K♠ が一番上」と思い込んでいるケース
    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Tableau, 0),
        &[up(Suit::Spades, Rank::King)],
    );
    assert_eq!(result, Err(MoveError::CardsNotAtSource(PileType::Waste)));
}

#[test]
fn test_out_of_range_pile_rejected() {
    let mut state = empty_state();
    let king = up(Suit::Spades, Rank::King);
    state.waste_pile = vec![king.clone()];
    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Tableau, 9),
        &[king.clone()],
    );
    assert!(matches!(result, Err(MoveError::InvalidPile { pile_index: 9, .. })));

    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Tableau, 12, 0),
        &CardPosition::pile(PileType::Tableau, 0),
        &[king],
    );
    assert!(matches!(result, Err(MoveError::InvalidPile { pile_index: 12, .. })));
}

#[test]
fn test_foundation_index_is_redirected_by_suit() {
    let mut state = empty_state();
    let ace = up(Suit::Spades, Rank::Ace);
    state.waste_pile = vec![ace.clone()];

    // 0 番 (ハート) を指定しても、スペードの組札 (3) に入る
    let next = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Foundation, 0),
        &[ace.clone()],
    )
    .unwrap();
    assert!(next.foundation_piles[0].is_empty());
    assert_eq!(ids(&next.foundation_piles[3]), vec![ace.id]);
    assert_eq!(next.score, 10);
}

#[test]
fn test_tableau_run_move_reveals_card() {
    let mut state = empty_state();
    let hidden = Card::new(Suit::Diamonds, Rank::Three);
    state.tableau_piles[0] = vec![hidden.clone(), up(Suit::Hearts, Rank::Queen), up(Suit::Clubs, Rank::Jack)];
    state.tableau_piles[1] = vec![up(Suit::Spades, Rank::King)];
    update_draggable(&mut state);

    let run = state.tableau_piles[0][1..].to_vec();
    let next = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Tableau, 0, 1),
        &CardPosition::pile(PileType::Tableau, 1),
        &run,
    )
    .unwrap();

    assert_eq!(next.tableau_piles[1].len(), 3);
    assert_eq!(next.tableau_piles[0].len(), 1);
    assert!(next.tableau_piles[0][0].is_face_up, "下の裏向きカードが表になる");
    assert!(next.tableau_piles[0][0].draggable);
    assert_eq!(next.score, 1, "2 枚まとめて動かしたら +1");
    assert_eq!(next.card_count(), state.card_count());
}

#[test]
fn test_multiple_cards_to_foundation_rejected() {
    let mut state = empty_state();
    state.tableau_piles[0] = vec![up(Suit::Hearts, Rank::Two), up(Suit::Clubs, Rank::Ace)];
    let cards = state.tableau_piles[0].clone();
    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Tableau, 0, 0),
        &CardPosition::pile(PileType::Foundation, 2),
        &cards,
    );
    assert!(result.is_err());
}

#[test]
fn test_face_down_card_cannot_move() {
    let mut state = empty_state();
    let hidden = Card::new(Suit::Spades, Rank::King);
    state.tableau_piles[0] = vec![hidden.clone()];
    let result = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Tableau, 0, 0),
        &CardPosition::pile(PileType::Tableau, 1),
        &[hidden],
    );
    assert!(matches!(result, Err(MoveError::FaceDownCard(_))));
}

#[test]
fn test_moves_onto_waste_or_stock_rejected() {
    let mut state = empty_state();
    let king = up(Suit::Spades, Rank::King);
    state.tableau_piles[0] = vec![king.clone()];
    for pile_type in [PileType::Waste, PileType::Stock] {
        let result = validate_and_execute_move(
            &state,
            &CardPosition::new(PileType::Tableau, 0, 0),
            &CardPosition::pile(pile_type, 0),
            &[king.clone()],
        );
        assert_eq!(result, Err(MoveError::InvalidDestination(pile_type)));
    }
}

#[test]
fn test_last_card_to_foundation_wins() {
    let mut state = empty_state();
    for (index, &suit) in crate::components::card::ALL_SUITS.iter().enumerate() {
        let ranks = crate::components::card::ALL_RANKS;
        let count = if suit == Suit::Spades { 12 } else { 13 };
        state.foundation_piles[index] = ranks.iter().take(count).map(|&rank| up(suit, rank)).collect();
    }
    let king = up(Suit::Spades, Rank::King);
    state.waste_pile = vec![king.clone()];

    let next = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Foundation, 3),
        &[king],
    )
    .unwrap();
    assert!(next.is_game_won);
}

#[test]
fn test_move_clears_selection() {
    let mut state = empty_state();
    let king = up(Suit::Spades, Rank::King);
    state.waste_pile = vec![king.clone()];
    state.selected_cards = vec![king.clone()];
    state.selected_pile_type = Some(PileType::Waste);
    state.selected_pile_index = Some(0);

    let next = validate_and_execute_move(
        &state,
        &CardPosition::new(PileType::Waste, 0, 0),
        &CardPosition::pile(PileType::Tableau, 3),
        &[king],
    )
    .unwrap();
    assert!(!next.has_selection());
    assert_eq!(next.selected_pile_type, None);
}

// --- flip_stock のテスト ---

#[test]
fn test_flip_stock_draws_one_card() {
    let mut state = empty_state();
    state.settings.draw_count = 3;
    state.stock_pile = vec![Card::new(Suit::Clubs, Rank::Two), Card::new(Suit::Hearts, Rank::Nine)];

    let next = flip_stock(&state).unwrap();
    assert_eq!(next.stock_pile.len(), 1, "draw_count に関係なく 1 枚だけ");
    assert_eq!(next.waste_pile.len(), 1);
    assert_eq!(next.waste_pile[0].id, "hearts-9");
    assert!(next.waste_pile[0].is_face_up);
    assert!(next.waste_pile[0].draggable);
    assert_eq!(next.moves, 1);
}

#[test]
fn test_flip_stock_recycles_waste() {
    let mut state = empty_state();
    state.waste_pile = vec![up(Suit::Clubs, Rank::Two), up(Suit::Hearts, Rank::Nine), up(Suit::Spades, Rank::Five)];

    let next = flip_stock(&state).unwrap();
    assert!(next.waste_pile.is_empty());
    assert_eq!(next.stock_pile.len(), 3);
    assert!(next.stock_pile.iter().all(|c| !c.is_face_up));
    assert_eq!(next.stock_cycles, 1);
    assert_eq!(next.moves, 1);
    // 戻した後、最初にめくられるのは最初に捨て札に出たカード
    assert_eq!(next.stock_pile.last().unwrap().id, "clubs-2");
}

#[test]
fn test_flip_stock_both_empty_fails() {
    assert_eq!(flip_stock(&empty_state()), Err(MoveError::StockAndWasteEmpty));
}

#[test]
fn test_flip_stock_respects_cycling_limit() {
    let mut state = empty_state();
    state.settings.deck_cycling_limit = 2;
    state.stock_cycles = 2;
    state.waste_pile = vec![up(Suit::Clubs, Rank::Two)];
    assert_eq!(flip_stock(&state), Err(MoveError::CyclingLimitReached(2)));

    state.stock_cycles = 1;
    assert!(flip_stock(&state).is_ok());
}

// --- draggable のテスト ---

#[test]
fn test_update_draggable() {
    let mut state = empty_state();
    state.tableau_piles[0] = vec![
        Card::new(Suit::Clubs, Rank::Two),
        up(Suit::Spades, Rank::Nine),
        up(Suit::Hearts, Rank::Eight),
    ];
    state.waste_pile = vec![up(Suit::Clubs, Rank::Four), up(Suit::Hearts, Rank::Six)];
    state.foundation_piles[0] = vec![up(Suit::Hearts, Rank::Ace), up(Suit::Hearts, Rank::Two)];
    state.stock_pile = vec![Card::new(Suit::Diamonds, Rank::Jack)];
    update_draggable(&mut state);

    let flags = |pile: &[Card]| pile.iter().map(|c| c.draggable).collect::<Vec<_>>();
    assert_eq!(flags(&state.tableau_piles[0]), vec![false, true, true]);
    assert_eq!(flags(&state.waste_pile), vec![false, true]);
    assert_eq!(flags(&state.foundation_piles[0]), vec![false, true]);
    assert_eq!(flags(&state.stock_pile), vec![false]);
}

#[test]
fn test_find_valid_foundation_pile() {
    let mut state = empty_state();
    assert_eq!(find_valid_foundation_pile(&up(Suit::Clubs, Rank::Ace), &state), Some(2));
    assert_eq!(find_valid_foundation_pile(&up(Suit::Clubs, Rank::Two), &state), None);
    state.foundation_piles[2] = vec![up(Suit::Clubs, Rank::Ace)];
    assert_eq!(find_valid_foundation_pile(&up(Suit::Clubs, Rank::Two), &state), Some(2));
}
