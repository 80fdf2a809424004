//! ルール判定で共通して使うヘルパー関数や型を置くよ。

use crate::components::card::{Card, Suit};

/// カードの色（赤か黒か）を表すヘルパーenumだよ。
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CardColor {
    Red,
    Black,
}

impl CardColor {
    /// スートからカードの色を取得する関数。
    pub fn from_suit(suit: Suit) -> Self {
        match suit {
            Suit::Hearts | Suit::Diamonds => CardColor::Red,
            Suit::Clubs | Suit::Spades => CardColor::Black,
        }
    }

    pub fn of(card: &Card) -> Self {
        Self::from_suit(card.suit)
    }
}

/// スートから組札 (Foundation) のインデックスへ。
/// 約束事: 0: Hearts ❤️, 1: Diamonds ♦️, 2: Clubs ♣️, 3: Spades ♠️
pub fn foundation_index_for_suit(suit: Suit) -> usize {
    match suit {
        Suit::Hearts => 0,
        Suit::Diamonds => 1,
        Suit::Clubs => 2,
        Suit::Spades => 3,
    }
}

/// 組札のインデックス (0-3) から対応するスートを取得する。
pub fn foundation_suit(foundation_index: usize) -> Option<Suit> {
    match foundation_index {
        0 => Some(Suit::Hearts),
        1 => Some(Suit::Diamonds),
        2 => Some(Suit::Clubs),
        3 => Some(Suit::Spades),
        _ => None,
    }
}

/// 山の一番上のカード。
pub fn top_card(pile: &[Card]) -> Option<&Card> {
    pile.last()
}
