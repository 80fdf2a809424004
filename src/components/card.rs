// src/components/card.rs

// serde でカード情報を JSON にして JS 側の描画コンポーネントに渡すよ！
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// カードのスート（マーク）を表す列挙型だよ！❤️♦️♣️♠️
///
/// JSON では `"hearts"` みたいな小文字の名前になる。
/// この並び順がそのまま組札 (Foundation) のインデックス 0..3 になるよ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,   // ❤️
    Diamonds, // ♦️
    Clubs,    // ♣️
    Spades,   // ♠️
}

impl Suit {
    /// カード ID の一部にもなる小文字の名前。
    pub fn name(self) -> &'static str {
        match self {
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
        }
    }

    /// ハートとダイヤは赤！
    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

/// カードのランク（数字）を表す列挙型だよ！ A, 2, 3, ..., K
///
/// JSON では 1..13 の整数としてやり取りする (A=1, J=11, Q=12, K=13)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    /// 1 (A) から 13 (K) までの数値を返すよ。
    pub fn value(self) -> u8 {
        self as u8
    }

    /// 数値からランクを作る。範囲外なら None！
    pub fn from_value(value: u8) -> Option<Rank> {
        ALL_RANKS.get(usize::from(value).checked_sub(1)?).copied()
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.value()
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::from_value(value).ok_or_else(|| format!("rank out of range: {}", value))
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Ace,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
];

/// カード一枚を表す値オブジェクトだよ！🃏
///
/// - `id`: スートとランクから作る一意な ID (`"spades-13"` みたいな感じ)。ゲーム中ずっと変わらない。
/// - `is_face_up`: 表向きなら true
/// - `draggable`: 盤面のルールから毎回再計算される派生フラグ。直接いじらないこと！
///
/// 状態を変えたいときは `face_up()` などで新しい Card を作るよ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub suit: Suit,
    pub rank: Rank,
    pub is_face_up: bool,
    pub draggable: bool,
}

impl Card {
    /// 裏向きの新しいカードを作る。
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            id: card_id(suit, rank),
            suit,
            rank,
            is_face_up: false,
            draggable: false,
        }
    }

    /// 表向きにしたコピーを返すよ。
    pub fn face_up(&self) -> Card {
        Card { is_face_up: true, ..self.clone() }
    }

    /// 裏向きにしたコピー。裏向きのカードは絶対にドラッグできないので draggable も落とす。
    pub fn face_down(&self) -> Card {
        Card { is_face_up: false, draggable: false, ..self.clone() }
    }

    pub fn with_draggable(&self, draggable: bool) -> Card {
        Card { draggable, ..self.clone() }
    }

    pub fn is_red(&self) -> bool {
        self.suit.is_red()
    }

    /// ログやエラーメッセージ用の短い表記 (例: `Q♥`)。
    pub fn label(&self) -> String {
        format!("{}{}", self.rank.label(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// `${suit}-${rank}` 形式の ID を作る。
pub fn card_id(suit: Suit, rank: Rank) -> String {
    format!("{}-{}", suit.name(), rank.value())
}
