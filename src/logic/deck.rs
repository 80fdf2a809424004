// src/logic/deck.rs

use rand::{Error as RandError, RngCore, SeedableRng};

use crate::components::card::{Card, ALL_RANKS, ALL_SUITS};
use crate::components::game_state::{GameSettings, GameState, GameStats, TABLEAU_PILE_COUNT};
use crate::logic::rules;

/// 標準的な52枚のカードデッキを生成する関数だよ！🃏
///
/// スート × ランクの全組み合わせを一枚ずつ、全部裏向きで作る。ID は `suit-rank`。
pub fn create_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for &suit in ALL_SUITS.iter() {
        for &rank in ALL_RANKS.iter() {
            deck.push(Card::new(suit, rank));
        }
    }
    deck
}

/// Mulberry32 擬似乱数生成器。32bit の状態を足し込んでハッシュするだけの小さいやつ。
///
/// 同じシードなら必ず同じ列が出るので、テストでも SSR とクライアントでも同じ配り方になる。
/// `rand::RngCore` を実装してあるので、他の rand の API にもそのまま渡せるよ。
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// [0, 1) の浮動小数点数。
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Mulberry32::new(u32::from_le_bytes(seed))
    }
}

/// シード付きの Fisher–Yates シャッフル。元のデッキは変えずに新しい Vec を返す。
pub fn shuffle_deck(deck: &[Card], seed: u32) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    let mut rng = Mulberry32::new(seed);
    for i in (1..shuffled.len()).rev() {
        // j は 0..=i のどれか
        let j = (rng.next_f64() * (i + 1) as f64).floor() as usize;
        shuffled.swap(i, j.min(i));
    }
    shuffled
}

/// 配り終わった直後の山たち。
#[derive(Debug, Clone, PartialEq)]
pub struct InitialDeal {
    pub tableau_piles: Vec<Vec<Card>>,
    pub stock_pile: Vec<Card>,
}

/// クロンダイクの初期配置を作るよ！
///
/// 場札 i 列目 (0..6) に i+1 枚、それぞれ一番上だけ表向き。残りは全部裏向きで山札へ。
pub fn deal_initial_cards(seed: u32) -> InitialDeal {
    let mut deck = shuffle_deck(&create_deck(), seed).into_iter();
    let mut tableau_piles = Vec::with_capacity(TABLEAU_PILE_COUNT);

    for pile_index in 0..TABLEAU_PILE_COUNT {
        let mut pile: Vec<Card> = deck.by_ref().take(pile_index + 1).collect();
        if let Some(top) = pile.last_mut() {
            *top = top.face_up();
        }
        tableau_piles.push(pile);
    }

    let stock_pile = deck.map(|card| card.face_down()).collect();
    InitialDeal { tableau_piles, stock_pile }
}

/// 新しいゲームの GameState を作る。履歴は空 (`history_index = -1`)。
pub fn create_initial_game_state(
    seed: u32,
    settings: GameSettings,
    stats: GameStats,
    now_ms: f64,
) -> GameState {
    let deal = deal_initial_cards(seed);
    let mut state = GameState::empty(settings, stats);
    state.tableau_piles = deal.tableau_piles;
    state.stock_pile = deal.stock_pile;
    state.game_start_time = now_ms;
    rules::update_draggable(&mut state);
    state
}
