// src/components/game_state.rs

// serde を使う宣言！ゲーム状態を JS に渡したり localStorage に保存したりするよ。
use serde::{Deserialize, Serialize};

use crate::components::card::Card;
use crate::components::stack::PileType;

/// 一つの山 (場札の一列、組札、山札、捨て札) はただのカード列。末尾が一番上！
pub type Pile = Vec<Card>;

pub const TABLEAU_PILE_COUNT: usize = 7;
pub const FOUNDATION_PILE_COUNT: usize = 4;

/// プレイヤーが変えられる設定だよ。⚙️
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// 捨て札を山札に戻せる回数の上限。0 なら無制限。
    pub deck_cycling_limit: u32,
    /// 一度にめくる枚数。保存はするけど、今のところ山札めくりは常に 1 枚。
    pub draw_count: u8,
    pub auto_move: bool,
    pub sound_enabled: bool,
    pub show_hints: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            deck_cycling_limit: 0,
            draw_count: 1,
            auto_move: false,
            sound_enabled: true,
            show_hints: true,
        }
    }
}

/// 通算成績。保存は外側 (persistence) がやる。🏆
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub games_played: u32,
    pub games_won: u32,
    pub best_score: i32,
    /// 一番少ない手数でのクリア。まだクリアしてなければ None。
    pub best_moves: Option<u32>,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl GameStats {
    /// 新しいゲームを始めた時に呼ぶ。前のゲームを勝たずに捨てたら連勝が途切れる。
    pub fn record_game_started(&mut self, previous_game_unfinished: bool) {
        self.games_played += 1;
        if previous_game_unfinished {
            self.current_streak = 0;
        }
    }

    pub fn record_win(&mut self, score: i32, moves: u32) {
        self.games_won += 1;
        self.best_score = self.best_score.max(score);
        self.best_moves = Some(self.best_moves.map_or(moves, |best| best.min(moves)));
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }
}

/// 履歴に積む盤面のスナップショット。
///
/// 選択状態も履歴そのものも持たないので、「アンドゥで古い選択が復活する」ことは構造的に起きない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub tableau_piles: Vec<Pile>,
    pub foundation_piles: Vec<Pile>,
    pub stock_pile: Pile,
    pub waste_pile: Pile,
    pub moves: u32,
    pub score: i32,
    pub is_game_won: bool,
    pub stock_cycles: u32,
}

impl GameSnapshot {
    pub fn of(state: &GameState) -> Self {
        Self {
            tableau_piles: state.tableau_piles.clone(),
            foundation_piles: state.foundation_piles.clone(),
            stock_pile: state.stock_pile.clone(),
            waste_pile: state.waste_pile.clone(),
            moves: state.moves,
            score: state.score,
            is_game_won: state.is_game_won,
            stock_cycles: state.stock_cycles,
        }
    }
}

/// 履歴の一項目。`state` が無いものは壊れたエントリとして扱う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub action: String,
    #[serde(default)]
    pub state: Option<GameSnapshot>,
    pub timestamp: f64,
}

/// ゲーム全体の唯一の正解データだよ！
///
/// 受理された手ごとに丸ごと新しい値に置き換わる。却下された手では元の値には一切触らない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub tableau_piles: Vec<Pile>,
    pub foundation_piles: Vec<Pile>,
    pub stock_pile: Pile,
    pub waste_pile: Pile,
    pub moves: u32,
    pub score: i32,
    pub is_game_won: bool,
    pub selected_cards: Vec<Card>,
    pub selected_pile_type: Option<PileType>,
    pub selected_pile_index: Option<usize>,
    pub stock_cycles: u32,
    pub settings: GameSettings,
    pub stats: GameStats,
    /// UI には出さない。途中保存は `SavedGame` が別に持つ。
    #[serde(skip)]
    pub history: Vec<HistoryEntry>,
    /// 履歴のカーソル。-1 は「履歴なし」。
    pub history_index: i32,
    /// ゲーム開始時刻 (ミリ秒)。
    pub game_start_time: f64,
}

impl GameState {
    /// 空の盤面。デッキを配るのは `logic::deck::create_initial_game_state` の仕事。
    pub fn empty(settings: GameSettings, stats: GameStats) -> Self {
        Self {
            tableau_piles: vec![Vec::new(); TABLEAU_PILE_COUNT],
            foundation_piles: vec![Vec::new(); FOUNDATION_PILE_COUNT],
            stock_pile: Vec::new(),
            waste_pile: Vec::new(),
            moves: 0,
            score: 0,
            is_game_won: false,
            selected_cards: Vec::new(),
            selected_pile_type: None,
            selected_pile_index: None,
            stock_cycles: 0,
            settings,
            stats,
            history: Vec::new(),
            history_index: -1,
            game_start_time: 0.0,
        }
    }

    /// 山の種類と番号から山を引く。範囲外なら None。
    pub fn pile(&self, pile_type: PileType, pile_index: usize) -> Option<&Pile> {
        match pile_type {
            PileType::Tableau => self.tableau_piles.get(pile_index),
            PileType::Foundation => self.foundation_piles.get(pile_index),
            PileType::Waste if pile_index == 0 => Some(&self.waste_pile),
            PileType::Stock if pile_index == 0 => Some(&self.stock_pile),
            _ => None,
        }
    }

    pub fn pile_mut(&mut self, pile_type: PileType, pile_index: usize) -> Option<&mut Pile> {
        match pile_type {
            PileType::Tableau => self.tableau_piles.get_mut(pile_index),
            PileType::Foundation => self.foundation_piles.get_mut(pile_index),
            PileType::Waste if pile_index == 0 => Some(&mut self.waste_pile),
            PileType::Stock if pile_index == 0 => Some(&mut self.stock_pile),
            _ => None,
        }
    }

    /// 全部の山を順番に見るイテレータ (場札、組札、山札、捨て札の順)。
    pub fn all_piles(&self) -> impl Iterator<Item = &Pile> {
        self.tableau_piles
            .iter()
            .chain(self.foundation_piles.iter())
            .chain(std::iter::once(&self.stock_pile))
            .chain(std::iter::once(&self.waste_pile))
    }

    /// 盤面にあるカードの総数。常に 52 のはず！
    pub fn card_count(&self) -> usize {
        self.all_piles().map(Vec::len).sum()
    }

    pub fn clear_selection(&mut self) {
        self.selected_cards.clear();
        self.selected_pile_type = None;
        self.selected_pile_index = None;
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_cards.is_empty()
    }

    /// スナップショットから盤面を戻す。設定・成績・履歴は今のものを引き継ぐ。
    pub fn restored_from(&self, snapshot: &GameSnapshot, history_index: i32) -> GameState {
        GameState {
            tableau_piles: snapshot.tableau_piles.clone(),
            foundation_piles: snapshot.foundation_piles.clone(),
            stock_pile: snapshot.stock_pile.clone(),
            waste_pile: snapshot.waste_pile.clone(),
            moves: snapshot.moves,
            score: snapshot.score,
            is_game_won: snapshot.is_game_won,
            selected_cards: Vec::new(),
            selected_pile_type: None,
            selected_pile_index: None,
            stock_cycles: snapshot.stock_cycles,
            settings: self.settings.clone(),
            stats: self.stats.clone(),
            history: self.history.clone(),
            history_index,
            game_start_time: self.game_start_time,
        }
    }
}

// --- テスト ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::card::{Rank, Suit};

    #[test]
    fn empty_state_has_klondike_shape() {
        let state = GameState::empty(GameSettings::default(), GameStats::default());
        assert_eq!(state.tableau_piles.len(), 7);
        assert_eq!(state.foundation_piles.len(), 4);
        assert_eq!(state.history_index, -1);
        assert_eq!(state.card_count(), 0);
    }

    #[test]
    fn pile_lookup_rejects_out_of_range() {
        let state = GameState::empty(GameSettings::default(), GameStats::default());
        assert!(state.pile(PileType::Tableau, 6).is_some());
        assert!(state.pile(PileType::Tableau, 7).is_none());
        assert!(state.pile(PileType::Foundation, 4).is_none());
        assert!(state.pile(PileType::Waste, 1).is_none());
        assert!(state.pile(PileType::Stock, 0).is_some());
    }

    #[test]
    fn snapshot_drops_selection() {
        let mut state = GameState::empty(GameSettings::default(), GameStats::default());
        let card = Card::new(Suit::Hearts, Rank::Ace).face_up();
        state.waste_pile.push(card.clone());
        state.selected_cards = vec![card];
        state.selected_pile_type = Some(PileType::Waste);
        state.selected_pile_index = Some(0);

        let snapshot = GameSnapshot::of(&state);
        let restored = state.restored_from(&snapshot, 0);
        assert!(!restored.has_selection());
        assert_eq!(restored.selected_pile_type, None);
        assert_eq!(restored.waste_pile.len(), 1);
    }

    #[test]
    fn stats_track_streaks_and_bests() {
        let mut stats = GameStats::default();
        stats.record_game_started(false);
        stats.record_win(120, 90);
        stats.record_game_started(false);
        stats.record_win(80, 110);
        assert_eq!(stats.games_won, 2);
        assert_eq!(stats.best_score, 120);
        assert_eq!(stats.best_moves, Some(90));
        assert_eq!(stats.best_streak, 2);

        stats.record_game_started(true);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.games_played, 3);
    }

    #[test]
    fn ui_json_leaves_out_history_entries() {
        let mut state = GameState::empty(GameSettings::default(), GameStats::default());
        let entry = HistoryEntry { action: "new-game".to_string(), state: Some(GameSnapshot::of(&state)), timestamp: 0.0 };
        state.history.push(entry);
        state.history_index = 0;

        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("history").is_none());
        assert_eq!(json["historyIndex"], 0);
        assert_eq!(json["tableauPiles"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: GameSettings = serde_json::from_str(r#"{"deckCyclingLimit":3}"#).unwrap();
        assert_eq!(settings.deck_cycling_limit, 3);
        assert_eq!(settings.draw_count, 1);
        assert!(settings.sound_enabled);
    }
}
