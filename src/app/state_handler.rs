// src/app/state_handler.rs
//! ゲームの進行役 (`GameSession`) だよ。🎮
//!
//! エンジン (logic) は純粋な関数だけなので、「今の盤面」を持って結果を反映するのはここ。
//! 手が通ったら履歴に積んで、成績を更新して、効果音を決めて、保存する。
//! UI 側 (GameApp) はこれを薄く包むだけ。

use log::{debug, info, warn};

use crate::app::audio::{AudioService, CuePlayer, SoundCue};
use crate::app::persistence::{GamePersistence, KeyValueStore};
use crate::components::card::Card;
use crate::components::game_state::{GameSettings, GameState, GameStats};
use crate::components::stack::{CardPosition, PileType};
use crate::config::game::AUTO_MOVE_SWEEP_LIMIT;
use crate::error::MoveError;
use crate::logic::auto_move::{auto_move_to_foundation, find_auto_move_candidate};
use crate::logic::deck::create_initial_game_state;
use crate::logic::hint::{find_hint, Hint};
use crate::logic::history::{self, with_saved_state};
use crate::logic::rules::{self, MoveResult};
use crate::logic::selection;

pub struct GameSession<S: KeyValueStore, P: CuePlayer> {
    state: GameState,
    persistence: GamePersistence<S>,
    audio: AudioService<P>,
}

impl<S: KeyValueStore, P: CuePlayer> GameSession<S, P> {
    /// 保存済みの設定と成績を読んで、新しいゲームから始める。
    pub fn new(persistence: GamePersistence<S>, audio: AudioService<P>, seed: u32, now_ms: f64) -> Self {
        let settings = persistence.load_settings().unwrap_or_default();
        let stats = persistence.load_stats().unwrap_or_default();
        let mut session = Self { state: GameState::empty(settings, stats), persistence, audio };
        session.audio.set_enabled(session.state.settings.sound_enabled);
        session.new_game(seed, now_ms);
        session
    }

    /// 24 時間以内の途中のゲームがあればそこから再開。無ければ新しいゲーム。
    pub fn restore_or_new(persistence: GamePersistence<S>, audio: AudioService<P>, seed: u32, now_ms: f64) -> Self {
        let Some(saved) = persistence.load_game_state(now_ms) else {
            return Self::new(persistence, audio, seed, now_ms);
        };
        let settings = persistence.load_settings().unwrap_or_default();
        let stats = persistence.load_stats().unwrap_or_default();
        info!("[Session] resuming saved game (moves={})", saved.moves);
        let mut audio = audio;
        audio.set_enabled(settings.sound_enabled);
        Self { state: saved.into_game_state(settings, stats), persistence, audio }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &GameStats {
        &self.state.stats
    }

    pub fn settings(&self) -> &GameSettings {
        &self.state.settings
    }

    pub fn audio(&self) -> &AudioService<P> {
        &self.audio
    }

    pub fn persistence(&self) -> &GamePersistence<S> {
        &self.persistence
    }

    /// 新しく配り直す。勝たずに途中で捨てたゲームは連勝を途切れさせる。
    pub fn new_game(&mut self, seed: u32, now_ms: f64) {
        let abandoned = self.state.moves > 0 && !self.state.is_game_won;
        let mut stats = self.state.stats.clone();
        stats.record_game_started(abandoned);

        let fresh = create_initial_game_state(seed, self.state.settings.clone(), stats, now_ms);
        self.state = with_saved_state("new-game", fresh, now_ms);
        info!("[Session] new game (seed={}, played={})", seed, self.state.stats.games_played);

        self.save_stats();
        self.persist(now_ms);
        self.audio.play(SoundCue::Shuffle);
    }

    pub fn move_cards(
        &mut self,
        from: &CardPosition,
        to: &CardPosition,
        cards: &[Card],
        now_ms: f64,
    ) -> Result<(), MoveError> {
        let result = rules::validate_and_execute_move(&self.state, from, to, cards);
        let cue = if to.pile_type == PileType::Foundation { SoundCue::CardDrop } else { SoundCue::CardMove };
        self.commit("move", result, cue, now_ms)
    }

    pub fn flip_stock(&mut self, now_ms: f64) -> Result<(), MoveError> {
        let result = rules::flip_stock(&self.state);
        self.commit("flip-stock", result, SoundCue::CardFlip, now_ms)
    }

    /// ダブルクリックされたカードを組札へ。
    pub fn auto_move(&mut self, card: &Card, now_ms: f64) -> Result<(), MoveError> {
        let result = auto_move_to_foundation(&self.state, card);
        self.commit("auto-move", result, SoundCue::CardDrop, now_ms)
    }

    pub fn can_undo(&self) -> bool {
        history::can_undo(&self.state)
    }

    pub fn undo(&mut self, now_ms: f64) -> bool {
        let mut restored = None;
        if !history::undo(&self.state, |state| restored = Some(state)) {
            return false;
        }
        let Some(state) = restored else {
            return false;
        };
        self.state = state;
        self.persist(now_ms);
        self.audio.play(SoundCue::CardMove);
        true
    }

    pub fn select(&mut self, position: &CardPosition) -> Result<(), MoveError> {
        self.state = selection::select_cards(&self.state, position)?;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.state = selection::clear_selection(&self.state);
    }

    /// ヒント。設定でヒントを切っていたら何も返さない。
    pub fn hint(&self) -> Option<Hint> {
        if !self.state.settings.show_hints {
            return None;
        }
        find_hint(&self.state)
    }

    pub fn update_settings(&mut self, settings: GameSettings) {
        self.audio.set_enabled(settings.sound_enabled);
        self.state.settings = settings;
        if let Err(e) = self.persistence.save_settings(&self.state.settings) {
            warn!("[Session] failed to save settings: {}", e);
        }
    }

    // --- 内部処理 ---

    /// エンジンの結果を反映する。失敗ならエラー音だけ鳴らして盤面はそのまま。
    fn commit(&mut self, action: &str, result: MoveResult, cue: SoundCue, now_ms: f64) -> Result<(), MoveError> {
        let next = match result {
            Ok(next) => next,
            Err(e) => {
                debug!("[Session] {} rejected: {}", action, e);
                self.audio.play(SoundCue::Error);
                return Err(e);
            }
        };
        let was_won = self.state.is_game_won;
        self.state = with_saved_state(action, next, now_ms);
        self.audio.play(cue);

        if self.state.settings.auto_move {
            self.sweep_to_foundations(now_ms);
        }
        if !was_won && self.state.is_game_won {
            self.on_win();
        }
        self.persist(now_ms);
        Ok(())
    }

    /// 組札に送れるカードを送れなくなるまで送る。一枚ごとに履歴を積む。
    fn sweep_to_foundations(&mut self, now_ms: f64) {
        for _ in 0..AUTO_MOVE_SWEEP_LIMIT {
            if self.state.is_game_won {
                break;
            }
            let Some(card) = find_auto_move_candidate(&self.state) else {
                break;
            };
            match auto_move_to_foundation(&self.state, &card) {
                Ok(next) => {
                    self.state = with_saved_state("auto-move", next, now_ms);
                    self.audio.play(SoundCue::CardDrop);
                }
                Err(e) => {
                    warn!("[Session] auto-move sweep stopped at {}: {}", card, e);
                    break;
                }
            }
        }
    }

    fn on_win(&mut self) {
        let (score, moves) = (self.state.score, self.state.moves);
        self.state.stats.record_win(score, moves);
        info!("[Session] game won! score={} moves={} streak={}", score, moves, self.state.stats.current_streak);
        self.save_stats();
        self.audio.play(SoundCue::Win);
    }

    fn save_stats(&self) {
        if let Err(e) = self.persistence.save_stats(&self.state.stats) {
            warn!("[Session] failed to save stats: {}", e);
        }
    }

    /// 途中のゲームを保存。クリアしたゲームは再開するものが無いので消す。
    fn persist(&self, now_ms: f64) {
        if self.state.is_game_won {
            self.persistence.clear_game_state();
            return;
        }
        if let Err(e) = self.persistence.save_game_state(&self.state, now_ms) {
            warn!("[Session] failed to save game: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::audio::fakes::RecordingPlayer;
    use crate::app::persistence::MemoryStore;
    use crate::components::card::{Rank, Suit};
    use crate::config::game::GAME_STATE_KEY;
    use crate::logic::rules::foundation_index_for_suit;

    type TestSession = GameSession<MemoryStore, RecordingPlayer>;

    fn session() -> TestSession {
        let mut audio = AudioService::new(RecordingPlayer::default(), true);
        audio.init();
        GameSession::new(GamePersistence::new(MemoryStore::new()), audio, 7, 0.0)
    }

    fn up(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank).face_up()
    }

    fn played(session: &TestSession) -> Vec<SoundCue> {
        session.audio().player().played.borrow().clone()
    }

    /// 盤面を差し替える。履歴は "new-game" 一件から。
    fn install(session: &mut TestSession, state: GameState) {
        session.state = with_saved_state("new-game", state, 0.0);
    }

    fn board(settings: GameSettings) -> GameState {
        GameState::empty(settings, GameStats::default())
    }

    #[test]
    fn new_session_deals_and_records_the_game() {
        let session = session();
        assert_eq!(session.state().card_count(), 52);
        assert_eq!(session.state().history.len(), 1);
        assert_eq!(session.state().history[0].action, "new-game");
        assert!(!session.can_undo());
        assert_eq!(session.stats().games_played, 1);
        assert_eq!(played(&session), [SoundCue::Shuffle]);
        assert_eq!(session.persistence().load_stats().unwrap().games_played, 1);
    }

    #[test]
    fn rejected_move_plays_error_and_keeps_board() {
        let mut session = session();
        let before = session.state().clone();
        let result = session.move_cards(
            &CardPosition::new(PileType::Waste, 0, 0),
            &CardPosition::pile(PileType::Tableau, 0),
            &[],
            1.0,
        );
        assert_eq!(result, Err(MoveError::NoCards));
        assert_eq!(session.state(), &before);
        assert_eq!(played(&session).last(), Some(&SoundCue::Error));
    }

    #[test]
    fn flip_then_undo_restores_stock() {
        let mut session = session();
        let stock_before = session.state().stock_pile.len();
        session.flip_stock(1.0).unwrap();
        assert_eq!(session.state().waste_pile.len(), 1);
        assert!(session.can_undo());

        assert!(session.undo(2.0));
        assert_eq!(session.state().stock_pile.len(), stock_before);
        assert!(session.state().waste_pile.is_empty());
        assert!(!session.undo(3.0));
        assert_eq!(played(&session), [SoundCue::Shuffle, SoundCue::CardFlip, SoundCue::CardMove]);
    }

    #[test]
    fn auto_move_sweep_sends_every_ready_card() {
        let mut session = session();
        let settings = GameSettings { auto_move: true, ..Default::default() };
        let mut state = board(settings.clone());
        state.stock_pile = vec![Card::new(Suit::Hearts, Rank::Ace)];
        state.tableau_piles[0] = vec![up(Suit::Hearts, Rank::Two)];
        state.tableau_piles[1] = vec![up(Suit::Spades, Rank::King)];
        install(&mut session, state);
        session.update_settings(settings);

        session.flip_stock(1.0).unwrap();
        let hearts = &session.state().foundation_piles[foundation_index_for_suit(Suit::Hearts)];
        assert_eq!(hearts.len(), 2);
        assert!(session.state().tableau_piles[0].is_empty());
        let actions: Vec<_> = session.state().history.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, ["new-game", "flip-stock", "auto-move", "auto-move"]);
        assert!(played(&session).ends_with(&[SoundCue::CardFlip, SoundCue::CardDrop, SoundCue::CardDrop]));
    }

    #[test]
    fn winning_move_updates_stats_and_clears_save() {
        let mut session = session();
        let mut state = board(GameSettings::default());
        for suit in [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades] {
            let ranks = (1..=13).filter_map(Rank::from_value);
            let mut pile: Vec<Card> = ranks.map(|rank| up(suit, rank)).collect();
            if suit == Suit::Hearts {
                pile.pop();
            }
            state.foundation_piles[foundation_index_for_suit(suit)] = pile;
        }
        let king = up(Suit::Hearts, Rank::King);
        state.waste_pile = vec![king.clone()];
        install(&mut session, state);

        session.auto_move(&king, 5.0).unwrap();
        assert!(session.state().is_game_won);
        assert_eq!(session.stats().games_won, 1);
        assert_eq!(session.stats().current_streak, 1);
        assert_eq!(played(&session).last(), Some(&SoundCue::Win));
        assert_eq!(session.persistence().store().get(GAME_STATE_KEY).unwrap(), None);
        assert_eq!(session.persistence().load_stats().unwrap().games_won, 1);
    }

    #[test]
    fn abandoning_a_started_game_breaks_the_streak() {
        let mut session = session();
        session.state.stats.current_streak = 3;
        session.flip_stock(1.0).unwrap();
        session.new_game(8, 2.0);
        assert_eq!(session.stats().games_played, 2);
        assert_eq!(session.stats().current_streak, 0);
    }

    #[test]
    fn hints_follow_settings() {
        let mut session = session();
        assert!(session.hint().is_some());
        let settings = GameSettings { show_hints: false, ..session.settings().clone() };
        session.update_settings(settings);
        assert_eq!(session.hint(), None);
        assert!(!session.persistence().load_settings().unwrap().show_hints);
    }

    #[test]
    fn disabling_sound_silences_cues() {
        let mut session = session();
        let settings = GameSettings { sound_enabled: false, ..session.settings().clone() };
        session.update_settings(settings);
        session.flip_stock(1.0).unwrap();
        assert_eq!(played(&session), [SoundCue::Shuffle]);
    }

    #[test]
    fn restore_resumes_recent_game() {
        let store = MemoryStore::new();
        let persistence = GamePersistence::new(store);
        let mut first = GameSession::new(persistence, AudioService::new(RecordingPlayer::default(), false), 3, 0.0);
        first.flip_stock(10.0).unwrap();
        let waste = first.state().waste_pile.clone();

        let GameSession { persistence, .. } = first;
        let resumed =
            GameSession::restore_or_new(persistence, AudioService::new(RecordingPlayer::default(), false), 99, 20.0);
        assert_eq!(resumed.state().waste_pile, waste);
        assert_eq!(resumed.state().moves, 1);
        assert!(resumed.can_undo());
    }

    #[test]
    fn restored_game_does_not_undo_into_the_undone_branch() {
        let mut first = GameSession::new(
            GamePersistence::new(MemoryStore::new()),
            AudioService::new(RecordingPlayer::default(), false),
            3,
            0.0,
        );
        for i in 0..20 {
            first.flip_stock(f64::from(i)).unwrap();
        }
        for _ in 0..15 {
            assert!(first.undo(30.0));
        }
        assert_eq!(first.state().moves, 5);

        let GameSession { persistence, .. } = first;
        let mut resumed =
            GameSession::restore_or_new(persistence, AudioService::new(RecordingPlayer::default(), false), 99, 40.0);
        assert_eq!(resumed.state().moves, 5);
        assert_eq!(resumed.state().history_index, 5);
        assert_eq!(resumed.state().history.len(), 6);

        resumed.flip_stock(50.0).unwrap();
        assert_eq!(resumed.state().moves, 6);
        assert!(resumed.undo(60.0));
        assert_eq!(resumed.state().moves, 5);
    }

    #[test]
    fn selection_is_stored_and_cleared() {
        let mut session = session();
        let top = session.state().tableau_piles[0].len() - 1;
        session.select(&CardPosition::new(PileType::Tableau, 0, top)).unwrap();
        assert!(session.state().has_selection());
        session.clear_selection();
        assert!(!session.state().has_selection());
    }
}
