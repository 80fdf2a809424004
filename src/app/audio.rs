// src/app/audio.rs
//! 効果音サービス 🔊
//!
//! アプリ起動時に一度だけ作って、必要なところに参照で渡す。読み込んだ音は
//! インスタンスの中にだけキャッシュして、`init()` / `dispose()` で明示的に出し入れする。
//! 再生は投げっぱなし。鳴らなくてもゲームは止めない。

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundCue {
    CardFlip,
    CardMove,
    CardDrop,
    Shuffle,
    Win,
    Error,
}

impl SoundCue {
    pub const ALL: [SoundCue; 6] = [
        SoundCue::CardFlip,
        SoundCue::CardMove,
        SoundCue::CardDrop,
        SoundCue::Shuffle,
        SoundCue::Win,
        SoundCue::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundCue::CardFlip => "cardFlip",
            SoundCue::CardMove => "cardMove",
            SoundCue::CardDrop => "cardDrop",
            SoundCue::Shuffle => "shuffle",
            SoundCue::Win => "win",
            SoundCue::Error => "error",
        }
    }

    pub fn asset_path(self) -> String {
        format!("sounds/{}.mp3", self.name())
    }
}

/// 実際に音を読み込んで鳴らすもの。
pub trait CuePlayer {
    type Handle;

    fn load(&self, cue: SoundCue) -> Result<Self::Handle, AudioError>;
    fn play(&self, cue: SoundCue, handle: &Self::Handle) -> Result<(), AudioError>;
}

pub struct AudioService<P: CuePlayer> {
    player: P,
    cache: HashMap<SoundCue, P::Handle>,
    enabled: bool,
    initialized: bool,
}

impl<P: CuePlayer> AudioService<P> {
    pub fn new(player: P, enabled: bool) -> Self {
        Self { player, cache: HashMap::new(), enabled, initialized: false }
    }

    /// 全部の音を読み込む。読めなかった音はログを出して飛ばす。読めた数を返す。
    pub fn init(&mut self) -> usize {
        for cue in SoundCue::ALL {
            if self.cache.contains_key(&cue) {
                continue;
            }
            match self.player.load(cue) {
                Ok(handle) => {
                    self.cache.insert(cue, handle);
                }
                Err(e) => warn!("[Audio] failed to load {}: {}", cue.name(), e),
            }
        }
        self.initialized = true;
        info!("[Audio] initialized with {} cue(s)", self.cache.len());
        self.cache.len()
    }

    pub fn dispose(&mut self) {
        self.cache.clear();
        self.initialized = false;
        debug!("[Audio] disposed");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// 鳴らしてみる。鳴らさなかった (無効) なら Ok(false)。
    pub fn try_play(&self, cue: SoundCue) -> Result<bool, AudioError> {
        if !self.enabled {
            return Ok(false);
        }
        if !self.initialized {
            return Err(AudioError::NotInitialized);
        }
        let handle = self.cache.get(&cue).ok_or(AudioError::Playback {
            cue: cue.name(),
            reason: "not loaded".to_string(),
        })?;
        self.player.play(cue, handle)?;
        Ok(true)
    }

    /// 投げっぱなしで鳴らす。失敗してもログだけ。
    pub fn play(&self, cue: SoundCue) {
        if let Err(e) = self.try_play(cue) {
            debug!("[Audio] {} not played: {}", cue.name(), e);
        }
    }
}

/// `<audio>` 要素で鳴らすプレイヤー。
#[derive(Debug, Clone, Default)]
pub struct HtmlAudioPlayer;

impl CuePlayer for HtmlAudioPlayer {
    type Handle = HtmlAudioElement;

    fn load(&self, cue: SoundCue) -> Result<HtmlAudioElement, AudioError> {
        let audio = HtmlAudioElement::new_with_src(&cue.asset_path()).map_err(|e| AudioError::Playback {
            cue: cue.name(),
            reason: format!("{:?}", e),
        })?;
        audio.set_preload("auto");
        Ok(audio)
    }

    fn play(&self, cue: SoundCue, audio: &HtmlAudioElement) -> Result<(), AudioError> {
        audio.set_current_time(0.0);
        let promise = audio.play().map_err(|e| AudioError::Playback { cue: cue.name(), reason: format!("{:?}", e) })?;
        // 自動再生ポリシーで拒否されることがある。待たずに結果だけログに残す
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                debug!("[Audio] {} rejected by browser: {:?}", cue.name(), e);
            }
        });
        Ok(())
    }
}
