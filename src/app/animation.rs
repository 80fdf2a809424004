// src/app/animation.rs
//! カードが飛んでいく見た目だけを担当するアニメーションエンジンだよ！🎬
//!
//! 盤面 (GameState) には絶対に触らない。位置は `PositionDetector` に聞いて、
//! 複製したオーバーレイをタイマーで段階的に動かす。transitionend は取りこぼすことがあるので使わない。

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use futures::future::join_all;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::app::dom_probe::LayoutEnvironment;
use crate::app::overlay::{AnimationPhase, OverlayGuard, OverlayHost};
use crate::app::position_detector::PositionDetector;
use crate::components::card::Card;
use crate::components::position::{Confidence, Point};
use crate::config::game::{DEFAULT_ANIMATION_DURATION_MS, MIN_ANIMATION_DISTANCE_PX};
use crate::error::AnimationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationType {
    Move,
    Flip,
    Shuffle,
}

impl FromStr for AnimationType {
    type Err = AnimationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "move" => Ok(AnimationType::Move),
            "flip" => Ok(AnimationType::Flip),
            "shuffle" => Ok(AnimationType::Shuffle),
            other => Err(AnimationError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnimationType::Move => "move",
            AnimationType::Flip => "flip",
            AnimationType::Shuffle => "shuffle",
        })
    }
}

pub type CompleteCallback = Box<dyn FnOnce()>;
pub type ErrorCallback = Box<dyn FnOnce(String)>;

pub struct AnimationOptions {
    pub animation_type: AnimationType,
    pub duration_ms: u32,
    /// flip の時に、元のカードが裏向きかどうかを見る。
    pub card: Option<Card>,
    pub on_complete: Option<CompleteCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl AnimationOptions {
    pub fn new(animation_type: AnimationType) -> Self {
        Self {
            animation_type,
            duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            card: None,
            on_complete: None,
            on_error: None,
        }
    }

    /// JS から来た文字列で種類を決める。知らない種類ならエラー。
    pub fn named(type_name: &str) -> Result<Self, AnimationError> {
        type_name.parse().map(Self::new)
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(String) + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for AnimationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationOptions")
            .field("animation_type", &self.animation_type)
            .field("duration_ms", &self.duration_ms)
            .field("card", &self.card.as_ref().map(Card::label))
            .finish_non_exhaustive()
    }
}

/// 2 点間の移動量。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPath {
    pub dx: f64,
    pub dy: f64,
    pub distance: f64,
    /// 度 (degree)。
    pub angle: f64,
}

impl AnimationPath {
    pub fn between(from: Point, to: Point) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        Self { dx, dy, distance: dx.hypot(dy), angle: dy.atan2(dx).to_degrees() }
    }

    pub fn is_degenerate(&self) -> bool {
        self.distance < MIN_ANIMATION_DISTANCE_PX
    }
}

/// オーバーレイの初期状態と、順番に流すフェーズ。
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlan {
    pub initial_opacity: f64,
    pub phases: Vec<AnimationPhase>,
}

fn translate(dx: f64, dy: f64) -> String {
    format!("translate({}px, {}px)", dx, dy)
}

/// 種類ごとのフェーズを組み立てる。DOM には触らない純粋な計算。
pub fn plan_animation<R: Rng>(
    animation_type: AnimationType,
    path: &AnimationPath,
    duration_ms: u32,
    card: Option<&Card>,
    rng: &mut R,
) -> AnimationPlan {
    match animation_type {
        AnimationType::Move => AnimationPlan {
            initial_opacity: 1.0,
            phases: vec![AnimationPhase {
                duration_ms,
                transform: translate(path.dx, path.dy),
                opacity: None,
                easing: "ease-in-out",
            }],
        },
        AnimationType::Flip if card.map_or(false, |card| !card.is_face_up) => {
            // 裏向きから: 浮かび上がる 25% → 半分進みながら回転 50% → 残り 25%
            let reveal = duration_ms / 4;
            let rotate = duration_ms / 2;
            let settle = duration_ms - reveal - rotate;
            AnimationPlan {
                initial_opacity: 0.0,
                phases: vec![
                    AnimationPhase {
                        duration_ms: reveal,
                        transform: translate(0.0, 0.0),
                        opacity: Some(1.0),
                        easing: "ease-out",
                    },
                    AnimationPhase {
                        duration_ms: rotate,
                        transform: format!("{} rotateY(180deg)", translate(path.dx / 2.0, path.dy / 2.0)),
                        opacity: None,
                        easing: "ease-in-out",
                    },
                    AnimationPhase {
                        duration_ms: settle,
                        transform: format!("{} rotateY(180deg)", translate(path.dx, path.dy)),
                        opacity: None,
                        easing: "ease-in",
                    },
                ],
            }
        }
        AnimationType::Flip => AnimationPlan {
            initial_opacity: 1.0,
            phases: vec![AnimationPhase {
                duration_ms,
                transform: format!("{} rotateY(180deg)", translate(path.dx, path.dy)),
                opacity: None,
                easing: "ease-in-out",
            }],
        },
        AnimationType::Shuffle => {
            let turns: i32 = rng.gen_range(1..=2);
            let direction = if rng.gen_bool(0.5) { 1 } else { -1 };
            AnimationPlan {
                initial_opacity: 1.0,
                phases: vec![AnimationPhase {
                    duration_ms,
                    transform: format!(
                        "{} rotate({}deg) scale(0.9)",
                        translate(path.dx, path.dy),
                        360 * turns * direction
                    ),
                    opacity: None,
                    easing: "cubic-bezier(0.68, -0.55, 0.27, 1.55)",
                }],
            }
        }
    }
}

/// `animate_element_sequence` の 1 件分。
pub struct SequenceItem<'a, T> {
    pub from: &'a T,
    pub to: &'a T,
    pub options: AnimationOptions,
}

/// シーケンス全体の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    pub completed: usize,
    pub failed: usize,
}

pub struct Animator<H: OverlayHost, E: LayoutEnvironment> {
    host: H,
    detector: PositionDetector<E>,
    rng: RefCell<StdRng>,
}

impl<H: OverlayHost, E: LayoutEnvironment> Animator<H, E> {
    pub fn new(host: H, env: E) -> Self {
        Self::with_rng(host, env, StdRng::from_entropy())
    }

    pub fn with_rng(host: H, env: E, rng: StdRng) -> Self {
        Self { host, detector: PositionDetector::new(env), rng: RefCell::new(rng) }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn detector(&self) -> &PositionDetector<E> {
        &self.detector
    }

    /// 1 枚分のアニメーション。成功しても失敗しても必ず終わる。
    ///
    /// 成功したら `on_complete`、失敗したら `on_error` を呼んでから `Err` を返す。
    pub async fn animate_element(
        &self,
        from: &H::Element,
        to: &H::Element,
        options: AnimationOptions,
    ) -> Result<(), AnimationError> {
        let AnimationOptions { animation_type, duration_ms, card, on_complete, on_error } = options;
        match self.run(from, to, animation_type, duration_ms, card.as_ref()).await {
            Ok(()) => {
                if let Some(callback) = on_complete {
                    callback();
                }
                Ok(())
            }
            Err(e) => {
                warn!("[Animation] {} failed: {}", animation_type, e);
                if let Some(callback) = on_error {
                    callback(e.to_string());
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        from: &H::Element,
        to: &H::Element,
        animation_type: AnimationType,
        duration_ms: u32,
        card: Option<&Card>,
    ) -> Result<(), AnimationError> {
        let positions = self.detector.get_element_positions(from, to).await;
        if positions.from.confidence() == Confidence::Low || positions.to.confidence() == Confidence::Low {
            // 位置があてにならないなら飛ばさずに終わりの状態へ (フォールバックも Low)
            info!(
                "[Animation] {} skipped: low confidence (from={:?}, to={:?})",
                animation_type, positions.from.position.source, positions.to.position.source
            );
            return Ok(());
        }

        let path = AnimationPath::between(positions.from.position.center(), positions.to.position.center());
        if path.is_degenerate() {
            debug!("[Animation] {} skipped: distance {:.2}px", animation_type, path.distance);
            return Ok(());
        }

        let plan = {
            let mut rng = self.rng.borrow_mut();
            plan_animation(animation_type, &path, duration_ms, card, &mut *rng)
        };
        let overlay = self.host.create_overlay(from, &positions.from.position, plan.initial_opacity)?;
        let guard = OverlayGuard::new(&self.host, overlay);

        for phase in &plan.phases {
            self.host.apply_phase(guard.overlay(), phase)?;
            self.detector.environment().sleep(phase.duration_ms).await;
        }
        debug!("[Animation] {} finished ({:.0}px, {:.0}deg)", animation_type, path.distance, path.angle);
        Ok(())
    }

    /// 複数のアニメーションを `stagger_delay_ms` ずつずらして同時に走らせる。
    ///
    /// 一つ失敗しても残りは止めない。全部終わってから `on_complete` を呼ぶ。
    /// 失敗があった時は、その後で `on_error` に件数を渡す。
    pub async fn animate_element_sequence(
        &self,
        animations: Vec<SequenceItem<'_, H::Element>>,
        stagger_delay_ms: u32,
        on_complete: Option<CompleteCallback>,
        on_error: Option<ErrorCallback>,
    ) -> SequenceReport {
        let total = animations.len();
        let runs = animations.into_iter().enumerate().map(|(index, item)| async move {
            let delay = u32::try_from(index).unwrap_or(u32::MAX).saturating_mul(stagger_delay_ms);
            if delay > 0 {
                self.detector.environment().sleep(delay).await;
            }
            self.animate_element(item.from, item.to, item.options).await
        });
        let results = join_all(runs).await;

        let failed = results.iter().filter(|result| result.is_err()).count();
        let report = SequenceReport { completed: total - failed, failed };
        info!("[Animation] sequence done: {:?}", report);

        if let Some(callback) = on_complete {
            callback();
        }
        if failed > 0 {
            if let Some(callback) = on_error {
                callback(format!("{} of {} animations failed", failed, total));
            }
        }
        report
    }
}
