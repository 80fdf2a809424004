// src/app/position_detector.rs
//! DOM 要素の画面上の位置を「信用できる値」にする位置検出エンジンだよ！📐
//!
//! ブラウザはレイアウトが終わったタイミングを教えてくれないので、ここでは DOM を
//! 「そのうち正しくなる、当てにならない情報源」として扱う。
//!
//! 1 回の試行の流れ:
//! 1. document に繋がるまで待つ
//! 2. カードの大きさの CSS 変数が読めるまで待つ
//! 3. 矩形が 2 回続けて同じになるまで待つ
//! 4. 測る。矩形が 0 なのに CSS の大きさがある時は強制リフローして測り直し、
//!    それでもダメなら (0,0) に CSS の大きさで low 扱い
//! 5. 画面から極端に外れていないか確認
//!
//! 最大 10 回試してダメなら固定の fallback を返す。エラーは絶対に外に出さない。

use futures::join;
use log::debug;

use crate::app::dom_probe::{LayoutEnvironment, MeasurableElement};
use crate::components::position::{Confidence, ElementPosition, ElementPositions, PositionResolution, PositionSource, Rect};
use crate::config::layout::{
    ATTACH_POLL_DELAY_MS, ATTACH_POLL_LIMIT, CSS_VAR_POLL_DELAY_MS, CSS_VAR_POLL_LIMIT, FORCED_REFLOW_PASSES,
    MAX_POSITION_ATTEMPTS, RETRY_BASE_DELAY_MS, STABILITY_POLL_DELAY_MS, STABILITY_POLL_LIMIT, STABLE_READS_REQUIRED,
    VIEWPORT_BOUND_FACTOR,
};
use crate::error::ProbeError;

/// 1 回の試行の結果。
enum Attempt {
    Accepted(ElementPosition),
    /// 測れたけど使えない値だった (範囲外など)。次の試行へ。
    Rejected(&'static str),
}

pub struct PositionDetector<E: LayoutEnvironment> {
    env: E,
}

impl<E: LayoutEnvironment> PositionDetector<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    /// 要素の位置を解決する。何があっても値を返す。
    pub async fn get_element_position<M: MeasurableElement>(&self, element: &M) -> PositionResolution {
        for attempt in 1..=MAX_POSITION_ATTEMPTS {
            match self.try_measure(element).await {
                Ok(Attempt::Accepted(position)) => {
                    let resolution = PositionResolution { position, resolved: true, attempts: attempt };
                    log_resolution(&resolution);
                    return resolution;
                }
                Ok(Attempt::Rejected(reason)) => debug!("[Position] attempt {} rejected: {}", attempt, reason),
                Err(e) => debug!("[Position] attempt {} failed: {}", attempt, e),
            }
            if attempt < MAX_POSITION_ATTEMPTS {
                self.env.sleep(RETRY_BASE_DELAY_MS * attempt).await;
            }
        }

        let resolution = PositionResolution {
            position: ElementPosition::fallback(),
            resolved: false,
            attempts: MAX_POSITION_ATTEMPTS,
        };
        log_resolution(&resolution);
        resolution
    }

    /// 移動元と移動先を同時に解決する。
    pub async fn get_element_positions<M: MeasurableElement>(&self, from: &M, to: &M) -> ElementPositions {
        let (from, to) = join!(self.get_element_position(from), self.get_element_position(to));
        ElementPositions { from, to }
    }

    async fn try_measure<M: MeasurableElement>(&self, element: &M) -> Result<Attempt, ProbeError> {
        self.wait_for_attach(element).await?;
        let css_vars_loaded = self.wait_for_css_vars().await;
        let rect = self.wait_for_stable_rect(element).await?;

        let css_size = element.computed_size().unwrap_or_else(|e| {
            debug!("[Position] computed style unreadable: {}", e);
            None
        });

        let rect = if rect.is_all_zero() && css_size.is_some() {
            self.reflow_until_sized(element)?.unwrap_or(rect)
        } else {
            rect
        };

        if !rect.is_finite() {
            return Ok(Attempt::Rejected("non-finite rect"));
        }

        if !rect.has_size() {
            return Ok(match css_size {
                // CSS はあるのにレイアウトがまだ。場所は分からないので (0,0) で low
                Some((width, height)) => Attempt::Accepted(ElementPosition {
                    x: 0.0,
                    y: 0.0,
                    width,
                    height,
                    visible: css_vars_loaded,
                    confidence: Confidence::Low,
                    source: PositionSource::Measured,
                }),
                None => Attempt::Rejected("element has no size"),
            });
        }

        let center = rect.center();
        if !self.within_viewport_bounds(center.x, center.y) {
            return Ok(Attempt::Rejected("position far outside the viewport"));
        }

        let rect_valid = !rect.is_all_zero();
        let visible = (rect.has_size() || css_size.is_some())
            && css_vars_loaded
            && (rect_valid || element.has_layout_box() || css_size.is_some());
        let confidence = if visible { Confidence::High } else { Confidence::Medium };

        Ok(Attempt::Accepted(ElementPosition {
            x: center.x,
            y: center.y,
            width: rect.width,
            height: rect.height,
            visible,
            confidence,
            source: PositionSource::Measured,
        }))
    }

    async fn wait_for_attach<M: MeasurableElement>(&self, element: &M) -> Result<(), ProbeError> {
        for _ in 0..ATTACH_POLL_LIMIT {
            if element.is_connected() {
                return Ok(());
            }
            self.env.sleep(ATTACH_POLL_DELAY_MS).await;
        }
        if element.is_connected() {
            Ok(())
        } else {
            Err(ProbeError::Detached)
        }
    }

    /// CSS 変数が読めたら true。読めないまま上限に達したら false で先に進む。
    async fn wait_for_css_vars(&self) -> bool {
        for _ in 0..CSS_VAR_POLL_LIMIT {
            if self.env.card_size_vars().is_some() {
                return true;
            }
            self.env.sleep(CSS_VAR_POLL_DELAY_MS).await;
        }
        self.env.card_size_vars().is_some()
    }

    /// 矩形が続けて同じ値になるまで読み直す。上限に達したら最後の値を使う。
    async fn wait_for_stable_rect<M: MeasurableElement>(&self, element: &M) -> Result<Rect, ProbeError> {
        let mut previous = element.bounding_rect()?;
        let mut stable_reads = 1;
        for _ in 0..STABILITY_POLL_LIMIT {
            if stable_reads >= STABLE_READS_REQUIRED {
                break;
            }
            self.env.sleep(STABILITY_POLL_DELAY_MS).await;
            let current = element.bounding_rect()?;
            if current.approx_eq(&previous) {
                stable_reads += 1;
            } else {
                stable_reads = 1;
            }
            previous = current;
        }
        Ok(previous)
    }

    fn reflow_until_sized<M: MeasurableElement>(&self, element: &M) -> Result<Option<Rect>, ProbeError> {
        for pass in 1..=FORCED_REFLOW_PASSES {
            element.force_reflow();
            let rect = element.bounding_rect()?;
            if rect.has_size() {
                debug!("[Position] layout appeared after {} forced reflow(s)", pass);
                return Ok(Some(rect));
            }
        }
        Ok(None)
    }

    fn within_viewport_bounds(&self, x: f64, y: f64) -> bool {
        let (width, height) = self.env.viewport();
        if width <= 0.0 || height <= 0.0 {
            // 画面サイズが分からない時は判定しない
            return true;
        }
        let bound_x = width * VIEWPORT_BOUND_FACTOR;
        let bound_y = height * VIEWPORT_BOUND_FACTOR;
        (-bound_x..=bound_x).contains(&x) && (-bound_y..=bound_y).contains(&y)
    }
}

fn log_resolution(resolution: &PositionResolution) {
    debug!(
        "[Position] attempts={} confidence={:?} source={:?} resolved={}",
        resolution.attempts,
        resolution.position.confidence,
        resolution.position.source,
        resolution.resolved
    );
}
