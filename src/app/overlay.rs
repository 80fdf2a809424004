// src/app/overlay.rs
//! アニメーション用のオーバーレイ (カードの複製) を作って動かす部分。
//! 本物の山のレイアウトに影響しないように、body 直下に position: fixed で置く。

use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::app::dom_probe::{BrowserElement, MeasurableElement};
use crate::components::position::ElementPosition;
use crate::config::layout::OVERLAY_Z_INDEX;
use crate::error::AnimationError;

/// 1 フェーズ分の CSS 変化。`duration_ms` かけて `transform` (と `opacity`) に向かう。
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPhase {
    pub duration_ms: u32,
    pub transform: String,
    pub opacity: Option<f64>,
    pub easing: &'static str,
}

impl AnimationPhase {
    pub fn transition(&self) -> String {
        format!(
            "transform {ms}ms {easing}, opacity {ms}ms {easing}",
            ms = self.duration_ms,
            easing = self.easing
        )
    }
}

/// オーバーレイを置いたり動かしたり消したりできるもの。
pub trait OverlayHost {
    type Element: MeasurableElement;
    type Overlay;

    /// `source` を複製して `at` (中心座標) に置く。
    fn create_overlay(
        &self,
        source: &Self::Element,
        at: &ElementPosition,
        initial_opacity: f64,
    ) -> Result<Self::Overlay, AnimationError>;
    fn apply_phase(&self, overlay: &Self::Overlay, phase: &AnimationPhase) -> Result<(), AnimationError>;
    fn remove_overlay(&self, overlay: &Self::Overlay);
}

/// スコープを抜けたら必ずオーバーレイを消すガード。途中で失敗しても残骸は残らない。
pub struct OverlayGuard<'a, H: OverlayHost> {
    host: &'a H,
    overlay: H::Overlay,
}

impl<'a, H: OverlayHost> OverlayGuard<'a, H> {
    pub fn new(host: &'a H, overlay: H::Overlay) -> Self {
        Self { host, overlay }
    }

    pub fn overlay(&self) -> &H::Overlay {
        &self.overlay
    }
}

impl<H: OverlayHost> Drop for OverlayGuard<'_, H> {
    fn drop(&mut self) {
        self.host.remove_overlay(&self.overlay);
    }
}

// --- ブラウザ実装 ---

#[derive(Debug, Clone)]
pub struct BrowserOverlayHost {
    document: Document,
}

impl BrowserOverlayHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn from_window() -> Result<Self, AnimationError> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
            .ok_or_else(|| AnimationError::Overlay("document is unavailable".to_string()))
    }
}

fn set_style(element: &HtmlElement, property: &str, value: &str) -> Result<(), AnimationError> {
    element.style().set_property(property, value).map_err(|e| AnimationError::Style {
        property: property.to_string(),
        reason: format!("{:?}", e),
    })
}

impl OverlayHost for BrowserOverlayHost {
    type Element = BrowserElement;
    type Overlay = HtmlElement;

    fn create_overlay(
        &self,
        source: &BrowserElement,
        at: &ElementPosition,
        initial_opacity: f64,
    ) -> Result<HtmlElement, AnimationError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| AnimationError::Overlay("document has no body".to_string()))?;
        let clone = source
            .element()
            .clone_node_with_deep(true)
            .map_err(|e| AnimationError::Overlay(format!("clone failed: {:?}", e)))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| AnimationError::Overlay("cloned node is not an HtmlElement".to_string()))?;

        let left = at.x - at.width / 2.0;
        let top = at.y - at.height / 2.0;
        for (property, value) in [
            ("position", "fixed".to_string()),
            ("left", format!("{}px", left)),
            ("top", format!("{}px", top)),
            ("width", format!("{}px", at.width)),
            ("height", format!("{}px", at.height)),
            ("margin", "0".to_string()),
            ("z-index", OVERLAY_Z_INDEX.to_string()),
            ("pointer-events", "none".to_string()),
            ("transform", "none".to_string()),
            ("opacity", initial_opacity.to_string()),
            ("will-change", "transform, opacity".to_string()),
        ] {
            set_style(&clone, property, &value)?;
        }

        body.append_child(&clone)
            .map_err(|e| AnimationError::Overlay(format!("append failed: {:?}", e)))?;
        // 置いた直後の状態を確定させておかないと最初の transition が飛ばされる
        let _ = clone.offset_width();
        debug!("[Overlay] created at ({}, {})", left, top);
        Ok(clone)
    }

    fn apply_phase(&self, overlay: &HtmlElement, phase: &AnimationPhase) -> Result<(), AnimationError> {
        set_style(overlay, "transition", &phase.transition())?;
        set_style(overlay, "transform", &phase.transform)?;
        if let Some(opacity) = phase.opacity {
            set_style(overlay, "opacity", &opacity.to_string())?;
        }
        Ok(())
    }

    fn remove_overlay(&self, overlay: &HtmlElement) {
        if overlay.is_connected() {
            overlay.remove();
        } else {
            warn!("[Overlay] already detached");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::RecordingHost;
    use super::*;

    #[test]
    fn guard_removes_overlay_on_drop() {
        let host = RecordingHost::default();
        let element = crate::app::dom_probe::fakes::FakeElement::detached();
        {
            let overlay = host.create_overlay(&element, &ElementPosition::fallback(), 1.0).unwrap();
            let guard = OverlayGuard::new(&host, overlay);
            assert_eq!(*guard.overlay(), 0);
            assert_eq!(host.live_overlays(), 1);
        }
        assert_eq!(host.live_overlays(), 0);
    }

    #[test]
    fn transition_covers_transform_and_opacity() {
        let phase = AnimationPhase {
            duration_ms: 120,
            transform: "translate(1px, 2px)".to_string(),
            opacity: None,
            easing: "ease-out",
        };
        assert_eq!(phase.transition(), "transform 120ms ease-out, opacity 120ms ease-out");
    }
}
