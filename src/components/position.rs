// src/components/position.rs

use serde::{Deserialize, Serialize};

use crate::config::layout::{FALLBACK_HEIGHT, FALLBACK_WIDTH, FALLBACK_X, FALLBACK_Y};

/// 2D の点 (画面座標、px)。ドラッグのオフセットや移動先の計算に使うよ。📍
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `getBoundingClientRect()` 相当の矩形。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn has_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// 全部 0。CSS はあるのにレイアウトがまだ走っていない時によく見るやつ。
    pub fn is_all_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.width == 0.0 && self.height == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// 二回の読み取りが「同じ」とみなせるか (サブピクセルの揺れは無視)。
    pub fn approx_eq(&self, other: &Rect) -> bool {
        const EPSILON: f64 = 0.5;
        (self.left - other.left).abs() < EPSILON
            && (self.top - other.top).abs() < EPSILON
            && (self.width - other.width).abs() < EPSILON
            && (self.height - other.height).abs() < EPSILON
    }
}

/// 位置の信頼度。アニメーション側はこれを見て、ちゃんと飛ばすか省略するか決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// 実測した値か、最後の手段の固定値か。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSource {
    Measured,
    Fallback,
}

/// ある瞬間の DOM 要素の画面上の位置。ライブな参照じゃなくてスナップショットだよ。
/// `x`, `y` は要素の中心点。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub confidence: Confidence,
    pub source: PositionSource,
}

impl ElementPosition {
    /// 何をやってもダメだった時の固定位置。
    pub fn fallback() -> Self {
        Self {
            x: FALLBACK_X,
            y: FALLBACK_Y,
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
            visible: false,
            confidence: Confidence::Low,
            source: PositionSource::Fallback,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PositionSource::Fallback
    }
}

/// 位置検出の結果。ログの文章を読まなくてもテストできるように、試行回数も一緒に返す。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionResolution {
    pub position: ElementPosition,
    /// 実測で決まったら true、固定の fallback なら false。
    pub resolved: bool,
    pub attempts: u32,
}

impl PositionResolution {
    pub fn confidence(&self) -> Confidence {
        self.position.confidence
    }
}

/// from/to をまとめて解決した結果。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementPositions {
    pub from: PositionResolution,
    pub to: PositionResolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_matches_fixed_values() {
        let fb = ElementPosition::fallback();
        assert_eq!((fb.x, fb.y, fb.width, fb.height), (100.0, 100.0, 52.0, 72.0));
        assert!(!fb.visible);
        assert_eq!(fb.confidence, Confidence::Low);
        assert_eq!(fb.source, PositionSource::Fallback);
    }

    #[test]
    fn rect_center_and_stability() {
        let rect = Rect::new(10.0, 20.0, 50.0, 70.0);
        assert_eq!(rect.center(), Point::new(35.0, 55.0));
        assert!(rect.approx_eq(&Rect::new(10.2, 20.0, 50.0, 70.1)));
        assert!(!rect.approx_eq(&Rect::new(14.0, 20.0, 50.0, 70.0)));
        assert!(Rect::default().is_all_zero());
        assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
    }

    #[test]
    fn confidence_serializes_lowercase() {
        let json = serde_json::to_value(ElementPosition::fallback()).unwrap();
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["source"], "fallback");
    }
}
