// src/app/dom_probe.rs
//! DOM を「読む」部分だけを trait に切り出したモジュールだよ。🔍
//!
//! 位置検出エンジンは `MeasurableElement` (測る対象) と `LayoutEnvironment` (CSS 変数・画面サイズ・タイマー)
//! しか知らない。ブラウザでは web-sys の実装、テストでは `fakes` の偽物を差し込む。

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_timers::future::TimeoutFuture;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Window};

use crate::components::position::Rect;
use crate::config::layout::{CARD_HEIGHT_VAR, CARD_WIDTH_VAR};
use crate::error::ProbeError;

/// 位置を測れる要素。
pub trait MeasurableElement {
    /// document に繋がっているか。
    fn is_connected(&self) -> bool;
    /// `getBoundingClientRect()` 相当。
    fn bounding_rect(&self) -> Result<Rect, ProbeError>;
    /// 計算済みスタイルの width/height。どちらかが正の値でなければ `Ok(None)`。
    fn computed_size(&self) -> Result<Option<(f64, f64)>, ProbeError>;
    /// レイアウトに参加しているか (offsetParent があるか)。
    fn has_layout_box(&self) -> bool;
    /// offsetWidth/Height を読んで同期レイアウトを強制する。
    fn force_reflow(&self);
}

/// ページ全体の環境。
pub trait LayoutEnvironment {
    /// カードの大きさの CSS 変数。両方とも正の値で読めた時だけ Some。
    fn card_size_vars(&self) -> Option<(f64, f64)>;
    /// (innerWidth, innerHeight)
    fn viewport(&self) -> (f64, f64);
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// `"72px"` や `" 52 "` を数値にする。正の有限値だけ受け付ける。
pub fn parse_css_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

// --- ブラウザ実装 ---

/// web-sys の `Element` を包んだもの。
#[derive(Debug, Clone)]
pub struct BrowserElement {
    element: Element,
}

impl BrowserElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    fn html(&self) -> Option<&HtmlElement> {
        self.element.dyn_ref::<HtmlElement>()
    }
}

impl MeasurableElement for BrowserElement {
    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }

    fn bounding_rect(&self) -> Result<Rect, ProbeError> {
        if !self.element.is_connected() {
            return Err(ProbeError::Detached);
        }
        let rect = self.element.get_bounding_client_rect();
        Ok(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()))
    }

    fn computed_size(&self) -> Result<Option<(f64, f64)>, ProbeError> {
        let window = web_sys::window().ok_or(ProbeError::NoDocument)?;
        let style = window
            .get_computed_style(&self.element)
            .map_err(|e| ProbeError::ComputedStyle(format!("{:?}", e)))?
            .ok_or_else(|| ProbeError::ComputedStyle("no style declaration".to_string()))?;
        let read = |property: &str| -> Result<Option<f64>, ProbeError> {
            style
                .get_property_value(property)
                .map(|value| parse_css_px(&value))
                .map_err(|e| ProbeError::ComputedStyle(format!("{}: {:?}", property, e)))
        };
        Ok(read("width")?.zip(read("height")?))
    }

    fn has_layout_box(&self) -> bool {
        self.html().map_or(false, |html| html.offset_parent().is_some())
    }

    fn force_reflow(&self) {
        if let Some(html) = self.html() {
            // 読むだけでレイアウトが走る
            let _ = html.offset_height();
            let _ = html.offset_width();
        }
    }
}

/// 本物の window を見る環境。
#[derive(Debug, Clone, Default)]
pub struct BrowserEnvironment;

impl BrowserEnvironment {
    fn window(&self) -> Option<Window> {
        web_sys::window()
    }
}

impl LayoutEnvironment for BrowserEnvironment {
    fn card_size_vars(&self) -> Option<(f64, f64)> {
        let window = self.window()?;
        let root = window.document()?.document_element()?;
        let style = window.get_computed_style(&root).ok()??;
        let width = style.get_property_value(CARD_WIDTH_VAR).ok()?;
        let height = style.get_property_value(CARD_HEIGHT_VAR).ok()?;
        let size = parse_css_px(&width).zip(parse_css_px(&height));
        if size.is_none() {
            debug!("[Probe] css vars not ready: width='{}' height='{}'", width, height);
        }
        size
    }

    fn viewport(&self) -> (f64, f64) {
        let Some(window) = self.window() else {
            return (0.0, 0.0);
        };
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (width, height)
    }

    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(ms).boxed_local()
    }
}
