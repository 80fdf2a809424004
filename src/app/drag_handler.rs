// src/app/drag_handler.rs
//! Handles card dragging logic (start, update, end, cancel, snap-back).
//!
//! UI スレッド専用。並列性は無くて、ポインタイベントとタイマーのコールバックが交互に来るだけ。
//! 前のスナップバックのタイマーが残っている間に新しいドラッグが始まっても、
//! 世代番号 (generation) で古いタイマーを無視するので状態は壊れない。

use log::{debug, info, warn};
use web_sys::{Document, Element};

use crate::components::card::Card;
use crate::components::dragging_info::{DragState, DropZone};
use crate::components::game_state::{FOUNDATION_PILE_COUNT, TABLEAU_PILE_COUNT};
use crate::components::position::Point;
use crate::components::stack::{CardPosition, PileType};
use crate::config::game::{HIT_TEST_INTERVAL_MS, SNAP_BACK_DURATION_MS};

/// 画面上の点にあるドロップゾーンを調べるもの。
pub trait HitTester {
    fn zone_at(&self, point: Point) -> Option<DropZone>;
}

/// `end_drag` / `cancel_drag` の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// ドラッグ中じゃなかった。
    Ignored,
    /// 手が受理された。ドラッグ状態はもうリセット済み。
    Accepted { from: CardPosition, to: DropZone },
    /// 元に戻すアニメーション中。`duration_ms` 後に `complete_snap_back(generation)` を呼ぶこと。
    SnapBack { duration_ms: u32, generation: u64 },
}

pub struct DragController<H: HitTester> {
    state: DragState,
    zones: Vec<DropZone>,
    hovered: Option<DropZone>,
    hit_tester: H,
    last_hit_test_ms: Option<f64>,
    generation: u64,
}

impl<H: HitTester> DragController<H> {
    /// 場札 7 列と組札 4 つを登録した状態で作る。
    pub fn new(hit_tester: H) -> Self {
        let zones = (0..TABLEAU_PILE_COUNT)
            .map(|index| DropZone::new(PileType::Tableau, index))
            .chain((0..FOUNDATION_PILE_COUNT).map(|index| DropZone::new(PileType::Foundation, index)))
            .collect();
        Self {
            state: DragState::idle(),
            zones,
            hovered: None,
            hit_tester,
            last_hit_test_ms: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn drop_zones(&self) -> &[DropZone] {
        &self.zones
    }

    pub fn hovered_zone(&self) -> Option<DropZone> {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// ドラッグ開始。カードが無ければ何もしないで false。
    ///
    /// `element_center` は掴んだカードの矩形の中心。ポインタとのずれをオフセットとして覚える。
    pub fn start_drag(
        &mut self,
        cards: Vec<Card>,
        source: CardPosition,
        pointer: Point,
        element_center: Point,
        now_ms: f64,
    ) -> bool {
        if cards.is_empty() {
            debug!("[Drag] start ignored: no cards");
            return false;
        }
        if self.state.is_dragging || self.state.is_snap_back {
            warn!("[Drag] new drag supersedes the previous one");
        }
        // 古いスナップバックのタイマーを無効にする
        self.generation += 1;
        info!("[Drag] start {} card(s) from {:?}", cards.len(), source);
        self.state = DragState {
            is_dragging: true,
            dragged_cards: cards,
            drag_source: Some(source),
            drag_offset: Point::new(pointer.x - element_center.x, pointer.y - element_center.y),
            drag_position: pointer,
            is_animating: false,
            is_snap_back: false,
        };
        self.hovered = None;
        self.last_hit_test_ms = None;
        self.refresh_hover(now_ms);
        true
    }

    /// ポインタが動いた。位置はすぐ更新、当たり判定は間引く。
    pub fn update_drag(&mut self, pointer: Point, now_ms: f64) {
        if !self.state.is_dragging {
            return;
        }
        self.state.drag_position = pointer;
        self.refresh_hover(now_ms);
    }

    fn refresh_hover(&mut self, now_ms: f64) {
        let due = self
            .last_hit_test_ms
            .map_or(true, |last| now_ms - last >= HIT_TEST_INTERVAL_MS);
        if !due {
            return;
        }
        self.last_hit_test_ms = Some(now_ms);
        let zone = self
            .hit_tester
            .zone_at(self.state.drag_position)
            .filter(|zone| self.zones.contains(zone));
        if zone != self.hovered {
            debug!("[Drag] hovered zone -> {:?}", zone);
        }
        self.hovered = zone;
    }

    /// ドロップ。`move_cards(cards, from, to)` が true を返したら受理。
    ///
    /// ゾーンの上じゃない、または手が却下されたらスナップバック。
    pub fn end_drag<F>(&mut self, move_cards: F) -> DragOutcome
    where
        F: FnOnce(&[Card], CardPosition, CardPosition) -> bool,
    {
        if !self.state.is_dragging {
            return DragOutcome::Ignored;
        }
        let (Some(zone), Some(source)) = (self.hovered, self.state.drag_source) else {
            info!("[Drag] dropped outside any zone");
            return self.snap_back();
        };
        if move_cards(&self.state.dragged_cards, source, zone.as_target()) {
            info!("[Drag] dropped on {:?}", zone);
            self.reset();
            DragOutcome::Accepted { from: source, to: zone }
        } else {
            info!("[Drag] move to {:?} rejected", zone);
            self.snap_back()
        }
    }

    /// Escape などで取り消し。ホバー中のゾーンがあっても必ずスナップバック。
    pub fn cancel_drag(&mut self) -> DragOutcome {
        if !self.state.is_dragging {
            return DragOutcome::Ignored;
        }
        info!("[Drag] cancelled");
        self.snap_back()
    }

    fn snap_back(&mut self) -> DragOutcome {
        self.state.is_dragging = false;
        self.state.is_snap_back = true;
        self.state.is_animating = true;
        self.hovered = None;
        DragOutcome::SnapBack { duration_ms: SNAP_BACK_DURATION_MS, generation: self.generation }
    }

    /// スナップバックのタイマーが切れた。別のドラッグに上書きされていたら何もしない。
    pub fn complete_snap_back(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.state.is_snap_back {
            debug!("[Drag] stale snap-back timer ignored (gen {} != {})", generation, self.generation);
            return false;
        }
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.state = DragState::idle();
        self.hovered = None;
        self.last_hit_test_ms = None;
    }
}

// --- ブラウザ実装 ---

/// `elementFromPoint` で一番手前の要素を取って、`data-drop-zone` を持つ祖先を探す。
///
/// ゾーンの要素は `data-drop-zone data-pile-type="tableau" data-pile-index="3"` のように書く。
#[derive(Debug, Clone)]
pub struct BrowserHitTester {
    document: Document,
}

impl BrowserHitTester {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn zone_of(element: &Element) -> Option<DropZone> {
        let zone = element.closest("[data-drop-zone]").ok()??;
        let pile_type = PileType::parse(&zone.get_attribute("data-pile-type")?)?;
        let pile_index = zone.get_attribute("data-pile-index")?.parse().ok()?;
        Some(DropZone::new(pile_type, pile_index))
    }
}

impl HitTester for BrowserHitTester {
    fn zone_at(&self, point: Point) -> Option<DropZone> {
        let element = self.document.element_from_point(point.x as f32, point.y as f32)?;
        Self::zone_of(&element)
    }
}
