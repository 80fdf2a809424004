// src/app/browser_event_manager.rs
//! Handles attaching and detaching window listeners (pointermove, pointerup, keydown) during a drag.
//!
//! リスナーはドラッグ中だけ付ける。離した瞬間に外すけど、実行中のクロージャを
//! その場で drop すると壊れるので、外すのは次のマイクロタスクで行う。

use std::sync::{Arc, Mutex};

use gloo_timers::future::TimeoutFuture;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, Event, KeyboardEvent, MouseEvent};

use crate::app::drag_handler::DragOutcome;
use crate::app::init_handler::{BrowserDragController, BrowserSession};
use crate::components::position::Point;

type ListenerSlot = Arc<Mutex<Option<Closure<dyn FnMut(Event)>>>>;

/// ドラッグ中にだけ window に付けるクロージャたち。
#[derive(Clone, Default)]
pub(crate) struct DragListeners {
    pointermove: ListenerSlot,
    pointerup: ListenerSlot,
    keydown: ListenerSlot,
}

/// リスナーの中から触る共有状態。
#[derive(Clone)]
pub(crate) struct DragContext {
    pub(crate) session: Arc<Mutex<BrowserSession>>,
    pub(crate) drag: Arc<Mutex<BrowserDragController>>,
    /// 盤面かドラッグ状態が変わったら呼ぶ JS 関数。
    pub(crate) on_change: Arc<Mutex<Option<js_sys::Function>>>,
}

fn pointer_of(event: &Event) -> Option<Point> {
    // PointerEvent は MouseEvent の派生なので clientX/Y はこれで読める
    event
        .dyn_ref::<MouseEvent>()
        .map(|mouse_event| Point::new(f64::from(mouse_event.client_x()), f64::from(mouse_event.client_y())))
}

fn attach(slot: &ListenerSlot, event_name: &str, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let window = window().ok_or("Failed to get window")?;
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
    match slot.lock() {
        Ok(mut guard) => *guard = Some(closure),
        Err(e) => {
            error!("Failed to lock {} listener slot: {}", event_name, e);
            // 置き場所が無いなら付けたままにしない
            window.remove_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
        }
    }
    Ok(())
}

fn detach(slot: &ListenerSlot, event_name: &str) -> Result<(), JsValue> {
    let closure = match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(e) => {
            error!("Failed to lock {} listener slot: {}", event_name, e);
            return Ok(());
        }
    };
    if let Some(closure) = closure {
        let window = window().ok_or("Failed to get window")?;
        window.remove_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
        debug!("  Detached {} listener.", event_name);
    }
    Ok(())
}

/// ドラッグ開始時に呼ぶ。前のリスナーが残っていたら先に外す。
pub(crate) fn attach_drag_listeners(ctx: &DragContext, listeners: &DragListeners) -> Result<(), JsValue> {
    detach_drag_listeners(listeners)?;
    info!("Attaching drag listeners");

    // --- pointermove ---
    {
        let ctx = ctx.clone();
        attach(&listeners.pointermove, "pointermove", move |event: Event| {
            let Some(pointer) = pointer_of(&event) else {
                error!("Failed to read pointer position in pointermove listener");
                return;
            };
            match ctx.drag.lock() {
                Ok(mut drag) => drag.update_drag(pointer, js_sys::Date::now()),
                Err(e) => {
                    error!("Failed to lock drag controller in pointermove: {}", e);
                    return;
                }
            }
            notify_change(&ctx);
        })?;
    }

    // --- pointerup ---
    {
        let ctx = ctx.clone();
        let listeners_for_up = listeners.clone();
        attach(&listeners.pointerup, "pointerup", move |event: Event| {
            let pointer = pointer_of(&event);
            end_drag(&ctx, pointer);
            schedule_detach(listeners_for_up.clone());
        })?;
    }

    // --- keydown (Escape で取り消し) ---
    {
        let ctx = ctx.clone();
        let listeners_for_key = listeners.clone();
        attach(&listeners.keydown, "keydown", move |event: Event| {
            let is_escape = event
                .dyn_ref::<KeyboardEvent>()
                .map_or(false, |keyboard_event| keyboard_event.key() == "Escape");
            if !is_escape {
                return;
            }
            cancel_drag(&ctx);
            schedule_detach(listeners_for_key.clone());
        })?;
    }

    Ok(())
}

pub(crate) fn detach_drag_listeners(listeners: &DragListeners) -> Result<(), JsValue> {
    detach(&listeners.pointermove, "pointermove")?;
    detach(&listeners.pointerup, "pointerup")?;
    detach(&listeners.keydown, "keydown")?;
    Ok(())
}

fn schedule_detach(listeners: DragListeners) {
    spawn_local(async move {
        if let Err(e) = detach_drag_listeners(&listeners) {
            error!("Error detaching drag listeners: {:?}", e);
        }
    });
}

/// ドロップ。ホバー中のゾーンへの手をセッションに渡して、結果でスナップバックするか決める。
pub(crate) fn end_drag(ctx: &DragContext, pointer: Option<Point>) -> DragOutcome {
    let now = js_sys::Date::now();
    let outcome = {
        let mut drag = match ctx.drag.lock() {
            Ok(drag) => drag,
            Err(e) => {
                error!("Failed to lock drag controller in end_drag: {}", e);
                return DragOutcome::Ignored;
            }
        };
        if let Some(pointer) = pointer {
            drag.update_drag(pointer, now);
        }
        drag.end_drag(|cards, from, to| match ctx.session.lock() {
            Ok(mut session) => match session.move_cards(&from, &to, cards, now) {
                Ok(()) => true,
                Err(e) => {
                    info!("Drop rejected: {}", e);
                    false
                }
            },
            Err(e) => {
                error!("Failed to lock session in end_drag: {}", e);
                false
            }
        })
    };
    after_drag(ctx, outcome);
    outcome
}

pub(crate) fn cancel_drag(ctx: &DragContext) -> DragOutcome {
    let outcome = match ctx.drag.lock() {
        Ok(mut drag) => drag.cancel_drag(),
        Err(e) => {
            error!("Failed to lock drag controller in cancel_drag: {}", e);
            return DragOutcome::Ignored;
        }
    };
    after_drag(ctx, outcome);
    outcome
}

fn after_drag(ctx: &DragContext, outcome: DragOutcome) {
    if let DragOutcome::SnapBack { duration_ms, generation } = outcome {
        schedule_snap_back(ctx.clone(), duration_ms, generation);
    }
    if outcome != DragOutcome::Ignored {
        notify_change(ctx);
    }
}

/// スナップバックの時間が過ぎたらドラッグ状態をリセットする。
fn schedule_snap_back(ctx: DragContext, duration_ms: u32, generation: u64) {
    spawn_local(async move {
        TimeoutFuture::new(duration_ms).await;
        let reset = match ctx.drag.lock() {
            Ok(mut drag) => drag.complete_snap_back(generation),
            Err(e) => {
                error!("Failed to lock drag controller for snap-back: {}", e);
                false
            }
        };
        if reset {
            notify_change(&ctx);
        }
    });
}

/// JS 側の変更通知を呼ぶ。呼んでいる間はどのロックも持たない。
pub(crate) fn notify_change(ctx: &DragContext) {
    let callback = match ctx.on_change.lock() {
        Ok(guard) => guard.clone(),
        Err(e) => {
            error!("Failed to lock on_change callback: {}", e);
            return;
        }
    };
    if let Some(callback) = callback {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            error!("on_change callback threw: {:?}", e);
        }
    }
}
