//! Leptos DragDrop Utilities
//!
//! Mouse-driven row reordering inside a single list. A press only turns
//! into a drag after the pointer moved past a small threshold, so plain
//! clicks on a row still select it.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// Time after a drop during which row clicks are swallowed
const CLICK_SUPPRESS_MS: i32 = 100;

/// Drag state for one list, addressed by row position
#[derive(Clone, Copy)]
pub struct RowDnd {
    /// Row being dragged
    pub dragging: RwSignal<Option<usize>>,
    /// Row under the pointer while dragging
    pub over: RwSignal<Option<usize>>,
    /// True right after a drop; row click handlers should ignore clicks
    pub just_ended: RwSignal<bool>,
    /// Row pressed but not yet moved far enough
    pending: RwSignal<Option<usize>>,
    start: RwSignal<(i32, i32)>,
}

pub fn create_row_dnd() -> RowDnd {
    RowDnd {
        dragging: RwSignal::new(None),
        over: RwSignal::new(None),
        just_ended: RwSignal::new(false),
        pending: RwSignal::new(None),
        start: RwSignal::new((0, 0)),
    }
}

/// Whether a pointer that moved by (`dx`, `dy`) counts as a drag
pub fn exceeds_threshold(dx: i32, dy: i32) -> bool {
    dx.abs() > DRAG_THRESHOLD_PX || dy.abs() > DRAG_THRESHOLD_PX
}

/// Final move for a drag from `from` released over `over`, or `None` when
/// the row would stay where it is
pub fn resolve_move(from: Option<usize>, over: Option<usize>) -> Option<(usize, usize)> {
    match (from, over) {
        (Some(from), Some(to)) if from != to => Some((from, to)),
        _ => None,
    }
}

impl RowDnd {
    pub fn is_dragging(&self, row: usize) -> bool {
        self.dragging.get() == Some(row)
    }

    pub fn is_over(&self, row: usize) -> bool {
        self.dragging.get().is_some() && self.over.get() == Some(row)
    }

    fn end(&self) {
        self.dragging.set(None);
        self.over.set(None);
        self.pending.set(None);
        self.just_ended.set(true);

        if let Some(win) = web_sys::window() {
            let clear = self.just_ended;
            let cb = Closure::<dyn FnMut()>::new(move || clear.set(false));
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                CLICK_SUPPRESS_MS,
            );
            cb.forget();
        }
    }
}

/// Mousedown handler for a row. Presses on inputs and buttons are ignored.
pub fn make_on_mousedown(dnd: RowDnd, row: usize) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
                || target.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
            {
                return;
            }
        }
        dnd.pending.set(Some(row));
        dnd.start.set((ev.client_x(), ev.client_y()));
    }
}

/// Mouseenter handler for a row: it becomes the drop position
pub fn make_on_row_mouseenter(dnd: RowDnd, row: usize) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging.get_untracked().is_some() {
            dnd.over.set(Some(row));
        }
    }
}

/// Listens on the document for the drag threshold and the drop, calling
/// `on_drop(from, to)` when a row was released over another one. The
/// listeners are removed when the current reactive owner is cleaned up.
pub fn bind_row_listeners<F>(dnd: RowDnd, on_drop: F)
where
    F: Fn(usize, usize) + 'static,
{
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let pending = dnd.pending.get_untracked();
        if pending.is_none() || dnd.dragging.get_untracked().is_some() {
            return;
        }
        let (x, y) = dnd.start.get_untracked();
        if exceeds_threshold(ev.client_x() - x, ev.client_y() - y) {
            dnd.dragging.set(pending);
            dnd.over.set(pending);
        }
    });

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        if dnd.pending.get_untracked().is_none() && dnd.dragging.get_untracked().is_none() {
            return;
        }
        let drop = resolve_move(dnd.dragging.get_untracked(), dnd.over.get_untracked());
        dnd.end();
        if let Some((from, to)) = drop {
            on_drop(from, to);
        }
    });

    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());

    let listeners = StoredValue::new_local((on_mousemove, on_mouseup));
    on_cleanup(move || {
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let _ = listeners.try_with_value(|(on_mousemove, on_mouseup)| {
            let _ = doc.remove_event_listener_with_callback(
                "mousemove",
                on_mousemove.as_ref().unchecked_ref(),
            );
            let _ = doc.remove_event_listener_with_callback(
                "mouseup",
                on_mouseup.as_ref().unchecked_ref(),
            );
        });
    });
}
