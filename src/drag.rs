//! Pointer drag controller for overlay elements
//!
//! Turns press / move / release gestures into clamped position updates on the
//! overlay model. Global move and release listeners exist only while a drag is
//! active: they are held as a [`ListenerGuard`] inside the dragging state, so
//! every way out of that state releases them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::models::{clamp_position, Extent, OverlaySet, Point};

/// Which overlay element is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Caption,
    Logo,
}

impl DragTarget {
    fn position(self, overlays: &OverlaySet) -> Point {
        match self {
            DragTarget::Caption => overlays.caption.position(),
            DragTarget::Logo => overlays.logo.position(),
        }
    }

    fn footprint(self, overlays: &OverlaySet) -> Extent {
        match self {
            DragTarget::Caption => overlays.caption.footprint(),
            DragTarget::Logo => overlays.logo.footprint(),
        }
    }

    fn set_position(self, overlays: &mut OverlaySet, p: Point) {
        match self {
            DragTarget::Caption => overlays.caption.set_position(p),
            DragTarget::Logo => overlays.logo.set_position(p),
        }
    }
}

// =============================================================================
// Listener Registration
// =============================================================================

/// Registry of global pointer listeners (move + release)
///
/// Cloning shares the registry; the event loop asks it whether pointer events
/// outside the overlay elements should be routed to the controller.
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    active: Arc<AtomicUsize>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the listener pair; released when the guard drops
    pub fn acquire(&self) -> ListenerGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ListenerGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Whether global move/release events are currently wanted
    pub fn is_listening(&self) -> bool {
        self.active() > 0
    }

    /// Number of live registrations
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// A live listener registration
#[derive(Debug)]
pub struct ListenerGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Drag State Machine
// =============================================================================

/// Controller state
#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        target: DragTarget,
        /// Pointer position minus element top-left at press time
        offset: Point,
        _listeners: ListenerGuard,
    },
}

/// Drag controller: Idle → Dragging(target) → Idle
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    listeners: PointerListeners,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller registering into an existing listener registry
    pub fn with_listeners(listeners: PointerListeners) -> Self {
        Self {
            state: DragState::Idle,
            listeners,
        }
    }

    pub fn listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Element currently being dragged, if any
    pub fn target(&self) -> Option<DragTarget> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { target, .. } => Some(*target),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.target().is_some()
    }

    /// Press on an element: remember where on the element it was grabbed.
    ///
    /// Ignored while another drag is active.
    pub fn pointer_down(&mut self, target: DragTarget, pointer: Point, overlays: &OverlaySet) {
        if self.is_dragging() {
            return;
        }
        let offset = pointer.offset_from(target.position(overlays));
        debug!(?target, x = offset.x, y = offset.y, "drag started");
        self.state = DragState::Dragging {
            target,
            offset,
            _listeners: self.listeners.acquire(),
        };
    }

    /// Move the dragged element under the pointer, clamped into `container`.
    ///
    /// Returns true if an element was updated.
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        overlays: &mut OverlaySet,
        container: Extent,
    ) -> bool {
        let DragState::Dragging { target, offset, .. } = &self.state else {
            return false;
        };
        let candidate = pointer.offset_from(*offset);
        let clamped = clamp_position(candidate, target.footprint(overlays), container);
        target.set_position(overlays, clamped);
        true
    }

    /// Release anywhere ends the drag
    pub fn pointer_up(&mut self) {
        if let Some(target) = self.target() {
            debug!(?target, "drag finished");
        }
        self.state = DragState::Idle;
    }

    /// Abandon an active drag (model replaced, view torn down)
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
