#![forbid(unsafe_code)]

//! Per-dialog show/hide state machine.
//!
//! # Lifecycle
//!
//! ```text
//!            show()                 fade-in done
//!   Hidden ───────────▶ Showing ───────────────▶ Shown
//!     ▲                   │ hide()                │ hide()
//!     │   teardown done   ▼                       ▼
//!     └────────────── Hiding ◀────────────────────┘
//! ```
//!
//! Show runs in up to two suspended steps (backdrop fade-in, then dialog
//! fade-in) and hide in up to two more (dialog fade-out, then backdrop
//! fade-out). Each step is parked in the shared [`TransitionWaits`] as a
//! [`Continuation`] and released by the target's transition-end or by its
//! fallback timer, whichever comes first.
//!
//! # Invariants
//!
//! 1. `about_to_show` / `about_to_hide` are emitted before any state changes;
//!    canceling them leaves the dialog untouched.
//! 2. An accepted `show()` or `hide()` bumps the controller generation and
//!    drops this dialog's parked continuations, so a superseded sequence
//!    never resumes.
//! 3. Once a hide sequence finishes the dialog owns no backdrop, it no
//!    longer holds the [`ScrollLock`] and `hidden` has been emitted. Body
//!    padding is restored by the lock itself when the page unlocks.
//!
//! # Failure Modes
//!
//! - Transition-end never arrives: the fallback timer resumes the sequence
//!   after the configured duration.
//! - Dialog removed from the document mid-sequence: the sequence still runs
//!   to completion against the discarded element; nothing is reattached.

use std::fmt;
use std::time::Duration;

use bitflags::bitflags;
use modalkit_core::document::{Document, ElementId};
use modalkit_core::event::{Event, EventFlow};
use modalkit_runtime::{Clock, TransitionWaits};

use super::backdrop::{self, BackdropClick, FADE_CLASS, IN_CLASS};
use super::config::ModalOptions;
use super::events::{Hidden, ModalSignals, Shown};
use super::focus::FocusEnforcer;
use super::scroll_lock::{LockPolicy, ScrollLock};
use super::scrollbar::{self, ScrollbarState};

/// Visibility phase of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalPhase {
    #[default]
    Hidden,
    Showing,
    Shown,
    Hiding,
}

impl fmt::Display for ModalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hidden => "hidden",
            Self::Showing => "showing",
            Self::Shown => "shown",
            Self::Hiding => "hiding",
        })
    }
}

/// Result of a lifecycle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOutcome {
    /// The sequence started (it may already have finished).
    Started,
    /// An `about_to_*` observer vetoed the request.
    Canceled,
    /// The dialog was already in the requested state.
    NoOp,
}

bitflags! {
    /// Input handlers a controller currently responds to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Listeners: u8 {
        /// Escape dismisses.
        const KEYBOARD = 1 << 0;
        /// Viewport changes re-run size adjustment.
        const RESIZE = 1 << 1;
        /// `data-dismiss="modal"` descendants dismiss.
        const DISMISS = 1 << 2;
        /// Clicks on the backdrop dismiss or refocus.
        const BACKDROP_CLICK = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    BackdropShown,
    DialogShown,
    DialogHidden,
    BackdropRemoved,
}

/// A parked lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation {
    dialog: ElementId,
    generation: u64,
    step: Step,
}

impl Continuation {
    pub fn dialog(&self) -> ElementId {
        self.dialog
    }
}

/// Page-wide state shared by every controller.
pub struct ModalEnv {
    pub document: Document,
    pub focus: FocusEnforcer,
    pub scroll_lock: ScrollLock,
    pub(crate) waits: TransitionWaits<Continuation>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for ModalEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalEnv")
            .field("document", &self.document)
            .field("focus", &self.focus)
            .field("scroll_lock", &self.scroll_lock)
            .field("waits", &self.waits.len())
            .finish_non_exhaustive()
    }
}

impl ModalEnv {
    pub fn new(document: Document, clock: Box<dyn Clock>, policy: LockPolicy) -> Self {
        Self {
            document,
            focus: FocusEnforcer::new(),
            scroll_lock: ScrollLock::new(policy),
            waits: TransitionWaits::new(),
            clock,
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn waits(&self) -> &TransitionWaits<Continuation> {
        &self.waits
    }

    fn arm(&mut self, target: ElementId, fallback: Duration, continuation: Continuation) {
        let now = self.now();
        self.waits.arm(now, target, fallback, continuation);
    }
}

/// Show/hide controller bound to one dialog element.
#[derive(Debug)]
pub struct ModalController {
    element: ElementId,
    options: ModalOptions,
    phase: ModalPhase,
    is_shown: bool,
    backdrop: Option<ElementId>,
    scrollbar: ScrollbarState,
    listeners: Listeners,
    generation: u64,
    related_target: Option<ElementId>,
    signals: ModalSignals,
}

impl ModalController {
    pub fn new(element: ElementId, options: ModalOptions, signals: ModalSignals) -> Self {
        Self {
            element,
            options,
            phase: ModalPhase::Hidden,
            is_shown: false,
            backdrop: None,
            scrollbar: ScrollbarState::default(),
            listeners: Listeners::empty(),
            generation: 0,
            related_target: None,
            signals,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    /// Logical visibility: set as soon as a show is accepted, cleared as soon
    /// as a hide is accepted.
    pub fn is_shown(&self) -> bool {
        self.is_shown
    }

    pub fn backdrop(&self) -> Option<ElementId> {
        self.backdrop
    }

    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    pub fn signals(&self) -> &ModalSignals {
        &self.signals
    }

    /// Whether visibility changes on this dialog are animated.
    pub fn animates(&self, doc: &Document) -> bool {
        doc.supports_transitions() && doc.has_class(self.element, FADE_CLASS)
    }

    pub fn toggle(
        &mut self,
        env: &mut ModalEnv,
        related_target: Option<ElementId>,
    ) -> LifecycleOutcome {
        if self.is_shown {
            self.hide(env, None)
        } else {
            self.show(env, related_target)
        }
    }

    /// Open the dialog.
    pub fn show(
        &mut self,
        env: &mut ModalEnv,
        related_target: Option<ElementId>,
    ) -> LifecycleOutcome {
        let dialog = self.element;
        if self.signals.request_show(dialog, related_target) {
            tracing::debug!(%dialog, "modal show canceled");
            return LifecycleOutcome::Canceled;
        }
        if self.is_shown {
            return LifecycleOutcome::NoOp;
        }
        if self.phase == ModalPhase::Hiding {
            self.abandon_hide(env);
        }
        self.supersede(env);
        tracing::debug!(%dialog, related = ?related_target, "modal show started");

        self.is_shown = true;
        self.phase = ModalPhase::Showing;
        self.related_target = related_target;

        self.scrollbar = scrollbar::check_scrollbar(&mut env.document);
        env.scroll_lock.acquire(&mut env.document, dialog, self.scrollbar);

        if self.options.keyboard {
            self.listeners.insert(Listeners::KEYBOARD);
        }
        self.listeners.insert(Listeners::RESIZE | Listeners::DISMISS);

        let animate = self.animates(&env.document);
        if self.options.backdrop.is_enabled() {
            let el = backdrop::create(&mut env.document, animate);
            self.backdrop = Some(el);
            self.listeners.insert(Listeners::BACKDROP_CLICK);
            backdrop::reveal(&mut env.document, el, animate);
            if animate {
                let fallback = self.options.backdrop_transition;
                env.arm(el, fallback, self.continuation(Step::BackdropShown));
                return LifecycleOutcome::Started;
            }
        }
        self.on_backdrop_shown(env);
        LifecycleOutcome::Started
    }

    /// Close the dialog. `flow` is the triggering input event, whose default
    /// action is suppressed.
    pub fn hide(&mut self, env: &mut ModalEnv, flow: Option<&mut EventFlow>) -> LifecycleOutcome {
        if let Some(flow) = flow {
            flow.prevent_default();
        }
        let dialog = self.element;
        if self.signals.request_hide(dialog) {
            tracing::debug!(%dialog, "modal hide canceled");
            return LifecycleOutcome::Canceled;
        }
        if !self.is_shown {
            return LifecycleOutcome::NoOp;
        }
        self.supersede(env);
        tracing::debug!(%dialog, "modal hide started");

        self.is_shown = false;
        self.phase = ModalPhase::Hiding;
        self.listeners.remove(
            Listeners::KEYBOARD | Listeners::RESIZE | Listeners::DISMISS | Listeners::BACKDROP_CLICK,
        );
        env.focus.release();

        let doc = &mut env.document;
        doc.remove_class(dialog, IN_CLASS);
        doc.set_attribute(dialog, "aria-hidden", "true");

        if self.animates(&env.document) {
            let fallback = self.options.transition;
            env.arm(dialog, fallback, self.continuation(Step::DialogHidden));
        } else {
            self.hide_modal(env);
        }
        LifecycleOutcome::Started
    }

    /// Run a parked step. Returns `false` for continuations belonging to a
    /// superseded sequence or to another dialog.
    pub fn resume(&mut self, env: &mut ModalEnv, continuation: Continuation) -> bool {
        if continuation.dialog != self.element || continuation.generation != self.generation {
            tracing::trace!(
                dialog = %continuation.dialog,
                step = ?continuation.step,
                "stale modal continuation dropped"
            );
            return false;
        }
        match continuation.step {
            Step::BackdropShown => self.on_backdrop_shown(env),
            Step::DialogShown => self.finish_show(env),
            Step::DialogHidden => self.hide_modal(env),
            Step::BackdropRemoved => self.on_backdrop_removed(env),
        }
        true
    }

    /// React to input while the corresponding listeners are installed.
    ///
    /// Returns the outcome when the event started a lifecycle change.
    pub fn handle_event(
        &mut self,
        env: &mut ModalEnv,
        event: &Event,
        flow: &mut EventFlow,
    ) -> Option<LifecycleOutcome> {
        let dialog = self.element;
        match *event {
            Event::Key(key) if key.is_escape_press() => {
                if !self.listeners.contains(Listeners::KEYBOARD) {
                    return None;
                }
                let focused = env.document.focused()?;
                env.document
                    .contains(dialog, focused)
                    .then(|| self.hide(env, None))
            }
            Event::Click { target } => {
                if self.listeners.contains(Listeners::BACKDROP_CLICK) && self.backdrop == Some(target)
                {
                    return match BackdropClick::for_mode(self.options.backdrop)? {
                        BackdropClick::Dismiss => Some(self.hide(env, None)),
                        BackdropClick::Refocus => {
                            env.document.focus(dialog);
                            None
                        }
                    };
                }
                if !self.listeners.contains(Listeners::DISMISS) {
                    return None;
                }
                let doc = &env.document;
                let dismiss = doc
                    .closest(target, |d, id| d.data(id, "dismiss") == Some("modal"))
                    .filter(|&el| doc.contains(dialog, el));
                dismiss.map(|_| self.hide(env, Some(flow)))
            }
            Event::Resize { .. } => {
                if self.listeners.contains(Listeners::RESIZE) {
                    self.adjust(&mut env.document);
                }
                None
            }
            _ => None,
        }
    }

    fn continuation(&self, step: Step) -> Continuation {
        Continuation {
            dialog: self.element,
            generation: self.generation,
            step,
        }
    }

    fn supersede(&mut self, env: &mut ModalEnv) {
        self.generation += 1;
        let dialog = self.element;
        let dropped = env.waits.cancel_where(|c| c.dialog == dialog);
        if dropped > 0 {
            tracing::trace!(%dialog, dropped, "superseded in-flight modal sequence");
        }
    }

    /// Undo what a half-finished hide left behind before showing again.
    fn abandon_hide(&mut self, env: &mut ModalEnv) {
        let doc = &mut env.document;
        if let Some(el) = self.backdrop.take() {
            backdrop::discard(doc, el);
        }
        scrollbar::reset_adjustments(doc, self.element);
    }

    fn adjust(&self, doc: &mut Document) {
        if let Some(el) = self.backdrop {
            scrollbar::adjust_backdrop(doc, el, self.element);
        }
        scrollbar::adjust_dialog(doc, self.element, self.scrollbar);
    }

    fn on_backdrop_shown(&mut self, env: &mut ModalEnv) {
        let dialog = self.element;
        let animate = self.animates(&env.document);
        let doc = &mut env.document;

        if !doc.is_connected(dialog) {
            doc.append_child(doc.body(), dialog);
        }
        doc.set_displayed(dialog, true);
        doc.set_scroll_top(dialog, 0.0);
        self.adjust(doc);

        if animate {
            let _ = doc.offset_width(dialog);
            tracing::trace!(%dialog, "forced reflow before dialog fade-in");
        }
        doc.add_class(dialog, IN_CLASS);
        doc.set_attribute(dialog, "aria-hidden", "false");
        env.focus.acquire(dialog);

        if animate {
            let fallback = self.options.transition;
            env.arm(dialog, fallback, self.continuation(Step::DialogShown));
        } else {
            self.finish_show(env);
        }
    }

    fn finish_show(&mut self, env: &mut ModalEnv) {
        let dialog = self.element;
        self.phase = ModalPhase::Shown;
        env.document.focus(dialog);
        tracing::debug!(%dialog, "modal shown");
        self.signals.shown.emit(&mut Shown {
            dialog,
            related_target: self.related_target,
        });
    }

    fn hide_modal(&mut self, env: &mut ModalEnv) {
        env.document.set_displayed(self.element, false);
        if let Some(el) = self.backdrop {
            backdrop::conceal(&mut env.document, el);
            if self.animates(&env.document) {
                let fallback = self.options.backdrop_transition;
                env.arm(el, fallback, self.continuation(Step::BackdropRemoved));
                return;
            }
        }
        self.on_backdrop_removed(env);
    }

    fn on_backdrop_removed(&mut self, env: &mut ModalEnv) {
        if let Some(el) = self.backdrop.take() {
            backdrop::discard(&mut env.document, el);
        }
        self.finish_hide(env);
    }

    fn finish_hide(&mut self, env: &mut ModalEnv) {
        let dialog = self.element;
        let doc = &mut env.document;
        env.scroll_lock.release(doc, dialog);
        scrollbar::reset_adjustments(doc, dialog);
        self.phase = ModalPhase::Hidden;
        self.related_target = None;
        tracing::debug!(%dialog, "modal hidden");
        self.signals.hidden.emit(&mut Hidden { dialog });
    }
}
