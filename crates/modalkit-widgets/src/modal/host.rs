#![forbid(unsafe_code)]

//! Dialog registry and event loop.
//!
//! [`ModalHost`] owns the page, the controllers created for it and the
//! page-wide state they share. Embedders drive it with two calls:
//!
//! - [`ModalHost::dispatch`] for every input event;
//! - [`ModalHost::pump`] whenever [`ModalHost::next_deadline`] has passed, and
//!   after a remote load may have completed.
//!
//! # Declarative activation
//!
//! A click on (or inside) an element with `data-toggle="modal"` opens the
//! dialog named by its `data-target` selector or by the `#fragment` of its
//! `href`. The first activation creates the controller with options layered
//! as host defaults, then `href` as remote source (when it has no fragment),
//! then the dialog's `data-*`, then the trigger's `data-*`. Later activations
//! toggle. Focus returns to the trigger once the dialog is hidden again.
//!
//! # Failure Modes
//!
//! - Unresolvable targets: the request does nothing and is logged at debug.
//! - Invalid declared options: that layer is ignored and a warning logged.
//! - Remote source without a loader, or a failed load: warning, no `loaded`.

use std::sync::mpsc;
use std::time::Duration;

use ahash::AHashMap;
use modalkit_core::document::{Document, ElementId};
use modalkit_core::event::{Event, EventFlow};
use modalkit_runtime::{Clock, SystemClock};

use super::config::{Invocation, ModalOptions, ModalOptionsPatch, ModalVerb};
use super::controller::{Continuation, LifecycleOutcome, ModalController, ModalEnv, ModalPhase};
use super::events::{Loaded, ModalSignals};
use super::remote::{Completion, ContentLoader, LoadError, LoadId, LoadRequest, LoadSink};
use super::scroll_lock::{LockPolicy, ScrollLock};

/// Class of the region replaced by remote content.
pub const CONTENT_CLASS: &str = "modal-content";

/// Dialog reference accepted by [`ModalHost::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTarget<'a> {
    Element(ElementId),
    Selector(&'a str),
}

impl From<ElementId> for ModalTarget<'_> {
    fn from(el: ElementId) -> Self {
        Self::Element(el)
    }
}

impl<'a> From<&'a str> for ModalTarget<'a> {
    fn from(selector: &'a str) -> Self {
        Self::Selector(selector)
    }
}

#[derive(Debug)]
struct PendingLoad {
    dialog: ElementId,
    url: String,
}

/// Owner of the page and every modal controller on it.
pub struct ModalHost {
    env: ModalEnv,
    controllers: AHashMap<ElementId, ModalController>,
    order: Vec<ElementId>,
    signals: AHashMap<ElementId, ModalSignals>,
    defaults: ModalOptions,
    loader: Option<Box<dyn ContentLoader>>,
    load_tx: mpsc::Sender<Completion>,
    load_rx: mpsc::Receiver<Completion>,
    pending_loads: AHashMap<LoadId, PendingLoad>,
    next_load: u64,
    focus_returns: AHashMap<ElementId, ElementId>,
}

impl std::fmt::Debug for ModalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalHost")
            .field("env", &self.env)
            .field("dialogs", &self.order)
            .field("defaults", &self.defaults)
            .field("pending_loads", &self.pending_loads.len())
            .finish_non_exhaustive()
    }
}

impl ModalHost {
    /// Host driven by the wall clock.
    pub fn new(document: Document) -> Self {
        Self::with_clock(document, SystemClock::new())
    }

    pub fn with_clock(document: Document, clock: impl Clock + 'static) -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        Self {
            env: ModalEnv::new(document, Box::new(clock), LockPolicy::default()),
            controllers: AHashMap::new(),
            order: Vec::new(),
            signals: AHashMap::new(),
            defaults: ModalOptions::default(),
            loader: None,
            load_tx,
            load_rx,
            pending_loads: AHashMap::new(),
            next_load: 0,
            focus_returns: AHashMap::new(),
        }
    }

    /// Options every new controller starts from.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ModalOptions) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_scroll_lock_policy(mut self, policy: LockPolicy) -> Self {
        self.env.scroll_lock = ScrollLock::new(policy);
        self
    }

    #[must_use]
    pub fn with_loader(mut self, loader: impl ContentLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn document(&self) -> &Document {
        &self.env.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.env.document
    }

    pub fn defaults(&self) -> &ModalOptions {
        &self.defaults
    }

    pub fn controller(&self, dialog: ElementId) -> Option<&ModalController> {
        self.controllers.get(&dialog)
    }

    pub fn phase(&self, dialog: ElementId) -> Option<ModalPhase> {
        self.controller(dialog).map(ModalController::phase)
    }

    /// The dialog currently holding focus enforcement.
    pub fn focus_owner(&self) -> Option<ElementId> {
        self.env.focus.owner()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.env.scroll_lock.is_locked(&self.env.document)
    }

    /// Observer lists for `dialog`, available before its controller exists.
    ///
    /// Registers `dialog` so its future controller emits on the returned
    /// lists. A discarded element gets unregistered lists that never fire.
    pub fn signals(&mut self, dialog: ElementId) -> ModalSignals {
        if self.env.document.is_discarded(dialog) {
            return ModalSignals::default();
        }
        self.signals.entry(dialog).or_default().clone()
    }

    /// Observer lists already registered for `dialog`.
    pub fn signals_of(&self, dialog: ElementId) -> Option<ModalSignals> {
        self.signals.get(&dialog).cloned()
    }

    /// Imperative entry point.
    ///
    /// A verb runs against the (lazily created) controller. A configuration
    /// layer is merged over the host defaults and the dialog's declared
    /// options; if the resolved `show` is set, the dialog opens.
    ///
    /// Returns `None` when the target does not resolve or nothing ran.
    pub fn open<'a>(
        &mut self,
        target: impl Into<ModalTarget<'a>>,
        invocation: impl Into<Invocation>,
        related_target: Option<ElementId>,
    ) -> Option<LifecycleOutcome> {
        let dialog = self.resolve(target.into())?;
        match invocation.into() {
            Invocation::Verb(verb) => {
                if !self.controllers.contains_key(&dialog) {
                    let options =
                        self.layered_options(dialog, &ModalOptionsPatch::default(), None);
                    self.install(dialog, options);
                }
                Some(self.run_verb(dialog, verb, related_target))
            }
            Invocation::Configure(patch) => {
                let options = self.layered_options(dialog, &ModalOptionsPatch::default(), Some(&patch));
                let show = options.show;
                if !self.controllers.contains_key(&dialog) {
                    self.install(dialog, options);
                }
                show.then(|| self.run_verb(dialog, ModalVerb::Show, related_target))
            }
        }
    }

    pub fn show<'a>(
        &mut self,
        target: impl Into<ModalTarget<'a>>,
        related_target: Option<ElementId>,
    ) -> Option<LifecycleOutcome> {
        self.open(target, ModalVerb::Show, related_target)
    }

    pub fn hide<'a>(&mut self, target: impl Into<ModalTarget<'a>>) -> Option<LifecycleOutcome> {
        self.open(target, ModalVerb::Hide, None)
    }

    pub fn toggle<'a>(
        &mut self,
        target: impl Into<ModalTarget<'a>>,
        related_target: Option<ElementId>,
    ) -> Option<LifecycleOutcome> {
        self.open(target, ModalVerb::Toggle, related_target)
    }

    /// Route one input event.
    pub fn dispatch(&mut self, event: Event) -> EventFlow {
        let mut flow = EventFlow::new();
        match event {
            Event::TransitionEnd { target } => match self.env.waits.transition_ended(target) {
                Some(continuation) => self.resume(continuation),
                None => tracing::trace!(%target, "transition end with nothing waiting"),
            },
            Event::Focus { target } => {
                let env = &mut self.env;
                env.document.focus(target);
                if env.focus.enforce(&mut env.document, target) {
                    tracing::trace!(%target, "focus pulled back into dialog");
                }
            }
            Event::Resize { width, height } => {
                self.env.document.set_viewport(width, height);
                self.route(&event, &mut flow);
            }
            Event::Key(_) => self.route(&event, &mut flow),
            Event::Click { target } => {
                self.route(&event, &mut flow);
                self.activate_trigger(target, &mut flow);
            }
        }
        flow
    }

    /// Apply finished remote loads and run every continuation whose fallback
    /// deadline has passed. Returns how many items were processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok((id, result)) = self.load_rx.try_recv() {
            self.finish_load(id, result);
            processed += 1;
        }
        let now = self.env.now();
        loop {
            let due = self.env.waits.fire_due(now);
            if due.is_empty() {
                break;
            }
            for continuation in due {
                self.resume(continuation);
                processed += 1;
            }
        }
        let doc = &self.env.document;
        let controllers = &self.controllers;
        self.signals
            .retain(|el, _| controllers.contains_key(el) || !doc.is_discarded(*el));
        processed
    }

    /// Earliest pending fallback deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.env.waits.next_deadline()
    }

    pub fn now(&self) -> Duration {
        self.env.now()
    }

    /// No parked continuation and no outstanding load.
    pub fn is_idle(&self) -> bool {
        self.env.waits.is_empty() && self.pending_loads.is_empty()
    }

    fn resolve(&self, target: ModalTarget<'_>) -> Option<ElementId> {
        match target {
            ModalTarget::Element(el) if self.env.document.is_discarded(el) => {
                tracing::debug!(dialog = %el, "modal target was removed");
                None
            }
            ModalTarget::Element(el) => Some(el),
            ModalTarget::Selector(selector) => {
                let found = self.env.document.select(selector);
                if found.is_none() {
                    tracing::debug!(selector, "modal target not found");
                }
                found
            }
        }
    }

    fn declared_options(&self, el: ElementId) -> ModalOptionsPatch {
        ModalOptionsPatch::from_element(&self.env.document, el).unwrap_or_else(|err| {
            tracing::warn!(element = %el, %err, "ignoring invalid declared modal options");
            ModalOptionsPatch::default()
        })
    }

    /// defaults < `link` < dialog declarations < `call_site`.
    fn layered_options(
        &self,
        dialog: ElementId,
        link: &ModalOptionsPatch,
        call_site: Option<&ModalOptionsPatch>,
    ) -> ModalOptions {
        let declared = self.declared_options(dialog);
        self.defaults
            .layered(std::iter::once(link).chain(Some(&declared)).chain(call_site))
    }

    fn install(&mut self, dialog: ElementId, options: ModalOptions) {
        tracing::debug!(%dialog, ?options, "modal controller created");
        let remote = options.remote.clone();
        let signals = self.signals(dialog);
        self.controllers
            .insert(dialog, ModalController::new(dialog, options, signals));
        self.order.push(dialog);
        if let Some(url) = remote {
            self.start_load(dialog, url);
        }
    }

    fn run_verb(
        &mut self,
        dialog: ElementId,
        verb: ModalVerb,
        related_target: Option<ElementId>,
    ) -> LifecycleOutcome {
        let Some(ctrl) = self.controllers.get_mut(&dialog) else {
            return LifecycleOutcome::NoOp;
        };
        let env = &mut self.env;
        let outcome = match verb {
            ModalVerb::Show => ctrl.show(env, related_target),
            ModalVerb::Hide => ctrl.hide(env, None),
            ModalVerb::Toggle => ctrl.toggle(env, related_target),
        };
        self.after_step(dialog);
        outcome
    }

    fn resume(&mut self, continuation: Continuation) {
        let dialog = continuation.dialog();
        if let Some(ctrl) = self.controllers.get_mut(&dialog) {
            ctrl.resume(&mut self.env, continuation);
            self.after_step(dialog);
        }
    }

    fn route(&mut self, event: &Event, flow: &mut EventFlow) {
        for idx in 0..self.order.len() {
            let dialog = self.order[idx];
            if let Some(ctrl) = self.controllers.get_mut(&dialog)
                && ctrl.handle_event(&mut self.env, event, flow).is_some()
            {
                self.after_step(dialog);
            }
        }
    }

    /// Return focus to the trigger of a dialog that just finished hiding.
    fn after_step(&mut self, dialog: ElementId) {
        if self.phase(dialog) != Some(ModalPhase::Hidden) {
            return;
        }
        if let Some(trigger) = self.focus_returns.remove(&dialog)
            && self.env.document.is_visible(trigger)
        {
            self.env.document.focus(trigger);
        }
    }

    fn activate_trigger(&mut self, target: ElementId, flow: &mut EventFlow) {
        let doc = &self.env.document;
        let Some(trigger) = doc.closest(target, |d, id| d.data(id, "toggle") == Some("modal"))
        else {
            return;
        };
        let href = doc.attribute(trigger, "href").map(str::to_owned);
        let selector = doc
            .data(trigger, "target")
            .map(str::to_owned)
            .or_else(|| href.as_deref().and_then(fragment).map(str::to_owned));
        if doc.tag(trigger) == "a" {
            flow.prevent_default();
        }
        let Some(selector) = selector else {
            tracing::debug!(%trigger, "modal trigger names no target");
            return;
        };
        let Some(dialog) = self.resolve(ModalTarget::Selector(&selector)) else {
            return;
        };

        let outcome = if self.controllers.contains_key(&dialog) {
            self.run_verb(dialog, ModalVerb::Toggle, Some(trigger))
        } else {
            let link = match href.filter(|h| !h.contains('#')) {
                Some(url) => ModalOptionsPatch::new().remote(url),
                None => ModalOptionsPatch::default(),
            };
            let declared = self.declared_options(trigger);
            let options = self.layered_options(dialog, &link, Some(&declared));
            let show = options.show;
            self.install(dialog, options);
            if !show {
                return;
            }
            self.run_verb(dialog, ModalVerb::Show, Some(trigger))
        };

        let opened = self
            .controller(dialog)
            .is_some_and(ModalController::is_shown);
        if outcome == LifecycleOutcome::Started && opened {
            self.focus_returns.insert(dialog, trigger);
        }
    }

    fn start_load(&mut self, dialog: ElementId, url: String) {
        let Some(loader) = self.loader.as_mut() else {
            tracing::warn!(%dialog, url = %url, "remote modal content requested without a loader");
            return;
        };
        let id = LoadId(self.next_load);
        self.next_load += 1;
        tracing::debug!(%dialog, url = %url, "loading remote modal content");
        self.pending_loads.insert(
            id,
            PendingLoad {
                dialog,
                url: url.clone(),
            },
        );
        loader.load(LoadRequest { id, url }, LoadSink::new(id, self.load_tx.clone()));
    }

    fn finish_load(&mut self, id: LoadId, result: Result<String, LoadError>) {
        let Some(PendingLoad { dialog, url }) = self.pending_loads.remove(&id) else {
            tracing::trace!(?id, "completion for unknown load dropped");
            return;
        };
        let content = match result {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(%dialog, %err, "remote modal content failed to load");
                return;
            }
        };
        let doc = &mut self.env.document;
        let region = doc
            .find_descendant_with_class(dialog, CONTENT_CLASS)
            .unwrap_or(dialog);
        doc.replace_content(region, content);
        tracing::debug!(%dialog, url = %url, "remote modal content loaded");
        if let Some(signals) = self.signals_of(dialog) {
            signals.loaded.emit(&mut Loaded { dialog, url });
        }
    }
}

/// `#fragment` at the end of an `href`, if well formed.
fn fragment(href: &str) -> Option<&str> {
    let start = href.rfind('#')?;
    let frag = &href[start..];
    (frag.len() > 1 && !frag.contains(char::is_whitespace)).then_some(frag)
}
