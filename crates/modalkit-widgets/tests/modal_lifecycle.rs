//! Scenario tests for the modal host: lifecycle, backdrop, focus enforcement,
//! scrollbar compensation, declarative triggers and remote content.

#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use modalkit_core::{Document, ElementId, Event};
use modalkit_runtime::ManualClock;
use modalkit_widgets::modal::{
    BackdropMode, ContentLoader, LifecycleOutcome, LoadError, LoadRequest, LoadSink, LockPolicy,
    MODAL_OPEN_CLASS, ModalHost, ModalOptions, ModalOptionsPatch, ModalPhase, StaticLoader,
};

// =============================================================================
// Fixture
// =============================================================================

const GUTTER: f32 = 17.0;
const BODY_PADDING: f32 = 4.0;

struct Page {
    host: ModalHost,
    clock: ManualClock,
    dialog: ElementId,
    content: ElementId,
    close: ElementId,
    trigger: ElementId,
    link: ElementId,
}

/// A long page with one fading dialog, a button trigger and a link trigger.
fn build(configure: impl FnOnce(&mut Document, ElementId)) -> (Document, [ElementId; 5]) {
    let mut doc = Document::new(1024.0, 768.0);
    doc.set_scrollbar_width(GUTTER);
    let body = doc.body();
    doc.set_content_height(body, 2_000.0);
    doc.style_mut(body).padding_right = Some(BODY_PADDING);

    let dialog = doc.create_element("div");
    doc.set_attribute(dialog, "id", "donate");
    doc.add_class(dialog, "modal");
    doc.add_class(dialog, "fade");
    doc.set_attribute(dialog, "aria-hidden", "true");
    doc.set_displayed(dialog, false);
    doc.set_content_height(dialog, 400.0);
    doc.append_child(body, dialog);

    let content = doc.create_element("div");
    doc.add_class(content, "modal-content");
    doc.append_child(dialog, content);

    let close = doc.create_element("button");
    doc.set_attribute(close, "data-dismiss", "modal");
    doc.append_child(content, close);

    let trigger = doc.create_element("button");
    doc.set_attribute(trigger, "data-toggle", "modal");
    doc.set_attribute(trigger, "data-target", "#donate");
    doc.append_child(body, trigger);

    let link = doc.create_element("a");
    doc.set_attribute(link, "href", "#donate");
    doc.set_attribute(link, "data-toggle", "modal");
    doc.append_child(body, link);

    configure(&mut doc, dialog);
    (doc, [dialog, content, close, trigger, link])
}

fn page_with(
    configure: impl FnOnce(&mut Document, ElementId),
    finish: impl FnOnce(ModalHost) -> ModalHost,
) -> Page {
    let (doc, [dialog, content, close, trigger, link]) = build(configure);
    let clock = ManualClock::new();
    let host = finish(ModalHost::with_clock(doc, clock.clone()));
    Page {
        host,
        clock,
        dialog,
        content,
        close,
        trigger,
        link,
    }
}

fn page() -> Page {
    page_with(|_, _| {}, |host| host)
}

/// Run every parked continuation by jumping the clock to each deadline.
fn settle(p: &mut Page) {
    while let Some(deadline) = p.host.next_deadline() {
        p.clock.set(deadline);
        p.host.pump();
    }
}

fn backdrops(p: &Page) -> usize {
    p.host.document().elements_with_class("modal-backdrop").len()
}

fn body_padding(p: &Page) -> Option<f32> {
    let doc = p.host.document();
    doc.style(doc.body()).padding_right
}

fn record(p: &mut Page) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let signals = p.host.signals(p.dialog);
    {
        let log = Rc::clone(&log);
        signals
            .about_to_show
            .subscribe(move |_| log.borrow_mut().push("about_to_show".to_owned()))
            .detach();
    }
    {
        let log = Rc::clone(&log);
        signals
            .shown
            .subscribe(move |_| log.borrow_mut().push("shown".to_owned()))
            .detach();
    }
    {
        let log = Rc::clone(&log);
        signals
            .about_to_hide
            .subscribe(move |_| log.borrow_mut().push("about_to_hide".to_owned()))
            .detach();
    }
    {
        let log = Rc::clone(&log);
        signals
            .hidden
            .subscribe(move |_| log.borrow_mut().push("hidden".to_owned()))
            .detach();
    }
    log
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn show_then_escape_runs_full_cycle() {
    let mut p = page();
    let log = record(&mut p);

    assert_eq!(p.host.show(p.dialog, None), Some(LifecycleOutcome::Started));
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Showing));
    assert!(p.host.is_scroll_locked());
    assert_eq!(backdrops(&p), 1);

    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
    assert_eq!(p.host.document().attribute(p.dialog, "aria-hidden"), Some("false"));
    assert!(p.host.document().has_class(p.dialog, "in"));

    p.host.dispatch(Event::Focus { target: p.close });
    p.host.dispatch(Event::escape());
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hiding));
    assert_eq!(p.host.document().attribute(p.dialog, "aria-hidden"), Some("true"));

    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));
    assert_eq!(backdrops(&p), 0);
    assert!(!p.host.is_scroll_locked());
    assert!(!p.host.document().is_displayed(p.dialog));
    assert_eq!(
        *log.borrow(),
        ["about_to_show", "shown", "about_to_hide", "hidden"]
    );
    assert!(p.host.is_idle());
}

#[test]
fn fallback_timers_bound_each_step() {
    let mut p = page();
    p.host.show(p.dialog, None);

    assert_eq!(p.host.next_deadline(), Some(Duration::from_millis(150)));
    p.clock.advance(Duration::from_millis(149));
    p.host.pump();
    assert!(!p.host.document().is_displayed(p.dialog));

    p.clock.advance(Duration::from_millis(1));
    p.host.pump();
    assert!(p.host.document().is_displayed(p.dialog));
    assert_eq!(p.host.next_deadline(), Some(Duration::from_millis(450)));

    p.clock.set(Duration::from_millis(450));
    p.host.pump();
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
}

#[test]
fn transition_end_resumes_before_fallback() {
    let mut p = page();
    p.host.show(p.dialog, None);
    let backdrop = p.host.controller(p.dialog).and_then(|c| c.backdrop()).unwrap();

    p.host.dispatch(Event::TransitionEnd { target: backdrop });
    assert!(p.host.document().is_displayed(p.dialog));
    p.host.dispatch(Event::TransitionEnd { target: p.dialog });
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
    assert_eq!(p.host.now(), Duration::ZERO);

    // The fallback for the consumed wait must not fire a second time.
    assert_eq!(p.host.next_deadline(), None);
    p.host.dispatch(Event::TransitionEnd { target: p.dialog });
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
}

#[test]
fn detached_dialog_is_attached_on_show() {
    let mut p = page_with(
        |doc, dialog| {
            doc.detach(dialog);
            doc.remove_class(dialog, "fade");
        },
        |host| host,
    );
    p.host.show(p.dialog, None);
    assert!(p.host.document().is_connected(p.dialog));
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
}

#[test]
fn canceled_show_leaves_dialog_hidden() {
    let mut p = page();
    let _veto = p
        .host
        .signals(p.dialog)
        .about_to_show
        .subscribe(|event| event.prevent_default());

    assert_eq!(p.host.show(p.dialog, None), Some(LifecycleOutcome::Canceled));
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));
    assert_eq!(backdrops(&p), 0);
    assert!(!p.host.is_scroll_locked());
    assert_eq!(body_padding(&p), Some(BODY_PADDING));
}

#[test]
fn canceled_hide_leaves_dialog_shown() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);

    let _veto = p
        .host
        .signals(p.dialog)
        .about_to_hide
        .subscribe(|event| event.prevent_default());
    p.host.dispatch(Event::Focus { target: p.close });
    p.host.dispatch(Event::escape());
    assert_eq!(p.host.hide(p.dialog), Some(LifecycleOutcome::Canceled));
    settle(&mut p);

    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
    assert_eq!(backdrops(&p), 1);
}

#[test]
fn toggle_follows_logical_visibility() {
    let mut p = page();
    p.host.toggle(p.dialog, None);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Showing));
    p.host.toggle(p.dialog, None);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hiding));
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));
    assert_eq!(backdrops(&p), 0);
}

// =============================================================================
// Backdrop and keyboard
// =============================================================================

#[test]
fn backdrop_click_dismisses() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);
    let backdrop = p.host.controller(p.dialog).and_then(|c| c.backdrop()).unwrap();

    p.host.dispatch(Event::Click { target: backdrop });
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));
    assert!(p.host.document().is_discarded(backdrop));
}

#[test]
fn static_backdrop_click_keeps_dialog_and_refocuses() {
    let mut p = page_with(
        |doc, dialog| doc.set_attribute(dialog, "data-backdrop", "static"),
        |host| host,
    );
    p.host.show(p.dialog, None);
    settle(&mut p);
    let backdrop = p.host.controller(p.dialog).and_then(|c| c.backdrop()).unwrap();
    p.host.document_mut().blur();

    p.host.dispatch(Event::Click { target: backdrop });
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
    assert_eq!(p.host.document().focused(), Some(p.dialog));
    assert_eq!(backdrops(&p), 1);
}

#[test]
fn keyboard_false_ignores_escape() {
    let mut p = page_with(
        |doc, dialog| doc.set_attribute(dialog, "data-keyboard", "false"),
        |host| host,
    );
    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.dispatch(Event::escape());
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
}

#[test]
fn policy_defaults_apply_to_new_controllers() {
    let defaults = ModalOptions::from_toml_str("backdrop = false\nkeyboard = false").unwrap();
    let mut p = page_with(|_, _| {}, |host| host.with_defaults(defaults));
    p.host.show(p.dialog, None);
    settle(&mut p);

    assert_eq!(backdrops(&p), 0);
    p.host.dispatch(Event::escape());
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
}

#[test]
fn call_site_options_override_declared_ones() {
    let mut p = page_with(
        |doc, dialog| doc.set_attribute(dialog, "data-backdrop", "static"),
        |host| host,
    );
    let patch = ModalOptionsPatch::new().backdrop(BackdropMode::Disabled);
    assert_eq!(
        p.host.open(p.dialog, patch, None),
        Some(LifecycleOutcome::Started)
    );
    settle(&mut p);
    assert_eq!(backdrops(&p), 0);
}

// =============================================================================
// Focus enforcement
// =============================================================================

#[test]
fn focus_outside_is_pulled_back() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);

    p.host.dispatch(Event::Focus { target: p.trigger });
    assert_eq!(p.host.document().focused(), Some(p.dialog));

    p.host.dispatch(Event::Focus { target: p.close });
    assert_eq!(p.host.document().focused(), Some(p.close));
}

#[test]
fn second_dialog_takes_over_focus_enforcement() {
    let mut p = page();
    let other = {
        let doc = p.host.document_mut();
        let other = doc.create_element("div");
        doc.set_attribute(other, "id", "pledge");
        doc.set_displayed(other, false);
        let body = doc.body();
        doc.append_child(body, other);
        other
    };

    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.show("#pledge", None);
    settle(&mut p);
    assert_eq!(p.host.focus_owner(), Some(other));

    p.host.dispatch(Event::Focus { target: p.close });
    assert_eq!(p.host.document().focused(), Some(other));
}

#[test]
fn hiding_releases_enforcement() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.hide(p.dialog);
    assert_eq!(p.host.focus_owner(), None);
    settle(&mut p);

    p.host.dispatch(Event::Focus { target: p.trigger });
    assert_eq!(p.host.document().focused(), Some(p.trigger));
}

// =============================================================================
// Scrollbar compensation
// =============================================================================

#[test]
fn body_padding_grows_by_gutter_and_is_restored() {
    let mut p = page();
    p.host.show(p.dialog, None);
    assert_eq!(body_padding(&p), Some(BODY_PADDING + GUTTER));
    settle(&mut p);
    assert_eq!(body_padding(&p), Some(BODY_PADDING + GUTTER));

    p.host.hide(p.dialog);
    settle(&mut p);
    assert_eq!(body_padding(&p), Some(BODY_PADDING));
    assert!(
        p.host
            .document()
            .elements_with_class("modal-scrollbar-measure")
            .is_empty()
    );
}

#[test]
fn short_page_gets_no_padding() {
    let mut p = page_with(
        |doc, _| {
            let body = doc.body();
            doc.set_content_height(body, 300.0);
        },
        |host| host,
    );
    p.host.show(p.dialog, None);
    settle(&mut p);
    assert_eq!(body_padding(&p), Some(BODY_PADDING));
}

#[test]
fn tall_dialog_is_padded_and_reset() {
    let mut p = page_with(|doc, dialog| doc.set_content_height(dialog, 1_200.0), |host| host);
    p.host.show(p.dialog, None);
    settle(&mut p);
    let style = *p.host.document().style(p.dialog);
    assert_eq!(style.padding_right, Some(GUTTER));
    assert_eq!(style.padding_left, None);
    let backdrop = p.host.controller(p.dialog).and_then(|c| c.backdrop()).unwrap();
    assert_eq!(p.host.document().style(backdrop).height, Some(1_200.0));

    p.host.hide(p.dialog);
    settle(&mut p);
    assert_eq!(p.host.document().style(p.dialog).padding_right, None);
}

#[test]
fn resize_readjusts_open_dialog() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);
    assert_eq!(p.host.document().style(p.dialog).padding_right, None);

    p.host.dispatch(Event::Resize {
        width: 1024.0,
        height: 300.0,
    });
    assert_eq!(p.host.document().style(p.dialog).padding_right, Some(GUTTER));
}

#[test]
fn counted_lock_survives_first_hide() {
    let mut p = page_with(|_, _| {}, |host| host.with_scroll_lock_policy(LockPolicy::Counted));
    let other = {
        let doc = p.host.document_mut();
        let other = doc.create_element("div");
        let body = doc.body();
        doc.append_child(body, other);
        other
    };
    p.host.show(p.dialog, None);
    p.host.show(other, None);
    settle(&mut p);

    p.host.hide(p.dialog);
    settle(&mut p);
    assert!(p.host.document().has_class(p.host.document().body(), MODAL_OPEN_CLASS));

    p.host.hide(other);
    settle(&mut p);
    assert!(!p.host.is_scroll_locked());
}

/// A second dialog on the same page, fading like the first when `fade`.
fn add_dialog(p: &mut Page, id: &str, fade: bool) -> ElementId {
    let doc = p.host.document_mut();
    let dialog = doc.create_element("div");
    doc.set_attribute(dialog, "id", id);
    if fade {
        doc.add_class(dialog, "fade");
    }
    doc.set_displayed(dialog, false);
    let body = doc.body();
    doc.append_child(body, dialog);
    dialog
}

#[test]
fn handing_over_to_another_dialog_restores_padding() {
    let mut p = page();
    let pay = add_dialog(&mut p, "pay", true);

    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.hide(p.dialog);
    p.host.show("#pay", None);
    assert_eq!(body_padding(&p), Some(BODY_PADDING + GUTTER), "compensated once");
    settle(&mut p);
    assert_eq!(p.host.phase(pay), Some(ModalPhase::Shown));

    p.host.hide(pay);
    settle(&mut p);
    assert_eq!(body_padding(&p), Some(BODY_PADDING));
    assert!(!p.host.is_scroll_locked());
    assert_eq!(backdrops(&p), 0);
}

#[test]
fn nested_dialogs_restore_padding_in_either_close_order() {
    for policy in [LockPolicy::Shared, LockPolicy::Counted] {
        let mut p = page_with(
            |doc, dialog| doc.remove_class(dialog, "fade"),
            |host| host.with_scroll_lock_policy(policy),
        );
        let pay = add_dialog(&mut p, "pay", false);

        p.host.show(p.dialog, None);
        p.host.show(pay, None);
        assert_eq!(body_padding(&p), Some(BODY_PADDING + GUTTER), "{policy:?}");
        p.host.hide(p.dialog);
        if policy == LockPolicy::Counted {
            assert_eq!(body_padding(&p), Some(BODY_PADDING + GUTTER));
        }
        p.host.hide(pay);
        assert!(p.host.is_idle());
        assert_eq!(body_padding(&p), Some(BODY_PADDING), "{policy:?}");
        assert!(!p.host.is_scroll_locked(), "{policy:?}");
    }
}

#[test]
fn reopening_while_hiding_keeps_single_compensation() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.hide(p.dialog);
    p.host.show(p.dialog, None);
    settle(&mut p);
    assert_eq!(body_padding(&p), Some(BODY_PADDING + GUTTER));

    p.host.hide(p.dialog);
    settle(&mut p);
    assert_eq!(body_padding(&p), Some(BODY_PADDING));
}

#[test]
fn repeated_cycles_do_not_grow_the_page() {
    let mut p = page();
    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.hide(p.dialog);
    settle(&mut p);
    let slots = p.host.document().allocated_slots();

    for _ in 0..25 {
        p.host.show(p.dialog, None);
        settle(&mut p);
        p.host.hide(p.dialog);
        settle(&mut p);
    }
    assert_eq!(p.host.document().allocated_slots(), slots);
}

// =============================================================================
// Declarative triggers
// =============================================================================

#[test]
fn trigger_opens_and_focus_returns_after_hidden() {
    let mut p = page();
    let related = Rc::new(RefCell::new(None));
    {
        let related = Rc::clone(&related);
        p.host
            .signals(p.dialog)
            .shown
            .subscribe(move |event| *related.borrow_mut() = event.related_target)
            .detach();
    }

    let flow = p.host.dispatch(Event::Click { target: p.trigger });
    assert!(!flow.is_default_prevented(), "buttons have no default to stop");
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
    assert_eq!(*related.borrow(), Some(p.trigger));

    let flow = p.host.dispatch(Event::Click { target: p.close });
    assert!(flow.is_default_prevented());
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));
    assert_eq!(p.host.document().focused(), Some(p.trigger));
}

#[test]
fn hidden_trigger_does_not_get_focus_back() {
    let mut p = page();
    p.host.dispatch(Event::Click { target: p.trigger });
    settle(&mut p);
    p.host.document_mut().set_displayed(p.trigger, false);

    p.host.hide(p.dialog);
    settle(&mut p);
    assert_ne!(p.host.document().focused(), Some(p.trigger));
}

#[test]
fn link_trigger_prevents_navigation_and_toggles() {
    let mut p = page();
    let flow = p.host.dispatch(Event::Click { target: p.link });
    assert!(flow.is_default_prevented());
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));

    let flow = p.host.dispatch(Event::Click { target: p.link });
    assert!(flow.is_default_prevented());
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));
}

#[test]
fn click_inside_trigger_activates_it() {
    let mut p = page();
    let icon = {
        let doc = p.host.document_mut();
        let icon = doc.create_element("span");
        doc.append_child(p.trigger, icon);
        icon
    };
    p.host.dispatch(Event::Click { target: icon });
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Showing));
}

#[test]
fn trigger_declared_show_false_only_prepares() {
    let mut p = page_with(|_, _| {}, |host| host);
    p.host
        .document_mut()
        .set_attribute(p.trigger, "data-show", "false");

    p.host.dispatch(Event::Click { target: p.trigger });
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Hidden));

    p.host.dispatch(Event::Click { target: p.trigger });
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Showing));
}

#[test]
fn trigger_with_missing_target_does_nothing() {
    let mut p = page();
    p.host
        .document_mut()
        .set_attribute(p.trigger, "data-target", "#nowhere");
    p.host.dispatch(Event::Click { target: p.trigger });
    assert!(p.host.controller(p.dialog).is_none());
    assert_eq!(backdrops(&p), 0);
}

#[test]
fn canceled_trigger_show_does_not_steal_focus_later() {
    let mut p = page();
    let veto = p
        .host
        .signals(p.dialog)
        .about_to_show
        .subscribe(|event| event.prevent_default());
    p.host.dispatch(Event::Click { target: p.trigger });
    drop(veto);

    p.host.show(p.dialog, None);
    settle(&mut p);
    p.host.hide(p.dialog);
    settle(&mut p);
    assert_ne!(p.host.document().focused(), Some(p.trigger));
}

// =============================================================================
// Remote content
// =============================================================================

#[test]
fn remote_link_loads_into_content_region() {
    let loader = StaticLoader::new().with_page("/donate/form", "<form>monthly</form>");
    let mut p = page_with(|_, _| {}, |host| host.with_loader(loader));
    p.host
        .document_mut()
        .set_attribute(p.link, "href", "/donate/form");
    p.host
        .document_mut()
        .set_attribute(p.link, "data-target", "#donate");

    let loaded = Rc::new(RefCell::new(Vec::new()));
    {
        let loaded = Rc::clone(&loaded);
        p.host
            .signals(p.dialog)
            .loaded
            .subscribe(move |event| loaded.borrow_mut().push(event.url.clone()))
            .detach();
    }

    p.host.dispatch(Event::Click { target: p.link });
    assert!(!p.host.is_idle());
    settle(&mut p);
    p.host.pump();

    assert_eq!(p.host.document().text(p.content), "<form>monthly</form>");
    assert!(p.host.document().is_discarded(p.close));
    assert_eq!(*loaded.borrow(), ["/donate/form"]);
    assert!(p.host.is_idle());
}

#[derive(Clone, Default)]
struct DeferredLoader {
    parked: Rc<RefCell<Vec<(LoadRequest, LoadSink)>>>,
}

impl ContentLoader for DeferredLoader {
    fn load(&mut self, request: LoadRequest, sink: LoadSink) {
        self.parked.borrow_mut().push((request, sink));
    }
}

#[test]
fn failed_load_emits_nothing() {
    let loader = DeferredLoader::default();
    let parked = Rc::clone(&loader.parked);
    let mut p = page_with(
        |doc, dialog| doc.set_attribute(dialog, "data-remote", "/donate/broken"),
        |host| host.with_loader(loader),
    );
    let loaded = Rc::new(RefCell::new(0));
    {
        let loaded = Rc::clone(&loaded);
        p.host
            .signals(p.dialog)
            .loaded
            .subscribe(move |_| *loaded.borrow_mut() += 1)
            .detach();
    }

    p.host.open(p.dialog, ModalOptionsPatch::new().show(false), None);
    let (request, sink) = parked.borrow_mut().pop().unwrap();
    assert_eq!(request.url, "/donate/broken");
    sink.complete(Err(LoadError::Failed {
        url: request.url,
        reason: "503".into(),
    }));
    p.host.pump();

    assert_eq!(*loaded.borrow(), 0);
    assert!(p.host.is_idle());
    assert!(!p.host.document().is_discarded(p.close));
}

#[test]
fn remote_without_loader_is_ignored() {
    let mut p = page_with(
        |doc, dialog| doc.set_attribute(dialog, "data-remote", "/donate/form"),
        |host| host,
    );
    p.host.show(p.dialog, None);
    settle(&mut p);
    assert_eq!(p.host.phase(p.dialog), Some(ModalPhase::Shown));
    assert!(p.host.is_idle());
}
