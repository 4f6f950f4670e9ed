#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modalkit_core::{Document, Event};
use modalkit_runtime::ManualClock;
use modalkit_widgets::modal::{BackdropMode, ModalHost, ModalOptions, ModalPhase};

#[derive(Debug, Arbitrary)]
enum Op {
    Show,
    Hide,
    Toggle,
    Escape,
    ClickBackdrop,
    ClickDismiss,
    FocusOutside,
    DialogTransitionEnd,
    BackdropTransitionEnd,
    Advance(u16),
    Resize(u16, u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    fade: bool,
    backdrop: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let backdrop = match input.backdrop % 3 {
        0 => BackdropMode::Dismissible,
        1 => BackdropMode::Static,
        _ => BackdropMode::Disabled,
    };

    let mut doc = Document::new(1024.0, 768.0);
    doc.set_scrollbar_width(15.0);
    let body = doc.body();
    doc.set_content_height(body, 2_000.0);
    let dialog = doc.create_element("div");
    if input.fade {
        doc.add_class(dialog, "fade");
    }
    doc.set_displayed(dialog, false);
    doc.append_child(body, dialog);
    let dismiss = doc.create_element("button");
    doc.set_attribute(dismiss, "data-dismiss", "modal");
    doc.append_child(dialog, dismiss);
    let outside = doc.create_element("a");
    doc.append_child(body, outside);

    let clock = ManualClock::new();
    let mut host = ModalHost::with_clock(doc, clock.clone())
        .with_defaults(ModalOptions::default().backdrop(backdrop));

    for op in input.ops.into_iter().take(256) {
        match op {
            Op::Show => {
                host.show(dialog, None);
            }
            Op::Hide => {
                host.hide(dialog);
            }
            Op::Toggle => {
                host.toggle(dialog, None);
            }
            Op::Escape => {
                host.dispatch(Event::escape());
            }
            Op::ClickBackdrop => {
                if let Some(target) = host.controller(dialog).and_then(|c| c.backdrop()) {
                    host.dispatch(Event::Click { target });
                }
            }
            Op::ClickDismiss => {
                host.dispatch(Event::Click { target: dismiss });
            }
            Op::FocusOutside => {
                host.dispatch(Event::Focus { target: outside });
            }
            Op::DialogTransitionEnd => {
                host.dispatch(Event::TransitionEnd { target: dialog });
            }
            Op::BackdropTransitionEnd => {
                if let Some(target) = host.controller(dialog).and_then(|c| c.backdrop()) {
                    host.dispatch(Event::TransitionEnd { target });
                }
            }
            Op::Advance(ms) => {
                clock.advance(Duration::from_millis(u64::from(ms)));
                host.pump();
            }
            Op::Resize(w, h) => {
                host.dispatch(Event::Resize {
                    width: f32::from(w),
                    height: f32::from(h),
                });
            }
        }
    }

    while let Some(deadline) = host.next_deadline() {
        clock.set(deadline);
        host.pump();
    }

    let shown = host.controller(dialog).is_some_and(|c| c.is_shown());
    let backdrops = host.document().elements_with_class("modal-backdrop").len();
    if shown {
        assert_eq!(host.phase(dialog), Some(ModalPhase::Shown));
        assert!(backdrops <= 1);
    } else {
        assert_eq!(backdrops, 0);
        assert!(!host.is_scroll_locked());
    }
});
