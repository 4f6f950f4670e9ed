#![no_main]

use libfuzzer_sys::fuzz_target;
use modalkit_core::Document;
use modalkit_widgets::modal::{ModalOptions, ModalOptionsPatch, ModalVerb};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Policy documents must parse or fail cleanly.
    if let Ok(opts) = ModalOptions::from_toml_str(text) {
        let _ = opts.layered(&[ModalOptionsPatch::new()]);
    }
    let _ = ModalOptions::from_json_str(text);
    let _ = text.parse::<ModalVerb>();

    // Declared attributes and selectors never panic either.
    let mut doc = Document::new(800.0, 600.0);
    let el = doc.create_element("div");
    doc.append_child(doc.body(), el);
    for key in ["data-backdrop", "data-keyboard", "data-show", "data-remote"] {
        doc.set_attribute(el, key, text);
    }
    let _ = ModalOptionsPatch::from_element(&doc, el);
    let _ = doc.select(text);
});
