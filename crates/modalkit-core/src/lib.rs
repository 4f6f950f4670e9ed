#![forbid(unsafe_code)]

//! Headless page model and input events for modalkit.
//!
//! The modal controller never talks to a real browser. It manipulates a
//! [`Document`](document::Document) and reacts to [`Event`](event::Event)s,
//! which keeps every lifecycle step observable and deterministic.

pub mod document;
pub mod event;

pub use document::{Document, ElementFlags, ElementId, InlineStyle, Viewport};
pub use event::{Event, EventFlow, KeyCode, KeyEvent, KeyEventKind};
