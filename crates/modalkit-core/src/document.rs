#![forbid(unsafe_code)]

//! Headless document model.
//!
//! A [`Document`] is an arena of elements rooted at a `<html>` element with a
//! single `<body>`. It models exactly the page state a modal controller
//! touches: tree structure, classes, attributes, a handful of inline style
//! properties, display state, scroll offsets, focus, and the measurements
//! used for scrollbar compensation.
//!
//! # Measurement model
//!
//! - `scroll_height(el)` is the element's intrinsic content height (set with
//!   [`Document::set_content_height`]), or `0` when the element is not
//!   rendered.
//! - `offset_width(el)` is the inline width, falling back to the viewport
//!   width; `client_width(el)` subtracts the platform scrollbar gutter for
//!   elements flagged [`ElementFlags::SCROLL_GUTTER`].
//! - Every measurement read bumps [`Document::layout_reads`], standing in for
//!   a forced synchronous reflow.
//!
//! # Invariants
//!
//! - Removed elements free their arena slot for the next
//!   [`Document::create_element`]. A recycled slot bumps its generation, so
//!   an id held past [`Document::remove`] never aliases the new occupant: it
//!   reads as an empty element flagged [`ElementFlags::DISCARDED`], writes
//!   through it are dropped, and it can no longer be attached or focused.
//! - An element has at most one parent and appears once in its children list.
//! - `root()` and `body()` are always connected.
//!
//! # Failure Modes
//!
//! - Passing an [`ElementId`] minted by a different document panics on
//!   out-of-range ids (same contract as slice indexing) and otherwise reads
//!   as discarded unless the generations happen to match.
//! - Malformed selectors resolve to `None`; they never panic.

use std::cell::Cell;
use std::fmt;
use std::sync::LazyLock;

use ahash::AHashMap;
use bitflags::bitflags;

/// Generational element handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Raw arena index. Shared by every element that ever used the slot.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.index
    }

    /// How many times the slot was recycled before this element took it.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "el{}", self.index)
        } else {
            write!(f, "el{}v{}", self.index, self.generation)
        }
    }
}

bitflags! {
    /// Per-element layout and lifecycle flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u8 {
        /// `display: none`.
        const HIDDEN = 1 << 0;
        /// `overflow: scroll`: the element always reserves a scrollbar gutter.
        const SCROLL_GUTTER = 1 << 1;
        /// Removed from the document for good.
        const DISCARDED = 1 << 2;
    }
}

/// Inline style properties the modal layer reads and writes.
///
/// `None` means "not set inline" (the stylesheet value applies, which this
/// model treats as zero / auto).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InlineStyle {
    pub padding_left: Option<f32>,
    pub padding_right: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Visible page area in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    attributes: AHashMap<String, String>,
    style: InlineStyle,
    flags: ElementFlags,
    content_height: f32,
    scroll_top: f32,
    text: String,
    generation: u32,
}

impl Node {
    fn new(tag: &str, generation: u32) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: AHashMap::new(),
            style: InlineStyle::default(),
            flags: ElementFlags::empty(),
            content_height: 0.0,
            scroll_top: 0.0,
            text: String::new(),
            generation,
        }
    }

    /// Free slot, or the stand-in returned for stale ids.
    fn vacant(generation: u32) -> Self {
        let mut node = Self::new("", generation);
        node.flags = ElementFlags::DISCARDED;
        node
    }
}

static VACANT: LazyLock<Node> = LazyLock::new(|| Node::vacant(0));

/// The page: element tree, viewport, focus and platform metrics.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<u32>,
    /// Sink for writes through stale ids.
    scratch: Node,
    root: ElementId,
    body: ElementId,
    viewport: Viewport,
    scrollbar_width: f32,
    focused: Option<ElementId>,
    transitions: bool,
    layout_reads: Cell<u64>,
}

impl Document {
    /// Create an empty page with the given viewport size.
    ///
    /// The platform scrollbar gutter defaults to `0` (overlay scrollbars) and
    /// CSS transitions are reported as supported.
    pub fn new(width: f32, height: f32) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            scratch: Node::vacant(0),
            root: ElementId::new(0, 0),
            body: ElementId::new(0, 0),
            viewport: Viewport { width, height },
            scrollbar_width: 0.0,
            focused: None,
            transitions: true,
            layout_reads: Cell::new(0),
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.root = root;
        doc.body = body;
        doc.append_child(root, body);
        doc
    }

    fn node(&self, id: ElementId) -> &Node {
        let node = &self.nodes[id.index()];
        if node.generation == id.generation {
            node
        } else {
            &*VACANT
        }
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node {
        if self.nodes[id.index()].generation != id.generation {
            self.scratch = Node::vacant(0);
            return &mut self.scratch;
        }
        &mut self.nodes[id.index()]
    }

    fn count_layout_read(&self) {
        self.layout_reads.set(self.layout_reads.get() + 1);
    }

    // --- Tree ---

    /// The document element (`<html>`).
    #[inline]
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The `<body>` element.
    #[inline]
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Create a detached element, recycling a freed slot when one exists.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index as usize];
            let generation = slot.generation;
            *slot = Node::new(tag, generation);
            return ElementId::new(index, generation);
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(Node::new(tag, 0));
        ElementId::new(index, 0)
    }

    /// Number of arena slots, live or free.
    pub fn allocated_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// Discarded elements are ignored.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if self.is_discarded(child) || self.is_discarded(parent) {
            return;
        }
        debug_assert!(
            !self.contains(child, parent),
            "appending {child} under {parent} would create a cycle"
        );
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Remove `el` from its parent, keeping it alive for reinsertion.
    pub fn detach(&mut self, el: ElementId) {
        if let Some(parent) = self.node_mut(el).parent.take() {
            self.node_mut(parent).children.retain(|&c| c != el);
        }
    }

    /// Detach `el` and discard it together with its subtree.
    pub fn remove(&mut self, el: ElementId) {
        if self.is_discarded(el) {
            return;
        }
        self.detach(el);
        let mut stack = vec![el];
        while let Some(id) = stack.pop() {
            let slot = &mut self.nodes[id.index()];
            let next = Node::vacant(slot.generation.wrapping_add(1));
            let node = std::mem::replace(slot, next);
            stack.extend(node.children);
            self.free.push(id.index);
            if self.focused == Some(id) {
                self.focused = None;
            }
        }
    }

    /// Whether `el` has been removed for good.
    pub fn is_discarded(&self, el: ElementId) -> bool {
        self.node(el).flags.contains(ElementFlags::DISCARDED)
    }

    /// Parent element, if attached.
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.node(el).parent
    }

    /// Children in document order.
    pub fn children(&self, el: ElementId) -> &[ElementId] {
        &self.node(el).children
    }

    /// `el` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, el: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(Some(el), move |&id| self.parent(id))
    }

    /// Whether `el` is reachable from the document root.
    pub fn is_connected(&self, el: ElementId) -> bool {
        !self.is_discarded(el) && self.ancestors(el).any(|id| id == self.root)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Nearest inclusive ancestor of `el` satisfying `pred`.
    pub fn closest(
        &self,
        el: ElementId,
        pred: impl Fn(&Self, ElementId) -> bool,
    ) -> Option<ElementId> {
        self.ancestors(el).find(|&id| pred(self, id))
    }

    /// Descendants of `el` in pre-order, excluding `el` itself.
    pub fn descendants(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(el).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// First descendant of `el` carrying `class`.
    pub fn find_descendant_with_class(&self, el: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(el)
            .into_iter()
            .find(|&id| self.has_class(id, class))
    }

    /// Connected elements carrying `class`, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<ElementId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&el| self.attribute(el, "id") == Some(id))
    }

    /// Resolve a selector to a connected element.
    ///
    /// Only id selectors (`#name`) are understood. Anything else, including
    /// an empty string or a bare `#`, resolves to `None`.
    pub fn select(&self, selector: &str) -> Option<ElementId> {
        let name = selector.trim().strip_prefix('#')?;
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return None;
        }
        self.element_by_id(name)
    }

    /// Lower-case tag name.
    pub fn tag(&self, el: ElementId) -> &str {
        &self.node(el).tag
    }

    // --- Classes ---

    /// Add `class` if not already present.
    pub fn add_class(&mut self, el: ElementId, class: &str) {
        let classes = &mut self.node_mut(el).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_owned());
        }
    }

    /// Remove `class` if present.
    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        self.node_mut(el).classes.retain(|c| c != class);
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.node(el).classes.iter().any(|c| c == class)
    }

    pub fn classes(&self, el: ElementId) -> &[String] {
        &self.node(el).classes
    }

    // --- Attributes ---

    pub fn set_attribute(&mut self, el: ElementId, name: &str, value: impl Into<String>) {
        self.node_mut(el)
            .attributes
            .insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn attribute(&self, el: ElementId, name: &str) -> Option<&str> {
        self.node(el)
            .attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remove_attribute(&mut self, el: ElementId, name: &str) {
        self.node_mut(el)
            .attributes
            .remove(&name.to_ascii_lowercase());
    }

    /// `data-<key>` attribute.
    pub fn data(&self, el: ElementId, key: &str) -> Option<&str> {
        self.attribute(el, &format!("data-{key}"))
    }

    // --- Style and display ---

    pub fn style(&self, el: ElementId) -> &InlineStyle {
        &self.node(el).style
    }

    pub fn style_mut(&mut self, el: ElementId) -> &mut InlineStyle {
        &mut self.node_mut(el).style
    }

    pub fn flags(&self, el: ElementId) -> ElementFlags {
        self.node(el).flags
    }

    /// Toggle `display: none`.
    pub fn set_displayed(&mut self, el: ElementId, displayed: bool) {
        self.node_mut(el)
            .flags
            .set(ElementFlags::HIDDEN, !displayed);
    }

    /// Whether the element itself is not `display: none`.
    pub fn is_displayed(&self, el: ElementId) -> bool {
        !self.node(el).flags.contains(ElementFlags::HIDDEN)
    }

    /// Connected, and neither the element nor any ancestor is hidden.
    pub fn is_visible(&self, el: ElementId) -> bool {
        self.is_connected(el) && self.ancestors(el).all(|id| self.is_displayed(id))
    }

    /// Mark the element as `overflow: scroll`.
    pub fn set_scroll_gutter(&mut self, el: ElementId, gutter: bool) {
        self.node_mut(el)
            .flags
            .set(ElementFlags::SCROLL_GUTTER, gutter);
    }

    // --- Measurement ---

    /// Set the intrinsic content height used by [`scroll_height`](Self::scroll_height).
    pub fn set_content_height(&mut self, el: ElementId, height: f32) {
        self.node_mut(el).content_height = height.max(0.0);
    }

    /// Full content height; `0` when the element is not rendered.
    pub fn scroll_height(&self, el: ElementId) -> f32 {
        self.count_layout_read();
        if self.is_visible(el) {
            self.node(el).content_height
        } else {
            0.0
        }
    }

    /// Border-box width; `0` when the element is not rendered.
    pub fn offset_width(&self, el: ElementId) -> f32 {
        self.count_layout_read();
        if !self.is_visible(el) {
            return 0.0;
        }
        self.node(el).style.width.unwrap_or(self.viewport.width)
    }

    /// Width available to content, excluding any scrollbar gutter.
    pub fn client_width(&self, el: ElementId) -> f32 {
        let offset = self.offset_width(el);
        if self.flags(el).contains(ElementFlags::SCROLL_GUTTER) {
            (offset - self.scrollbar_width).max(0.0)
        } else {
            offset
        }
    }

    /// Resolved right padding (inline value, or `0` from the stylesheet).
    pub fn computed_padding_right(&self, el: ElementId) -> f32 {
        self.node(el).style.padding_right.unwrap_or(0.0)
    }

    /// Number of measurement reads performed so far.
    pub fn layout_reads(&self) -> u64 {
        self.layout_reads.get()
    }

    pub fn scroll_top(&self, el: ElementId) -> f32 {
        self.node(el).scroll_top
    }

    pub fn set_scroll_top(&mut self, el: ElementId, top: f32) {
        self.node_mut(el).scroll_top = top.max(0.0);
    }

    // --- Page metrics ---

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    /// Width of the platform scrollbar gutter.
    pub fn scrollbar_width(&self) -> f32 {
        self.scrollbar_width
    }

    pub fn set_scrollbar_width(&mut self, width: f32) {
        self.scrollbar_width = width.max(0.0);
    }

    /// Whether CSS transitions run (and therefore emit transition-end).
    pub fn supports_transitions(&self) -> bool {
        self.transitions
    }

    pub fn set_supports_transitions(&mut self, supported: bool) {
        self.transitions = supported;
    }

    // --- Focus ---

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Move focus to `el`. Discarded elements cannot take focus.
    pub fn focus(&mut self, el: ElementId) {
        if !self.is_discarded(el) {
            self.focused = Some(el);
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    // --- Content ---

    pub fn text(&self, el: ElementId) -> &str {
        &self.node(el).text
    }

    pub fn set_text(&mut self, el: ElementId, text: impl Into<String>) {
        self.node_mut(el).text = text.into();
    }

    /// Discard every child of `el` and replace its text.
    pub fn replace_content(&mut self, el: ElementId, text: impl Into<String>) {
        let children = std::mem::take(&mut self.node_mut(el).children);
        for child in children {
            self.node_mut(child).parent = None;
            self.remove(child);
        }
        self.set_text(el, text);
    }
}
