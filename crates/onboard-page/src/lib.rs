#![forbid(unsafe_code)]

//! Host page boundary for onboard tours.
//!
//! The tour controller never touches a real document directly. Everything it
//! needs (discovering hint containers, toggling marker classes, writing
//! inline styles, reading the serialized options attribute) flows through the
//! [`Page`] trait defined here.
//!
//! Two implementations ship with the crate:
//!
//! - [`Document`]: an in-memory element arena. Headless hosts and every test
//!   in the workspace drive tours against it.
//! - `WebPage` (`wasm32` only): a thin adapter over `web-sys` that maps
//!   [`ElementId`]s onto live DOM elements.
//!
//! # Example
//!
//! ```
//! use onboard_page::{Document, Page};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let hint = doc.create_element("div").unwrap();
//! doc.append_child(body, hint).unwrap();
//! doc.add_class(hint, "onboard-hint").unwrap();
//!
//! assert_eq!(doc.query_class("onboard-hint"), vec![hint]);
//! assert_eq!(doc.query_selector(".onboard-hint"), Some(hint));
//! ```

mod document;
mod selector;
#[cfg(target_arch = "wasm32")]
mod web;

pub use document::Document;
pub use selector::Selector;
#[cfg(target_arch = "wasm32")]
pub use web::WebPage;

/// Handle to an element owned by a [`Page`].
///
/// Handles are generational: once an element is removed, its handle never
/// aliases an element created later in the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(u32, u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }

    /// `idx:generation`, the form host adapters stamp onto live elements.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub(crate) fn to_ref(self) -> String {
        format!("{}:{}", self.0, self.1)
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub(crate) fn parse_ref(text: &str) -> Option<Self> {
        let (idx, generation) = text.split_once(':')?;
        Some(Self(idx.parse().ok()?, generation.parse().ok()?))
    }
}

/// Errors produced by page mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The handle refers to an element that has been removed.
    #[error("element {0:?} is no longer part of the page")]
    StaleElement(ElementId),
    /// Appending would make an element its own ancestor.
    #[error("cannot append {child:?} under its own descendant {parent:?}")]
    Cycle { parent: ElementId, child: ElementId },
    /// The host document rejected the operation.
    #[error("host page error: {0}")]
    Host(String),
}

/// Platform abstraction over the host document.
///
/// Query methods only see elements connected to the document root, in
/// document (pre-order) order. Mutations on stale handles fail with
/// [`PageError::StaleElement`].
pub trait Page {
    /// Every connected element carrying `class`, in document order.
    fn query_class(&self, class: &str) -> Vec<ElementId>;

    /// First connected element matching a simple selector (`tag`, `#id`, `.class`).
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Result<ElementId, PageError>;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), PageError>;

    /// Whether `id` is alive and connected to the document root.
    fn contains(&self, id: ElementId) -> bool;

    /// Direct parent of `id`, if any.
    fn parent(&self, id: ElementId) -> Option<ElementId>;

    fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), PageError>;
    fn remove_class(&mut self, id: ElementId, class: &str) -> Result<(), PageError>;
    fn has_class(&self, id: ElementId, class: &str) -> bool;

    /// Inline style property value, if set.
    fn style(&self, id: ElementId, property: &str) -> Option<String>;
    fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> Result<(), PageError>;
    fn remove_style(&mut self, id: ElementId, property: &str) -> Result<(), PageError>;
    /// Drop every inline style override (the whole `style` attribute).
    fn clear_inline_style(&mut self, id: ElementId) -> Result<(), PageError>;

    fn attribute(&self, id: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), PageError>;

    /// Replace the element's children with a text node.
    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), PageError>;
}
