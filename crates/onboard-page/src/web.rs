#![forbid(unsafe_code)]

//! `web-sys` adapter: drives a tour against the live browser DOM.
//!
//! DOM nodes have no stable integer identity, so the adapter keeps a
//! generational registry of every element it has handed out. Each
//! registered element is stamped with a `data-onboard-ref` attribute naming
//! its slot, which makes resolving an element back to its handle O(1).
//! [`WebPage::forget_detached`] releases elements that left the document.

use std::cell::RefCell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement};

use crate::{ElementId, Page, PageError};

const REF_ATTRIBUTE: &str = "data-onboard-ref";

#[derive(Debug, Default)]
struct Registry {
    slots: Vec<Option<Element>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Registry {
    fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.idx())
            .and_then(Option::as_ref)
            .filter(|_| self.generations[id.idx()] == id.generation())
    }

    fn insert(&mut self, element: Element) -> Result<ElementId, PageError> {
        let idx = match self.free_list.pop() {
            Some(idx) => idx,
            None => {
                self.slots.push(None);
                self.generations.push(0);
                self.slots.len() - 1
            }
        };
        let Ok(raw) = u32::try_from(idx) else {
            self.free_list.push(idx);
            return Err(PageError::Host("element registry is full".to_owned()));
        };
        let generation = self.generations[idx].saturating_add(1);
        self.generations[idx] = generation;
        self.slots[idx] = Some(element);
        Ok(ElementId::new(raw, generation))
    }

    fn release(&mut self, idx: usize) -> Option<Element> {
        let element = self.slots.get_mut(idx)?.take()?;
        self.free_list.push(idx);
        Some(element)
    }
}

/// [`Page`] implementation over `window.document`.
#[derive(Debug)]
pub struct WebPage {
    document: web_sys::Document,
    registry: RefCell<Registry>,
}

impl WebPage {
    /// Bind to the current window's document.
    pub fn from_window() -> Result<Self, PageError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PageError::Host("no window.document".to_owned()))?;
        Ok(Self::new(document))
    }

    /// Bind to an explicit document.
    #[must_use]
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            registry: RefCell::new(Registry::default()),
        }
    }

    /// Release every registered element no longer connected to the
    /// document. Their handles become stale. Returns how many were dropped.
    ///
    /// Elements created but not yet appended are released too.
    pub fn forget_detached(&mut self) -> usize {
        let registry = self.registry.get_mut();
        let detached: Vec<usize> = registry
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                slot.as_ref()
                    .filter(|el| !self.document.contains(Some(el.as_ref())))
                    .map(|_| idx)
            })
            .collect();
        for &idx in &detached {
            if let Some(el) = registry.release(idx) {
                let _ = el.remove_attribute(REF_ATTRIBUTE);
            }
        }
        detached.len()
    }

    fn register(&self, element: Element) -> Result<ElementId, PageError> {
        if let Some(id) = element
            .get_attribute(REF_ATTRIBUTE)
            .and_then(|text| ElementId::parse_ref(&text))
            && self
                .registry
                .borrow()
                .get(id)
                .is_some_and(|known| *known == element)
        {
            return Ok(id);
        }
        let id = self.registry.borrow_mut().insert(element.clone())?;
        element
            .set_attribute(REF_ATTRIBUTE, &id.to_ref())
            .map_err(host)?;
        Ok(id)
    }

    fn element(&self, id: ElementId) -> Result<Element, PageError> {
        self.registry
            .borrow()
            .get(id)
            .cloned()
            .ok_or(PageError::StaleElement(id))
    }

    fn html(&self, id: ElementId) -> Result<HtmlElement, PageError> {
        self.element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| PageError::Host("element has no inline style".to_owned()))
    }
}

fn host(err: JsValue) -> PageError {
    PageError::Host(format!("{err:?}"))
}

impl Page for WebPage {
    fn query_class(&self, class: &str) -> Vec<ElementId> {
        let Ok(list) = self.document.query_selector_all(&format!(".{class}")) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|el| self.register(el).ok())
            .collect()
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| self.register(el).ok())
    }

    fn create_element(&mut self, tag: &str) -> Result<ElementId, PageError> {
        let el = self.document.create_element(tag).map_err(host)?;
        self.register(el)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), PageError> {
        let parent = self.element(parent)?;
        let child = self.element(child)?;
        parent.append_child(&child).map_err(host)?;
        Ok(())
    }

    fn contains(&self, id: ElementId) -> bool {
        self.element(id)
            .is_ok_and(|el| self.document.contains(Some(el.as_ref())))
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.element(id).ok()?.parent_element()?;
        self.register(parent).ok()
    }

    fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), PageError> {
        self.element(id)?.class_list().add_1(class).map_err(host)
    }

    fn remove_class(&mut self, id: ElementId, class: &str) -> Result<(), PageError> {
        self.element(id)?.class_list().remove_1(class).map_err(host)
    }

    fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id)
            .is_ok_and(|el| el.class_list().contains(class))
    }

    fn style(&self, id: ElementId, property: &str) -> Option<String> {
        let value = self
            .html(id)
            .ok()?
            .style()
            .get_property_value(property)
            .ok()?;
        (!value.is_empty()).then_some(value)
    }

    fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> Result<(), PageError> {
        self.html(id)?
            .style()
            .set_property(property, value)
            .map_err(host)
    }

    fn remove_style(&mut self, id: ElementId, property: &str) -> Result<(), PageError> {
        self.html(id)?
            .style()
            .remove_property(property)
            .map(|_| ())
            .map_err(host)
    }

    fn clear_inline_style(&mut self, id: ElementId) -> Result<(), PageError> {
        self.element(id)?.remove_attribute("style").map_err(host)
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.element(id).ok()?.get_attribute(name)
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), PageError> {
        self.element(id)?.set_attribute(name, value).map_err(host)
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), PageError> {
        self.element(id)?.set_text_content(Some(text));
        Ok(())
    }
}
