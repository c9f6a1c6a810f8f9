#![forbid(unsafe_code)]

//! In-memory element arena implementing [`Page`].
//!
//! # Invariants
//!
//! 1. Slot 0 always holds the `<body>` root; it is never removed.
//! 2. A removed element frees its slot; reusing the slot bumps the
//!    generation so stale [`ElementId`]s never alias a new element.
//! 3. `children` and `parent` links are kept symmetric.

use crate::selector::Selector;
use crate::{ElementId, Page, PageError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    generation: u32,
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    /// Inline style declarations in insertion order.
    style: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    text: Option<String>,
}

impl Element {
    fn new(generation: u32, tag: &str) -> Self {
        Self {
            generation,
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            style: Vec::new(),
            attributes: Vec::new(),
            text: None,
        }
    }
}

/// Headless document: a `<body>` root plus an arena of elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    slots: Vec<Option<Element>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only `<body>`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Element::new(1, "body"))],
            generations: vec![1],
            free_list: Vec::new(),
        }
    }

    /// The root `<body>` element.
    #[must_use]
    pub const fn body(&self) -> ElementId {
        ElementId::new(0, 1)
    }

    /// Whether the handle still refers to a live element (connected or not).
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Remove `id` and its whole subtree. Removing the root or a stale
    /// handle is a no-op.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.body() || !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.get(id).and_then(|el| el.parent) {
            self.unlink(parent, id);
        }
        self.free_subtree(id);
    }

    /// Tag name of a live element.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|el| el.tag.as_str())
    }

    /// Children of a live element, in order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map_or(&[], |el| el.children.as_slice())
    }

    /// Class list of a live element, in insertion order.
    #[must_use]
    pub fn classes(&self, id: ElementId) -> &[String] {
        self.get(id).map_or(&[], |el| el.classes.as_slice())
    }

    /// Text content set through [`Page::set_text`].
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).and_then(|el| el.text.as_deref())
    }

    /// Serialized `style` attribute (`prop: value; ...`), or `None` when no
    /// inline style is set.
    #[must_use]
    pub fn style_attribute(&self, id: ElementId) -> Option<String> {
        let el = self.get(id)?;
        if el.style.is_empty() {
            return None;
        }
        Some(
            el.style
                .iter()
                .map(|(prop, value)| format!("{prop}: {value};"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|el| el.generation == id.generation())
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, PageError> {
        self.slots
            .get_mut(id.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|el| el.generation == id.generation())
            .ok_or(PageError::StaleElement(id))
    }

    fn unlink(&mut self, parent: ElementId, child: ElementId) {
        if let Ok(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != child);
        }
        if let Ok(c) = self.get_mut(child) {
            c.parent = None;
        }
    }

    fn free_subtree(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(el) = self.slots.get_mut(current.idx()).and_then(Option::take) else {
                continue;
            };
            stack.extend(el.children);
            self.free_list.push(current.idx());
        }
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.get(id).and_then(|el| el.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Connected elements in document (pre-order) order.
    fn walk(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![self.body()];
        while let Some(id) = stack.pop() {
            let Some(el) = self.get(id) else { continue };
            out.push(id);
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    fn id_attribute(el: &Element) -> Option<&str> {
        el.attributes
            .iter()
            .find(|(name, _)| name == "id")
            .map(|(_, value)| value.as_str())
    }
}

impl Page for Document {
    fn query_class(&self, class: &str) -> Vec<ElementId> {
        self.walk()
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        let Some(parsed) = Selector::parse(selector) else {
            tracing::debug!(selector, "unsupported selector");
            return None;
        };
        self.walk().into_iter().find(|id| {
            self.get(*id).is_some_and(|el| {
                parsed.matches(&el.tag, Self::id_attribute(el), |class| {
                    el.classes.iter().any(|c| c == class)
                })
            })
        })
    }

    fn create_element(&mut self, tag: &str) -> Result<ElementId, PageError> {
        let id = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Element::new(generation, tag));
            ElementId::new(idx as u32, generation)
        } else {
            self.slots.push(Some(Element::new(1, tag)));
            self.generations.push(1);
            ElementId::new((self.slots.len() - 1) as u32, 1)
        };
        Ok(id)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), PageError> {
        if !self.is_alive(parent) {
            return Err(PageError::StaleElement(parent));
        }
        if !self.is_alive(child) {
            return Err(PageError::StaleElement(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(PageError::Cycle { parent, child });
        }
        if let Some(old) = self.get(child).and_then(|el| el.parent) {
            self.unlink(old, child);
        }
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn contains(&self, id: ElementId) -> bool {
        self.is_alive(id) && self.is_ancestor_or_self(self.body(), id)
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|el| el.parent)
    }

    fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), PageError> {
        let el = self.get_mut(id)?;
        if !el.classes.iter().any(|c| c == class) {
            el.classes.push(class.to_owned());
        }
        Ok(())
    }

    fn remove_class(&mut self, id: ElementId, class: &str) -> Result<(), PageError> {
        self.get_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    fn style(&self, id: ElementId, property: &str) -> Option<String> {
        self.get(id)?
            .style
            .iter()
            .find(|(prop, _)| prop == property)
            .map(|(_, value)| value.clone())
    }

    fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> Result<(), PageError> {
        let el = self.get_mut(id)?;
        match el.style.iter_mut().find(|(prop, _)| prop == property) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => el.style.push((property.to_owned(), value.to_owned())),
        }
        Ok(())
    }

    fn remove_style(&mut self, id: ElementId, property: &str) -> Result<(), PageError> {
        self.get_mut(id)?.style.retain(|(prop, _)| prop != property);
        Ok(())
    }

    fn clear_inline_style(&mut self, id: ElementId) -> Result<(), PageError> {
        self.get_mut(id)?.style.clear();
        Ok(())
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.get(id)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<(), PageError> {
        let el = self.get_mut(id)?;
        match el.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => el.attributes.push((name.to_owned(), value.to_owned())),
        }
        Ok(())
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> Result<(), PageError> {
        let children = std::mem::take(&mut self.get_mut(id)?.children);
        for child in children {
            if let Ok(c) = self.get_mut(child) {
                c.parent = None;
            }
            self.free_subtree(child);
        }
        self.get_mut(id)?.text = Some(text.to_owned());
        Ok(())
    }
}
