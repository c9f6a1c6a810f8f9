#![forbid(unsafe_code)]

//! Compound simple selectors: `tag`, `#id`, `.class` and combinations such
//! as `div.onboard-hint#intro`.
//!
//! Combinators, attribute selectors and pseudo-classes are not supported;
//! [`Selector::parse`] rejects them.

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parse a compound selector. Returns `None` for empty or unsupported input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Self::default();
        let mut rest = input;

        let tag_len = rest.find(['.', '#']).unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if !is_ident(tag) {
                return None;
            }
            selector.tag = Some(tag.to_ascii_lowercase());
            rest = &rest[tag_len..];
        }

        while let Some(sigil) = rest.chars().next() {
            let body = &rest[1..];
            let len = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..len];
            if !is_ident(name) {
                return None;
            }
            match sigil {
                '.' => selector.classes.push(name.to_owned()),
                '#' => {
                    if selector.id.is_some() {
                        return None;
                    }
                    selector.id = Some(name.to_owned());
                }
                _ => return None,
            }
            rest = &body[len..];
        }

        Some(selector)
    }

    /// Whether an element with the given tag, id and class predicate matches.
    pub fn matches(&self, tag: &str, id: Option<&str>, has_class: impl Fn(&str) -> bool) -> bool {
        if let Some(want) = &self.tag
            && !want.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(want) = &self.id
            && id != Some(want.as_str())
        {
            return false;
        }
        self.classes.iter().all(|class| has_class(class))
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
