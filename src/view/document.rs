//! A small element tree standing in for the page.
//!
//! Nodes live in a generational arena, so a [`NodeId`] held across a
//! re-render resolves to nothing instead of to whatever took its slot.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::view::{FormField, Region};

new_key_type! {
    pub struct NodeId;
}

/// A detached element, built by markup helpers and then attached with
/// [`Document::append`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub href: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(String::from));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn href(mut self, href: &str) -> Self {
        self.href = Some(href.to_string());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub href: Option<String>,
    pub value: String,
    pub hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            text: None,
            href: None,
            value: String::new(),
            hidden: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    regions: HashMap<Region, NodeId>,
    fields: HashMap<FormField, NodeId>,
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: SlotMap::with_key(),
            regions: HashMap::new(),
            fields: HashMap::new(),
        };

        for region in Region::ALL {
            let mut node = Node::new(region.tag());
            node.id = Some(region.dom_id().to_string());
            node.hidden = true;
            let id = doc.nodes.insert(node);
            doc.regions.insert(region, id);
        }

        for field in FormField::ALL {
            let mut node = Node::new("input");
            node.id = Some(field.dom_id().to_string());
            let id = doc.nodes.insert(node);
            doc.attach(doc.regions[&Region::SubmitForm], id);
            doc.fields.insert(field, id);
        }

        doc
    }

    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn region(&self, region: Region) -> NodeId {
        self.regions[&region]
    }

    /// The top-level entries of a region, in display order.
    pub fn entries(&self, region: Region) -> &[NodeId] {
        self.nodes
            .get(self.region(region))
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Remove every entry from a region.
    pub fn empty(&mut self, region: Region) {
        let container = self.region(region);
        let children = self
            .nodes
            .get_mut(container)
            .map(|n| std::mem::take(&mut n.children))
            .unwrap_or_default();
        for child in children {
            self.drop_subtree(child);
        }
    }

    pub fn append(&mut self, region: Region, element: Element) -> NodeId {
        let node = self.build(element);
        self.attach(self.region(region), node);
        node
    }

    pub fn show(&mut self, region: Region) {
        let container = self.region(region);
        if let Some(node) = self.nodes.get_mut(container) {
            node.hidden = false;
        }
    }

    pub fn hide(&mut self, region: Region) {
        let container = self.region(region);
        if let Some(node) = self.nodes.get_mut(container) {
            node.hidden = true;
        }
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.nodes
            .get(self.region(region))
            .map(|n| !n.hidden)
            .unwrap_or(false)
    }

    pub fn value(&self, field: FormField) -> &str {
        self.nodes
            .get(self.fields[&field])
            .map(|n| n.value.as_str())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, field: FormField, value: &str) {
        if let Some(node) = self.nodes.get_mut(self.fields[&field]) {
            node.value = value.to_string();
        }
    }

    pub fn reset_form(&mut self) {
        for field in FormField::ALL {
            self.set_value(field, "");
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.get(node).is_some_and(|n| n.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            if !n.has_class(class) {
                n.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Nearest node, starting at `node` itself, that satisfies `matches`.
    pub fn closest(&self, node: NodeId, matches: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.nodes.get(id)?;
            if matches(n) {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    /// First descendant (depth-first) carrying `class`.
    pub fn find_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let n = self.nodes.get(node)?;
        for child in &n.children {
            if self.has_class(*child, class) {
                return Some(*child);
            }
            if let Some(found) = self.find_class(*child, class) {
                return Some(found);
            }
        }
        None
    }

    /// The region whose container holds `node`.
    pub fn region_of(&self, node: NodeId) -> Option<Region> {
        let container = self.closest(node, |n| n.parent.is_none())?;
        self.regions
            .iter()
            .find(|(_, id)| **id == container)
            .map(|(region, _)| *region)
    }

    /// All list items in any region rendered for `story_id`.
    pub fn items_for(&self, story_id: &str) -> Vec<NodeId> {
        Region::LISTS
            .iter()
            .flat_map(|region| self.entries(*region).iter().copied())
            .filter(|id| {
                self.nodes
                    .get(*id)
                    .is_some_and(|n| n.tag == "li" && n.id.as_deref() == Some(story_id))
            })
            .collect()
    }

    fn build(&mut self, element: Element) -> NodeId {
        let mut node = Node::new(element.tag);
        node.id = element.id;
        node.classes = element.classes;
        node.text = element.text;
        node.href = element.href;
        let id = self.nodes.insert(node);
        for child in element.children {
            let child_id = self.build(child);
            self.attach(id, child_id);
        }
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    fn drop_subtree(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(node) {
            for child in removed.children {
                self.drop_subtree(child);
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> Element {
        Element::new("li")
            .id(id)
            .child(Element::new("span").class("star").child(Element::new("i").class("far fa-star")))
            .child(Element::new("a").class("story-link").text(id))
    }

    #[test]
    fn test_new_document_has_hidden_regions_and_empty_form() {
        let doc = Document::new();
        for region in Region::ALL {
            assert!(!doc.is_visible(region));
        }
        assert_eq!(doc.value(FormField::Title), "");
        assert_eq!(doc.entries(Region::SubmitForm).len(), 3);
    }

    #[test]
    fn test_append_keeps_order() {
        let mut doc = Document::new();
        let a = doc.append(Region::AllStories, item("a"));
        let b = doc.append(Region::AllStories, item("b"));
        assert_eq!(doc.entries(Region::AllStories), &[a, b]);
    }

    #[test]
    fn test_closest_walks_to_list_item() {
        let mut doc = Document::new();
        let li = doc.append(Region::AllStories, item("a"));
        let glyph = doc.find_class(li, "fa-star").unwrap();

        assert_eq!(doc.closest(glyph, |n| n.tag == "li"), Some(li));
        let star = doc.find_class(li, "star").unwrap();
        assert_eq!(doc.closest(glyph, |n| n.has_class("star")), Some(star));
        assert_eq!(doc.region_of(glyph), Some(Region::AllStories));
    }

    #[test]
    fn test_empty_invalidates_old_ids() {
        let mut doc = Document::new();
        let li = doc.append(Region::Favorites, item("a"));
        let glyph = doc.find_class(li, "fa-star").unwrap();

        doc.empty(Region::Favorites);
        doc.append(Region::Favorites, item("b"));

        assert!(doc.get(li).is_none());
        assert!(doc.get(glyph).is_none());
        assert_eq!(doc.region_of(glyph), None);
        assert_eq!(doc.entries(Region::Favorites).len(), 1);
    }

    #[test]
    fn test_class_edits_are_idempotent() {
        let mut doc = Document::new();
        let li = doc.append(Region::AllStories, item("a"));
        let glyph = doc.find_class(li, "fa-star").unwrap();

        doc.add_class(glyph, "fas");
        doc.add_class(glyph, "fas");
        doc.remove_class(glyph, "far");
        let classes = &doc.get(glyph).unwrap().classes;
        assert_eq!(classes, &["fa-star", "fas"]);
    }

    #[test]
    fn test_items_for_spans_regions() {
        let mut doc = Document::new();
        doc.append(Region::AllStories, item("a"));
        doc.append(Region::Favorites, item("a"));
        doc.append(Region::OwnStories, item("b"));
        assert_eq!(doc.items_for("a").len(), 2);
    }

    #[test]
    fn test_form_values_reset() {
        let mut doc = Document::new();
        doc.set_value(FormField::Author, "J");
        assert_eq!(doc.value(FormField::Author), "J");
        doc.reset_form();
        assert_eq!(doc.value(FormField::Author), "");
    }
}
