//! Minimal markup query capability used by the extraction pipeline.
//!
//! The pipeline never talks to a concrete tree library directly. Everything
//! it needs from a parsed page is expressed by [`MarkupNode`]: element
//! children, element descendants, attributes and text. The provided methods
//! build the lookups the pipeline uses ("find by id", "find all by class",
//! "select by path") on top of those primitives.

use scraper::ElementRef;

/// Read-only view of one element in a parsed markup tree.
pub trait MarkupNode: Copy + PartialEq {
    /// Tag name without namespace prefix.
    fn tag(&self) -> &str;

    /// Attribute value, if present.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Direct element children in document order.
    fn element_children(&self) -> Vec<Self>;

    /// All element descendants in document order, excluding `self`.
    fn element_descendants(&self) -> Vec<Self>;

    /// The first text node found below this element, untrimmed.
    fn first_text(&self) -> Option<&str>;

    /// Concatenation of every text node below this element.
    fn text_content(&self) -> String;

    /// Check whether the `class` attribute contains `class` as a whole token.
    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Check tag name and class token at once.
    fn is(&self, tag: &str, class: &str) -> bool {
        self.tag() == tag && self.has_class(class)
    }

    /// Find the descendant element whose `id` attribute equals `id`.
    fn find_by_id(&self, id: &str) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|n| n.attr("id") == Some(id))
    }

    /// Find the first descendant with the given tag and class token.
    fn find_descendant(&self, tag: &str, class: &str) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|n| n.is(tag, class))
    }

    /// Find the first descendant with the given tag.
    fn find_tag(&self, tag: &str) -> Option<Self> {
        self.element_descendants()
            .into_iter()
            .find(|n| n.tag() == tag)
    }

    /// All descendants with the given tag and class token.
    fn descendants_by_class(&self, tag: &str, class: &str) -> Vec<Self> {
        self.element_descendants()
            .into_iter()
            .filter(|n| n.is(tag, class))
            .collect()
    }

    /// All descendants with the given tag.
    fn descendants_by_tag(&self, tag: &str) -> Vec<Self> {
        self.element_descendants()
            .into_iter()
            .filter(|n| n.tag() == tag)
            .collect()
    }

    /// Direct children with the given tag.
    fn children_by_tag(&self, tag: &str) -> Vec<Self> {
        self.element_children()
            .into_iter()
            .filter(|n| n.tag() == tag)
            .collect()
    }

    /// Select descendants by a whitespace-separated path of simple selectors.
    ///
    /// Each step is `tag`, `tag.class`, `tag#id`, `.class` or `#id`, and
    /// steps are joined by the descendant combinator, so
    /// `"div#active_ind div.tense"` finds every `div.tense` below the
    /// element with id `active_ind`.
    fn select_path(&self, path: &str) -> Vec<Self> {
        let mut current = vec![*self];

        for step in path.split_whitespace() {
            let selector = SimpleSelector::parse(step);
            let mut next: Vec<Self> = Vec::new();
            for node in &current {
                for candidate in node.element_descendants() {
                    if selector.matches(&candidate) && !next.contains(&candidate) {
                        next.push(candidate);
                    }
                }
            }
            current = next;
        }

        current
    }
}

/// One step of a [`MarkupNode::select_path`] path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimpleSelector<'s> {
    tag: Option<&'s str>,
    class: Option<&'s str>,
    id: Option<&'s str>,
}

impl<'s> SimpleSelector<'s> {
    fn parse(step: &'s str) -> Self {
        let (head, id) = match step.split_once('#') {
            Some((head, id)) => (head, Some(id)),
            None => (step, None),
        };
        let (tag, class) = match head.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (head, None),
        };

        Self {
            tag: Some(tag).filter(|t| !t.is_empty()),
            class,
            id,
        }
    }

    fn matches<N: MarkupNode>(&self, node: &N) -> bool {
        self.tag.is_none_or(|t| node.tag() == t)
            && self.class.is_none_or(|c| node.has_class(c))
            && self.id.is_none_or(|i| node.attr("id") == Some(i))
    }
}

impl MarkupNode for ElementRef<'_> {
    fn tag(&self) -> &str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn element_descendants(&self) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .collect()
    }

    fn first_text(&self) -> Option<&str> {
        self.text().next()
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}
