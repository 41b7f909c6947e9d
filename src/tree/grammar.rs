//! Grammar schemas: the node-type and field-name vocabulary of a language.
//!
//! A [`Grammar`] is what queries and indentation rules are validated against.
//! It is immutable once built and shared between every tree it parses.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::node::{Node, RawKind};

/// Metadata for one node-type of a grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindInfo {
    /// Name used in queries. For anonymous tokens this is the token text.
    pub name: SmolStr,
    /// Named kinds are matched by `(name)`, anonymous ones by `"text"`.
    pub named: bool,
    /// Trivia never appears as a child in node views.
    pub trivia: bool,
}

/// How a field picks its children out of a parent's non-trivia children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSelector {
    /// The nth non-trivia child.
    Nth(usize),
    /// Every named child at or after the nth non-trivia child.
    NamedFrom(usize),
    /// The first named child after the first child of the given kind.
    After(RawKind),
    /// The last named child before the first child of the given kind.
    Before(RawKind),
    /// Every named child before the first child of the given kind.
    AllBefore(RawKind),
    /// Every child of the given kind.
    Kind(RawKind),
}

/// The node-type / field-name schema of a language.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: SmolStr,
    kinds: Vec<KindInfo>,
    named: FxHashMap<SmolStr, RawKind>,
    literals: FxHashMap<SmolStr, RawKind>,
    fields: FxHashMap<RawKind, IndexMap<SmolStr, FieldSelector>>,
    field_names: FxHashSet<SmolStr>,
}

impl Grammar {
    /// Start building a grammar schema.
    pub fn builder(name: impl Into<SmolStr>) -> GrammarBuilder {
        GrammarBuilder {
            grammar: Grammar {
                name: name.into(),
                kinds: Vec::new(),
                named: FxHashMap::default(),
                literals: FxHashMap::default(),
                fields: FxHashMap::default(),
                field_names: FxHashSet::default(),
            },
        }
    }

    /// The grammar's language name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a named node-type, e.g. `identifier`.
    pub fn named_kind(&self, name: &str) -> Option<RawKind> {
        self.named.get(name).copied()
    }

    /// Look up an anonymous token by its text, e.g. `constraint`.
    pub fn literal_kind(&self, text: &str) -> Option<RawKind> {
        self.literals.get(text).copied()
    }

    /// Look up a kind by name, trying named kinds before literal tokens.
    pub fn kind(&self, name: &str) -> Option<RawKind> {
        self.named_kind(name).or_else(|| self.literal_kind(name))
    }

    /// Metadata for a kind, if it belongs to this grammar.
    pub fn info(&self, kind: RawKind) -> Option<&KindInfo> {
        self.kinds.get(kind.0 as usize)
    }

    /// Query name of a kind; `"?"` for kinds outside the schema.
    pub fn kind_name(&self, kind: RawKind) -> &str {
        self.info(kind).map_or("?", |info| info.name.as_str())
    }

    pub fn is_named(&self, kind: RawKind) -> bool {
        self.info(kind).is_some_and(|info| info.named)
    }

    pub fn is_trivia(&self, kind: RawKind) -> bool {
        self.info(kind).is_some_and(|info| info.trivia)
    }

    /// Whether any node-type declares a field with this name.
    pub fn has_field(&self, field: &str) -> bool {
        self.field_names.contains(field)
    }

    /// The selector of `field` on nodes of kind `parent`.
    pub fn field_selector(&self, parent: RawKind, field: &str) -> Option<FieldSelector> {
        self.fields.get(&parent)?.get(field).copied()
    }

    /// Fields declared for a node-type, in declaration order.
    pub fn fields_of(&self, parent: RawKind) -> impl Iterator<Item = (&str, FieldSelector)> {
        self.fields
            .get(&parent)
            .into_iter()
            .flat_map(|fields| fields.iter().map(|(name, sel)| (name.as_str(), *sel)))
    }

    /// Children of `node` stored under `field`. Empty when the field is absent.
    pub fn field_children<'g>(&self, node: &Node<'g>, field: &str) -> Vec<Node<'g>> {
        match self.field_selector(node.kind(), field) {
            Some(selector) => select(selector, node.children()),
            None => Vec::new(),
        }
    }

    /// The field of its parent that `node` occupies, if any.
    pub fn field_of(&self, node: &Node<'_>) -> Option<&str> {
        let parent = node.parent()?;
        let children = parent.children();
        self.fields_of(parent.kind())
            .find(|(_, selector)| select(*selector, children.clone()).contains(node))
            .map(|(name, _)| name)
    }
}

fn select<'g>(selector: FieldSelector, children: Vec<Node<'g>>) -> Vec<Node<'g>> {
    match selector {
        FieldSelector::Nth(n) => children.into_iter().nth(n).into_iter().collect(),
        FieldSelector::NamedFrom(n) => children
            .into_iter()
            .skip(n)
            .filter(|child| child.is_named())
            .collect(),
        FieldSelector::After(kind) => children
            .into_iter()
            .skip_while(|child| child.kind() != kind)
            .skip(1)
            .find(|child| child.is_named())
            .into_iter()
            .collect(),
        FieldSelector::Before(kind) => children
            .into_iter()
            .take_while(|child| child.kind() != kind)
            .filter(|child| child.is_named())
            .last()
            .into_iter()
            .collect(),
        FieldSelector::AllBefore(kind) => children
            .into_iter()
            .take_while(|child| child.kind() != kind)
            .filter(|child| child.is_named())
            .collect(),
        FieldSelector::Kind(kind) => children
            .into_iter()
            .filter(|child| child.kind() == kind)
            .collect(),
    }
}

/// Incremental construction of a [`Grammar`].
#[derive(Debug)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    fn insert(&mut self, kind: RawKind, info: KindInfo) {
        let index = kind.0 as usize;
        if self.grammar.kinds.len() <= index {
            self.grammar.kinds.resize(
                index + 1,
                KindInfo {
                    name: SmolStr::new_static("?"),
                    named: false,
                    trivia: false,
                },
            );
        }
        self.grammar.kinds[index] = info;
    }

    /// Declare a named node-type.
    pub fn named(mut self, kind: RawKind, name: &'static str) -> Self {
        let name = SmolStr::new_static(name);
        self.grammar.named.insert(name.clone(), kind);
        self.insert(kind, KindInfo { name, named: true, trivia: false });
        self
    }

    /// Declare an anonymous token matched by its literal text.
    pub fn literal(mut self, kind: RawKind, text: &'static str) -> Self {
        let name = SmolStr::new_static(text);
        self.grammar.literals.insert(name.clone(), kind);
        self.insert(kind, KindInfo { name, named: false, trivia: false });
        self
    }

    /// Declare a trivia kind (whitespace, newlines).
    pub fn trivia(mut self, kind: RawKind, name: &'static str) -> Self {
        let name = SmolStr::new_static(name);
        self.insert(kind, KindInfo { name, named: false, trivia: true });
        self
    }

    /// Declare a field on a node-type.
    pub fn field(mut self, parent: RawKind, name: &'static str, selector: FieldSelector) -> Self {
        let name = SmolStr::new_static(name);
        self.grammar.field_names.insert(name.clone());
        self.grammar
            .fields
            .entry(parent)
            .or_default()
            .insert(name, selector);
        self
    }

    pub fn build(self) -> Grammar {
        self.grammar
    }
}
