//! Compiled patterns and structural matching.

use regex::Regex;
use smol_str::SmolStr;

use crate::tree::{Node, RawKind};

/// Index of a capture name within its pattern.
pub type CaptureId = usize;

/// What a pattern node accepts before its children are considered.
#[derive(Clone, Debug)]
pub enum NodeTest {
    /// `(kind ...)` or `"text"`
    Kind(RawKind),
    /// `(_ ...)`: any named node
    AnyNamed,
    /// `_`: any node or token
    Any,
    /// `[a b c]`: the first branch that matches
    Alternation(Vec<PatternNode>),
}

/// One node of a pattern tree.
#[derive(Clone, Debug)]
pub struct PatternNode {
    pub test: NodeTest,
    pub children: Vec<ChildStep>,
    /// Set by a trailing `.`: no named sibling may follow the last child.
    pub anchor_end: bool,
    pub captures: Vec<CaptureId>,
}

impl PatternNode {
    pub fn new(test: NodeTest) -> Self {
        Self {
            test,
            children: Vec::new(),
            anchor_end: false,
            captures: Vec::new(),
        }
    }

    /// Count of kind, field and literal constraints.
    pub fn specificity(&self) -> u32 {
        let own = match &self.test {
            NodeTest::Kind(_) => 1,
            NodeTest::AnyNamed | NodeTest::Any => 0,
            NodeTest::Alternation(branches) => branches
                .iter()
                .map(PatternNode::specificity)
                .min()
                .unwrap_or(0),
        };
        own + self
            .children
            .iter()
            .map(|step| u32::from(step.field.is_some()) + step.pattern.specificity())
            .sum::<u32>()
    }
}

/// A child pattern, optionally constrained to a field and anchored.
#[derive(Clone, Debug)]
pub struct ChildStep {
    pub field: Option<SmolStr>,
    /// Set by a preceding `.`: no named sibling may sit between this child
    /// and the previous one (or the parent's start).
    pub anchored: bool,
    pub pattern: PatternNode,
}

/// A filter over captured nodes, checked after a structural match.
#[derive(Clone, Debug)]
pub enum Predicate {
    EqText {
        capture: CaptureId,
        text: String,
        negated: bool,
    },
    EqCapture {
        left: CaptureId,
        right: CaptureId,
        negated: bool,
    },
    Match {
        capture: CaptureId,
        regex: Regex,
        negated: bool,
    },
    AnyOf {
        capture: CaptureId,
        values: Vec<String>,
    },
}

impl Predicate {
    /// Whether the bindings satisfy the predicate.
    ///
    /// A predicate over a capture that did not bind (an untaken alternation
    /// branch) holds vacuously.
    pub fn holds(&self, bindings: &[(CaptureId, Node<'_>)]) -> bool {
        let text = |id: CaptureId| {
            bindings
                .iter()
                .find(|(capture, _)| *capture == id)
                .map(|(_, node)| node.text())
        };
        match self {
            Predicate::EqText {
                capture,
                text: expected,
                negated,
            } => text(*capture).is_none_or(|t| (t == *expected) != *negated),
            Predicate::EqCapture {
                left,
                right,
                negated,
            } => match (text(*left), text(*right)) {
                (Some(l), Some(r)) => (l == r) != *negated,
                _ => true,
            },
            Predicate::Match {
                capture,
                regex,
                negated,
            } => text(*capture).is_none_or(|t| regex.is_match(&t) != *negated),
            Predicate::AnyOf { capture, values } => {
                text(*capture).is_none_or(|t| values.iter().any(|v| *v == t))
            }
        }
    }
}

/// A compiled pattern with the rule-table metadata of its group.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Position in the compiled set, in rule-table order.
    pub index: usize,
    /// Index of the rule group that declared it.
    pub rule: usize,
    pub feature: SmolStr,
    pub overrides: bool,
    /// Byte offset of the pattern in its rule's query source.
    pub offset: usize,
    pub root: PatternNode,
    pub predicates: Vec<Predicate>,
    pub capture_names: Vec<SmolStr>,
    pub specificity: u32,
}

impl Pattern {
    /// Match the pattern rooted at `node`, returning the bindings in
    /// capture order.
    pub fn matches<'g>(&self, node: &Node<'g>) -> Option<Vec<(CaptureId, Node<'g>)>> {
        let mut bindings = Vec::new();
        if !match_node(&self.root, node, &mut bindings) {
            return None;
        }
        self.predicates
            .iter()
            .all(|p| p.holds(&bindings))
            .then_some(bindings)
    }
}

fn match_node<'g>(
    pattern: &PatternNode,
    node: &Node<'g>,
    out: &mut Vec<(CaptureId, Node<'g>)>,
) -> bool {
    let mark = out.len();
    out.extend(pattern.captures.iter().map(|&id| (id, node.clone())));

    let matched = match &pattern.test {
        NodeTest::Alternation(branches) => branches.iter().any(|branch| {
            let branch_mark = out.len();
            let ok = match_node(branch, node, out);
            if !ok {
                out.truncate(branch_mark);
            }
            ok
        }),
        NodeTest::Kind(kind) => node.kind() == *kind && match_children(pattern, node, out),
        NodeTest::AnyNamed => node.is_named() && match_children(pattern, node, out),
        NodeTest::Any => match_children(pattern, node, out),
    };

    if !matched {
        out.truncate(mark);
    }
    matched
}

fn match_children<'g>(
    pattern: &PatternNode,
    parent: &Node<'g>,
    out: &mut Vec<(CaptureId, Node<'g>)>,
) -> bool {
    if pattern.children.is_empty() && !pattern.anchor_end {
        return true;
    }
    let kids = parent.children();
    let fields: Vec<Option<Vec<Node<'g>>>> = pattern
        .children
        .iter()
        .map(|step| step.field.as_deref().map(|f| parent.field(f)))
        .collect();
    let cx = Siblings {
        kids: &kids,
        fields: &fields,
        anchor_end: pattern.anchor_end,
    };
    cx.match_from(&pattern.children, 0, 0, out)
}

struct Siblings<'a, 'g> {
    kids: &'a [Node<'g>],
    fields: &'a [Option<Vec<Node<'g>>>],
    anchor_end: bool,
}

impl<'g> Siblings<'_, 'g> {
    fn named_between(&self, from: usize, to: usize) -> bool {
        self.kids[from..to].iter().any(Node::is_named)
    }

    /// Match `steps[step..]` against `kids[from..]`, backtracking over
    /// candidate positions.
    fn match_from(
        &self,
        steps: &[ChildStep],
        step: usize,
        from: usize,
        out: &mut Vec<(CaptureId, Node<'g>)>,
    ) -> bool {
        let Some(current) = steps.get(step) else {
            return !self.anchor_end || !self.named_between(from, self.kids.len());
        };

        for index in from..self.kids.len() {
            if current.anchored && self.named_between(from, index) {
                break;
            }
            let kid = &self.kids[index];
            if let Some(Some(members)) = self.fields.get(step) {
                if !members.contains(kid) {
                    continue;
                }
            }
            let mark = out.len();
            if match_node(&current.pattern, kid, out)
                && self.match_from(steps, step + 1, index + 1, out)
            {
                return true;
            }
            out.truncate(mark);
        }
        false
    }
}
