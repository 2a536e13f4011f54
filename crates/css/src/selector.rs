//! Selector AST.
//!
//! Nodes live in a [`SelectorArena`] and refer to each other by typed index.
//! The arena is frozen once parsing finishes and shared behind an `Arc`;
//! [`ComplexSelector`] and [`SelectorList`] are cheap handles into it.

use std::fmt;
use std::sync::Arc;

use arena::{Arena, Idx};
use smallvec::SmallVec;

use crate::specificity::Specificity;
use crate::token::{CssToken, write_css_string};

/// Combinator between compound selectors in a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Trails the subject compound.
    None,
    /// Whitespace or `>>`: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
    /// `+`: prev + next
    NextSibling,
    /// `~`: prev ~ subsequent
    SubsequentSibling,
    /// `||`: column. Parsed, never matches.
    Column,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Combinator::None => "",
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::SubsequentSibling => " ~ ",
            Combinator::Column => " || ",
        })
    }
}

/// Namespace part of a type, universal or attribute selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamespaceConstraint {
    /// No prefix written; the default namespace applies to type selectors,
    /// attributes use the null namespace.
    Default,
    /// `*|`
    Any,
    /// `|`: no namespace.
    None,
    /// `ns|`
    Prefix(String),
}

impl fmt::Display for NamespaceConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceConstraint::Default => Ok(()),
            NamespaceConstraint::Any => f.write_str("*|"),
            NamespaceConstraint::None => f.write_str("|"),
            NamespaceConstraint::Prefix(prefix) => write!(f, "{prefix}|"),
        }
    }
}

/// Attribute selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Equals,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

impl AttrOperator {
    fn as_str(self) -> &'static str {
        match self {
            AttrOperator::Exists => "",
            AttrOperator::Equals => "=",
            AttrOperator::Includes => "~=",
            AttrOperator::DashMatch => "|=",
            AttrOperator::Prefix => "^=",
            AttrOperator::Suffix => "$=",
            AttrOperator::Substring => "*=",
        }
    }
}

/// A single simple selector component.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    /// Type selector, e.g. `div`, `svg|rect`. `local_name` is lowercase.
    Type {
        namespace: NamespaceConstraint,
        local_name: String,
    },
    /// `*`, `ns|*`
    Universal { namespace: NamespaceConstraint },
    /// ID selector `#foo`.
    Id(String),
    /// Class selector `.bar`.
    Class(String),
    /// Attribute selector `[ns|name op value]`. `value` is empty for `Exists`.
    Attribute {
        namespace: NamespaceConstraint,
        name: String,
        operator: AttrOperator,
        value: String,
    },
    /// `:name` or `:name(args)`. The argument tokens are kept as written.
    PseudoClass {
        name: String,
        arguments: Option<Vec<CssToken>>,
    },
    /// `::name` or `::name(args)`.
    PseudoElement {
        name: String,
        arguments: Option<Vec<CssToken>>,
    },
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Type {
                namespace,
                local_name,
            } => write!(f, "{namespace}{local_name}"),
            SimpleSelector::Universal { namespace } => write!(f, "{namespace}*"),
            SimpleSelector::Id(id) => write!(f, "#{id}"),
            SimpleSelector::Class(class) => write!(f, ".{class}"),
            SimpleSelector::Attribute {
                namespace,
                name,
                operator,
                value,
            } => {
                write!(f, "[{namespace}{name}")?;
                if *operator != AttrOperator::Exists {
                    f.write_str(operator.as_str())?;
                    write_css_string(f, value)?;
                }
                f.write_str("]")
            }
            SimpleSelector::PseudoClass { name, arguments } => {
                write!(f, ":{name}")?;
                write_arguments(f, arguments.as_deref())
            }
            SimpleSelector::PseudoElement { name, arguments } => {
                write!(f, "::{name}")?;
                write_arguments(f, arguments.as_deref())
            }
        }
    }
}

fn write_arguments(f: &mut fmt::Formatter<'_>, arguments: Option<&[CssToken]>) -> fmt::Result {
    let Some(arguments) = arguments else {
        return Ok(());
    };
    f.write_str("(")?;
    for tok in arguments {
        write!(f, "{tok}")?;
    }
    f.write_str(")")
}

// ─────────────────────────────────────────────────────────────────────────────
// Arena storage
// ─────────────────────────────────────────────────────────────────────────────

pub type SimpleId = Idx<SimpleSelector>;
pub type CompoundId = Idx<CompoundNode>;
pub type ComplexId = Idx<ComplexNode>;

#[derive(Debug)]
pub struct CompoundNode {
    simples: SmallVec<[SimpleId; 4]>,
}

#[derive(Debug, Clone, Copy)]
struct StepNode {
    compound: CompoundId,
    combinator: Combinator,
}

/// Everything left of the subject is an ancestor step with a real combinator.
#[derive(Debug)]
pub struct ComplexNode {
    ancestors: SmallVec<[StepNode; 3]>,
    subject: CompoundId,
    specificity: Specificity,
}

/// Owner of every node produced by one parse.
#[derive(Debug, Default)]
pub struct SelectorArena {
    simples: Arena<SimpleSelector>,
    compounds: Arena<CompoundNode>,
    complexes: Arena<ComplexNode>,
}

impl SelectorArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc_simple(&mut self, simple: SimpleSelector) -> SimpleId {
        self.simples.alloc(simple)
    }

    pub(crate) fn alloc_compound(&mut self, simples: SmallVec<[SimpleId; 4]>) -> CompoundId {
        self.compounds.alloc(CompoundNode { simples })
    }

    /// `ancestors` run left to right and each carries the combinator that
    /// follows it.
    pub(crate) fn alloc_complex(
        &mut self,
        ancestors: Vec<(CompoundId, Combinator)>,
        subject: CompoundId,
        specificity: Specificity,
    ) -> ComplexId {
        let ancestors = ancestors
            .into_iter()
            .map(|(compound, combinator)| StepNode {
                compound,
                combinator,
            })
            .collect();
        self.complexes.alloc(ComplexNode {
            ancestors,
            subject,
            specificity,
        })
    }

    pub fn simple_count(&self) -> usize {
        self.simples.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handles
// ─────────────────────────────────────────────────────────────────────────────

/// Simple selectors that must all match one element (`div.foo#bar`).
#[derive(Clone, Copy)]
pub struct CompoundSelector<'a> {
    arena: &'a SelectorArena,
    id: CompoundId,
}

impl<'a> CompoundSelector<'a> {
    pub fn simples(self) -> impl ExactSizeIterator<Item = &'a SimpleSelector> + 'a {
        let arena = self.arena;
        arena.compounds[self.id]
            .simples
            .iter()
            .map(move |&id| &arena.simples[id])
    }

    pub fn len(self) -> usize {
        self.arena.compounds[self.id].simples.len()
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for CompoundSelector<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.simples().eq(other.simples())
    }
}

impl fmt::Display for CompoundSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in self.simples() {
            write!(f, "{simple}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompoundSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.simples()).finish()
    }
}

/// One compound of a complex selector and the combinator that follows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<'a> {
    pub compound: CompoundSelector<'a>,
    pub combinator: Combinator,
}

/// Compound selectors linked by combinators, e.g. `ul > li.active`.
///
/// Steps are stored left to right. The last step is the subject and its
/// combinator is [`Combinator::None`].
#[derive(Clone)]
pub struct ComplexSelector {
    arena: Arc<SelectorArena>,
    id: ComplexId,
}

impl ComplexSelector {
    pub(crate) fn new(arena: Arc<SelectorArena>, id: ComplexId) -> Self {
        Self { arena, id }
    }

    fn node(&self) -> &ComplexNode {
        &self.arena.complexes[self.id]
    }

    /// Number of steps, subject included.
    pub fn len(&self) -> usize {
        self.node().ancestors.len() + 1
    }

    /// Always false; a complex selector has at least its subject.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn step(&self, index: usize) -> Option<Step<'_>> {
        let node = self.node();
        match index.cmp(&node.ancestors.len()) {
            std::cmp::Ordering::Less => {
                let step = node.ancestors[index];
                Some(Step {
                    compound: self.compound(step.compound),
                    combinator: step.combinator,
                })
            }
            std::cmp::Ordering::Equal => Some(self.subject_step()),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Left-to-right steps.
    pub fn steps(&self) -> impl DoubleEndedIterator<Item = Step<'_>> + ExactSizeIterator {
        let node = self.node();
        node.ancestors
            .iter()
            .map(|step| Step {
                compound: self.compound(step.compound),
                combinator: step.combinator,
            })
            .chain(std::iter::once(self.subject_step()))
            .collect::<SmallVec<[Step<'_>; 4]>>()
            .into_iter()
    }

    /// The rightmost compound, matched against the candidate element.
    pub fn subject(&self) -> CompoundSelector<'_> {
        self.compound(self.node().subject)
    }

    pub fn specificity(&self) -> Specificity {
        self.node().specificity
    }

    fn subject_step(&self) -> Step<'_> {
        Step {
            compound: self.subject(),
            combinator: Combinator::None,
        }
    }

    fn compound(&self, id: CompoundId) -> CompoundSelector<'_> {
        CompoundSelector {
            arena: &self.arena,
            id,
        }
    }
}

impl PartialEq for ComplexSelector {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.steps().eq(other.steps())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.steps() {
            write!(f, "{}{}", step.compound, step.combinator)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComplexSelector({self})")
    }
}

/// Comma-separated complex selectors; matches if any member matches.
#[derive(Clone)]
pub struct SelectorList {
    arena: Arc<SelectorArena>,
    members: SmallVec<[ComplexId; 1]>,
}

impl SelectorList {
    pub(crate) fn new(arena: Arc<SelectorArena>, members: SmallVec<[ComplexId; 1]>) -> Self {
        Self { arena, members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ComplexSelector> {
        let id = *self.members.get(index)?;
        Some(ComplexSelector::new(Arc::clone(&self.arena), id))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = ComplexSelector> + '_ {
        self.members
            .iter()
            .map(|&id| ComplexSelector::new(Arc::clone(&self.arena), id))
    }

    /// Highest specificity among the members, or zero for an empty list.
    pub fn max_specificity(&self) -> Specificity {
        self.iter()
            .map(|sel| sel.specificity())
            .max()
            .unwrap_or(Specificity::ZERO)
    }
}

impl PartialEq for SelectorList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sel) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{sel}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelectorList({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn handmade() -> ComplexSelector {
        let mut arena = SelectorArena::new();
        let ul = arena.alloc_simple(SimpleSelector::Type {
            namespace: NamespaceConstraint::Default,
            local_name: "ul".into(),
        });
        let li = arena.alloc_simple(SimpleSelector::Type {
            namespace: NamespaceConstraint::Default,
            local_name: "li".into(),
        });
        let active = arena.alloc_simple(SimpleSelector::Class("active".into()));
        let left = arena.alloc_compound(smallvec![ul]);
        let right = arena.alloc_compound(smallvec![li, active]);
        let id = arena.alloc_complex(
            vec![(left, Combinator::Child)],
            right,
            Specificity::new(0, 1, 2),
        );
        ComplexSelector::new(Arc::new(arena), id)
    }

    #[test]
    fn steps_run_left_to_right() {
        let sel = handmade();
        assert_eq!(sel.len(), 2);
        let combinators: Vec<_> = sel.steps().map(|s| s.combinator).collect();
        assert_eq!(combinators, vec![Combinator::Child, Combinator::None]);
        assert_eq!(sel.subject().len(), 2);
        assert!(sel.step(2).is_none());
    }

    #[test]
    fn steps_reverse_for_matching() {
        let sel = handmade();
        let first = sel.steps().next_back().map(|s| s.compound.to_string());
        assert_eq!(first.as_deref(), Some("li.active"));
    }

    #[test]
    fn display_round_trips_through_text() {
        assert_eq!(handmade().to_string(), "ul > li.active");
    }

    #[test]
    fn simple_selector_display() {
        let attr = SimpleSelector::Attribute {
            namespace: NamespaceConstraint::Prefix("xlink".into()),
            name: "href".into(),
            operator: AttrOperator::Prefix,
            value: "http".into(),
        };
        assert_eq!(attr.to_string(), "[xlink|href^=\"http\"]");
        let universal = SimpleSelector::Universal {
            namespace: NamespaceConstraint::None,
        };
        assert_eq!(universal.to_string(), "|*");
        let pseudo = SimpleSelector::PseudoClass {
            name: "nth-child".into(),
            arguments: Some(vec![CssToken::Ident("odd".into())]),
        };
        assert_eq!(pseudo.to_string(), ":nth-child(odd)");
    }

    #[test]
    fn handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ComplexSelector>();
        assert_send_sync::<SelectorList>();
    }

    #[test]
    fn structural_equality_ignores_arena_identity() {
        assert_eq!(handmade(), handmade());
    }
}
