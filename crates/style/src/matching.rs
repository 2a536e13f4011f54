//! Selector matching: decide whether an element matches a CSS selector.
//!
//! Complex selectors are matched **right-to-left**: the subject compound is
//! tested against the element first, then the matcher walks up or sideways
//! through the tree following each combinator. Descendant and subsequent-sibling
//! walks backtrack, so `a > b c` finds a `b` under an `a` even when a nearer
//! `b` ancestor is not a child of an `a`.
//!
//! The tree is reached only through [`SelectorElement`], so any DOM can be
//! matched against.

use std::collections::HashMap;

use css::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, CssToken, NamespaceConstraint,
    SelectorList, SimpleSelector,
};
use dom::ElementRef;
use log::trace;

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator trait and context
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    CaseSensitive,
    AsciiCaseInsensitive,
}

impl CaseSensitivity {
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::CaseSensitive => a == b,
            CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Document compatibility mode. Quirks mode matches ids and classes
/// ASCII case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

impl QuirksMode {
    pub fn classes_and_ids_case_sensitivity(self) -> CaseSensitivity {
        match self {
            QuirksMode::Quirks => CaseSensitivity::AsciiCaseInsensitive,
            QuirksMode::NoQuirks | QuirksMode::LimitedQuirks => CaseSensitivity::CaseSensitive,
        }
    }
}

/// What the matcher needs from an element and its tree.
pub trait SelectorElement: Sized {
    fn parent_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;

    fn local_name(&self) -> &str;
    /// Namespace URL, `None` for no namespace.
    fn namespace_url(&self) -> Option<&str>;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, name: &str, case: CaseSensitivity) -> bool;

    /// Attribute `name` in `namespace` (`None` = the null namespace).
    fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str>;

    /// `true` if any attribute called `name`, in any namespace, passes `test`.
    fn any_attribute(&self, name: &str, test: &mut dyn FnMut(&str) -> bool) -> bool {
        self.attribute(None, name).is_some_and(test)
    }

    /// No element children and no text.
    fn is_empty(&self) -> bool;

    fn is_root(&self) -> bool {
        self.parent_element().is_none()
    }

    fn is_same_element(&self, other: &Self) -> bool;

    /// Hook for pseudo-classes the matcher does not know (`:hover`,
    /// `:checked`, ...). Unknown pseudo-classes never match by default.
    fn match_pseudo_class(&self, name: &str, arguments: Option<&[CssToken]>) -> bool {
        let _ = (name, arguments);
        false
    }
}

/// Matching configuration.
pub struct MatchingContext<E> {
    /// Element `:scope` refers to. Without one, `:scope` means `:root`.
    pub scope: Option<E>,
    /// Prefix to namespace URL table for `ns|name` selectors.
    pub namespaces: HashMap<String, String>,
    /// Namespace unprefixed type selectors are restricted to.
    pub default_namespace: Option<String>,
    pub quirks_mode: QuirksMode,
}

impl<E> Default for MatchingContext<E> {
    fn default() -> Self {
        Self {
            scope: None,
            namespaces: HashMap::new(),
            default_namespace: None,
            quirks_mode: QuirksMode::NoQuirks,
        }
    }
}

impl<E> MatchingContext<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: E) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_namespace(mut self, prefix: &str, url: &str) -> Self {
        self.namespaces.insert(prefix.to_string(), url.to_string());
        self
    }

    pub fn with_default_namespace(mut self, url: &str) -> Self {
        self.default_namespace = Some(url.to_string());
        self
    }

    pub fn with_quirks_mode(mut self, quirks_mode: QuirksMode) -> Self {
        self.quirks_mode = quirks_mode;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Test whether `element` matches a complex selector.
pub fn matches<E: SelectorElement>(
    selector: &ComplexSelector,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    match_step(selector, selector.len() - 1, element, context)
}

/// Test whether `element` matches any member of a selector list.
pub fn matches_list<E: SelectorElement>(
    list: &SelectorList,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    list.iter().any(|selector| matches(&selector, element, context))
}

/// Test whether `element` matches every simple selector of a compound.
pub fn matches_compound<E: SelectorElement>(
    compound: CompoundSelector<'_>,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    compound
        .simples()
        .all(|simple| matches_simple(simple, element, context))
}

pub fn matches_simple<E: SelectorElement>(
    simple: &SimpleSelector,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    match simple {
        SimpleSelector::Universal { namespace } => {
            matches_element_namespace(namespace, element, context)
        }
        SimpleSelector::Type {
            namespace,
            local_name,
        } => {
            element.local_name().eq_ignore_ascii_case(local_name)
                && matches_element_namespace(namespace, element, context)
        }
        SimpleSelector::Id(id) => element.id().is_some_and(|own| {
            context.quirks_mode.classes_and_ids_case_sensitivity().eq(own, id)
        }),
        SimpleSelector::Class(class) => {
            element.has_class(class, context.quirks_mode.classes_and_ids_case_sensitivity())
        }
        SimpleSelector::Attribute {
            namespace,
            name,
            operator,
            value,
        } => matches_attribute(namespace, name, *operator, value, element, context),
        SimpleSelector::PseudoClass { name, arguments } => {
            matches_pseudo_class(name, arguments.as_deref(), element, context)
        }
        // A pseudo-element selects part of its originating element; it does
        // not restrict which element that is.
        SimpleSelector::PseudoElement { .. } => true,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Combinator walk
// ─────────────────────────────────────────────────────────────────────────────

/// Match step `index` (and everything left of it) against `element`.
fn match_step<E: SelectorElement>(
    selector: &ComplexSelector,
    index: usize,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    let Some(step) = selector.step(index) else {
        return false;
    };
    if !matches_compound(step.compound, element, context) {
        return false;
    }
    if index == 0 {
        return true;
    }
    let Some(left) = selector.step(index - 1) else {
        return false;
    };

    match left.combinator {
        Combinator::Child => element
            .parent_element()
            .is_some_and(|parent| match_step(selector, index - 1, &parent, context)),
        Combinator::NextSibling => element
            .prev_sibling_element()
            .is_some_and(|sibling| match_step(selector, index - 1, &sibling, context)),
        Combinator::Descendant => {
            let mut cursor = element.parent_element();
            while let Some(ancestor) = cursor {
                trace!("descendant walk at step {}", index - 1);
                if match_step(selector, index - 1, &ancestor, context) {
                    return true;
                }
                cursor = ancestor.parent_element();
            }
            false
        }
        Combinator::SubsequentSibling => {
            let mut cursor = element.prev_sibling_element();
            while let Some(sibling) = cursor {
                trace!("sibling walk at step {}", index - 1);
                if match_step(selector, index - 1, &sibling, context) {
                    return true;
                }
                cursor = sibling.prev_sibling_element();
            }
            false
        }
        Combinator::Column => {
            trace!("column combinator in {selector} never matches");
            false
        }
        Combinator::None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simple selector helpers
// ─────────────────────────────────────────────────────────────────────────────

fn matches_element_namespace<E: SelectorElement>(
    constraint: &NamespaceConstraint,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    match constraint {
        NamespaceConstraint::Any => true,
        NamespaceConstraint::None => element.namespace_url().is_none(),
        NamespaceConstraint::Default => match &context.default_namespace {
            Some(url) => element.namespace_url() == Some(url.as_str()),
            None => true,
        },
        NamespaceConstraint::Prefix(prefix) => match context.namespaces.get(prefix) {
            Some(url) => element.namespace_url() == Some(url.as_str()),
            None => {
                trace!("undeclared namespace prefix {prefix:?}");
                false
            }
        },
    }
}

fn matches_attribute<E: SelectorElement>(
    namespace: &NamespaceConstraint,
    name: &str,
    operator: AttrOperator,
    expected: &str,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    let mut test = |actual: &str| attribute_value_matches(operator, actual, expected);
    match namespace {
        NamespaceConstraint::Any => element.any_attribute(name, &mut test),
        NamespaceConstraint::Default | NamespaceConstraint::None => {
            element.attribute(None, name).is_some_and(test)
        }
        NamespaceConstraint::Prefix(prefix) => match context.namespaces.get(prefix) {
            Some(url) => element.attribute(Some(url), name).is_some_and(test),
            None => false,
        },
    }
}

fn attribute_value_matches(operator: AttrOperator, actual: &str, expected: &str) -> bool {
    match operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        AttrOperator::Includes => {
            !expected.is_empty()
                && !expected.contains(|c: char| c.is_ascii_whitespace())
                && actual.split_ascii_whitespace().any(|word| word == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

fn matches_pseudo_class<E: SelectorElement>(
    name: &str,
    arguments: Option<&[CssToken]>,
    element: &E,
    context: &MatchingContext<E>,
) -> bool {
    match (name, arguments) {
        ("root", None) => element.is_root(),
        ("scope", None) => match &context.scope {
            Some(scope) => element.is_same_element(scope),
            None => element.is_root(),
        },
        ("first-child", None) => element.prev_sibling_element().is_none(),
        ("last-child", None) => element.next_sibling_element().is_none(),
        ("only-child", None) => {
            element.prev_sibling_element().is_none() && element.next_sibling_element().is_none()
        }
        ("first-of-type", None) => !has_sibling_of_type(element, E::prev_sibling_element),
        ("last-of-type", None) => !has_sibling_of_type(element, E::next_sibling_element),
        ("empty", None) => element.is_empty(),
        ("nth-child", Some(args)) => {
            let position = count_siblings(element, E::prev_sibling_element) + 1;
            parse_nth(args).is_some_and(|(a, b)| nth_matches(a, b, position))
        }
        ("nth-last-child", Some(args)) => {
            let position = count_siblings(element, E::next_sibling_element) + 1;
            parse_nth(args).is_some_and(|(a, b)| nth_matches(a, b, position))
        }
        _ => element.match_pseudo_class(name, arguments),
    }
}

fn count_siblings<E: SelectorElement>(element: &E, step: fn(&E) -> Option<E>) -> i64 {
    let mut count = 0;
    let mut cursor = step(element);
    while let Some(sibling) = cursor {
        count += 1;
        cursor = step(&sibling);
    }
    count
}

fn has_sibling_of_type<E: SelectorElement>(element: &E, step: fn(&E) -> Option<E>) -> bool {
    let mut cursor = step(element);
    while let Some(sibling) = cursor {
        if sibling.local_name() == element.local_name()
            && sibling.namespace_url() == element.namespace_url()
        {
            return true;
        }
        cursor = step(&sibling);
    }
    false
}

/// Check if An+B matches the given 1-based index.
fn nth_matches(a: i64, b: i64, n: i64) -> bool {
    if a == 0 {
        return n == b;
    }
    let Some(diff) = n.checked_sub(b) else {
        return false;
    };
    diff.checked_rem(a) == Some(0) && diff.checked_div(a).is_some_and(|k| k >= 0)
}

/// An+B coefficients outside the 32-bit range never match anything.
fn nth_coefficient(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX)).then_some(value as i64)
}

/// Parse the `An+B` micro-syntax from pseudo-class arguments.
fn parse_nth(args: &[CssToken]) -> Option<(i64, i64)> {
    let tokens: Vec<&CssToken> = args.iter().filter(|t| !t.is_whitespace()).collect();

    let (a, unit, rest) = match tokens.as_slice() {
        [CssToken::Ident(word)] if word.eq_ignore_ascii_case("odd") => return Some((2, 1)),
        [CssToken::Ident(word)] if word.eq_ignore_ascii_case("even") => return Some((2, 0)),
        [
            CssToken::Number {
                value,
                is_integer: true,
                ..
            },
        ] => return Some((0, nth_coefficient(*value)?)),
        [CssToken::Dimension { value, unit }, rest @ ..] => {
            (nth_coefficient(*value)?, unit.to_ascii_lowercase(), rest)
        }
        [CssToken::Delim('+'), CssToken::Ident(ident), rest @ ..] if !ident.starts_with('-') => {
            (1, ident.to_ascii_lowercase(), rest)
        }
        [CssToken::Ident(ident), rest @ ..] => match ident.strip_prefix('-') {
            Some(tail) => (-1, tail.to_ascii_lowercase(), rest),
            None => (1, ident.to_ascii_lowercase(), rest),
        },
        _ => return None,
    };

    if unit == "n" {
        return match rest {
            [] => Some((a, 0)),
            [number] => Some((a, integer(number, true)?)),
            [CssToken::Delim('+'), number] => Some((a, integer(number, false)?)),
            [CssToken::Delim('-'), number] => Some((a, -integer(number, false)?)),
            _ => None,
        };
    }
    // `2n-1` tokenizes as a dimension whose unit is `n-1`.
    let tail = unit.strip_prefix("n-")?;
    if tail.is_empty() {
        return match rest {
            [number] => Some((a, -integer(number, false)?)),
            _ => None,
        };
    }
    if !rest.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((a, -nth_coefficient(tail.parse::<f64>().ok()?)?))
}

/// An integer token, with or without an explicit sign as requested.
fn integer(tok: &CssToken, want_signed: bool) -> Option<i64> {
    match tok {
        CssToken::Number {
            value,
            is_integer: true,
            signed,
        } if *signed == want_signed => nth_coefficient(*value),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Element tree binding
// ─────────────────────────────────────────────────────────────────────────────

impl<'a> SelectorElement for ElementRef<'a> {
    fn parent_element(&self) -> Option<Self> {
        self.parent()
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.prev_sibling()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_sibling()
    }

    fn local_name(&self) -> &str {
        &self.data().local_name
    }

    fn namespace_url(&self) -> Option<&str> {
        self.data().namespace.as_deref()
    }

    fn id(&self) -> Option<&str> {
        self.data().id.as_deref()
    }

    fn has_class(&self, name: &str, case: CaseSensitivity) -> bool {
        self.data().classes.iter().any(|class| case.eq(class, name))
    }

    fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.data().attribute(namespace, name)
    }

    fn any_attribute(&self, name: &str, test: &mut dyn FnMut(&str) -> bool) -> bool {
        self.data()
            .attributes_named(name)
            .any(|attr| test(&attr.value))
    }

    fn is_empty(&self) -> bool {
        self.dom().is_empty_element(self.id())
    }

    fn is_root(&self) -> bool {
        ElementRef::is_root(self)
    }

    fn is_same_element(&self, other: &Self) -> bool {
        self == other
    }

    fn match_pseudo_class(&self, name: &str, arguments: Option<&[CssToken]>) -> bool {
        match (name, arguments) {
            // :link matches <a>/<area> with href; nothing is ever visited.
            ("link" | "any-link", None) => {
                matches!(self.data().local_name.as_str(), "a" | "area")
                    && self.data().attribute(None, "href").is_some()
            }
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
