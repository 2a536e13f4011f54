//! Cascade resolution: collect the rules matching an element, sort them and
//! merge the winning declaration of each property into the style store.
//!
//! Order (low → high priority):
//!   1. User-agent normal
//!   2. User normal
//!   3. Author normal
//!   4. Inline normal
//!   5. Author !important
//!   6. Inline !important
//!   7. User !important
//!   8. User-agent !important
//!
//! Within each level higher specificity wins, then later source order.

use std::collections::HashMap;

use css::{ComplexSelector, SelectorList, Specificity};
use dom::{Dom, ElementRef, NodeId};
use log::debug;

use crate::error::Result;
use crate::matching::{MatchingContext, SelectorElement, matches};
use crate::property::{Provenance, StyleOrigin, StyleProperty};
use crate::registry::PropertyId;
use crate::store::StyleStore;
use crate::value::StyleValue;

// ─────────────────────────────────────────────────────────────────────────────
// Rules
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lowercase property name.
    pub property: String,
    pub value: StyleValue,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: StyleValue) -> Self {
        Self {
            property: property.to_ascii_lowercase(),
            value,
            important: false,
        }
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: SelectorList,
    pub declarations: Vec<Declaration>,
    pub origin: StyleOrigin,
    pub source_id: usize,
}

impl StyleRule {
    pub fn new(
        selectors: SelectorList,
        declarations: Vec<Declaration>,
        origin: StyleOrigin,
        source_id: usize,
    ) -> Self {
        Self {
            selectors,
            declarations,
            origin,
            source_id,
        }
    }

    /// Parse `selectors` as a selector list.
    pub fn parse(
        selectors: &str,
        declarations: Vec<Declaration>,
        origin: StyleOrigin,
        source_id: usize,
    ) -> Result<Self> {
        Ok(Self::new(
            css::parse_str(selectors)?,
            declarations,
            origin,
            source_id,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Matching
// ─────────────────────────────────────────────────────────────────────────────

/// A rule that matched an element, with the most specific matching member
/// of its selector list.
#[derive(Debug, Clone)]
pub struct MatchedRule<'r> {
    pub rule: &'r StyleRule,
    pub selector: ComplexSelector,
    pub specificity: Specificity,
    pub source_order: usize,
}

/// Every rule of `rules` that matches `element`, in source order.
pub fn collect_matching_rules<'r, E: SelectorElement>(
    element: &E,
    rules: &'r [StyleRule],
    context: &MatchingContext<E>,
) -> Vec<MatchedRule<'r>> {
    let mut matched = Vec::new();
    for (source_order, rule) in rules.iter().enumerate() {
        let best = rule
            .selectors
            .iter()
            .filter(|selector| matches(selector, element, context))
            .max_by_key(ComplexSelector::specificity);
        if let Some(selector) = best {
            matched.push(MatchedRule {
                rule,
                specificity: selector.specificity(),
                selector,
                source_order,
            });
        }
    }
    matched
}

fn important_origin_rank(origin: StyleOrigin) -> u8 {
    match origin {
        StyleOrigin::Author => 0,
        StyleOrigin::Inline => 1,
        StyleOrigin::User => 2,
        StyleOrigin::UserAgent => 3,
    }
}

/// Cascade rank of a declaration: important above normal, then origin.
fn level(declaration: &Declaration, origin: StyleOrigin) -> (bool, u8) {
    if declaration.important {
        (true, important_origin_rank(origin))
    } else {
        (false, origin as u8)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────────────────────────────────────

/// Merge the winning declaration of every property into `element`'s
/// Assigned values. Declarations for unknown properties or with values the
/// property rejects are skipped. A value an earlier pass took from a rule is
/// reset to Unset when no declaration wins it this time. Returns how many
/// Assigned values changed.
pub fn apply_matched_rules(
    store: &mut StyleStore,
    element: NodeId,
    matched: &[MatchedRule<'_>],
) -> Result<usize> {
    let registry = store.registry().clone();
    let mut winners: HashMap<PropertyId, (&Declaration, &MatchedRule<'_>)> = HashMap::new();

    for entry in matched {
        for declaration in &entry.rule.declarations {
            let Some(id) = registry.id(&declaration.property) else {
                debug!("skipping unknown property `{}`", declaration.property);
                continue;
            };
            let Some(definition) = registry.get(id) else {
                continue;
            };
            if let Err(err) = definition.check(&declaration.value) {
                debug!("skipping declaration: {err}");
                continue;
            }
            let key = (
                level(declaration, entry.rule.origin),
                entry.specificity,
                entry.source_order,
            );
            let wins = match winners.get(&id) {
                Some((held, by)) => {
                    key >= (level(held, by.rule.origin), by.specificity, by.source_order)
                }
                None => true,
            };
            if wins {
                winners.insert(id, (declaration, entry));
            }
        }
    }

    let mut stale: Vec<PropertyId> = store
        .properties(element)
        .filter(|(id, slot)| {
            !winners.contains_key(id)
                && slot.provenance().is_some_and(|p| p.selector.is_some())
        })
        .map(|(id, _)| id)
        .collect();
    stale.sort();

    let mut changed = 0;
    for id in stale {
        let Some(definition) = registry.get(id) else {
            continue;
        };
        debug!("no rule sets {} on {:?} any more", definition.name, element);
        if store.reset(element, &definition.name)? {
            changed += 1;
        }
    }

    let mut ordered: Vec<_> = winners.into_iter().collect();
    ordered.sort_by_key(|(id, _)| *id);

    for (_, (declaration, entry)) in ordered {
        let provenance = Provenance::new(entry.rule.origin, entry.rule.source_id)
            .with_selector(entry.selector.clone());
        let source = StyleProperty::with_value(declaration.value.clone(), Some(provenance));
        if store.overwrite(element, &declaration.property, &source)? {
            changed += 1;
        }
    }
    Ok(changed)
}

/// Match and apply `rules` to every element of the subtree at `root`,
/// registering elements with the store as needed.
pub fn cascade_tree<'d>(
    store: &mut StyleStore,
    dom: &'d Dom,
    root: NodeId,
    rules: &[StyleRule],
    context: &MatchingContext<ElementRef<'d>>,
) -> Result<usize> {
    if !store.contains(root) {
        store.insert_tree(dom, root)?;
    }
    let mut elements = vec![root];
    elements.extend(dom.descendants(root));

    let mut changed = 0;
    for id in elements {
        let Some(element) = ElementRef::new(dom, id) else {
            continue;
        };
        if !store.contains(id) {
            let parent = dom.parent_element(id).filter(|p| store.contains(*p));
            store.insert_element(id, parent)?;
        }
        let matched = collect_matching_rules(&element, rules, context);
        changed += apply_matched_rules(store, id, &matched)?;
    }
    debug!("cascade over {:?} changed {} values", root, changed);
    Ok(changed)
}
