//! Per-element style state and the Assigned → Specified → Computed pipeline.
//!
//! Values are resolved lazily: a read fills the cache, a write clears it.
//! Inherited values are pulled from the parent on demand and the pull is
//! recorded as a dependency edge on the parent's slot, so that a later
//! change to the parent clears every descendant that copied from it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dom::{Dom, NodeId};
use log::{debug, trace};

use crate::error::{ResolutionError, Result, StyleError};
use crate::layout::LayoutContext;
use crate::property::{Provenance, StyleProperty};
use crate::registry::{Dirt, PropertyDefinition, PropertyId, PropertyRegistry};
use crate::value::{StyleValue, Unit};

/// Emitted synchronously for every change of an Assigned value.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleChange {
    pub element: NodeId,
    pub property: String,
    pub old: StyleValue,
    pub new: StyleValue,
    pub dirt: Dirt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StyleChange) + Send>;

#[derive(Debug, Default)]
struct ElementStyle {
    parent: Option<NodeId>,
    properties: HashMap<PropertyId, StyleProperty>,
}

pub struct StyleStore {
    registry: Arc<PropertyRegistry>,
    elements: HashMap<NodeId, ElementStyle>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for StyleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleStore")
            .field("properties", &self.registry.len())
            .field("elements", &self.elements.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl StyleStore {
    pub fn new(registry: Arc<PropertyRegistry>) -> Self {
        Self {
            registry,
            elements: HashMap::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn registry(&self) -> &Arc<PropertyRegistry> {
        &self.registry
    }

    // ── Structure ──────────────────────────────────────────────────────────

    /// Register `element` under `parent`. Re-inserting an element moves it.
    pub fn insert_element(&mut self, element: NodeId, parent: Option<NodeId>) -> Result<()> {
        if self.elements.contains_key(&element) {
            return self.set_parent(element, parent);
        }
        if let Some(parent) = parent {
            if !self.elements.contains_key(&parent) {
                return Err(StyleError::UnknownElement(parent));
            }
        }
        self.elements.insert(
            element,
            ElementStyle {
                parent,
                properties: HashMap::new(),
            },
        );
        Ok(())
    }

    /// Register every element of the subtree at `root`, with `root` as a
    /// style root.
    pub fn insert_tree(&mut self, dom: &Dom, root: NodeId) -> Result<()> {
        if dom.element(root).is_some() {
            self.insert_element(root, None)?;
        }
        for id in dom.descendants(root) {
            if dom.element(id).is_none() {
                continue;
            }
            let parent = dom
                .parent_element(id)
                .filter(|p| self.elements.contains_key(p));
            self.insert_element(id, parent)?;
        }
        Ok(())
    }

    pub fn contains(&self, element: NodeId) -> bool {
        self.elements.contains_key(&element)
    }

    pub fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.elements.get(&element).and_then(|e| e.parent)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Move `element` under `parent`, clearing everything it inherited.
    pub fn set_parent(&mut self, element: NodeId, parent: Option<NodeId>) -> Result<()> {
        let old = self
            .elements
            .get(&element)
            .ok_or(StyleError::UnknownElement(element))?
            .parent;
        if let Some(new) = parent {
            if !self.elements.contains_key(&new) {
                return Err(StyleError::UnknownElement(new));
            }
            let mut cursor = Some(new);
            while let Some(id) = cursor {
                if id == element {
                    return Err(StyleError::InvalidParent {
                        element,
                        parent: new,
                    });
                }
                cursor = self.parent(id);
            }
        }
        if old == parent {
            return Ok(());
        }
        if let Some(old) = old {
            self.forget_dependent(old, element);
        }
        if let Some(style) = self.elements.get_mut(&element) {
            style.parent = parent;
        }
        self.invalidate_element(element);
        Ok(())
    }

    /// Drop `element` and its properties. Its children become roots and
    /// everything that inherited from it is invalidated.
    pub fn remove_element(&mut self, element: NodeId) -> Result<()> {
        let ids: Vec<PropertyId> = match self.elements.get(&element) {
            Some(style) => style.properties.keys().copied().collect(),
            None => return Err(StyleError::UnknownElement(element)),
        };
        for id in ids {
            self.invalidate_property(element, id);
        }
        let parent = self.parent(element);
        if let Some(parent) = parent {
            self.forget_dependent(parent, element);
        }
        self.elements.remove(&element);

        let orphans: Vec<NodeId> = self
            .elements
            .iter()
            .filter(|(_, style)| style.parent == Some(element))
            .map(|(id, _)| *id)
            .collect();
        for orphan in orphans {
            if let Some(style) = self.elements.get_mut(&orphan) {
                style.parent = None;
            }
            self.invalidate_element(orphan);
        }
        Ok(())
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    /// The slot for `name` on `element`, if one has been created.
    pub fn property(&self, element: NodeId, name: &str) -> Option<&StyleProperty> {
        let id = self.registry.id(name)?;
        self.elements.get(&element)?.properties.get(&id)
    }

    pub fn assigned(&self, element: NodeId, name: &str) -> Option<&StyleValue> {
        self.property(element, name).map(StyleProperty::assigned)
    }

    /// Every slot created on `element`, in no particular order.
    pub fn properties(
        &self,
        element: NodeId,
    ) -> impl Iterator<Item = (PropertyId, &StyleProperty)> + '_ {
        self.elements
            .get(&element)
            .into_iter()
            .flat_map(|style| style.properties.iter().map(|(id, slot)| (*id, slot)))
    }

    pub fn specified(
        &mut self,
        element: NodeId,
        name: &str,
        layout: &dyn LayoutContext,
    ) -> Result<StyleValue> {
        let id = self.property_id(name)?;
        self.specified_by_id(element, id, layout)
    }

    pub fn computed(
        &mut self,
        element: NodeId,
        name: &str,
        layout: &dyn LayoutContext,
    ) -> Result<StyleValue> {
        let id = self.property_id(name)?;
        self.computed_by_id(element, id, layout)
    }

    pub fn specified_by_id(
        &mut self,
        element: NodeId,
        id: PropertyId,
        layout: &dyn LayoutContext,
    ) -> Result<StyleValue> {
        let registry = Arc::clone(&self.registry);
        let definition = lookup_definition(&registry, id)?;
        let style = self
            .elements
            .get(&element)
            .ok_or(StyleError::UnknownElement(element))?;
        let slot = style.properties.get(&id);
        if let Some(cached) = slot.and_then(|p| p.specified.as_ref()) {
            return Ok(cached.clone());
        }
        let parent = style.parent;
        let assigned = slot.map(|p| p.assigned.clone()).unwrap_or_default();

        let value = match assigned {
            StyleValue::Unset | StyleValue::Initial => match parent {
                Some(parent) if definition.inherited => {
                    self.resolve_ancestors(parent, id, layout)?;
                    let value = self.computed_by_id(parent, id, layout)?;
                    self.slot(parent, id).add_dependent(element);
                    value
                }
                _ => definition.initial.clone(),
            },
            other => other,
        };
        trace!(
            "specified {} of {:?} resolved to {}",
            definition.name, element, value
        );
        self.slot(element, id).specified = Some(value.clone());
        Ok(value)
    }

    pub fn computed_by_id(
        &mut self,
        element: NodeId,
        id: PropertyId,
        layout: &dyn LayoutContext,
    ) -> Result<StyleValue> {
        let registry = Arc::clone(&self.registry);
        let definition = lookup_definition(&registry, id)?;
        if let Some(cached) = self
            .elements
            .get(&element)
            .and_then(|e| e.properties.get(&id))
            .and_then(|p| p.computed.as_ref())
        {
            return Ok(cached.clone());
        }

        let specified = self.specified_by_id(element, id, layout)?;
        let value = match specified {
            StyleValue::Percentage(percent) => {
                let resolver = definition.percentage_resolver.ok_or_else(|| {
                    ResolutionError::NoPercentageResolver {
                        property: definition.name.clone(),
                    }
                })?;
                resolver(layout, element, percent)?
            }
            StyleValue::Dimension { value, unit: Unit::Px } => StyleValue::px(value),
            StyleValue::Dimension { value, unit } => {
                let scale = layout
                    .unit_scale(element, &unit)
                    .ok_or(ResolutionError::UnknownUnit { element, unit })?;
                StyleValue::px(value * scale)
            }
            StyleValue::Inherit => match self.parent(element) {
                Some(parent) => {
                    let value = self.specified_by_id(parent, id, layout)?;
                    self.slot(parent, id).add_dependent(element);
                    value
                }
                None => definition.initial.clone(),
            },
            other => other,
        };
        trace!(
            "computed {} of {:?} resolved to {}",
            definition.name, element, value
        );
        self.slot(element, id).computed = Some(value.clone());
        Ok(value)
    }

    /// Fill the Computed caches of the inheritance chain above `element`
    /// from the top down, so that pulling `element`'s value only recurses
    /// one level however deep the tree is.
    fn resolve_ancestors(
        &mut self,
        element: NodeId,
        id: PropertyId,
        layout: &dyn LayoutContext,
    ) -> Result<()> {
        let mut chain = Vec::new();
        let mut cursor = self.parent(element);
        while let Some(ancestor) = cursor {
            let Some(style) = self.elements.get(&ancestor) else {
                break;
            };
            let slot = style.properties.get(&id);
            if slot.is_some_and(|p| p.computed.is_some()) {
                break;
            }
            chain.push(ancestor);
            let pulls = slot.is_none_or(|p| {
                matches!(p.assigned, StyleValue::Unset | StyleValue::Initial)
            });
            if !pulls {
                break;
            }
            cursor = style.parent;
        }
        if !chain.is_empty() {
            trace!("resolving {} ancestors of {:?} first", chain.len(), element);
        }
        for ancestor in chain.into_iter().rev() {
            self.computed_by_id(ancestor, id, layout)?;
        }
        Ok(())
    }

    // ── Writes ─────────────────────────────────────────────────────────────

    /// Set the Assigned value of `name` on `element`. Returns whether the
    /// value changed.
    pub fn assign(&mut self, element: NodeId, name: &str, value: StyleValue) -> Result<bool> {
        self.assign_with(element, name, value, None)
    }

    pub fn assign_with(
        &mut self,
        element: NodeId,
        name: &str,
        value: StyleValue,
        provenance: Option<Provenance>,
    ) -> Result<bool> {
        let source = StyleProperty::with_value(value, provenance);
        self.merge(element, name, &source, |slot, def, source| {
            slot.assign(def, source.assigned.clone(), source.provenance.clone())
        })
    }

    /// Copy `source` into the slot only if nothing is assigned there yet.
    pub fn cascade(&mut self, element: NodeId, name: &str, source: &StyleProperty) -> Result<bool> {
        self.merge(element, name, source, StyleProperty::cascade)
    }

    /// Replace the slot's value with `source`'s when they differ.
    pub fn overwrite(
        &mut self,
        element: NodeId,
        name: &str,
        source: &StyleProperty,
    ) -> Result<bool> {
        self.merge(element, name, source, StyleProperty::overwrite)
    }

    /// Drop the Assigned value of `name` back to Unset and forget where it
    /// came from. Returns whether the value changed.
    pub fn reset(&mut self, element: NodeId, name: &str) -> Result<bool> {
        self.merge(element, name, &StyleProperty::new(), |slot, _, _| {
            slot.provenance = None;
            if slot.assigned.is_unset() {
                return Ok(false);
            }
            slot.assigned = StyleValue::Unset;
            slot.invalidate();
            Ok(true)
        })
    }

    fn merge<F>(
        &mut self,
        element: NodeId,
        name: &str,
        source: &StyleProperty,
        apply: F,
    ) -> Result<bool>
    where
        F: FnOnce(
            &mut StyleProperty,
            &PropertyDefinition,
            &StyleProperty,
        ) -> std::result::Result<bool, crate::error::PropertyTypeError>,
    {
        let id = self.property_id(name)?;
        if !self.elements.contains_key(&element) {
            return Err(StyleError::UnknownElement(element));
        }
        let registry = Arc::clone(&self.registry);
        let definition = lookup_definition(&registry, id)?;

        let slot = self.slot(element, id);
        let old = slot.assigned.clone();
        if !apply(slot, definition, source)? {
            return Ok(false);
        }
        let new = slot.assigned.clone();

        self.invalidate_property(element, id);
        self.notify(&StyleChange {
            element,
            property: definition.name.clone(),
            old,
            new,
            dirt: definition.dirt,
        });
        Ok(true)
    }

    // ── Invalidation ───────────────────────────────────────────────────────

    /// Clear every cached value of `element` and of whatever inherited
    /// from it.
    pub fn invalidate_element(&mut self, element: NodeId) {
        let ids: Vec<PropertyId> = match self.elements.get(&element) {
            Some(style) => style.properties.keys().copied().collect(),
            None => return,
        };
        for id in ids {
            self.invalidate_property(element, id);
        }
    }

    /// Clear every cache in the store.
    pub fn invalidate_all(&mut self) {
        for style in self.elements.values_mut() {
            for slot in style.properties.values_mut() {
                slot.invalidate();
                slot.dependents.clear();
            }
        }
        debug!("invalidated all {} elements", self.elements.len());
    }

    fn invalidate_property(&mut self, element: NodeId, id: PropertyId) {
        let mut work = vec![element];
        let mut cleared = 0usize;
        while let Some(next) = work.pop() {
            let Some(slot) = self
                .elements
                .get_mut(&next)
                .and_then(|e| e.properties.get_mut(&id))
            else {
                continue;
            };
            slot.invalidate();
            cleared += 1;
            work.extend(slot.dependents.drain(..));
        }
        if cleared > 1 {
            debug!(
                "invalidating {:?} of {:?} cleared {} dependents",
                id,
                element,
                cleared - 1
            );
        }
    }

    fn forget_dependent(&mut self, parent: NodeId, element: NodeId) {
        if let Some(style) = self.elements.get_mut(&parent) {
            for slot in style.properties.values_mut() {
                slot.dependents.retain(|d| *d != element);
            }
        }
    }

    // ── Notifications ──────────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StyleChange) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: &StyleChange) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }

    // ── Helpers ────────────────────────────────────────────────────────────

    fn property_id(&self, name: &str) -> Result<PropertyId> {
        self.registry
            .id(name)
            .ok_or_else(|| ResolutionError::UnknownProperty(name.to_string()).into())
    }

    /// The slot for `id` on a known element, created on first touch.
    fn slot(&mut self, element: NodeId, id: PropertyId) -> &mut StyleProperty {
        self.elements
            .entry(element)
            .or_default()
            .properties
            .entry(id)
            .or_default()
    }
}

fn lookup_definition(registry: &PropertyRegistry, id: PropertyId) -> Result<&PropertyDefinition> {
    registry
        .get(id)
        .ok_or_else(|| ResolutionError::UnknownProperty(format!("{id:?}")).into())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Mutex;

    use super::*;
    use crate::layout::{PercentageBase, StaticLayout, percent_of_containing_block_width};
    use crate::value::ValueKinds;

    /// Counts how often resolvers reach into layout.
    struct CountingLayout {
        width: f64,
        base_reads: Cell<usize>,
        scale_reads: Cell<usize>,
    }

    impl CountingLayout {
        fn new(width: f64) -> Self {
            Self {
                width,
                base_reads: Cell::new(0),
                scale_reads: Cell::new(0),
            }
        }
    }

    impl LayoutContext for CountingLayout {
        fn unit_scale(&self, _: NodeId, unit: &Unit) -> Option<f64> {
            self.scale_reads.set(self.scale_reads.get() + 1);
            match unit {
                Unit::Em => Some(10.0),
                _ => None,
            }
        }

        fn percentage_base(&self, _: NodeId, base: PercentageBase) -> Option<f64> {
            self.base_reads.set(self.base_reads.get() + 1);
            match base {
                PercentageBase::ContainingBlockWidth => Some(self.width),
                _ => None,
            }
        }
    }

    fn registry() -> Arc<PropertyRegistry> {
        Arc::new(
            PropertyRegistry::builder()
                .define(
                    PropertyDefinition::new("color", StyleValue::keyword("black"))
                        .inherited()
                        .allow(ValueKinds::KEYWORD)
                        .dirt(Dirt::PAINT),
                )
                .define(
                    PropertyDefinition::new("weight", StyleValue::Integer(400))
                        .inherited()
                        .allow(ValueKinds::INTEGER)
                        .keywords(&["bold", "normal"]),
                )
                .define(
                    PropertyDefinition::new("margin-left", StyleValue::px(0.0))
                        .allow(ValueKinds::DIMENSION | ValueKinds::AUTO)
                        .percentages(percent_of_containing_block_width)
                        .dirt(Dirt::LAYOUT),
                )
                .define(
                    PropertyDefinition::new("size", StyleValue::px(16.0))
                        .inherited()
                        .allow(ValueKinds::DIMENSION | ValueKinds::PERCENTAGE),
                )
                .build(),
        )
    }

    /// root > mid > leaf, all registered.
    fn chain() -> (StyleStore, [NodeId; 3]) {
        let mut dom = Dom::new();
        let root = dom.create_html_element("root", &[]);
        let mid = dom.create_html_element("mid", &[]);
        let leaf = dom.create_html_element("leaf", &[]);
        dom.append_child(root, mid);
        dom.append_child(mid, leaf);
        let mut store = StyleStore::new(registry());
        store.insert_tree(&dom, root).unwrap();
        (store, [root, mid, leaf])
    }

    fn layout() -> StaticLayout {
        StaticLayout::new(300.0, 200.0)
    }

    #[test]
    fn insert_tree_links_parents() {
        let (store, [root, mid, leaf]) = chain();
        assert_eq!(store.len(), 3);
        assert_eq!(store.parent(root), None);
        assert_eq!(store.parent(mid), Some(root));
        assert_eq!(store.parent(leaf), Some(mid));
    }

    #[test]
    fn unset_uses_initial_or_inherits() {
        let (mut store, [root, mid, leaf]) = chain();
        let layout = layout();
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("black")
        );
        store.assign(root, "color", StyleValue::keyword("red")).unwrap();
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("red")
        );
        // Not inherited: the child gets the initial value.
        store.assign(mid, "margin-left", StyleValue::px(4.0)).unwrap();
        assert_eq!(
            store.computed(leaf, "margin-left", &layout).unwrap(),
            StyleValue::px(0.0)
        );
    }

    #[test]
    fn initial_keyword_defaults_like_unset() {
        let (mut store, [root, mid, _]) = chain();
        let layout = layout();
        store.assign(root, "color", StyleValue::keyword("red")).unwrap();
        store.assign(mid, "color", StyleValue::Initial).unwrap();
        assert_eq!(
            store.specified(mid, "color", &layout).unwrap(),
            StyleValue::keyword("red")
        );
        store.assign(mid, "margin-left", StyleValue::Initial).unwrap();
        assert_eq!(
            store.specified(mid, "margin-left", &layout).unwrap(),
            StyleValue::px(0.0)
        );
    }

    #[test]
    fn rejected_assignment_keeps_the_prior_value() {
        let (mut store, [root, ..]) = chain();
        store.assign(root, "weight", StyleValue::keyword("bold")).unwrap();
        let err = store
            .assign(root, "weight", StyleValue::String("heavy".into()))
            .unwrap_err();
        assert!(matches!(err, StyleError::Type(_)));
        assert_eq!(
            store.assigned(root, "weight"),
            Some(&StyleValue::keyword("bold"))
        );
    }

    #[test]
    fn percentage_margin_resolves_against_containing_block() {
        let (mut store, [_, mid, _]) = chain();
        let layout = CountingLayout::new(300.0);
        store
            .assign(mid, "margin-left", StyleValue::Percentage(50.0))
            .unwrap();
        assert_eq!(
            store.computed(mid, "margin-left", &layout).unwrap(),
            StyleValue::px(150.0)
        );
    }

    #[test]
    fn repeated_reads_resolve_once() {
        let (mut store, [_, mid, _]) = chain();
        let layout = CountingLayout::new(300.0);
        store
            .assign(mid, "margin-left", StyleValue::Percentage(50.0))
            .unwrap();
        store.computed(mid, "margin-left", &layout).unwrap();
        store.computed(mid, "margin-left", &layout).unwrap();
        assert_eq!(layout.base_reads.get(), 1);

        store
            .assign(mid, "margin-left", StyleValue::Percentage(10.0))
            .unwrap();
        assert_eq!(
            store.computed(mid, "margin-left", &layout).unwrap(),
            StyleValue::px(30.0)
        );
        assert_eq!(layout.base_reads.get(), 2);
    }

    #[test]
    fn dimensions_scale_to_pixels() {
        let (mut store, [root, ..]) = chain();
        let layout = CountingLayout::new(300.0);
        store
            .assign(root, "margin-left", StyleValue::dimension(2.0, Unit::Em))
            .unwrap();
        assert_eq!(
            store.computed(root, "margin-left", &layout).unwrap(),
            StyleValue::px(20.0)
        );

        store
            .assign(root, "margin-left", StyleValue::dimension(1.0, Unit::Vw))
            .unwrap();
        assert_eq!(
            store.computed(root, "margin-left", &layout),
            Err(StyleError::Resolution(ResolutionError::UnknownUnit {
                element: root,
                unit: Unit::Vw
            }))
        );

        store.assign(root, "margin-left", StyleValue::px(7.0)).unwrap();
        let reads = layout.scale_reads.get();
        assert_eq!(
            store.computed(root, "margin-left", &layout).unwrap(),
            StyleValue::px(7.0)
        );
        assert_eq!(layout.scale_reads.get(), reads);
    }

    #[test]
    fn percentage_without_resolver_fails() {
        let (mut store, [root, ..]) = chain();
        store.assign(root, "size", StyleValue::Percentage(50.0)).unwrap();
        assert_eq!(
            store.computed(root, "size", &layout()),
            Err(StyleError::Resolution(
                ResolutionError::NoPercentageResolver {
                    property: "size".into()
                }
            ))
        );
        assert!(store.property(root, "size").unwrap().cached_computed().is_none());
    }

    #[test]
    fn inherit_at_root_uses_initial() {
        let (mut store, [root, ..]) = chain();
        store.assign(root, "weight", StyleValue::Inherit).unwrap();
        assert_eq!(
            store.specified(root, "weight", &layout()).unwrap(),
            StyleValue::Inherit
        );
        assert_eq!(
            store.computed(root, "weight", &layout()).unwrap(),
            StyleValue::Integer(400)
        );
    }

    #[test]
    fn inherit_pulls_the_parent_specified_value() {
        let (mut store, [_, mid, leaf]) = chain();
        let layout = CountingLayout::new(300.0);
        store.assign(mid, "margin-left", StyleValue::Percentage(10.0)).unwrap();
        store.assign(leaf, "margin-left", StyleValue::Inherit).unwrap();
        assert_eq!(
            store.computed(leaf, "margin-left", &layout).unwrap(),
            StyleValue::Percentage(10.0)
        );
        assert_eq!(layout.base_reads.get(), 0);
    }

    #[test]
    fn ancestor_change_reaches_inheriting_descendants() {
        let (mut store, [root, mid, leaf]) = chain();
        let layout = layout();
        store.assign(root, "color", StyleValue::keyword("red")).unwrap();
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("red")
        );
        assert_eq!(store.property(root, "color").unwrap().dependents(), &[mid]);
        assert_eq!(store.property(mid, "color").unwrap().dependents(), &[leaf]);

        store.assign(root, "color", StyleValue::keyword("blue")).unwrap();
        assert!(store.property(leaf, "color").unwrap().cached_computed().is_none());
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("blue")
        );
    }

    #[test]
    fn deep_inheritance_chains_resolve() {
        let mut dom = Dom::new();
        let mut store = StyleStore::new(registry());
        let root = dom.create_html_element("div", &[]);
        store.insert_element(root, None).unwrap();
        let mut leaf = root;
        for _ in 0..50_000 {
            let child = dom.create_html_element("div", &[]);
            store.insert_element(child, Some(leaf)).unwrap();
            leaf = child;
        }
        let layout = layout();

        store.assign(root, "color", StyleValue::keyword("red")).unwrap();
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("red")
        );

        store.assign(root, "color", StyleValue::keyword("blue")).unwrap();
        assert!(store.property(leaf, "color").unwrap().cached_computed().is_none());
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("blue")
        );
    }

    #[test]
    fn explicit_value_stops_inheritance() {
        let (mut store, [root, mid, leaf]) = chain();
        let layout = layout();
        store.assign(mid, "color", StyleValue::keyword("green")).unwrap();
        store.computed(leaf, "color", &layout).unwrap();
        store.assign(root, "color", StyleValue::keyword("blue")).unwrap();
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("green")
        );
    }

    #[test]
    fn repeated_pulls_record_one_edge() {
        let (mut store, [root, mid, _]) = chain();
        let layout = layout();
        for _ in 0..3 {
            store.computed(mid, "color", &layout).unwrap();
            store.invalidate_element(mid);
        }
        store.computed(mid, "color", &layout).unwrap();
        assert_eq!(store.property(root, "color").unwrap().dependents(), &[mid]);
    }

    #[test]
    fn notifications_fire_once_per_change() {
        let (mut store, [root, ..]) = chain();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |change: &StyleChange| {
            sink.lock().unwrap().push(change.clone());
        });

        store.assign(root, "color", StyleValue::keyword("red")).unwrap();
        store.assign(root, "color", StyleValue::keyword("red")).unwrap();
        let _ = store.assign(root, "color", StyleValue::Integer(3));
        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].element, root);
            assert_eq!(seen[0].property, "color");
            assert_eq!(seen[0].old, StyleValue::Unset);
            assert_eq!(seen[0].new, StyleValue::keyword("red"));
            assert_eq!(seen[0].dirt, Dirt::PAINT);
        }

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.assign(root, "color", StyleValue::keyword("blue")).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn store_cascade_and_overwrite() {
        let (mut store, [root, ..]) = chain();
        let source = StyleProperty::with_value(StyleValue::keyword("red"), None);
        assert!(store.cascade(root, "color", &source).unwrap());
        let other = StyleProperty::with_value(StyleValue::keyword("blue"), None);
        assert!(!store.cascade(root, "color", &other).unwrap());
        assert_eq!(store.assigned(root, "color"), Some(&StyleValue::keyword("red")));

        assert!(store.overwrite(root, "color", &other).unwrap());
        assert!(!store.overwrite(root, "color", &other).unwrap());
        assert_eq!(store.assigned(root, "color"), Some(&StyleValue::keyword("blue")));
    }

    #[test]
    fn reparenting_invalidates_inherited_values() {
        let mut dom = Dom::new();
        let a = dom.create_html_element("a", &[]);
        let b = dom.create_html_element("b", &[]);
        let child = dom.create_html_element("c", &[]);
        let grandchild = dom.create_html_element("d", &[]);
        let mut store = StyleStore::new(registry());
        store.insert_element(a, None).unwrap();
        store.insert_element(b, None).unwrap();
        store.insert_element(child, Some(a)).unwrap();
        store.insert_element(grandchild, Some(child)).unwrap();
        store.assign(a, "color", StyleValue::keyword("red")).unwrap();
        store.assign(b, "color", StyleValue::keyword("blue")).unwrap();

        let layout = layout();
        assert_eq!(
            store.computed(grandchild, "color", &layout).unwrap(),
            StyleValue::keyword("red")
        );
        store.set_parent(child, Some(b)).unwrap();
        assert_eq!(
            store.computed(grandchild, "color", &layout).unwrap(),
            StyleValue::keyword("blue")
        );
        assert!(store.property(a, "color").unwrap().dependents().is_empty());
    }

    #[test]
    fn cycles_are_refused() {
        let (mut store, [root, mid, leaf]) = chain();
        assert_eq!(
            store.set_parent(root, Some(leaf)),
            Err(StyleError::InvalidParent {
                element: root,
                parent: leaf
            })
        );
        assert_eq!(
            store.set_parent(mid, Some(mid)),
            Err(StyleError::InvalidParent {
                element: mid,
                parent: mid
            })
        );
        assert_eq!(store.parent(root), None);
    }

    #[test]
    fn removing_an_element_orphans_its_children() {
        let (mut store, [root, mid, leaf]) = chain();
        let layout = layout();
        store.assign(mid, "color", StyleValue::keyword("red")).unwrap();
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("red")
        );
        store.remove_element(mid).unwrap();
        assert!(!store.contains(mid));
        assert_eq!(store.parent(leaf), None);
        assert_eq!(
            store.computed(leaf, "color", &layout).unwrap(),
            StyleValue::keyword("black")
        );
        assert!(store.property(root, "color").map_or(true, |p| p.dependents().is_empty()));
        assert_eq!(
            store.remove_element(mid),
            Err(StyleError::UnknownElement(mid))
        );
    }

    #[test]
    fn unknown_names_and_elements() {
        let mut dom = Dom::new();
        let root = dom.create_html_element("root", &[]);
        let stranger = dom.create_html_element("x", &[]);
        let mut store = StyleStore::new(registry());
        store.insert_element(root, None).unwrap();
        assert_eq!(
            store.assign(root, "nope", StyleValue::Auto),
            Err(StyleError::Resolution(ResolutionError::UnknownProperty(
                "nope".into()
            )))
        );
        assert_eq!(
            store.insert_element(root, Some(stranger)),
            Err(StyleError::UnknownElement(stranger))
        );
        assert!(store.computed(stranger, "color", &layout()).is_err());
        assert_eq!(
            store.assign(stranger, "color", StyleValue::keyword("red")),
            Err(StyleError::UnknownElement(stranger))
        );
    }

    #[test]
    fn invalidate_all_clears_caches() {
        let (mut store, [root, _, leaf]) = chain();
        let layout = layout();
        store.computed(leaf, "color", &layout).unwrap();
        store.invalidate_all();
        assert!(store.property(leaf, "color").unwrap().cached_computed().is_none());
        assert!(store.property(root, "color").unwrap().dependents().is_empty());
    }

    #[test]
    fn property_names_are_case_insensitive() {
        let (mut store, [root, ..]) = chain();
        store.assign(root, "COLOR", StyleValue::keyword("red")).unwrap();
        assert_eq!(
            store.computed(root, "Color", &layout()).unwrap(),
            StyleValue::keyword("red")
        );
    }
}
