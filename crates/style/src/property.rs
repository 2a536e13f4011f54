//! One property slot of one element: the Assigned value, where it came
//! from, and the Specified/Computed caches derived from it.

use css::{ComplexSelector, Specificity};
use dom::NodeId;
use smallvec::SmallVec;

use crate::error::PropertyTypeError;
use crate::registry::PropertyDefinition;
use crate::value::StyleValue;

/// Origin of a declaration, in increasing cascade priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleOrigin {
    UserAgent,
    User,
    Author,
    /// `style` attribute.
    Inline,
}

/// Where an Assigned value came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub origin: StyleOrigin,
    /// Stylesheet or rule identifier chosen by the caller.
    pub source_id: usize,
    /// Selector that matched, for rule-sourced values.
    pub selector: Option<ComplexSelector>,
    pub specificity: Specificity,
}

impl Provenance {
    pub fn new(origin: StyleOrigin, source_id: usize) -> Self {
        Self {
            origin,
            source_id,
            selector: None,
            specificity: Specificity::ZERO,
        }
    }

    pub fn with_selector(mut self, selector: ComplexSelector) -> Self {
        self.specificity = selector.specificity();
        self.selector = Some(selector);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleProperty {
    pub(crate) assigned: StyleValue,
    pub(crate) provenance: Option<Provenance>,
    pub(crate) specified: Option<StyleValue>,
    pub(crate) computed: Option<StyleValue>,
    /// Elements that pulled an inherited value from this slot.
    pub(crate) dependents: SmallVec<[NodeId; 4]>,
}

impl StyleProperty {
    pub fn new() -> Self {
        Self::default()
    }

    /// A detached slot holding `value`, typically a rule's declaration fed
    /// to [`StyleProperty::cascade`] or [`StyleProperty::overwrite`].
    pub fn with_value(value: StyleValue, provenance: Option<Provenance>) -> Self {
        Self {
            assigned: value,
            provenance,
            ..Self::default()
        }
    }

    pub fn assigned(&self) -> &StyleValue {
        &self.assigned
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    /// Cached Specified value, if resolved since the last invalidation.
    pub fn cached_specified(&self) -> Option<&StyleValue> {
        self.specified.as_ref()
    }

    pub fn cached_computed(&self) -> Option<&StyleValue> {
        self.computed.as_ref()
    }

    pub fn dependents(&self) -> &[NodeId] {
        &self.dependents
    }

    /// Write the Assigned value. Returns whether it changed; only a change
    /// clears the caches. A rejected value leaves the slot untouched.
    pub fn assign(
        &mut self,
        definition: &PropertyDefinition,
        value: StyleValue,
        provenance: Option<Provenance>,
    ) -> Result<bool, PropertyTypeError> {
        definition.check(&value)?;
        self.provenance = provenance;
        if value == self.assigned {
            return Ok(false);
        }
        self.assigned = value;
        self.invalidate();
        Ok(true)
    }

    /// Copy `source` in only if this slot has nothing assigned.
    pub fn cascade(
        &mut self,
        definition: &PropertyDefinition,
        source: &StyleProperty,
    ) -> Result<bool, PropertyTypeError> {
        if !self.assigned.is_unset() || source.assigned.is_unset() {
            return Ok(false);
        }
        self.assign(definition, source.assigned.clone(), source.provenance.clone())
    }

    /// Replace this slot's value with `source`'s when they differ.
    pub fn overwrite(
        &mut self,
        definition: &PropertyDefinition,
        source: &StyleProperty,
    ) -> Result<bool, PropertyTypeError> {
        if self.assigned == source.assigned {
            return Ok(false);
        }
        self.assign(definition, source.assigned.clone(), source.provenance.clone())
    }

    /// Drop both caches.
    pub fn invalidate(&mut self) {
        self.specified = None;
        self.computed = None;
    }

    pub(crate) fn add_dependent(&mut self, element: NodeId) {
        if !self.dependents.contains(&element) {
            self.dependents.push(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKinds;

    fn weight() -> PropertyDefinition {
        PropertyDefinition::new("font-weight", StyleValue::Integer(400))
            .allow(ValueKinds::INTEGER)
            .keywords(&["normal", "bold"])
    }

    fn filled(property: &mut StyleProperty) {
        property.specified = Some(StyleValue::Integer(1));
        property.computed = Some(StyleValue::Integer(1));
    }

    #[test]
    fn rejected_write_keeps_prior_value() {
        let def = weight();
        let mut property = StyleProperty::new();
        assert_eq!(property.assign(&def, StyleValue::keyword("bold"), None), Ok(true));
        filled(&mut property);

        let err = property
            .assign(&def, StyleValue::String("heavy".into()), None)
            .unwrap_err();
        assert!(matches!(err, PropertyTypeError::KindNotAllowed { .. }));
        assert_eq!(property.assigned(), &StyleValue::keyword("bold"));
        assert!(property.cached_computed().is_some());
    }

    #[test]
    fn unchanged_write_keeps_caches() {
        let def = weight();
        let mut property = StyleProperty::new();
        property.assign(&def, StyleValue::Integer(700), None).unwrap();
        filled(&mut property);
        assert_eq!(property.assign(&def, StyleValue::Integer(700), None), Ok(false));
        assert!(property.cached_specified().is_some());

        assert_eq!(property.assign(&def, StyleValue::Integer(300), None), Ok(true));
        assert!(property.cached_specified().is_none());
        assert!(property.cached_computed().is_none());
    }

    #[test]
    fn cascade_fills_only_gaps() {
        let def = weight();
        let source = StyleProperty::with_value(
            StyleValue::Integer(700),
            Some(Provenance::new(StyleOrigin::Author, 3)),
        );

        let mut empty = StyleProperty::new();
        assert_eq!(empty.cascade(&def, &source), Ok(true));
        assert_eq!(empty.assigned(), &StyleValue::Integer(700));
        assert_eq!(empty.provenance().map(|p| p.source_id), Some(3));

        let mut set = StyleProperty::with_value(StyleValue::Integer(100), None);
        assert_eq!(set.cascade(&def, &source), Ok(false));
        assert_eq!(set.assigned(), &StyleValue::Integer(100));

        let mut untouched = StyleProperty::new();
        assert_eq!(untouched.cascade(&def, &StyleProperty::new()), Ok(false));
        assert!(untouched.assigned().is_unset());
    }

    #[test]
    fn overwrite_replaces() {
        let def = weight();
        let source = StyleProperty::with_value(StyleValue::Integer(700), None);

        let mut set = StyleProperty::with_value(StyleValue::Integer(100), None);
        filled(&mut set);
        assert_eq!(set.overwrite(&def, &source), Ok(true));
        assert_eq!(set.assigned(), &StyleValue::Integer(700));
        assert!(set.cached_computed().is_none());

        filled(&mut set);
        assert_eq!(set.overwrite(&def, &source), Ok(false));
        assert!(set.cached_computed().is_some());
    }

    #[test]
    fn merges_validate_against_the_target() {
        let def = weight();
        let source = StyleProperty::with_value(StyleValue::px(3.0), None);
        let mut target = StyleProperty::new();
        assert!(target.cascade(&def, &source).is_err());
        assert!(target.overwrite(&def, &source).is_err());
        assert!(target.assigned().is_unset());
    }

    #[test]
    fn provenance_takes_selector_specificity() {
        let selector = css::parse_single_str("#nav .item").unwrap();
        let provenance = Provenance::new(StyleOrigin::Author, 0).with_selector(selector);
        assert_eq!(provenance.specificity, Specificity::new(1, 1, 0));
    }

    #[test]
    fn dependents_are_deduplicated() {
        let mut dom = dom::Dom::new();
        let child = dom.create_html_element("p", &[]);
        let mut property = StyleProperty::new();
        property.add_dependent(child);
        property.add_dependent(child);
        assert_eq!(property.dependents(), &[child]);
    }
}
