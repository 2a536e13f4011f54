//! Property definitions and the registry that owns them.
//!
//! A [`PropertyRegistry`] is built once by a single writer and is immutable
//! afterwards; style stores hold it behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use dom::NodeId;
use log::{debug, warn};

use crate::error::{PropertyTypeError, ResolutionError};
use crate::layout::{
    LayoutContext, percent_of_containing_block_height, percent_of_containing_block_width,
    percent_of_parent_font_size,
};
use crate::value::{StyleValue, ValueKinds};

bitflags! {
    /// What a change to a property invalidates downstream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Dirt: u8 {
        const LAYOUT = 1 << 0;
        const PAINT = 1 << 1;
        const TEXT = 1 << 2;
        const STACKING = 1 << 3;
    }
}

/// Turns a percentage into an absolute value for one element.
pub type PercentageResolver =
    fn(&dyn LayoutContext, NodeId, f64) -> Result<StyleValue, ResolutionError>;

// ─────────────────────────────────────────────────────────────────────────────
// PropertyDefinition
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PropertyDefinition {
    pub name: String,
    pub initial: StyleValue,
    pub inherited: bool,
    pub allowed: ValueKinds,
    pub disallowed: ValueKinds,
    /// Lowercase keywords accepted for `Keyword` values. `None` accepts any.
    pub keywords: Option<Vec<String>>,
    pub percentage_resolver: Option<PercentageResolver>,
    pub dirt: Dirt,
}

impl PropertyDefinition {
    pub fn new(name: &str, initial: StyleValue) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            initial,
            inherited: false,
            allowed: ValueKinds::empty(),
            disallowed: ValueKinds::empty(),
            keywords: None,
            percentage_resolver: None,
            dirt: Dirt::empty(),
        }
    }

    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    pub fn allow(mut self, kinds: ValueKinds) -> Self {
        self.allowed |= kinds;
        self
    }

    pub fn disallow(mut self, kinds: ValueKinds) -> Self {
        self.disallowed |= kinds;
        self
    }

    /// Restrict `Keyword` values to `words`. Also allows keywords.
    pub fn keywords(mut self, words: &[&str]) -> Self {
        self.allowed |= ValueKinds::KEYWORD;
        self.keywords = Some(words.iter().map(|w| w.to_ascii_lowercase()).collect());
        self
    }

    pub fn percentages(mut self, resolver: PercentageResolver) -> Self {
        self.allowed |= ValueKinds::PERCENTAGE;
        self.percentage_resolver = Some(resolver);
        self
    }

    pub fn dirt(mut self, dirt: Dirt) -> Self {
        self.dirt |= dirt;
        self
    }

    /// Kinds accepted on write: the CSS-wide keywords are always allowed
    /// unless explicitly disallowed.
    pub fn effective_kinds(&self) -> ValueKinds {
        (self.allowed | ValueKinds::CSS_WIDE) - self.disallowed
    }

    /// Validate an externally assigned value.
    pub fn check(&self, value: &StyleValue) -> Result<(), PropertyTypeError> {
        if !self.effective_kinds().contains(value.kind()) {
            return Err(PropertyTypeError::KindNotAllowed {
                property: self.name.clone(),
                kind: value.kind_name(),
            });
        }
        if let (StyleValue::Keyword(word), Some(list)) = (value, &self.keywords) {
            if !list.iter().any(|k| k.eq_ignore_ascii_case(word)) {
                return Err(PropertyTypeError::KeywordNotAllowed {
                    property: self.name.clone(),
                    keyword: word.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("name", &self.name)
            .field("initial", &self.initial)
            .field("inherited", &self.inherited)
            .field("allowed", &self.allowed)
            .field("disallowed", &self.disallowed)
            .field("keywords", &self.keywords)
            .field("percentage_resolver", &self.percentage_resolver.is_some())
            .field("dirt", &self.dirt)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PropertyRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Dense index of a definition inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u32);

impl PropertyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
pub struct PropertyRegistry {
    definitions: Vec<PropertyDefinition>,
    by_name: HashMap<String, PropertyId>,
}

#[derive(Debug, Default)]
pub struct PropertyRegistryBuilder {
    registry: PropertyRegistry,
}

impl PropertyRegistryBuilder {
    /// Add a definition. A second definition with the same name replaces
    /// the first.
    pub fn define(mut self, definition: PropertyDefinition) -> Self {
        let registry = &mut self.registry;
        match registry.by_name.get(&definition.name) {
            Some(&id) => {
                warn!("property `{}` redefined", definition.name);
                registry.definitions[id.index()] = definition;
            }
            None => {
                let id = PropertyId(registry.definitions.len() as u32);
                registry.by_name.insert(definition.name.clone(), id);
                registry.definitions.push(definition);
            }
        }
        self
    }

    pub fn build(self) -> PropertyRegistry {
        debug!(
            "property registry built with {} definitions",
            self.registry.definitions.len()
        );
        self.registry
    }
}

impl PropertyRegistry {
    pub fn builder() -> PropertyRegistryBuilder {
        PropertyRegistryBuilder::default()
    }

    /// The process-wide registry of standard properties.
    pub fn standard() -> Arc<PropertyRegistry> {
        static STANDARD: OnceLock<Arc<PropertyRegistry>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(standard_definitions().build()))
            .clone()
    }

    /// Find a definition by name, ASCII case-insensitively.
    pub fn lookup(&self, name: &str) -> Option<&PropertyDefinition> {
        self.id(name).map(|id| &self.definitions[id.index()])
    }

    pub fn id(&self, name: &str) -> Option<PropertyId> {
        match self.by_name.get(name) {
            Some(id) => Some(*id),
            None => self.by_name.get(&name.to_ascii_lowercase()).copied(),
        }
    }

    pub fn get(&self, id: PropertyId) -> Option<&PropertyDefinition> {
        self.definitions.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (PropertyId(i as u32), d))
    }
}

fn standard_definitions() -> PropertyRegistryBuilder {
    use ValueKinds as K;

    let box_len = |name: &str, resolver: PercentageResolver| {
        PropertyDefinition::new(name, StyleValue::Auto)
            .allow(K::DIMENSION | K::AUTO)
            .percentages(resolver)
            .dirt(Dirt::LAYOUT)
    };
    let margin = |name: &str| {
        PropertyDefinition::new(name, StyleValue::px(0.0))
            .allow(K::DIMENSION | K::AUTO)
            .percentages(percent_of_containing_block_width)
            .dirt(Dirt::LAYOUT)
    };
    let padding = |name: &str| {
        PropertyDefinition::new(name, StyleValue::px(0.0))
            .allow(K::DIMENSION)
            .percentages(percent_of_containing_block_width)
            .dirt(Dirt::LAYOUT)
    };

    let mut builder = PropertyRegistry::builder()
        .define(
            PropertyDefinition::new("color", StyleValue::keyword("black"))
                .inherited()
                .allow(K::KEYWORD | K::CURRENT_COLOR)
                .dirt(Dirt::PAINT),
        )
        .define(
            PropertyDefinition::new("display", StyleValue::keyword("inline"))
                .keywords(&[
                    "inline",
                    "block",
                    "inline-block",
                    "flex",
                    "inline-flex",
                    "grid",
                    "inline-grid",
                    "list-item",
                    "table",
                    "contents",
                ])
                .allow(K::NONE)
                .dirt(Dirt::LAYOUT | Dirt::STACKING),
        )
        .define(
            PropertyDefinition::new("visibility", StyleValue::keyword("visible"))
                .inherited()
                .keywords(&["visible", "hidden", "collapse"])
                .dirt(Dirt::PAINT),
        )
        .define(
            PropertyDefinition::new("font-size", StyleValue::keyword("medium"))
                .inherited()
                .allow(K::DIMENSION)
                .keywords(&[
                    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large",
                    "smaller", "larger",
                ])
                .percentages(percent_of_parent_font_size)
                .dirt(Dirt::LAYOUT | Dirt::TEXT),
        )
        .define(
            PropertyDefinition::new("font-family", StyleValue::keyword("serif"))
                .inherited()
                .allow(K::STRING | K::KEYWORD)
                .dirt(Dirt::LAYOUT | Dirt::TEXT),
        )
        .define(
            PropertyDefinition::new("font-weight", StyleValue::Integer(400))
                .inherited()
                .allow(K::INTEGER)
                .keywords(&["normal", "bold", "bolder", "lighter"])
                .dirt(Dirt::LAYOUT | Dirt::TEXT),
        )
        .define(
            PropertyDefinition::new("line-height", StyleValue::keyword("normal"))
                .inherited()
                .allow(K::NUMBER | K::DIMENSION)
                .keywords(&["normal"])
                .percentages(percent_of_parent_font_size)
                .dirt(Dirt::LAYOUT | Dirt::TEXT),
        )
        .define(
            PropertyDefinition::new("text-align", StyleValue::keyword("start"))
                .inherited()
                .keywords(&["start", "end", "left", "right", "center", "justify"])
                .dirt(Dirt::LAYOUT | Dirt::TEXT),
        )
        .define(box_len("width", percent_of_containing_block_width))
        .define(box_len("height", percent_of_containing_block_height))
        .define(box_len("left", percent_of_containing_block_width))
        .define(box_len("right", percent_of_containing_block_width))
        .define(box_len("top", percent_of_containing_block_height))
        .define(box_len("bottom", percent_of_containing_block_height))
        .define(
            PropertyDefinition::new("z-index", StyleValue::Auto)
                .allow(K::INTEGER | K::AUTO)
                .dirt(Dirt::STACKING | Dirt::PAINT),
        )
        .define(
            PropertyDefinition::new("opacity", StyleValue::Number(1.0))
                .allow(K::NUMBER)
                .dirt(Dirt::PAINT | Dirt::STACKING),
        );

    for side in ["top", "right", "bottom", "left"] {
        builder = builder
            .define(margin(&format!("margin-{side}")))
            .define(padding(&format!("padding-{side}")));
    }
    builder
}
