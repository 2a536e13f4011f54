//! Layout collaborator consulted while computing values.
//!
//! The style store never owns layout state: a [`LayoutContext`] is handed to
//! each `computed` call and percentage resolvers read their base through it.

use std::collections::HashMap;

use dom::NodeId;

use crate::error::ResolutionError;
use crate::value::{StyleValue, Unit};

/// Quantity a percentage is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PercentageBase {
    ContainingBlockWidth,
    ContainingBlockHeight,
    ParentFontSize,
}

pub trait LayoutContext {
    /// Pixels per one `unit` at `element`. `None` if the unit is unknown.
    fn unit_scale(&self, element: NodeId, unit: &Unit) -> Option<f64>;

    /// Size in pixels of `base` for `element`. `None` if layout has not
    /// determined it.
    fn percentage_base(&self, element: NodeId, base: PercentageBase) -> Option<f64>;
}

/// Pixels per unit for the CSS absolute units (96px per inch).
pub fn absolute_unit_scale(unit: &Unit) -> Option<f64> {
    Some(match unit {
        Unit::Px => 1.0,
        Unit::In => 96.0,
        Unit::Cm => 96.0 / 2.54,
        Unit::Mm => 96.0 / 25.4,
        Unit::Q => 96.0 / 101.6,
        Unit::Pt => 96.0 / 72.0,
        Unit::Pc => 16.0,
        _ => return None,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Percentage resolvers
// ─────────────────────────────────────────────────────────────────────────────

fn percent_of(
    layout: &dyn LayoutContext,
    element: NodeId,
    percent: f64,
    base: PercentageBase,
) -> Result<StyleValue, ResolutionError> {
    let size = layout
        .percentage_base(element, base)
        .ok_or(ResolutionError::MissingPercentageBase { element, base })?;
    Ok(StyleValue::px(size * percent / 100.0))
}

pub fn percent_of_containing_block_width(
    layout: &dyn LayoutContext,
    element: NodeId,
    percent: f64,
) -> Result<StyleValue, ResolutionError> {
    percent_of(layout, element, percent, PercentageBase::ContainingBlockWidth)
}

pub fn percent_of_containing_block_height(
    layout: &dyn LayoutContext,
    element: NodeId,
    percent: f64,
) -> Result<StyleValue, ResolutionError> {
    percent_of(layout, element, percent, PercentageBase::ContainingBlockHeight)
}

pub fn percent_of_parent_font_size(
    layout: &dyn LayoutContext,
    element: NodeId,
    percent: f64,
) -> Result<StyleValue, ResolutionError> {
    percent_of(layout, element, percent, PercentageBase::ParentFontSize)
}

// ─────────────────────────────────────────────────────────────────────────────
// StaticLayout
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-geometry layout: one viewport, one font size, and optional
/// per-element overrides of the percentage bases.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Used for `em`, `rem`, `ex` (half) and `ch` (half).
    pub font_size: f64,
    overrides: HashMap<(NodeId, PercentageBase), f64>,
}

impl StaticLayout {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport_width,
            viewport_height,
            font_size: 16.0,
            overrides: HashMap::new(),
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn set_base(&mut self, element: NodeId, base: PercentageBase, size: f64) {
        self.overrides.insert((element, base), size);
    }
}

impl Default for StaticLayout {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl LayoutContext for StaticLayout {
    fn unit_scale(&self, _element: NodeId, unit: &Unit) -> Option<f64> {
        if let Some(scale) = absolute_unit_scale(unit) {
            return Some(scale);
        }
        let (vw, vh) = (self.viewport_width / 100.0, self.viewport_height / 100.0);
        match unit {
            Unit::Em | Unit::Rem => Some(self.font_size),
            Unit::Ex | Unit::Ch => Some(self.font_size / 2.0),
            Unit::Vw => Some(vw),
            Unit::Vh => Some(vh),
            Unit::Vmin => Some(vw.min(vh)),
            Unit::Vmax => Some(vw.max(vh)),
            _ => None,
        }
    }

    fn percentage_base(&self, element: NodeId, base: PercentageBase) -> Option<f64> {
        if let Some(size) = self.overrides.get(&(element, base)) {
            return Some(*size);
        }
        Some(match base {
            PercentageBase::ContainingBlockWidth => self.viewport_width,
            PercentageBase::ContainingBlockHeight => self.viewport_height,
            PercentageBase::ParentFontSize => self.font_size,
        })
    }
}
