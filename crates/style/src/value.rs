//! Style values as they flow through the Assigned → Specified → Computed
//! pipeline.

use std::fmt;

use bitflags::bitflags;
use css::{CssToken, tokenize};

// ─────────────────────────────────────────────────────────────────────────────
// Unit
// ─────────────────────────────────────────────────────────────────────────────

/// Length unit of a [`StyleValue::Dimension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    Px,
    Em,
    Rem,
    Ex,
    Ch,
    Vw,
    Vh,
    Vmin,
    Vmax,
    Cm,
    Mm,
    Q,
    In,
    Pt,
    Pc,
    /// Anything else, lowercased.
    Other(String),
}

impl Unit {
    /// Parse a unit tag, ASCII case-insensitively.
    pub fn from_tag(tag: &str) -> Unit {
        match tag.to_ascii_lowercase().as_str() {
            "px" => Unit::Px,
            "em" => Unit::Em,
            "rem" => Unit::Rem,
            "ex" => Unit::Ex,
            "ch" => Unit::Ch,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            "vmin" => Unit::Vmin,
            "vmax" => Unit::Vmax,
            "cm" => Unit::Cm,
            "mm" => Unit::Mm,
            "q" => Unit::Q,
            "in" => Unit::In,
            "pt" => Unit::Pt,
            "pc" => Unit::Pc,
            other => Unit::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Rem => "rem",
            Unit::Ex => "ex",
            Unit::Ch => "ch",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Vmin => "vmin",
            Unit::Vmax => "vmax",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::Q => "q",
            Unit::In => "in",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ValueKinds
// ─────────────────────────────────────────────────────────────────────────────

bitflags! {
    /// One bit per [`StyleValue`] variant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValueKinds: u16 {
        const UNSET = 1 << 0;
        const INITIAL = 1 << 1;
        const INHERIT = 1 << 2;
        const AUTO = 1 << 3;
        const NONE = 1 << 4;
        const KEYWORD = 1 << 5;
        const INTEGER = 1 << 6;
        const NUMBER = 1 << 7;
        const PERCENTAGE = 1 << 8;
        const DIMENSION = 1 << 9;
        const STRING = 1 << 10;
        const CURRENT_COLOR = 1 << 11;

        /// Accepted by every property.
        const CSS_WIDE = Self::UNSET.bits() | Self::INITIAL.bits() | Self::INHERIT.bits();
        const LENGTH_PERCENTAGE = Self::DIMENSION.bits() | Self::PERCENTAGE.bits();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StyleValue
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StyleValue {
    /// Nothing assigned.
    #[default]
    Unset,
    Initial,
    Inherit,
    Auto,
    None,
    /// Lowercase identifier such as `block` or `red`.
    Keyword(String),
    Integer(i64),
    Number(f64),
    Percentage(f64),
    Dimension { value: f64, unit: Unit },
    String(String),
    CurrentColor,
}

impl StyleValue {
    pub fn kind(&self) -> ValueKinds {
        match self {
            StyleValue::Unset => ValueKinds::UNSET,
            StyleValue::Initial => ValueKinds::INITIAL,
            StyleValue::Inherit => ValueKinds::INHERIT,
            StyleValue::Auto => ValueKinds::AUTO,
            StyleValue::None => ValueKinds::NONE,
            StyleValue::Keyword(_) => ValueKinds::KEYWORD,
            StyleValue::Integer(_) => ValueKinds::INTEGER,
            StyleValue::Number(_) => ValueKinds::NUMBER,
            StyleValue::Percentage(_) => ValueKinds::PERCENTAGE,
            StyleValue::Dimension { .. } => ValueKinds::DIMENSION,
            StyleValue::String(_) => ValueKinds::STRING,
            StyleValue::CurrentColor => ValueKinds::CURRENT_COLOR,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            StyleValue::Unset => "unset",
            StyleValue::Initial => "initial",
            StyleValue::Inherit => "inherit",
            StyleValue::Auto => "auto",
            StyleValue::None => "none",
            StyleValue::Keyword(_) => "keyword",
            StyleValue::Integer(_) => "integer",
            StyleValue::Number(_) => "number",
            StyleValue::Percentage(_) => "percentage",
            StyleValue::Dimension { .. } => "dimension",
            StyleValue::String(_) => "string",
            StyleValue::CurrentColor => "currentcolor",
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, StyleValue::Unset)
    }

    pub fn keyword(word: &str) -> Self {
        StyleValue::Keyword(word.to_ascii_lowercase())
    }

    pub fn px(value: f64) -> Self {
        StyleValue::Dimension {
            value,
            unit: Unit::Px,
        }
    }

    pub fn dimension(value: f64, unit: Unit) -> Self {
        StyleValue::Dimension { value, unit }
    }

    /// Parse a single-component value such as `50%`, `2em`, `bold` or
    /// `"Helvetica"`. Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        let tokens = tokenize(text);
        let mut components = tokens
            .iter()
            .filter(|t| !t.is_whitespace() && !t.is_eof());
        let first = components.next()?;
        if components.next().is_some() {
            return None;
        }
        Self::from_token(first)
    }

    pub fn from_token(token: &CssToken) -> Option<Self> {
        Some(match token {
            CssToken::Ident(word) => match word.to_ascii_lowercase().as_str() {
                "unset" => StyleValue::Unset,
                "initial" => StyleValue::Initial,
                "inherit" => StyleValue::Inherit,
                "auto" => StyleValue::Auto,
                "none" => StyleValue::None,
                "currentcolor" => StyleValue::CurrentColor,
                other => StyleValue::Keyword(other.to_string()),
            },
            CssToken::Number {
                value,
                is_integer: true,
                ..
            } => StyleValue::Integer(*value as i64),
            CssToken::Number { value, .. } => StyleValue::Number(*value),
            CssToken::Percentage(value) => StyleValue::Percentage(*value),
            CssToken::Dimension { value, unit } => StyleValue::Dimension {
                value: *value,
                unit: Unit::from_tag(unit),
            },
            CssToken::String(s) => StyleValue::String(s.clone()),
            _ => return None,
        })
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Unset => f.write_str("unset"),
            StyleValue::Initial => f.write_str("initial"),
            StyleValue::Inherit => f.write_str("inherit"),
            StyleValue::Auto => f.write_str("auto"),
            StyleValue::None => f.write_str("none"),
            StyleValue::Keyword(word) => f.write_str(word),
            StyleValue::Integer(n) => write!(f, "{n}"),
            StyleValue::Number(n) => write!(f, "{n}"),
            StyleValue::Percentage(p) => write!(f, "{p}%"),
            StyleValue::Dimension { value, unit } => write!(f, "{value}{unit}"),
            StyleValue::String(s) => write!(f, "{s:?}"),
            StyleValue::CurrentColor => f.write_str("currentcolor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_parse_case_insensitively() {
        assert_eq!(Unit::from_tag("PX"), Unit::Px);
        assert_eq!(Unit::from_tag("Vmin"), Unit::Vmin);
        assert_eq!(Unit::from_tag("Q"), Unit::Q);
        assert_eq!(Unit::from_tag("Furlong"), Unit::Other("furlong".into()));
    }

    #[test]
    fn parse_single_values() {
        assert_eq!(StyleValue::parse("50%"), Some(StyleValue::Percentage(50.0)));
        assert_eq!(
            StyleValue::parse(" 2EM "),
            Some(StyleValue::dimension(2.0, Unit::Em))
        );
        assert_eq!(StyleValue::parse("700"), Some(StyleValue::Integer(700)));
        assert_eq!(StyleValue::parse("0.5"), Some(StyleValue::Number(0.5)));
        assert_eq!(StyleValue::parse("Bold"), Some(StyleValue::keyword("bold")));
        assert_eq!(StyleValue::parse("inherit"), Some(StyleValue::Inherit));
        assert_eq!(StyleValue::parse("currentColor"), Some(StyleValue::CurrentColor));
        assert_eq!(
            StyleValue::parse("'Helvetica Neue'"),
            Some(StyleValue::String("Helvetica Neue".into()))
        );
    }

    #[test]
    fn parse_rejects_multiple_components() {
        assert_eq!(StyleValue::parse("1px solid"), None);
        assert_eq!(StyleValue::parse(""), None);
        assert_eq!(StyleValue::parse("#fff"), None);
    }

    #[test]
    fn kinds_are_distinct_bits() {
        let all = [
            StyleValue::Unset,
            StyleValue::Initial,
            StyleValue::Inherit,
            StyleValue::Auto,
            StyleValue::None,
            StyleValue::keyword("x"),
            StyleValue::Integer(1),
            StyleValue::Number(1.0),
            StyleValue::Percentage(1.0),
            StyleValue::px(1.0),
            StyleValue::String("x".into()),
            StyleValue::CurrentColor,
        ];
        let mut seen = ValueKinds::empty();
        for value in &all {
            assert!(!seen.intersects(value.kind()), "{value} reuses a bit");
            seen |= value.kind();
        }
        assert!(seen.contains(ValueKinds::CSS_WIDE));
    }

    #[test]
    fn display() {
        assert_eq!(StyleValue::px(150.0).to_string(), "150px");
        assert_eq!(StyleValue::Percentage(50.0).to_string(), "50%");
        assert_eq!(StyleValue::String("a".into()).to_string(), "\"a\"");
    }
}
