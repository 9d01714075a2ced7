//! Alignment anchors for padding images of unequal size.
//!
//! An [`Anchor`] is one of nine named points (vertical × horizontal).
//! Its string form is `"<vertical>-<horizontal>"`, e.g. `"bottom-center"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Vertical placement of the smaller image inside the padded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlign {
    /// Flush with the top edge.
    #[default]
    Top,
    /// Centered, rounding the top padding down.
    Middle,
    /// Flush with the bottom edge.
    Bottom,
}

/// Horizontal placement of the smaller image inside the padded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered, rounding the left padding down.
    Center,
    /// Flush with the right edge.
    Right,
}

impl VerticalAlign {
    /// Rows of padding above an image of height `actual` in a canvas of
    /// height `desired`.
    ///
    /// Callers must ensure `actual <= desired`.
    #[must_use]
    pub const fn offset(self, actual: u32, desired: u32) -> u32 {
        match self {
            Self::Top => 0,
            Self::Middle => (desired - actual) / 2,
            Self::Bottom => desired - actual,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

impl HorizontalAlign {
    /// Columns of padding left of an image of width `actual` in a canvas
    /// of width `desired`.
    ///
    /// Callers must ensure `actual <= desired`.
    #[must_use]
    pub const fn offset(self, actual: u32, desired: u32) -> u32 {
        match self {
            Self::Left => 0,
            Self::Center => (desired - actual) / 2,
            Self::Right => desired - actual,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// One of the nine alignment points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Anchor {
    /// Vertical component.
    pub vertical: VerticalAlign,
    /// Horizontal component.
    pub horizontal: HorizontalAlign,
}

impl Anchor {
    /// All nine anchors in row-major order, `top-left` first.
    pub const ALL: [Self; 9] = [
        Self::new(VerticalAlign::Top, HorizontalAlign::Left),
        Self::new(VerticalAlign::Top, HorizontalAlign::Center),
        Self::new(VerticalAlign::Top, HorizontalAlign::Right),
        Self::new(VerticalAlign::Middle, HorizontalAlign::Left),
        Self::new(VerticalAlign::Middle, HorizontalAlign::Center),
        Self::new(VerticalAlign::Middle, HorizontalAlign::Right),
        Self::new(VerticalAlign::Bottom, HorizontalAlign::Left),
        Self::new(VerticalAlign::Bottom, HorizontalAlign::Center),
        Self::new(VerticalAlign::Bottom, HorizontalAlign::Right),
    ];

    /// Create an anchor from its two components.
    #[must_use]
    pub const fn new(vertical: VerticalAlign, horizontal: HorizontalAlign) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.vertical.as_str(), self.horizontal.as_str())
    }
}

/// Error returned when parsing an unknown anchor name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor '{0}', expected one of top|middle|bottom-left|center|right")]
pub struct ParseAnchorError(String);

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAnchorError(s.to_string());
        let (v, h) = s.trim().split_once('-').ok_or_else(err)?;
        let vertical = match v {
            "top" => VerticalAlign::Top,
            "middle" => VerticalAlign::Middle,
            "bottom" => VerticalAlign::Bottom,
            _ => return Err(err()),
        };
        let horizontal = match h {
            "left" => HorizontalAlign::Left,
            "center" => HorizontalAlign::Center,
            "right" => HorizontalAlign::Right,
            _ => return Err(err()),
        };
        Ok(Self::new(vertical, horizontal))
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.to_string()
    }
}

impl TryFrom<String> for Anchor {
    type Error = ParseAnchorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_top_left() {
        assert_eq!(Anchor::default().to_string(), "top-left");
    }

    #[test]
    fn every_anchor_round_trips_through_its_name() {
        for anchor in Anchor::ALL {
            let parsed: Anchor = anchor.to_string().parse().unwrap();
            assert_eq!(parsed, anchor);
        }
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("top".parse::<Anchor>().is_err());
        assert!("center-middle".parse::<Anchor>().is_err());
        assert!("bottom-centre".parse::<Anchor>().is_err());
    }

    #[test]
    fn offsets_follow_the_anchor() {
        assert_eq!(VerticalAlign::Top.offset(10, 12), 0);
        assert_eq!(VerticalAlign::Middle.offset(10, 12), 1);
        assert_eq!(VerticalAlign::Bottom.offset(10, 12), 2);
        // Odd slack rounds down.
        assert_eq!(HorizontalAlign::Center.offset(4, 9), 2);
        assert_eq!(HorizontalAlign::Right.offset(4, 9), 5);
    }

    #[test]
    fn serde_uses_the_string_form() {
        let anchor = Anchor::new(VerticalAlign::Bottom, HorizontalAlign::Center);
        let json = serde_json::to_string(&anchor).unwrap();
        assert_eq!(json, r#""bottom-center""#);
        let back: Anchor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, anchor);
        assert!(serde_json::from_str::<Anchor>(r#""sideways""#).is_err());
    }
}
