use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic dimension a block of trials tests.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    High,
    Low,
    Shape,
    Size,
    Colour,
    Texture,
}

impl Condition {
    /// Every condition, in the order blocks are listed before shuffling.
    pub const ALL: [Condition; 6] = [
        Condition::Low,
        Condition::High,
        Condition::Shape,
        Condition::Size,
        Condition::Colour,
        Condition::Texture,
    ];

    /// Parses a raw stimulus-file label. Surrounding whitespace and case are ignored.
    pub fn from_label(raw: &str) -> Option<Self> {
        use Condition::*;
        Some(match raw.trim().to_lowercase().as_str() {
            "high" => High,
            "low" => Low,
            "shape" => Shape,
            "size" => Size,
            "colour" => Colour,
            "texture" => Texture,
            _ => return None,
        })
    }

    pub fn label(&self) -> &'static str {
        use Condition::*;
        match self {
            High => "high",
            Low => "low",
            Shape => "shape",
            Size => "size",
            Colour => "colour",
            Texture => "texture",
        }
    }

    /// Name shown to participants. Both meaning conditions read as "meaning".
    pub fn display_name(&self) -> &'static str {
        if self.is_meaning() {
            "meaning"
        } else {
            self.label()
        }
    }

    pub fn is_meaning(&self) -> bool {
        matches!(self, Condition::High | Condition::Low)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_normalized_before_matching() {
        assert_eq!(Condition::from_label("  High "), Some(Condition::High));
        assert_eq!(Condition::from_label("COLOUR"), Some(Condition::Colour));
        assert_eq!(Condition::from_label("texture\t"), Some(Condition::Texture));
        assert_eq!(Condition::from_label("color"), None);
        assert_eq!(Condition::from_label(""), None);
    }

    #[test]
    fn meaning_conditions_share_a_display_name() {
        assert_eq!(Condition::High.display_name(), "meaning");
        assert_eq!(Condition::Low.display_name(), "meaning");
        assert_eq!(Condition::Shape.display_name(), "shape");
    }

    #[test]
    fn all_lists_each_condition_once() {
        for c in Condition::ALL {
            assert_eq!(Condition::ALL.iter().filter(|x| **x == c).count(), 1);
            assert_eq!(Condition::from_label(c.label()), Some(c));
        }
    }
}
