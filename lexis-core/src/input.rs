use crate::trial::ResponseKey;

/// Keyboard input after platform key codes have been mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKey {
    Space,
    Escape,
    Enter,
    Backspace,
    One,
    Two,
    Three,
    /// Printable text typed into the setup form.
    Text(String),
}

impl InputKey {
    /// The key as a trial response, if it is one of the four accepted keys.
    pub fn as_response(&self) -> Option<ResponseKey> {
        match self {
            InputKey::One => Some(ResponseKey::One),
            InputKey::Two => Some(ResponseKey::Two),
            InputKey::Three => Some(ResponseKey::Three),
            InputKey::Escape => Some(ResponseKey::Escape),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_digits_and_escape_are_responses() {
        assert_eq!(InputKey::Two.as_response(), Some(ResponseKey::Two));
        assert_eq!(InputKey::Escape.as_response(), Some(ResponseKey::Escape));
        assert_eq!(InputKey::Space.as_response(), None);
        assert_eq!(InputKey::Text("1".into()).as_response(), None);
    }
}
