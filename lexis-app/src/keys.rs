use lexis_core::InputKey;
use winit::keyboard::KeyCode;

/// Maps a pressed key to experiment input.
///
/// While `typing`, printable keys arrive as text for the setup form.
pub fn map_key(code: Option<KeyCode>, text: Option<&str>, typing: bool) -> Option<InputKey> {
    let named = match code {
        Some(KeyCode::Escape) => Some(InputKey::Escape),
        Some(KeyCode::Enter | KeyCode::NumpadEnter) => Some(InputKey::Enter),
        Some(KeyCode::Backspace) => Some(InputKey::Backspace),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    if typing {
        return text
            .filter(|t| !t.is_empty() && !t.chars().any(char::is_control))
            .map(|t| InputKey::Text(t.to_string()));
    }

    match code? {
        KeyCode::Space => Some(InputKey::Space),
        KeyCode::Digit1 | KeyCode::Numpad1 => Some(InputKey::One),
        KeyCode::Digit2 | KeyCode::Numpad2 => Some(InputKey::Two),
        KeyCode::Digit3 | KeyCode::Numpad3 => Some(InputKey::Three),
        _ => None,
    }
}
