//! Score slot text handling shared by the text fields and the on-screen keypad.

/// Accepts an optional leading minus followed by digits, or nothing at all.
/// Text with digits must also fit in an `i64`.
pub fn is_valid_score_text(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    digits.is_empty() || raw.parse::<i64>().is_ok()
}

/// Blank slots and a lone minus sign count as zero.
pub fn parse_score(raw: &str) -> i64 {
    raw.parse::<i64>().unwrap_or(0)
}

/// True while the slot holds no number yet.
pub fn is_blank(raw: &str) -> bool {
    raw.is_empty() || raw == "-"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(u8),
    Minus,
    Backspace,
}

impl KeypadKey {
    /// Phone-style layout, three keys per row.
    pub const LAYOUT: [KeypadKey; 12] = [
        KeypadKey::Digit(1),
        KeypadKey::Digit(2),
        KeypadKey::Digit(3),
        KeypadKey::Digit(4),
        KeypadKey::Digit(5),
        KeypadKey::Digit(6),
        KeypadKey::Digit(7),
        KeypadKey::Digit(8),
        KeypadKey::Digit(9),
        KeypadKey::Minus,
        KeypadKey::Digit(0),
        KeypadKey::Backspace,
    ];

    pub fn label(self) -> String {
        match self {
            KeypadKey::Digit(d) => d.to_string(),
            KeypadKey::Minus => "-".to_string(),
            KeypadKey::Backspace => "⌫".to_string(),
        }
    }
}

/// Text the slot would hold after pressing `key`. A minus is only taken as
/// the first character; the result still has to pass [`is_valid_score_text`].
pub fn apply_key(current: &str, key: KeypadKey) -> String {
    let mut next = current.to_string();
    match key {
        KeypadKey::Digit(d) => {
            if let Some(c) = char::from_digit(u32::from(d), 10) {
                next.push(c);
            }
        }
        KeypadKey::Minus => {
            if next.is_empty() {
                next.push('-');
            }
        }
        KeypadKey::Backspace => {
            next.pop();
        }
    }
    next
}
