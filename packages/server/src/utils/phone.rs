/// Normalize a user-entered phone number to E.164, assuming US numbers when
/// no country code is given.
///
/// Returns `None` when the input has no digits.
pub fn normalize_e164(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        return (compact.len() > 1).then_some(compact);
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0 => None,
        10 => Some(format!("+1{digits}")),
        _ => Some(format!("+{digits}")),
    }
}
