//! Validation and sanitizing rules for nicknames, chat and flavor text.

const FLAVOR_TEXT_MAX_LENGTH: usize = 255;
const REPLACEMENT: char = '\u{FFFD}';

/// Letters derived from the Latin script, which is what nicknames and chat
/// are restricted to. No emojis, no exotic scripts.
fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{00C0}'..='\u{00FF}').contains(&c) && c != '\u{00D7}' && c != '\u{00F7}'
        || ('\u{0100}'..='\u{024F}').contains(&c)
}

fn is_chat_char(c: char) -> bool {
    is_latin_letter(c)
        || c.is_ascii_digit()
        || c == '_'
        || c == '-'
        || c == ' '
        || (c.is_ascii_punctuation() && c != ';')
}

/// Checks if a nickname is valid. Nicknames start with a Latin letter and may
/// otherwise contain Latin letters, digits, underscore and minus.
pub fn is_nick_valid(nick: &str) -> bool {
    let mut chars = nick.chars();
    match chars.next() {
        Some(first) if is_latin_letter(first) => {}
        _ => return false,
    }
    chars.all(|c| is_latin_letter(c) || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Chat messages may not contain the semicolon sign or any fancy characters.
/// Forbidden characters are replaced with the Unicode replacement character.
pub fn sanitize_chat_message(text: &str) -> String {
    text.chars()
        .map(|c| if is_chat_char(c) { c } else { REPLACEMENT })
        .collect()
}

/// Flavor text follows the chat rules and is limited to 255 characters. If
/// the limit is exceeded, the text is truncated and ends in "..." to indicate
/// "there would be more".
pub fn sanitize_flavor_text(text: &str) -> String {
    if text.chars().count() <= FLAVOR_TEXT_MAX_LENGTH {
        return sanitize_chat_message(text);
    }
    let mut truncated: String = sanitize_chat_message(text)
        .chars()
        .take(FLAVOR_TEXT_MAX_LENGTH - 3)
        .collect();
    truncated.push_str("...");
    truncated
}
