//! Character classes used to count syllabic units in a transcript.

fn is_hiragana(c: char) -> bool {
    ('\u{3041}'..='\u{3096}').contains(&c)
}

fn is_katakana(c: char) -> bool {
    // Includes the prolonged sound mark ー (U+30FC) and half-width forms.
    ('\u{30A1}'..='\u{30FA}').contains(&c)
        || c == '\u{30FC}'
        || ('\u{FF66}'..='\u{FF9D}').contains(&c)
}

fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

/// ASCII and full-width letters and digits.
fn is_latin_alphanumeric(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('\u{FF10}'..='\u{FF19}').contains(&c)
        || ('\u{FF21}'..='\u{FF3A}').contains(&c)
        || ('\u{FF41}'..='\u{FF5A}').contains(&c)
}

fn is_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{F900}'..='\u{FAFF}').contains(&c)
        || c == '\u{3005}' // 々
}

/// True when the text has kanji whose reading must be resolved before
/// syllables can be counted.
pub fn needs_reading(text: &str) -> bool {
    text.chars().any(is_ideograph)
}

/// Kana plus letters and digits. Spaces, punctuation and anything still
/// written in kanji are not counted.
pub fn count_syllabic_units(text: &str) -> usize {
    text.chars()
        .filter(|&c| is_kana(c) || is_latin_alphanumeric(c))
        .count()
}
