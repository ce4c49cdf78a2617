use unicode_normalization::UnicodeNormalization;

/// Normalize scraped text to NFC and collapse runs of whitespace to a
/// single space.
///
/// Profile pages mix precomposed and decomposed Cyrillic (й, ї) and pad
/// text nodes with indentation from the template.
pub fn clean_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    nfc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Like [`clean_text`], but an empty result becomes `None`.
pub fn non_empty(input: &str) -> Option<String> {
    let cleaned = clean_text(input);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Remove line breaks without touching other spacing, then trim.
///
/// History paragraphs use `<br>` for layout only; the text on either side
/// is joined directly.
pub fn strip_line_breaks(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    nfc.replace(['\n', '\r'], "").trim().to_string()
}
