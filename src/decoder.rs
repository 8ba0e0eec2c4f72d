//! Value decoding: quote stripping and escape expansion
//!
//! Decoding happens before interpolation: the decoder normalizes the raw
//! value text of a line, and the parser later feeds the decoded text through
//! the interpolation resolver.

/// Decodes the raw value text of a line
///
/// Rules, applied in order:
/// - empty input decodes to the empty string;
/// - a value wrapped in a single matching pair of `"` or `'` loses exactly
///   that pair, and double-quoted values additionally expand literal `\n`
///   sequences into real newlines;
/// - anything else is trimmed of surrounding whitespace, with no unescaping.
///
/// Single-quoted values are never escape-processed.
pub fn decode(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let bytes = raw.as_bytes();
    let double_quoted = raw.len() >= 2 && bytes[0] == b'"' && bytes[raw.len() - 1] == b'"';
    let single_quoted = raw.len() >= 2 && bytes[0] == b'\'' && bytes[raw.len() - 1] == b'\'';

    if double_quoted || single_quoted {
        let inner = &raw[1..raw.len() - 1];
        if double_quoted {
            inner.replace("\\n", "\n")
        } else {
            inner.to_string()
        }
    } else {
        raw.trim().to_string()
    }
}
