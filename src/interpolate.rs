//! Recursive placeholder interpolation
//!
//! A placeholder is the configured prefix character (default `$`), an
//! optional `{`, an identifier of word characters and dots, and an optional
//! `}`. Lookups hit the in-progress payload first, then (in objects mode) the
//! object-path side-mapping with dots translated to `->`, then previously
//! committed store values. Looked-up values are themselves resolved before
//! substitution, so chained references work to any depth — guarded by cycle
//! detection.

use crate::error::ParseError;
use crate::parser::ParsePayload;
use crate::store::EnvStore;

/// Placeholder resolver for one parse pass
///
/// Borrows an immutable snapshot of the payload: the parser resolves entries
/// into a separate copy so that recursive lookups always see raw text.
pub struct Interpolator<'a> {
    prefix: char,
    objects: bool,
    payload: &'a ParsePayload,
    store: Option<&'a EnvStore>,
}

impl<'a> Interpolator<'a> {
    /// Creates a resolver over a payload snapshot and an optional store
    pub fn new(
        prefix: char,
        objects: bool,
        payload: &'a ParsePayload,
        store: Option<&'a EnvStore>,
    ) -> Self {
        Self {
            prefix,
            objects,
            payload,
            store,
        }
    }

    /// Resolves all placeholders in a free-standing value
    pub fn resolve(&self, value: &str) -> Result<String, ParseError> {
        let mut stack = Vec::new();
        self.resolve_inner(value, &mut stack)
    }

    /// Resolves the value of a named entry
    ///
    /// The entry's own key seeds the in-resolution stack so that direct
    /// self-references are caught as cycles.
    pub fn resolve_entry(&self, key: &str, value: &str) -> Result<String, ParseError> {
        let mut stack = vec![key.to_string()];
        self.resolve_inner(value, &mut stack)
    }

    fn resolve_inner(&self, value: &str, stack: &mut Vec<String>) -> Result<String, ParseError> {
        if !value.contains(self.prefix) {
            return Ok(value.to_string());
        }
        let chars: Vec<char> = value.chars().collect();
        let mut out = String::with_capacity(value.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c != self.prefix {
                out.push(c);
                i += 1;
                continue;
            }

            // A backslash immediately before the prefix escapes it: the
            // prefix is emitted literally and nothing is looked up.
            if i > 0 && chars[i - 1] == '\\' {
                out.pop();
                out.push(c);
                i += 1;
                continue;
            }

            let mut j = i + 1;
            let braced = j < chars.len() && chars[j] == '{';
            if braced {
                j += 1;
            }
            let ident_start = j;
            while j < chars.len() && is_ident_char(chars[j]) {
                j += 1;
            }
            let ident: String = chars[ident_start..j].iter().collect();
            if ident.is_empty() {
                // A bare prefix is not a placeholder; leave it verbatim.
                out.push(c);
                i += 1;
                continue;
            }
            if braced && j < chars.len() && chars[j] == '}' {
                j += 1;
            }

            match self.lookup(&ident) {
                Some((canonical, raw)) => {
                    if stack.contains(&canonical) {
                        stack.push(canonical);
                        return Err(ParseError::CyclicInterpolation {
                            chain: stack.clone(),
                        });
                    }
                    stack.push(canonical);
                    let resolved = self.resolve_inner(&raw, stack)?;
                    stack.pop();
                    out.push_str(&resolved);
                }
                // Unresolvable identifiers drop the placeholder silently.
                None => {}
            }
            i = j;
        }

        Ok(out)
    }

    /// Looks up an identifier, returning its canonical key and raw text
    ///
    /// The canonical key (the object-path form for dotted identifiers that
    /// hit the side-mapping) is what the cycle guard tracks.
    fn lookup(&self, ident: &str) -> Option<(String, String)> {
        if let Some(value) = self.payload.vars.get(ident) {
            return Some((ident.to_string(), value.to_string()));
        }
        if self.objects {
            let translated = ident.replace('.', "->");
            if let Some(value) = self.payload.objects.get(&translated) {
                return Some((translated, value.to_string()));
            }
        }
        if let Some(store) = self.store {
            if let Some(value) = store.get(ident) {
                return Some((ident.to_string(), value.to_string()));
            }
            if self.objects {
                let translated = ident.replace('.', "->");
                if let Some(value) = store.objects().get(&translated) {
                    return Some((translated, value.to_string()));
                }
            }
        }
        None
    }
}

/// Identifier charset: ASCII word characters and dots
fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::EnvValue;

    fn payload(pairs: &[(&str, &str)]) -> ParsePayload {
        let mut payload = ParsePayload::new();
        for (key, value) in pairs {
            payload
                .vars
                .insert((*key).to_string(), EnvValue::String((*value).to_string()));
        }
        payload
    }

    #[test]
    fn resolves_plain_reference() {
        let payload = payload(&[("HOST", "localhost")]);
        let resolver = Interpolator::new('$', false, &payload, None);
        assert_eq!(resolver.resolve("http://$HOST/").unwrap(), "http://localhost/");
    }

    #[test]
    fn resolves_braced_reference() {
        let payload = payload(&[("HOST", "localhost")]);
        let resolver = Interpolator::new('$', false, &payload, None);
        assert_eq!(resolver.resolve("${HOST}:80").unwrap(), "localhost:80");
    }

    #[test]
    fn resolves_transitively() {
        let payload = payload(&[("A", "1"), ("B", "$A"), ("C", "$B")]);
        let resolver = Interpolator::new('$', false, &payload, None);
        assert_eq!(resolver.resolve_entry("C", "$B").unwrap(), "1");
    }

    #[test]
    fn escaped_prefix_is_literal() {
        let payload = payload(&[("A", "value")]);
        let resolver = Interpolator::new('$', false, &payload, None);
        assert_eq!(resolver.resolve("\\$A").unwrap(), "$A");
    }

    #[test]
    fn unresolved_placeholder_drops_silently() {
        let payload = payload(&[]);
        let resolver = Interpolator::new('$', false, &payload, None);
        assert_eq!(resolver.resolve("x-$MISSING-y").unwrap(), "x--y");
    }

    #[test]
    fn bare_prefix_stays_verbatim() {
        let payload = payload(&[]);
        let resolver = Interpolator::new('$', false, &payload, None);
        assert_eq!(resolver.resolve("cost: 5$").unwrap(), "cost: 5$");
    }

    #[test]
    fn direct_cycle_is_detected() {
        let payload = payload(&[("A", "$A")]);
        let resolver = Interpolator::new('$', false, &payload, None);
        let err = resolver.resolve_entry("A", "$A").unwrap_err();
        assert!(err.is_cyclic());
    }

    #[test]
    fn mutual_cycle_is_detected() {
        let payload = payload(&[("A", "$B"), ("B", "$A")]);
        let resolver = Interpolator::new('$', false, &payload, None);
        let err = resolver.resolve_entry("A", "$B").unwrap_err();
        match err {
            ParseError::CyclicInterpolation { chain } => {
                assert_eq!(chain, vec!["A", "B", "A"]);
            }
        }
    }

    #[test]
    fn dotted_identifier_falls_back_to_objects() {
        let mut payload = payload(&[]);
        payload.objects.insert(
            "db->host".to_string(),
            EnvValue::String("localhost".to_string()),
        );
        let resolver = Interpolator::new('$', true, &payload, None);
        assert_eq!(resolver.resolve("$db.host").unwrap(), "localhost");
    }

    #[test]
    fn custom_prefix_character() {
        let payload = payload(&[("NAME", "app")]);
        let resolver = Interpolator::new('%', false, &payload, None);
        assert_eq!(resolver.resolve("%NAME v1").unwrap(), "app v1");
        assert_eq!(resolver.resolve("$NAME v1").unwrap(), "$NAME v1");
    }

    #[test]
    fn store_values_act_as_fallback() {
        let mut store = EnvStore::new();
        let mut committed = ParsePayload::new();
        committed
            .vars
            .insert("BASE".to_string(), EnvValue::String("/srv".to_string()));
        store.merge(committed);

        let payload = payload(&[]);
        let resolver = Interpolator::new('$', false, &payload, Some(&store));
        assert_eq!(resolver.resolve("$BASE/app").unwrap(), "/srv/app");
    }
}
