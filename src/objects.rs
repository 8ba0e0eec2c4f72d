//! Object-path aggregation
//!
//! Reassembles `parent->child` style lines into nested-path keys. A parent
//! line declares a value; the immediately following `->child=...` lines
//! supply key structure only — every derived entry inherits the parent's
//! value. Aggregation is a two-pass reconstruction and is packaged as the
//! built-in plugin exercising the pipeline hook API.

use smallvec::SmallVec;

use crate::decoder::decode;
use crate::error::PluginError;
use crate::plugin::{EnvPlugin, HookContext, PluginMeta, Stage};
use crate::tokenizer::{LineClass, SourceLine};

/// Splits an object-path key into its non-empty segments
pub fn path_segments(key: &str) -> SmallVec<[&str; 4]> {
    key.split("->").filter(|segment| !segment.is_empty()).collect()
}

#[derive(Debug)]
struct RecordedLine {
    index: usize,
    key: String,
    value: String,
    child: bool,
}

/// Built-in plugin aggregating `->` path lines into the objects side-mapping
///
/// Registered automatically when objects mode is on. The parse-line hook
/// records every value-bearing line; the post-parse hook scans the recorded
/// sequence for parent/child runs and contributes the derived entries.
#[derive(Debug, Default)]
pub struct ObjectPathPlugin {
    lines: Vec<RecordedLine>,
}

impl ObjectPathPlugin {
    /// Creates the aggregation plugin
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnvPlugin for ObjectPathPlugin {
    fn meta(&self) -> PluginMeta {
        PluginMeta::new("object-paths", env!("CARGO_PKG_VERSION"))
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::ParseLine, Stage::PostParse]
    }

    fn on_parse_line(
        &mut self,
        line: &SourceLine<'_>,
        ctx: &mut HookContext<'_>,
    ) -> Result<(), PluginError> {
        if !ctx.options().objects {
            return Ok(());
        }
        let (key, value) = match &line.class {
            LineClass::Pair { key, value } => (*key, *value),
            LineClass::Typed { key, value, .. } => (*key, *value),
            LineClass::Path { key, value } => (*key, *value),
            _ => return Ok(()),
        };
        self.lines.push(RecordedLine {
            index: line.index,
            key: key.to_string(),
            value: decode(value),
            child: key.starts_with("->"),
        });
        Ok(())
    }

    fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        let lines = std::mem::take(&mut self.lines);
        if !ctx.options().objects {
            return Ok(());
        }
        for (position, parent) in lines.iter().enumerate() {
            if parent.child {
                continue;
            }
            let name = path_segments(&parent.key)
                .first()
                .copied()
                .unwrap_or(&parent.key);

            // Children must follow on consecutive source lines; the first
            // gap or non-child line ends the run.
            let mut expected = parent.index + 1;
            for child in &lines[position + 1..] {
                if child.index != expected || !child.child {
                    break;
                }
                ctx.payload()
                    .objects
                    .insert(format!("{name}{}", child.key), parent.value.clone().into());
                expected += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse_str};

    fn objects_options() -> ParseOptions {
        ParseOptions {
            objects: true,
            ..ParseOptions::default()
        }
    }

    #[test]
    fn splits_path_segments() {
        let segments = path_segments("db->pool->size");
        assert_eq!(segments.as_slice(), ["db", "pool", "size"]);
        assert_eq!(path_segments("->child").as_slice(), ["child"]);
    }

    #[test]
    fn children_inherit_the_parent_value() {
        let payload = parse_str("parent=X\n->child=ignored\n", &objects_options()).unwrap();
        assert_eq!(
            payload.objects.get("parent->child").unwrap().as_str(),
            Some("X")
        );
    }

    #[test]
    fn multiple_children_share_one_parent() {
        let source = "db=main\n->host=a\n->port=b\n";
        let payload = parse_str(source, &objects_options()).unwrap();
        assert_eq!(payload.objects.get("db->host").unwrap().as_str(), Some("main"));
        assert_eq!(payload.objects.get("db->port").unwrap().as_str(), Some("main"));
    }

    #[test]
    fn aggregation_stops_at_first_non_child_line() {
        let source = "parent=X\n->a=1\nOTHER=2\n->b=3\n";
        let payload = parse_str(source, &objects_options()).unwrap();
        assert!(payload.objects.contains_key("parent->a"));
        assert!(!payload.objects.contains_key("parent->b"));
    }

    #[test]
    fn blank_line_ends_the_run() {
        let source = "parent=X\n\n->a=1\n";
        let payload = parse_str(source, &objects_options()).unwrap();
        assert!(!payload.objects.contains_key("parent->a"));
    }

    #[test]
    fn path_parent_attaches_children_to_its_first_segment() {
        let source = "db->pool=deep\n->timeout=5\n";
        let payload = parse_str(source, &objects_options()).unwrap();
        assert_eq!(payload.objects.get("db->pool").unwrap().as_str(), Some("deep"));
        assert_eq!(payload.objects.get("db->timeout").unwrap().as_str(), Some("deep"));
    }

    #[test]
    fn standalone_path_lines_keep_their_own_value() {
        let payload = parse_str("db->host=localhost\n", &objects_options()).unwrap();
        assert_eq!(
            payload.objects.get("db->host").unwrap().as_str(),
            Some("localhost")
        );
    }

    #[test]
    fn objects_mode_off_records_nothing() {
        let payload = parse_str("parent=X\n->child=1\n", &ParseOptions::default()).unwrap();
        assert!(payload.objects.is_empty());
    }
}
