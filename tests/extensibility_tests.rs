//! Tests for the plugin pipeline: registration, dispatch, isolation
//!
//! These cover the extension surface: declared stage capabilities, stable
//! token identity, registration order, contribution merging, and the
//! guarantee that a failing hook never takes down the pass.

use envpipe::{
    EnvLoader, EnvPlugin, EnvValue, HookContext, LineClass, PluginError, PluginMeta, PluginRegistry,
    SourceLine, Stage,
};

/// Plugin that counts value-bearing lines and publishes the total
struct LineCounter {
    seen: usize,
}

impl LineCounter {
    fn new() -> Self {
        Self { seen: 0 }
    }
}

impl EnvPlugin for LineCounter {
    fn meta(&self) -> PluginMeta {
        PluginMeta::new("line-counter", "1.0.0")
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::ParseLine, Stage::PostParse]
    }

    fn on_parse_line(
        &mut self,
        line: &SourceLine<'_>,
        _ctx: &mut HookContext<'_>,
    ) -> Result<(), PluginError> {
        if !line.class.is_inert() {
            self.seen += 1;
        }
        Ok(())
    }

    fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        let seen = std::mem::take(&mut self.seen);
        ctx.register("LINES_SEEN", seen.to_string());
        Ok(())
    }
}

/// Plugin whose parse-line hook fails on one specific line
struct FailsOnLine {
    failing_index: usize,
    processed: Vec<usize>,
}

impl EnvPlugin for FailsOnLine {
    fn meta(&self) -> PluginMeta {
        PluginMeta::new("fails-on-line", "1.0.0")
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::ParseLine, Stage::PostParse]
    }

    fn on_parse_line(
        &mut self,
        line: &SourceLine<'_>,
        _ctx: &mut HookContext<'_>,
    ) -> Result<(), PluginError> {
        if line.index == self.failing_index {
            return Err(PluginError::new("fails-on-line", "refused this line"));
        }
        self.processed.push(line.index);
        Ok(())
    }

    fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        let processed = std::mem::take(&mut self.processed);
        ctx.register(
            "PROCESSED",
            processed
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(","),
        );
        Ok(())
    }
}

fn loader_with(plugin: Box<dyn EnvPlugin>) -> EnvLoader {
    EnvLoader::builder()
        .with_logging(false)
        .with_plugin(plugin)
        .build()
}

#[test]
fn plugin_contributions_merge_into_the_store() {
    let mut loader = loader_with(Box::new(LineCounter::new()));
    loader.load_str("A=1\n# comment\nB=2\n\nC=3\n").unwrap();

    assert_eq!(loader.get("LINES_SEEN").unwrap().as_str(), Some("3"));
}

#[test]
fn a_hook_failure_on_one_line_does_not_stop_the_pass() {
    // The hook refuses line index 2; every other line is still processed
    // and the core entries all merge.
    let mut loader = loader_with(Box::new(FailsOnLine {
        failing_index: 2,
        processed: Vec::new(),
    }));
    loader.load_str("L0=a\nL1=b\nL2=c\nL3=d\nL4=e\n").unwrap();

    assert_eq!(loader.get("PROCESSED").unwrap().as_str(), Some("0,1,3,4,5"));
    for key in ["L0", "L1", "L2", "L3", "L4"] {
        assert!(loader.get(key).is_some());
    }
}

#[test]
fn contributions_made_during_the_line_pass_interpolate() {
    struct Provider;

    impl EnvPlugin for Provider {
        fn meta(&self) -> PluginMeta {
            PluginMeta::new("provider", "1.0.0")
        }

        fn stages(&self) -> &'static [Stage] {
            &[Stage::ParseLine]
        }

        fn on_parse_line(
            &mut self,
            line: &SourceLine<'_>,
            ctx: &mut HookContext<'_>,
        ) -> Result<(), PluginError> {
            if line.index == 0 {
                ctx.register("INJECTED", "from-plugin");
            }
            Ok(())
        }
    }

    let mut loader = loader_with(Box::new(Provider));
    loader.load_str("REF=$INJECTED\n").unwrap();

    assert_eq!(loader.get("REF").unwrap().as_str(), Some("from-plugin"));
}

#[test]
fn post_parse_hooks_see_the_assembled_payload() {
    struct Summarizer;

    impl EnvPlugin for Summarizer {
        fn meta(&self) -> PluginMeta {
            PluginMeta::new("summarizer", "1.0.0")
        }

        fn stages(&self) -> &'static [Stage] {
            &[Stage::PostParse]
        }

        fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
            let total = ctx.payload().vars.len();
            ctx.register("TOTAL_KEYS", total.to_string());
            Ok(())
        }
    }

    let mut loader = loader_with(Box::new(Summarizer));
    loader.load_str("A=1\nB=2\nC=3\n").unwrap();

    assert_eq!(loader.get("TOTAL_KEYS").unwrap().as_str(), Some("3"));
}

#[test]
fn identical_metadata_registers_once() {
    let mut loader = EnvLoader::builder().with_logging(false).build();
    let first = loader.use_plugin(Box::new(LineCounter::new()));
    let second = loader.use_plugin(Box::new(LineCounter::new()));

    assert_eq!(first, second);
    let stat = loader.stat();
    assert_eq!(stat.plugins.len(), 1);
    assert_eq!(stat.plugins[0].name, "line-counter");
}

#[test]
fn removed_plugins_stop_contributing() {
    let mut loader = EnvLoader::builder().with_logging(false).build();
    let token = loader.use_plugin(Box::new(LineCounter::new()));
    assert!(loader.remove_plugin(token));
    assert!(!loader.remove_plugin(token));

    loader.load_str("A=1\n").unwrap();
    assert!(loader.get("LINES_SEEN").is_none());
    assert!(loader.stat().plugins.is_empty());
}

#[test]
fn registration_order_is_preserved_in_dispatch_and_stat() {
    struct Tagger {
        name: &'static str,
    }

    impl EnvPlugin for Tagger {
        fn meta(&self) -> PluginMeta {
            PluginMeta::new(self.name, "1.0.0")
        }

        fn stages(&self) -> &'static [Stage] {
            &[Stage::PostParse]
        }

        fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
            let trail = ctx
                .payload()
                .vars
                .get("TRAIL")
                .and_then(EnvValue::as_str)
                .unwrap_or("")
                .to_string();
            ctx.register("TRAIL", format!("{trail}{};", self.name));
            Ok(())
        }
    }

    let mut loader = EnvLoader::builder()
        .with_logging(false)
        .with_plugin(Box::new(Tagger { name: "first" }))
        .with_plugin(Box::new(Tagger { name: "second" }))
        .build();
    loader.load_str("A=1\n").unwrap();

    assert_eq!(loader.get("TRAIL").unwrap().as_str(), Some("first;second;"));
    let names: Vec<String> = loader
        .stat()
        .plugins
        .iter()
        .map(|meta| meta.name.clone())
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn registry_works_standalone_for_embedders() {
    let mut registry = PluginRegistry::new();
    let token = registry.register(Box::new(LineCounter::new()));

    assert!(registry.contains(token));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.metas()[0].name, "line-counter");
    assert!(registry.unregister(token));
    assert!(registry.is_empty());
}

#[test]
fn classified_lines_reach_hooks_with_their_class() {
    struct ClassRecorder {
        comments: usize,
    }

    impl EnvPlugin for ClassRecorder {
        fn meta(&self) -> PluginMeta {
            PluginMeta::new("class-recorder", "1.0.0")
        }

        fn stages(&self) -> &'static [Stage] {
            &[Stage::ParseLine, Stage::PostParse]
        }

        fn on_parse_line(
            &mut self,
            line: &SourceLine<'_>,
            _ctx: &mut HookContext<'_>,
        ) -> Result<(), PluginError> {
            if matches!(line.class, LineClass::Comment) {
                self.comments += 1;
            }
            Ok(())
        }

        fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
            let comments = std::mem::take(&mut self.comments);
            ctx.register("COMMENTS", comments.to_string());
            Ok(())
        }
    }

    let mut loader = loader_with(Box::new(ClassRecorder { comments: 0 }));
    loader.load_str("# one\nA=1\n# two\n").unwrap();

    assert_eq!(loader.get("COMMENTS").unwrap().as_str(), Some("2"));
}
