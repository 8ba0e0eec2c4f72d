//! Plugin pipeline: contribute derived values from custom hooks

use envpipe::{
    EnvLoader, EnvPlugin, HookContext, PluginError, PluginMeta, SourceLine, Stage,
};

/// Collects keys ending in `_URL` and publishes a summary entry
struct UrlCollector {
    urls: Vec<String>,
}

impl EnvPlugin for UrlCollector {
    fn meta(&self) -> PluginMeta {
        PluginMeta::new("url-collector", "0.1.0")
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::ParseLine, Stage::PostParse]
    }

    fn on_parse_line(
        &mut self,
        line: &SourceLine<'_>,
        _ctx: &mut HookContext<'_>,
    ) -> Result<(), PluginError> {
        if let envpipe::LineClass::Pair { key, .. } = &line.class
            && key.ends_with("_URL")
        {
            self.urls.push((*key).to_string());
        }
        Ok(())
    }

    fn on_post_parse(&mut self, ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        let urls = std::mem::take(&mut self.urls);
        ctx.register("KNOWN_URLS", urls.join(","));
        Ok(())
    }
}

fn main() -> Result<(), envpipe::EnvError> {
    tracing_subscriber::fmt().compact().init();

    let mut loader = EnvLoader::builder()
        .with_objects(true)
        .with_plugin(Box::new(UrlCollector { urls: Vec::new() }))
        .build();

    loader.load_str(
        "HOST=localhost\nAPI_URL=http://$HOST/api\nDOCS_URL=http://$HOST/docs\ndb=primary\n->host=ignored\n",
    )?;

    println!("KNOWN_URLS = {:?}", loader.get("KNOWN_URLS"));
    println!("db->host   = {:?}", loader.store().objects().get("db->host"));
    Ok(())
}
