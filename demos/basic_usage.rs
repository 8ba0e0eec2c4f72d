//! Basic usage: parse an in-memory environment source and query it

use envpipe::{CoercionMode, EnvLoader};

fn main() -> Result<(), envpipe::EnvError> {
    tracing_subscriber::fmt().compact().init();

    let source = "\
# application settings
APP_NAME=demo
HOST=localhost
PORT:number=8080
DEBUG=true
URL=http://$HOST:$PORT/api
GREETING=\"hello\\nworld\"
";

    let mut loader = EnvLoader::builder()
        .with_types(true)
        .with_coercion(CoercionMode::Auto)
        .build();
    loader.load_str(source)?;

    for key in ["APP_NAME", "HOST", "PORT", "DEBUG", "URL", "GREETING"] {
        if let Some(value) = loader.get(key) {
            println!("{key} = {value:?}");
        }
    }

    let stat = loader.stat();
    println!(
        "initialized={} version={} plugins={}",
        stat.initialized,
        stat.version,
        stat.plugins.len()
    );
    Ok(())
}
