mod cli;

use anyhow::Context;
use cue_inject::{EnvFiller, Injector, TfStateFiller};
use std::io::Write;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_env("CUE_INJECT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn run(cli: &cli::Cli) -> anyhow::Result<()> {
    let env = match &cli.pattern {
        Some(pattern) => {
            let pattern = regex::Regex::new(pattern).context("cannot parse pattern")?;
            EnvFiller::matching(|name| pattern.is_match(name))
        }
        None => EnvFiller::all(),
    };

    let mut injector = Injector::builder()
        .filler(env)
        .filler(TfStateFiller::new())
        .build();

    let value = injector
        .inject(&cli.src)
        .with_context(|| format!("failed to inject values to file {}", cli.src.display()))?;
    let rendered = render(&value, cli.format)
        .with_context(|| format!("failed to format file {}", cli.src.display()))?;

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("cannot write file {}", path.display()))?,
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}

fn render(value: &cuelite::Value, format: cli::OutputFormat) -> anyhow::Result<String> {
    let rendered = match format {
        cli::OutputFormat::Cue => cuelite::format(value),
        cli::OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&value.export()?)?;
            json.push('\n');
            json
        }
        cli::OutputFormat::Yaml => serde_yaml::to_string(&value.export()?)?,
    };

    Ok(rendered)
}
