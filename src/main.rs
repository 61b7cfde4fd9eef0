//! Scope Engine CLI
//!
//! Thin command-line surface over the library: discover and categorize
//! files, analyze single-file dependencies, score change impact, map the
//! relationship graph, and load theme contexts. Output is pretty-printed
//! JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scope_engine::analysis::{dependency, discovery, impact};
use scope_engine::config::{Args, Command, EngineConfig};
use scope_engine::scope::ScopeEngine;
use scope_engine::types::ContextMode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = args.command.clone();
    let config: EngineConfig = args.into();
    let Some(command) = command else {
        anyhow::bail!("no command given; run with --help for usage");
    };

    let output = match command {
        Command::Discover { include, exclude } => {
            let files = discovery::discover(&config.workspace, &include, &exclude)
                .context("file discovery failed")?;
            serde_json::to_value(files)?
        }
        Command::Analyze { file } => {
            let record = dependency::analyze(&config.workspace, &file).await;
            serde_json::to_value(record)?
        }
        Command::Impact { file } => {
            let engine = ScopeEngine::new(config);
            let report = engine
                .file_impact(&file)
                .await
                .context("impact assessment failed")?;
            serde_json::to_value(report)?
        }
        Command::Relationships => {
            let map = impact::map_relationships(&config.workspace)
                .await
                .context("relationship mapping failed")?;
            serde_json::to_value(map)?
        }
        Command::Context { theme, mode, force } => {
            let mode: ContextMode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let engine = ScopeEngine::new(config);
            let result = engine
                .load_context(&theme, mode, force)
                .await
                .with_context(|| format!("loading context for theme {theme}"))?;
            serde_json::to_value(result)?
        }
        Command::Escalate { mode, issue } => {
            let mode: ContextMode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let engine = ScopeEngine::new(config);
            let assessment = engine.assess_escalation(mode, &issue).await;
            serde_json::to_value(assessment)?
        }
        Command::Themes => {
            let engine = ScopeEngine::new(config);
            let names = engine.theme_store().theme_names().await;
            serde_json::to_value(names)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
