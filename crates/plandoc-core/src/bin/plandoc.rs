//! `plandoc` command line
//!
//! Parses task documents, previews proposal batches as unified diffs, and
//! applies them. Logs go to stderr (`RUST_LOG`, default `info`); results go
//! to stdout.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use plandoc_core::composition::{parse_batch, ProposalBatch, ProposalNormalizer};
use plandoc_core::{DocumentStore, EngineConfig, Reconciler};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let document = Arg::new("document")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Task document to operate on");
    let proposals = Arg::new("proposals")
        .long("proposals")
        .short('p')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON file with producer proposals");

    Command::new("plandoc")
        .version(plandoc_core::VERSION)
        .about("Merge proposed tasks into planning documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML engine configuration"),
        )
        .subcommand(
            Command::new("parse")
                .about("Print the parsed structure of a document as JSON")
                .arg(document.clone()),
        )
        .subcommand(
            Command::new("preview")
                .about("Show the unified diff a batch would produce")
                .arg(document.clone())
                .arg(proposals.clone()),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a batch and print the report")
                .arg(document.clone())
                .arg(proposals.clone())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Compute the report without writing"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the report as JSON"),
                ),
        )
        .subcommand(
            Command::new("history")
                .about("Show where each proposal already lives")
                .arg(document)
                .arg(proposals),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

async fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_toml_str(&raw)
                .with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

async fn load_batch(path: &Path) -> Result<ProposalBatch> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading proposals {}", path.display()))?;
    let batch = parse_batch(&raw).with_context(|| format!("parsing proposals {}", path.display()))?;
    for rejected in &batch.rejected {
        tracing::warn!(id = %rejected.id, reason = %rejected.reason, "dropping malformed proposal");
    }
    Ok(batch)
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument '{name}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();
    let config = load_config(&matches).await?;
    let store = DocumentStore::new(Reconciler::new(config)?);
    let normalizer = ProposalNormalizer::new();

    match matches.subcommand() {
        Some(("parse", args)) => {
            let doc = store.parse(required_path(args, "document")?).await?;
            println!("{}", serde_json::to_string_pretty(doc.as_ref())?);
        }
        Some(("preview", args)) => {
            let document = required_path(args, "document")?;
            let batch = load_batch(required_path(args, "proposals")?).await?;
            let (block, report) = store.preview(document, &batch.proposals, &normalizer).await?;
            print!("{}", block.render_unified());
            eprintln!("{report}");
        }
        Some(("apply", args)) => {
            let document = required_path(args, "document")?;
            let batch = load_batch(required_path(args, "proposals")?).await?;
            let dry_run = args.get_flag("dry-run");
            let mut report = store
                .apply(document, &batch.proposals, &normalizer, dry_run)
                .await?;
            report.record_rejections(batch.rejected);
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
                for skipped in &report.apply.skipped {
                    println!("  not applied: {} ({:?})", skipped.directive, skipped.reason);
                }
            }
        }
        Some(("history", args)) => {
            let document = required_path(args, "document")?;
            let batch = load_batch(required_path(args, "proposals")?).await?;
            let history = store.history(document, &batch.proposals, &normalizer).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn apply_accepts_global_config_and_dry_run() {
        let matches = cli()
            .try_get_matches_from([
                "plandoc", "apply", "Tasks.md", "-p", "batch.json", "--dry-run", "--config", "c.toml",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("c.toml"))
        );
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "apply");
        assert!(args.get_flag("dry-run"));
    }
}
