//! field-toggle - inspect and simulate form visibility rules
//!
//! Checks rule tables, shows what a driver value resolves to, and replays
//! driver changes against an in-memory page.

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use field_toggle::config::{load_pages, read_rules, ToggleConfig};
use field_toggle::{
    pages, ControlId, Effect, MemoryDocument, Page, PageSet, VisibilityController,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "field-toggle", version, about)]
struct Cli {
    /// Rules file merged over the built-in pages (overrides the config file)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known pages and their driver fields
    Pages,
    /// Build every rule table and report problems
    Check,
    /// Show the effect a driver value selects
    Resolve {
        #[arg(long)]
        page: String,
        #[arg(long)]
        value: String,
    },
    /// Load a page with a driver value, then replay changes
    Simulate {
        #[arg(long)]
        page: String,
        #[arg(long)]
        value: String,
        /// Driver value to change to; repeatable
        #[arg(long = "change")]
        changes: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ToggleConfig::load()?;

    // Initialize logging
    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "field_toggle=info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let rules_path = cli.rules.or(config.rules_path);
    let rules_path = rules_path.as_deref();

    match cli.command {
        Command::Pages => {
            for page in load_pages(rules_path)?.iter() {
                println!("{:<24} driver={}", page.name, page.driver);
            }
        }
        Command::Check => check(rules_path)?,
        Command::Resolve { page, value } => {
            let pages = load_pages(rules_path)?;
            let page = find_page(&pages, &page)?;
            let matched = page.rules.lookup(&value).is_some();
            println!(
                "{} = {value:?} ({})",
                page.driver,
                if matched { "rule" } else { "fallback" }
            );
            print_effect(page.rules.resolve(&value));
        }
        Command::Simulate {
            page,
            value,
            changes,
        } => {
            let pages = load_pages(rules_path)?;
            let page = find_page(&pages, &page)?;
            simulate(page, &value, &changes)?;
        }
    }

    Ok(())
}

/// Build every page separately so each broken one is reported
fn check(rules_path: Option<&Path>) -> Result<()> {
    let mut pages = pages::builtin()?;
    let mut failed = 0;
    if let Some(path) = rules_path {
        for result in read_rules(path)?.build_each() {
            match result {
                Ok(page) => pages.extend([page]),
                Err(err) => {
                    println!("error {err}");
                    failed += 1;
                }
            }
        }
    }

    for page in pages.iter() {
        println!(
            "ok {:<24} {} rule value(s), {} group(s), {} control(s)",
            page.name,
            page.rules.values().len(),
            page.rules.groups().len(),
            page.rules.referenced_controls().len()
        );
    }
    if failed > 0 {
        bail!("{failed} page(s) failed to build");
    }
    Ok(())
}

fn find_page<'a>(pages: &'a PageSet, name: &str) -> Result<&'a Page> {
    pages
        .get(name)
        .ok_or_else(|| anyhow!("unknown page `{name}`"))
}

fn join_ids<'a>(ids: impl IntoIterator<Item = &'a ControlId>) -> String {
    let ids: Vec<&str> = ids.into_iter().map(ControlId::as_str).collect();
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}

fn print_effect(effect: &Effect) {
    println!("  show: {}", join_ids(effect.shown()));
    println!("  hide: {}", join_ids(effect.hidden()));
    if effect.activations().is_empty() {
        println!("  name: unchanged");
    }
    for activation in effect.activations() {
        println!(
            "  name: {}={:?}, cleared: {}",
            activation.active(),
            activation.field_name(),
            join_ids(activation.peers())
        );
    }
}

fn simulate(page: &Page, value: &str, changes: &[String]) -> Result<()> {
    let mut document = MemoryDocument::for_page(page, value);
    VisibilityController::initialize(&mut document, page.driver.clone(), page.rules.clone())?;
    print_document(&document, &format!("load {} = {value:?}", page.driver));

    for change in changes {
        document.change(page.driver.as_str(), change);
        print_document(&document, &format!("change {} = {change:?}", page.driver));
    }
    Ok(())
}

fn print_document(document: &MemoryDocument, heading: &str) {
    println!("{heading}");
    for (id, control) in document.snapshot() {
        println!(
            "  {:<24} {:<6} name={:?}",
            id.as_str(),
            control.display_value(),
            control.name
        );
    }
}
