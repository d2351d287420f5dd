mod commands;
mod logging;
mod progress;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{CategorySelector, Cli, Commands};
use dotenv::dotenv;
use glob::Pattern;
use progress::CliReporter;
use smart_purge_core::registry::{self, Group, Safety};
use smart_purge_core::{preview, PurgeConfig, PurgeExecutor, ScanCoordinator, Selection, SqliteDocument};
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match smart_purge_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    if let Some(database) = args.database {
        config.database_path = database;
    }

    let result = match args.command {
        Some(Commands::Import { snapshot }) => run_import(&config, &snapshot),
        Some(Commands::List) => {
            run_list();
            Ok(())
        }
        Some(Commands::Scan(selector)) => run_scan_only(&config, &selector),
        Some(Commands::Purge { selector, execute }) => run_purge(&config, &selector, execute),
        Some(Commands::Export { selector, output }) => run_export(&config, &selector, output),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        Some(Commands::TruncateDb) => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the Database?",
                Some(false),
            ) {
                Ok(true) => run_truncate(&config),
                _ => process::exit(0),
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }

    Ok(())
}

fn open_document(config: &PurgeConfig) -> anyhow::Result<SqliteDocument> {
    SqliteDocument::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path))
}

fn run_import(config: &PurgeConfig, snapshot: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(snapshot)
        .with_context(|| format!("reading snapshot {}", snapshot.display()))?;
    let doc = open_document(config)?;
    let imported = doc.import_json(&json)?;
    info!(
        "Imported {} elements into {}",
        format!("{}", imported).green(),
        config.database_path.cyan()
    );
    Ok(())
}

fn run_list() {
    for group in registry::build_groups() {
        println!("{} {} [{}]", group.icon, group.name.bold(), group.id.dimmed());
        for category in &group.categories {
            let marker = if category.default_selected { "*" } else { " " };
            let safety = match category.safety {
                Safety::Safe => category.safety.to_string().green(),
                Safety::Warning => category.safety.to_string().yellow(),
            };
            println!(
                "  {} {:<32} {:<8} {}",
                marker, category.id, safety, category.description
            );
        }
        println!();
    }
    println!("{}", "* selected when no --category/--group/--all is given".dimmed());
}

/// Category ids picked by the selector, in registry order.
fn resolve_categories(groups: &[Group], selector: &CategorySelector) -> anyhow::Result<Vec<&'static str>> {
    let all_ids = || groups.iter().flat_map(|g| g.categories.iter());

    if selector.all {
        return Ok(all_ids().map(|c| c.id).collect());
    }
    if selector.categories.is_empty() && selector.groups.is_empty() {
        return Ok(all_ids().filter(|c| c.default_selected).map(|c| c.id).collect());
    }

    let mut patterns = Vec::with_capacity(selector.categories.len());
    for raw in &selector.categories {
        let pattern =
            Pattern::new(raw).with_context(|| format!("invalid category pattern '{}'", raw))?;
        if !all_ids().any(|c| pattern.matches(c.id)) {
            warn!("No category matches '{}'", raw);
        }
        patterns.push(pattern);
    }
    for id in &selector.groups {
        if registry::find_group(groups, id).is_none() {
            bail!("unknown group '{}'", id);
        }
    }

    Ok(groups
        .iter()
        .flat_map(|g| g.categories.iter().map(move |c| (g.id, c)))
        .filter(|(group_id, c)| {
            selector.groups.iter().any(|g| g == group_id)
                || patterns.iter().any(|p| p.matches(c.id))
        })
        .map(|(_, c)| c.id)
        .collect())
}

/// Scan the selected categories into `groups`; returns the scanned ids.
fn run_scan(
    doc: &SqliteDocument,
    config: &PurgeConfig,
    groups: &mut [Group],
    selector: &CategorySelector,
) -> anyhow::Result<Vec<&'static str>> {
    let ids = resolve_categories(groups, selector)?;
    if ids.is_empty() {
        bail!("no categories selected");
    }

    let coordinator = ScanCoordinator::new(doc, config);
    let reporter = CliReporter::new();
    let summary = {
        let mut selected = registry::select_categories(groups, &ids);
        coordinator.scan(&mut selected, &reporter, &|| false)
    };

    info!(
        "{} categories scanned, {} failed, {} unused items in {}",
        format!("{}", summary.categories_scanned).cyan(),
        format!("{}", summary.categories_failed).red(),
        format!("{}", summary.unused_items).yellow(),
        format!("{:.2}s", summary.duration.as_secs_f64()).green(),
    );
    Ok(ids)
}

fn print_results(groups: &[Group], ids: &[&str]) {
    for group in groups {
        let scanned: Vec<_> = group
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .collect();
        if scanned.is_empty() {
            continue;
        }
        println!("{} {} ({})", group.icon, group.name.bold(), group.status_text());
        for category in scanned {
            let line = format!("  {} {}", category.icon, category.display_text());
            match category.scan_error() {
                Some(err) => println!("{} {}", line.red(), err.dimmed()),
                None if category.unused_count() > 0 => println!("{}", line.yellow()),
                None => println!("{}", line.dimmed()),
            }
            for item in category.items() {
                let name = if item.can_delete {
                    item.metadata.name.normal()
                } else {
                    item.metadata.name.dimmed()
                };
                println!("      {:<48} {} {}", name, item.item_type.dimmed(), item.entity.id);
            }
        }
        println!();
    }
}

fn run_scan_only(config: &PurgeConfig, selector: &CategorySelector) -> anyhow::Result<()> {
    let doc = open_document(config)?;
    let mut groups = registry::build_groups();
    let ids = run_scan(&doc, config, &mut groups, selector)?;
    print_results(&groups, &ids);
    Ok(())
}

fn run_purge(config: &PurgeConfig, selector: &CategorySelector, execute: bool) -> anyhow::Result<()> {
    let doc = open_document(config)?;
    let mut groups = registry::build_groups();
    let ids = run_scan(&doc, config, &mut groups, selector)?;

    let selected = groups
        .iter()
        .flat_map(|g| g.categories.iter())
        .filter(|c| ids.contains(&c.id));
    let selection = Selection::from_categories(selected);
    if selection.is_empty() {
        info!("Nothing to purge");
        return Ok(());
    }

    let dangerous: Vec<&str> = groups
        .iter()
        .flat_map(|g| g.categories.iter())
        .filter(|c| ids.contains(&c.id) && c.is_dangerous() && c.unused_count() > 0)
        .map(|c| c.name)
        .collect();

    let dry_run = !execute && config.dry_run_default;
    if !dry_run {
        if !dangerous.is_empty() {
            println!(
                "{} {}",
                "Warning: selection includes".yellow(),
                dangerous.join(", ").yellow().bold()
            );
        }
        let prompt = format!("Delete {} items? This can be undone only from a backup.", selection.len());
        if !prompt_confirm(&prompt, Some(false))? {
            info!("Purge cancelled");
            return Ok(());
        }
    }

    let executor = PurgeExecutor::new(&doc, config);
    let reporter = CliReporter::new();
    let report = executor.execute(&selection, dry_run, &reporter)?;

    println!();
    let summary = report.summary(config.failure_summary_limit);
    if report.failed.is_empty() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
    if dry_run {
        info!("Re-run with {} to delete", "--execute".bold());
    }
    Ok(())
}

fn run_export(
    config: &PurgeConfig,
    selector: &CategorySelector,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let doc = open_document(config)?;
    let mut groups = registry::build_groups();
    let ids = run_scan(&doc, config, &mut groups, selector)?;

    let items = groups
        .iter()
        .flat_map(|g| g.categories.iter())
        .filter(|c| ids.contains(&c.id))
        .flat_map(|c| c.items().iter())
        .filter(|item| item.can_delete);
    let preview_groups = preview::group_items(items);

    let path = output
        .unwrap_or_else(|| PathBuf::from(preview::default_export_name(Local::now().naive_local())));
    let rows = preview::export_csv(&path, &preview_groups)?;
    info!(
        "{} rows written to {}",
        format!("{}", rows).green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn run_truncate(config: &PurgeConfig) -> anyhow::Result<()> {
    let doc = open_document(config)?;
    doc.truncate_all()?;
    println!("All tables truncated");
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
