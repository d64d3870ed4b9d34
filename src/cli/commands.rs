//! Command dispatch

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::ToggleOutcome;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::tree_view::TreeViewConvert;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::parent_dir;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { catalog, state }) => cmd_tree(cli, catalog, state.as_deref()),
        Some(Commands::Roots { catalog }) => cmd_roots(cli, catalog),
        Some(Commands::Descendants { catalog, id }) => cmd_descendants(cli, catalog, id),
        Some(Commands::Filter {
            catalog,
            categories,
            state,
        }) => cmd_filter(cli, catalog, categories, state.as_deref()),
        Some(Commands::Toggle {
            catalog,
            id,
            off,
            state,
        }) => cmd_toggle(cli, catalog, id, !off, state.as_deref()),
        Some(Commands::Pick {
            catalog,
            id,
            off,
            state,
        }) => cmd_pick(cli, catalog, id, !off, state.as_deref()),
        Some(Commands::Check { catalog }) => cmd_check(cli, catalog),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see 'catsel --help'".to_string(),
        )),
    }
}

/// Settings for a catalog, with command line overrides applied on top.
fn load_settings(cli: &Cli, catalog: Option<&Path>) -> CliResult<Settings> {
    let mut settings = Settings::load(catalog.map(parent_dir))?;
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    debug!("effective mode: {}", settings.mode);
    Ok(settings)
}

fn container(cli: &Cli, catalog: &Path) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli, Some(catalog))?))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| InfraError::json("render output", e))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").map_err(|e| InfraError::io("write stdout", e))?;
    Ok(())
}

fn require_id(id: &str, what: &str) -> CliResult<()> {
    if id.trim().is_empty() {
        return Err(CliError::InvalidArgs(format!("{what} id must not be empty")));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, catalog: &Path, state: Option<&Path>) -> CliResult<()> {
    let services = container(cli, catalog)?;
    let selector = services.selector.open(catalog)?;
    let selection = services.selector.load_selection(state)?;

    let trees = selector.to_tree_views(&selection, &services.settings.display);
    if trees.is_empty() {
        output::info("no categories");
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    for tree in trees {
        write!(stdout, "{tree}").map_err(|e| InfraError::io("write stdout", e))?;
    }
    drop(stdout);

    let forest = selector.forest();
    output::detail(&format!(
        "{} categories, depth {}, {} products, mode {}{}",
        forest.len(),
        forest.depth(),
        selector.products().len(),
        selector.mode(),
        if selector.is_read_only() { ", read-only" } else { "" }
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_roots(cli: &Cli, catalog: &Path) -> CliResult<()> {
    let services = container(cli, catalog)?;
    let roots = services.selector.roots(catalog)?;

    if cli.json {
        let ids: Vec<_> = roots
            .iter()
            .map(|r| serde_json::json!({ "id": r.id, "name": r.name }))
            .collect();
        return print_json(&ids);
    }
    if roots.is_empty() {
        output::info("no categories");
    }
    for root in roots {
        output::info(&format!("{}\t{}", root.id, root.name));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_descendants(cli: &Cli, catalog: &Path, id: &str) -> CliResult<()> {
    require_id(id, "category")?;
    let services = container(cli, catalog)?;
    let ids = services.selector.descendants(catalog, id)?;

    if cli.json {
        return print_json(&ids);
    }
    output::info(&ids.iter().join("\n"));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_filter(
    cli: &Cli,
    catalog: &Path,
    categories: &[String],
    state: Option<&Path>,
) -> CliResult<()> {
    let services = container(cli, catalog)?;
    let products = services.selector.filter(catalog, categories, state)?;

    if cli.json {
        return print_json(&products);
    }
    if products.is_empty() {
        output::info("no products");
    }
    for product in products {
        output::info(&format!(
            "{}\t{}\t{:.2}\t{}",
            product.id,
            product.name,
            product.selling_price,
            product.effective_category_id().unwrap_or("-")
        ));
    }
    Ok(())
}

fn report_toggle(cli: &Cli, what: &str, id: &str, outcome: &ToggleOutcome) -> CliResult<()> {
    if cli.json {
        return print_json(&outcome.selection);
    }
    if !outcome.changed {
        output::warning(&format!("{what} {id}: nothing to change"));
        return Ok(());
    }
    match &outcome.persisted {
        Some(path) => output::success(&format!("{what} {id} applied, saved to {}", path.display())),
        None => output::success(&format!("{what} {id} applied (no state file, not saved)")),
    }
    output::header("categories");
    output::detail(&outcome.selection.categories.iter().join(", "));
    output::header("products");
    output::detail(&outcome.selection.products.iter().join(", "));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_toggle(
    cli: &Cli,
    catalog: &Path,
    id: &str,
    should_select: bool,
    state: Option<&Path>,
) -> CliResult<()> {
    require_id(id, "category")?;
    let services = container(cli, catalog)?;
    let outcome = services
        .selector
        .toggle_category(catalog, state, id, should_select)?;
    report_toggle(cli, "category", id, &outcome)
}

#[instrument(skip(cli))]
fn cmd_pick(
    cli: &Cli,
    catalog: &Path,
    id: &str,
    should_select: bool,
    state: Option<&Path>,
) -> CliResult<()> {
    require_id(id, "product")?;
    let services = container(cli, catalog)?;
    let outcome = services
        .selector
        .toggle_product(catalog, state, id, should_select)?;
    report_toggle(cli, "product", id, &outcome)
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, catalog: &Path) -> CliResult<()> {
    let services = container(cli, catalog)?;
    let issues = services.selector.check(catalog)?;

    if cli.json {
        let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
        return print_json(&messages);
    }
    if issues.is_empty() {
        output::success("category hierarchy is consistent");
        return Ok(());
    }
    output::header(&format!("{} issue(s) found", issues.len()));
    for issue in &issues {
        output::failure(issue);
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { catalog } => {
            let settings = load_settings(cli, catalog.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no config directory on this platform)"),
            }
            output::info(&format!(
                "local:  {}",
                local_config_path(Path::new("<catalog_dir>")).display()
            ));
        }
    }
    Ok(())
}
