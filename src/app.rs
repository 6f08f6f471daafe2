use std::time::Instant;

use crate::cli::{Cli, Commands};
use crate::error::AppError;
use crate::output::{
    NumberFormat, SessionTableOptions, output_inventory_json, print_session_table,
    print_source_table,
};
use crate::pricing::{NoPricing, PricingDb, PricingSource};
use crate::source::{load_inventory, resolve_sources};

/// Run the selected command
pub(crate) fn run(cli: &Cli) -> Result<(), AppError> {
    match Commands::or_default(cli.command) {
        Commands::List => handle_list(cli),
        Commands::Sources => handle_sources(cli),
    }
}

fn handle_sources(cli: &Cli) -> Result<(), AppError> {
    let sources = resolve_sources(cli.source_selector(), &cli.paths)?;
    print_source_table(&sources, cli.use_color());
    Ok(())
}

fn handle_list(cli: &Cli) -> Result<(), AppError> {
    // Validate presentation options before doing any scanning
    let number_format = NumberFormat::from_locale(cli.locale.as_deref())?;
    let sources = resolve_sources(cli.source_selector(), &cli.paths)?;

    let pricing: Box<dyn PricingSource> = if cli.show_cost() {
        Box::new(PricingDb::load(cli.offline))
    } else {
        Box::new(NoPricing)
    };

    let start = Instant::now();
    let inventory = load_inventory(&sources, &cli.scan_options(), pricing.as_ref());
    tracing::debug!(
        sessions = inventory.sessions.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "inventory loaded"
    );

    if cli.json {
        println!("{}", output_inventory_json(&inventory, cli.show_cost())?);
        return Ok(());
    }

    if inventory.sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    print_session_table(
        &inventory,
        &SessionTableOptions {
            use_color: cli.use_color(),
            compact: cli.compact,
            show_cost: cli.show_cost(),
            number_format,
        },
    );
    Ok(())
}
