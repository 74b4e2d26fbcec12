mod cli;

use clap::Parser;
use log::error;
use std::process::ExitCode;

/*-------------------------------------------------------------------------------------------------
  Main CLI Function
-------------------------------------------------------------------------------------------------*/

fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Initialize logging
    stderrlog::new()
        .module(module_path!())
        .quiet(args.verbose.is_silent())
        .verbosity(args.verbose.log_level().map_or(0, |level| level as usize - 1))
        .init()
        .ok();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            error!("{error}");
            ExitCode::from(2)
        }
    }
}

/// Run the CLI; returns `false` when one or more looked-up addresses were not found.
fn run(args: &cli::Args) -> cli::Result<bool> {
    // Validate the addresses before touching the cache or the network
    let addresses = cli::parse_addresses(args)?;

    let client = cli::build_client(args)?;
    let dataset = client.get_dataset()?.filter(&cli::build_filter(args));

    let (prefixes, all_found) = match &addresses {
        Some(addresses) => {
            let lookup = cli::lookup(&dataset, addresses);
            cli::log::lookup_results(addresses.len(), &lookup);
            let all_found = lookup.not_found.is_empty();
            (lookup.prefixes, all_found)
        }
        None => (dataset.prefixes().iter().collect(), true),
    };

    match args.output {
        cli::OutputFormat::Table => cli::output::prefix_table(&prefixes),
        cli::OutputFormat::Cidr => cli::output::prefixes_in_cidr_format(&prefixes),
        cli::OutputFormat::Regions => cli::output::regions(&prefixes),
        cli::OutputFormat::NetworkBorderGroups => cli::output::network_border_groups(&prefixes),
        cli::OutputFormat::Services => cli::output::services(&prefixes),
    };

    if let Some(csv_file) = &args.csv_file {
        cli::csv::save(&prefixes, csv_file)?;
    }

    Ok(all_found)
}
