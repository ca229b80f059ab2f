mod options;
mod printer;

use lamellar_motifs::active_message::LamellarCollective;
use lamellar_motifs::{
    load_input, Collective, DegreeRefinedLabeler, MotifError, ReductionCoordinator,
};
use options::MotifCli;

use clap::Parser;
use lamellar::active_messaging::prelude::*;
use tracing::error;
use tracing_subscriber::EnvFilter;

use std::process::ExitCode;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = MotifCli::parse();
    let world = lamellar::LamellarWorldBuilder::new().build();
    let my_pe = world.my_pe();
    if my_pe == 0 {
        cli.describe(world.num_pes());
    }

    match run(&world, cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(pe = my_pe, "{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(world: &LamellarWorld, cli: MotifCli) -> Result<(), MotifError> {
    let config = cli.into_config();
    config.validate(world.num_pes())?;
    let collective = LamellarCollective::new(world)?;
    let labeler = DegreeRefinedLabeler;
    let report = ReductionCoordinator::new(&collective, &labeler, &config)
        .run(|| load_input(&config))?;
    let rank = collective.rank();
    if let Some(counts) = &report.counts {
        if config.show_results {
            if let Err(e) = printer::print_results(rank, counts) {
                error!("unable to write results: {e}");
            }
        }
        printer::print_phase_times(rank, config.motif_order, counts, &report.timings);
    }
    Ok(())
}
