use clap::Parser;
use evrptw_io::{load_instance, read_arc_matrix, write_report};
use evrptw_milp::{
    bd_cost_of_fixed_routes, solve_evrptw, solve_evrptw_bd, BdParams, ExpandedInstance,
    SolveConfig,
};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{BdArgs, Cli, Commands, CommonArgs};

fn bd_params(args: &BdArgs) -> anyhow::Result<BdParams> {
    let params = BdParams {
        lower_fraction: args.lb,
        upper_fraction: args.ub,
        ..BdParams::default()
    }
    .with_price_level(args.price_level)?;
    Ok(params)
}

fn result_path(dir: &Path, instance: &str) -> std::path::PathBuf {
    dir.join(format!("{instance}_result.csv"))
}

fn run_one(command: &Commands, common: &CommonArgs, name: &str) -> anyhow::Result<()> {
    let instance = load_instance(&common.data_dir, name)?;
    let config = SolveConfig {
        time_limit_secs: common.time_limit,
    };

    let report = match command {
        Commands::Solve { .. } => solve_evrptw(&instance, &config)?,
        Commands::SolveBd { bd, .. } => solve_evrptw_bd(&instance, &config, &bd_params(bd)?)?,
        Commands::BdCost { bd, routes_dir, .. } => {
            let size = ExpandedInstance::new(&instance).len();
            let route = read_arc_matrix(&result_path(routes_dir, name), size)?;
            bd_cost_of_fixed_routes(&instance, &config, &bd_params(bd)?, &route)?
        }
    };

    let out = result_path(&common.out_dir, name);
    write_report(&out, &report)?;
    info!(
        instance = name,
        objective = report.objective,
        status = %report.status,
        output = %out.display(),
        "instance finished"
    );
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let common = match &cli.command {
        Commands::Solve { common }
        | Commands::SolveBd { common, .. }
        | Commands::BdCost { common, .. } => common,
    };
    std::fs::create_dir_all(&common.out_dir)?;

    let mut solved = 0usize;
    for name in &common.instances {
        match run_one(&cli.command, common, name) {
            Ok(()) => solved += 1,
            Err(e) => error!(instance = name, "instance failed: {e:?}"),
        }
    }
    info!(
        solved,
        failed = common.instances.len() - solved,
        "batch finished"
    );
    // A partially failed batch still produced results worth keeping.
    if solved == 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to set up logging");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("fatal: {e:?}");
            ExitCode::FAILURE
        }
    }
}
