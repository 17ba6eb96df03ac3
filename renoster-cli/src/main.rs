#![recursion_limit = "128"]

mod argparse;
mod logging;

use anyhow::Result;
use clap::ArgMatches;

use renoster::{init_stats, pbrt, PbrtOptions};

fn main() {
    println!("Renoster 0.1 [Detected {} cores]", num_cpus::get());
    let matches = argparse::parse_args();

    let level = if matches.is_present("verbose") {
        "debug"
    } else {
        "info"
    };
    let _logger = logging::configure_logger(level);

    if let Err(ref e) = run(&matches) {
        println!("Application error: {}", e);
        ::std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    init_stats();
    let nthreads = matches
        .value_of("nthreads")
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);
    let opts = PbrtOptions {
        num_threads: nthreads,
        ..PbrtOptions::default()
    };
    let filename = matches.value_of("INPUT").unwrap();
    pbrt::parse_scene(opts, filename)?;

    Ok(())
}
