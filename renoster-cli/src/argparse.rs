use clap::{App, Arg, ArgMatches};

pub fn parse_args<'a>() -> ArgMatches<'a> {
    App::new("renoster")
        .version("0.1")
        .author("Antoine Büsch")
        .about("Offline physically-based Monte Carlo path tracer")
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .help("Output file name")
                .default_value("image.png"),
        )
        .arg(
            Arg::with_name("nthreads")
                .long("nthreads")
                .help("Number of worker threads (0 = use all available cores)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .help("Log debug information"),
        )
        .arg(
            Arg::with_name("INPUT")
                .required(true)
                .index(1)
                .help("Scene file to render"),
        )
        .get_matches()
}
