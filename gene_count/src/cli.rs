use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    Command,
};

use utils::{init_log, LogLevel};

use crate::config::{Config, DEFAULT_COORD_TAG};

/// SAM tags are two characters: a letter followed by a letter or digit
fn parse_tag(s: &str) -> Result<String, String> {
    match s.as_bytes() {
        [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphanumeric() => Ok(s.to_owned()),
        _ => Err(format!("{} is not a valid SAM tag name", s)),
    }
}

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("timestamp")
                .short('X')
                .long("timestamp")
                .value_parser(value_parser!(stderrlog::Timestamp))
                .value_name("GRANULARITY")
                .default_value("none")
                .help("Prepend log entries with a timestamp"),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .value_name("LOGLEVEL")
                .value_parser(value_parser!(LogLevel))
                .ignore_case(true)
                .default_value("info")
                .help("Set log level"),
        )
        .arg(
            Arg::new("quiet")
                .action(ArgAction::SetTrue)
                .long("quiet")
                .conflicts_with("loglevel")
                .help("Silence all output"),
        )
        .arg(
            Arg::new("tag")
                .short('T')
                .long("tag")
                .value_parser(parse_tag)
                .value_name("TAG")
                .default_value(DEFAULT_COORD_TAG)
                .help("Tag with the genomic coordinates of each transcriptome alignment"),
        )
        .arg(
            Arg::new("check_grouping")
                .action(ArgAction::SetTrue)
                .short('c')
                .long("check-grouping")
                .help("Fail if the records for a read are not adjacent in the input (uses more memory)"),
        )
        .arg(
            Arg::new("mapping_file")
                .value_parser(value_parser!(PathBuf))
                .value_name("MAPPING_FILE")
                .required(true)
                .help("Tab separated file with isoform and gene identifiers"),
        )
        .arg(
            Arg::new("input_file")
                .value_parser(value_parser!(PathBuf))
                .value_name("INPUT_FILE")
                .required(true)
                .help("Input SAM/BAM file aligned to the transcriptome, grouped by read name"),
        )
        .arg(
            Arg::new("output_file")
                .value_parser(value_parser!(PathBuf))
                .value_name("OUTPUT_FILE")
                .required(true)
                .help("Output file for gene counts"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    let path = |s: &str| {
        m.get_one::<PathBuf>(s)
            .expect("Missing required argument")
            .to_owned()
    };

    let mut cfg = Config::new(path("mapping_file"), path("input_file"), path("output_file"));

    if let Some(tag) = m.get_one::<String>("tag") {
        cfg.set_coord_tag(tag.clone())
    }
    cfg.set_check_grouping(m.get_flag("check_grouping"));

    Ok(cfg)
}
