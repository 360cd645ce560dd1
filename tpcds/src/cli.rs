use clap::builder::{BoolishValueParser, NonEmptyStringValueParser};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::ffi::OsString;

use crate::models::GenerationConfig;
use crate::models::config::{DEFAULT_MASTER, DEFAULT_NUM_PARTITIONS};

pub fn command() -> Command {
    Command::new("tpcds-datagen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates TPC-DS data with dsdgen and registers it as external tables")
        .arg(
            Arg::new("master")
                .short('m')
                .long("master")
                .value_name("MASTER")
                .help(format!(
                    "Engine master: local, local[N] or local[*] (default {DEFAULT_MASTER})"
                )),
        )
        .arg(
            Arg::new("dsdgenDir")
                .short('d')
                .long("dsdgenDir")
                .value_name("DIR")
                .required(true)
                .value_parser(NonEmptyStringValueParser::new())
                .help("Directory containing the dsdgen binary"),
        )
        .arg(
            Arg::new("scaleFactor")
                .short('s')
                .long("scaleFactor")
                .value_name("GB")
                .value_parser(parse_scale_factor)
                .help("Dataset size in GB"),
        )
        .arg(
            Arg::new("location")
                .short('l')
                .long("location")
                .value_name("PATH")
                .help("Root path (or s3:// URL) the tables are written under"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format: parquet, csv or json"),
        )
        .arg(bool_arg(
            "useDoubleForDecimal",
            'i',
            "Store decimal columns as doubles",
        ))
        .arg(bool_arg("useStringForDate", 'e', "Store date columns as strings"))
        .arg(bool_arg("overwrite", 'o', "Replace existing table data"))
        .arg(bool_arg(
            "partitionTables",
            'p',
            "Partition fact tables by their date key",
        ))
        .arg(bool_arg(
            "clusterByPartitionColumns",
            'c',
            "Coalesce each partition's rows before writing",
        ))
        .arg(bool_arg(
            "filterOutNullPartitionValues",
            'v',
            "Drop rows whose partition key is null",
        ))
        .arg(
            Arg::new("numPartitions")
                .short('n')
                .long("numPartitions")
                .value_name("N")
                .value_parser(value_parser!(u32).range(1..))
                .help(format!(
                    "Number of dsdgen children to split generation into \
                     (default {DEFAULT_NUM_PARTITIONS})"
                )),
        )
}

fn bool_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .short(short)
        .long(name)
        .value_name("BOOL")
        .action(ArgAction::Set)
        .value_parser(BoolishValueParser::new())
        .help(help)
}

fn parse_scale_factor(value: &str) -> Result<String, String> {
    match value.parse::<f64>() {
        Ok(scale) if scale.is_finite() && scale > 0.0 => Ok(value.to_string()),
        _ => Err(format!("'{}' is not a positive number", value)),
    }
}

/// Parses the command line into a [`GenerationConfig`]. `argv[0]` is the program name.
pub fn parse_arguments<I, T>(argv: I) -> Result<GenerationConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(argv)?;
    Ok(config_from_matches(&matches))
}

fn config_from_matches(matches: &ArgMatches) -> GenerationConfig {
    let dsdgen_dir = matches
        .get_one::<String>("dsdgenDir")
        .cloned()
        .unwrap_or_default();
    let mut config = GenerationConfig::new(dsdgen_dir);

    if let Some(master) = matches.get_one::<String>("master") {
        config = config.with_master(master);
    }
    if let Some(scale_factor) = matches.get_one::<String>("scaleFactor") {
        config = config.with_scale_factor(scale_factor);
    }
    if let Some(location) = matches.get_one::<String>("location") {
        config = config.with_location(location);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config = config.with_format(format);
    }
    if let Some(&flag) = matches.get_one::<bool>("useDoubleForDecimal") {
        config = config.with_use_double_for_decimal(flag);
    }
    if let Some(&flag) = matches.get_one::<bool>("useStringForDate") {
        config = config.with_use_string_for_date(flag);
    }
    if let Some(&flag) = matches.get_one::<bool>("overwrite") {
        config = config.with_overwrite(flag);
    }
    if let Some(&flag) = matches.get_one::<bool>("partitionTables") {
        config = config.with_partition_tables(flag);
    }
    if let Some(&flag) = matches.get_one::<bool>("clusterByPartitionColumns") {
        config = config.with_cluster_by_partition_columns(flag);
    }
    if let Some(&flag) = matches.get_one::<bool>("filterOutNullPartitionValues") {
        config = config.with_filter_out_null_partition_values(flag);
    }
    if let Some(&num_partitions) = matches.get_one::<u32>("numPartitions") {
        config = config.with_num_partitions(num_partitions);
    }

    config
}

/// Process exit status for a parse failure: 0 when help or version was requested.
pub fn exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<GenerationConfig, clap::Error> {
        parse_arguments(std::iter::once("tpcds-datagen").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn test_minimal_arguments_use_defaults() {
        let config = parse(&["-d", "/opt/dsdgen"]).unwrap();

        assert_eq!(config, GenerationConfig::new("/opt/dsdgen"));
        assert_eq!(config.master(), "local[*]");
        assert_eq!(config.num_partitions(), 10000);
        assert!(config.partition_tables());
        assert!(config.cluster_by_partition_columns());
        assert!(config.filter_out_null_partition_values());
        assert!(!config.overwrite());
        assert!(!config.use_double_for_decimal());
        assert!(!config.use_string_for_date());
    }

    #[test]
    fn test_all_short_options() {
        let config = parse(&[
            "-m", "local[4]", "-d", "/dsdgen", "-s", "10", "-l", "/data/tpcds", "-f", "parquet",
            "-i", "true", "-e", "true", "-o", "true", "-p", "false", "-c", "false", "-v", "false",
            "-n", "500",
        ])
        .unwrap();

        assert_eq!(config.master(), "local[4]");
        assert_eq!(config.dsdgen_dir(), "/dsdgen");
        assert_eq!(config.scale_factor(), Some("10"));
        assert_eq!(config.location(), Some("/data/tpcds"));
        assert_eq!(config.format(), Some("parquet"));
        assert!(config.use_double_for_decimal());
        assert!(config.use_string_for_date());
        assert!(config.overwrite());
        assert!(!config.partition_tables());
        assert!(!config.cluster_by_partition_columns());
        assert!(!config.filter_out_null_partition_values());
        assert_eq!(config.num_partitions(), 500);
    }

    #[test]
    fn test_long_options() {
        let config = parse(&[
            "--dsdgenDir",
            "/dsdgen",
            "--scaleFactor",
            "0.1",
            "--location",
            "s3://bucket/tpcds",
            "--format",
            "csv",
            "--overwrite",
            "yes",
            "--numPartitions",
            "4",
        ])
        .unwrap();

        assert_eq!(config.scale_factor(), Some("0.1"));
        assert_eq!(config.location(), Some("s3://bucket/tpcds"));
        assert_eq!(config.format(), Some("csv"));
        assert!(config.overwrite());
        assert_eq!(config.num_partitions(), 4);
        assert!(config.partition_tables());
    }

    #[test]
    fn test_missing_dsdgen_dir_fails_with_exit_code_one() {
        let err = parse(&["-s", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_empty_dsdgen_dir_rejected() {
        let err = parse(&["-d", ""]).unwrap_err();
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = parse(&["-d", "/dsdgen", "--tableFilter", "store"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse(&["-d", "/dsdgen", "-n", "0"]).is_err());
        assert!(parse(&["-d", "/dsdgen", "-n", "many"]).is_err());
        assert!(parse(&["-d", "/dsdgen", "-s", "big"]).is_err());
        assert!(parse(&["-d", "/dsdgen", "-s", "-1"]).is_err());
        assert!(parse(&["-d", "/dsdgen", "-o", "maybe"]).is_err());
    }

    #[test]
    fn test_help_exits_cleanly() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(exit_code(&err), 0);
    }
}
