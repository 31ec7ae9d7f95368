use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::Path;
use frelia_core::build_site;
use crate::config::FreliaConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing documents [default: ./site]")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: ./out]")
        )
        .arg(
            Arg::new("templates")
                .short('t')
                .long("templates")
                .value_name("GLOB")
                .help("Glob matching the templates [default: ./templates/**/*.html]")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value(crate::config::DEFAULT_CONFIG_FILE)
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Build the static site from source documents")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = FreliaConfig::load(args)?;
    let build_config = &config.build;

    let source_dir = Path::new(&build_config.source);
    let output_dir = Path::new(&build_config.output);

    tracing::info!(
        source = %source_dir.display(),
        templates = %build_config.templates,
        transforms = config.pipeline.transform_specs().len(),
        "building site"
    );
    let written = build_site(&config.pipeline, source_dir, output_dir, &build_config.templates)?;

    println!("Built {written} pages in {}", output_dir.display());

    Ok(())
}
