use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::error;
use pairwise_matches::config::{load_config, PairFilterConfig};
use pairwise_matches::features::{
    describer_for_preset, DescriberPreset, ImageDescriber, SiftDescriber,
};
use pairwise_matches::pipeline::{run_pair_filter, PairFilterOptions};
use std::path::PathBuf;
use std::process;

/// Match two images and print the correspondences that survive K-VLD.
#[derive(Parser, Debug)]
#[command(name = "kvld_filter")]
#[command(about = "Putative SIFT matching followed by the K-VLD consistency filter")]
struct Args {
    /// First image
    #[arg(short = 'i', long = "img1")]
    img1: PathBuf,

    /// Second image
    #[arg(short = 'j', long = "img2")]
    img2: PathBuf,

    /// Directory for debug outputs
    #[arg(short, long, default_value = ".")]
    outdir: PathBuf,

    /// 1: SVGs and JSON report, 2: also features and match files
    #[arg(short, long, default_value_t = 0)]
    debug: usize,

    /// Describer preset: default, normal, high or ultra
    #[arg(short = 'f', long = "feature")]
    feature: Option<DescriberPreset>,

    /// JSON file overriding matcher, K-VLD and describer settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => exit_with_usage(err),
    };

    if let Err(err) = run(args) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PairFilterConfig::default(),
    };
    let describer: Box<dyn ImageDescriber> = match args.feature {
        Some(preset) => describer_for_preset(preset, config.describer.clone()),
        None => Box::new(SiftDescriber::new(config.describer.clone())),
    };

    let options = PairFilterOptions {
        left_image: args.img1,
        right_image: args.img2,
        outdir: args.outdir,
        debug: args.debug,
    };
    let output = run_pair_filter(&options, describer.as_ref(), &config)?;
    for line in output.match_lines() {
        println!("{line}");
    }
    Ok(())
}

/// Print a clap error and exit; argument errors always show the usage line.
fn exit_with_usage(err: clap::Error) -> ! {
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        let _ = err.print();
        process::exit(0);
    }
    let rendered = err.render().to_string();
    eprint!("{rendered}");
    if !rendered.contains("Usage:") {
        eprintln!("\n{}", Args::command().render_usage());
    }
    process::exit(1);
}
