use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::error;
use pairwise_matches::pipeline::export::stdout_line;
use pairwise_matches::pipeline::{run_export, ExportOptions};
use std::process;

/// Export the pairwise matches of an SfM dataset as text lines.
#[derive(Parser, Debug)]
#[command(name = "export_matches")]
#[command(about = "Write view_I,x1,y1,view_J,x2,y2 lines for every match of every pair")]
struct Args {
    /// Scene description (sfm_data.json)
    #[arg(short = 'i', long = "input_file", default_value = "")]
    input_file: String,

    /// Directory holding image_describer.json and the .feat files
    #[arg(short = 'd', long = "matchdir", default_value = "")]
    matchdir: String,

    /// Pairwise match file (.txt)
    #[arg(short = 'm', long = "matchfile", default_value = "")]
    matchfile: String,

    /// Output directory for matches.txt
    #[arg(short = 'o', long = "outdir", default_value = "")]
    outdir: String,

    /// Also write one SVG per pair
    #[arg(long)]
    svg: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args_os().len() <= 1 {
        eprintln!("{}", Args::command().render_help());
        process::exit(1);
    }
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => exit_with_usage(err),
    };

    let options = ExportOptions {
        input_file: args.input_file,
        matchdir: args.matchdir,
        matchfile: args.matchfile,
        outdir: args.outdir,
        svg: args.svg,
    };
    match run_export(&options) {
        Ok(summary) => {
            for line in &summary.lines {
                println!("{}", stdout_line(line));
            }
        }
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    }
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
