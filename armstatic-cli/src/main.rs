// CLI driver
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use armstatic_core::Binary;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "armstatic")]
#[command(about = "Static binary analyzer for ARM/Thumb/Thumb2 executables")]
#[command(version)]
struct Cli {
    /// Path to the binary to analyze
    path: PathBuf,

    /// Raise the log level (repeat for more: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the static file somewhere other than `<path>.static`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON summary (function/block/instruction/loop counts) here
    #[arg(long)]
    json_summary: Option<PathBuf>,
}

#[derive(Serialize)]
struct Summary {
    functions: usize,
    blocks: usize,
    instructions: usize,
    loops: usize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pb = create_progress_bar("Analyzing binary...");

    let mut binary = Binary::load(&cli.path)
        .with_context(|| format!("failed to load {}", cli.path.display()))?;

    let output_path = cli.output.clone().unwrap_or_else(|| {
        let mut p = cli.path.clone().into_os_string();
        p.push(".static");
        PathBuf::from(p)
    });

    let app_name = cli
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "__unknown__".to_string());

    let out_file = File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(out_file);
    armstatic_core::write_static_file(&mut writer, &mut binary, &app_name)
        .with_context(|| "analysis failed while writing the static file")?;

    if let Some(summary_path) = &cli.json_summary {
        let functions = binary.functions();
        let summary = Summary {
            functions: functions.len(),
            blocks: functions.iter().map(|f| f.count_basic_blocks()).sum(),
            instructions: functions.iter().map(|f| f.count_instructions()).sum(),
            loops: functions
                .iter()
                .filter_map(|f| f.control_flow.as_ref())
                .map(|cf| cf.loops.len())
                .sum(),
        };
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(summary_path, json)
            .with_context(|| format!("failed to write {}", summary_path.display()))?;
    }

    pb.finish_with_message(format!("Wrote {}", output_path.display()));
    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb
}
