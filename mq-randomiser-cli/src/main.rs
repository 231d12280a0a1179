use clap::{ArgAction, Parser};
use std::path::PathBuf;

use mq_randomiser_core::{run, RandomiserSettings};

#[derive(Debug, Parser)]
#[command(name = "mq-randomiser", version, about = "Final Fantasy Mystic Quest randomiser tool")]
struct Args {
    /// Snapshot file (.json or .json.gz), or a directory containing snapshot.json.
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long)]
    seed: u64,

    /// Replace the built-in item catalog and ban-lists with a JSON file.
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_treasures: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_monsters: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_formations: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_bosses: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    randomize_battlefields: bool,

    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    randomize_characters: bool,

    /// Also write spoiler_log.txt next to the output snapshot.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let settings = RandomiserSettings {
        seed: args.seed,
        randomize_treasures: args.randomize_treasures,
        randomize_monsters: args.randomize_monsters,
        randomize_formations: args.randomize_formations,
        randomize_bosses: args.randomize_bosses,
        randomize_battlefields: args.randomize_battlefields,
        randomize_characters: args.randomize_characters,
        debug: args.debug,
        input_path: args.input,
        output_path: args.output,
        config_path: args.config,
    };

    log::info!("randomising with seed {}", settings.seed);
    if let Err(err) = run(settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
