use std::env;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Error};
use env_logger::{fmt, Builder};
use log::{error, info, Level, LevelFilter, Record};

use crate::config::Command;

mod config;

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "{}", record.args())
        } else {
            writeln!(buf, "{}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder.format(format).filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("DDNNF_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    init_logging();

    let config = match config::parse_args(env::args().skip(1))? {
        Command::Help => {
            print!("{}", config::USAGE);
            return Ok(0);
        }
        Command::Run(config) => config,
    };

    info!("This is ddnnf {}", env!("CARGO_PKG_VERSION"));
    info!("Reading file '{}'", config.input.display());
    let file = fs::File::open(&config.input)
        .with_context(|| format!("unable to open file '{}'", config.input.display()))?;
    let mut graph = config.input_format.read(file)?;
    info!("{} nodes, {} edges", graph.node_count(), graph.edge_count());

    if !config.conditions.is_empty() {
        info!("Conditioning on {} literals", config.conditions.len());
        graph.condition_all(&config.conditions)?;
        info!(
            "{} nodes, {} edges after conditioning",
            graph.node_count(),
            graph.edge_count()
        );
    }

    if let Some((path, format)) = &config.output {
        info!("Writing file '{}'", path.display());
        let file = fs::File::create(path)
            .with_context(|| format!("unable to create file '{}'", path.display()))?;
        let mut writer = io::BufWriter::new(file);
        format.write(&mut writer, &graph)?;
        writer.flush()?;
    }

    Ok(0)
}
