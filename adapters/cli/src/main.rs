#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Dotlink in a terminal.

mod commands;
mod render;

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotlink_core::{CellCoord, ColorBombTrigger, Event, GameConfig, Palette, SpawnRuleMode};
use dotlink_session::Session;
use flexi_logger::{AdaptiveFormat, Logger};

use self::{commands::LineCommand, render::Legend};

/// Command-line arguments for the Dotlink terminal client.
#[derive(Clone, Debug, Parser)]
#[command(name = "dotlink", about = "Connect same-colored dots from the terminal")]
struct Options {
    /// TOML file holding a game configuration; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board width in slots.
    #[arg(long)]
    columns: Option<u32>,

    /// Board height in slots.
    #[arg(long)]
    rows: Option<u32>,

    /// Number of tile colors.
    #[arg(long)]
    colors: Option<usize>,

    /// Seed for refill colors.
    #[arg(long)]
    seed: Option<u64>,

    /// Whether special-tile path lengths are exact or thresholds.
    #[arg(long, value_enum)]
    spawn_rule: Option<SpawnRuleArg>,

    /// Interaction that sets off a color bomb.
    #[arg(long, value_enum)]
    color_bomb_trigger: Option<TriggerArg>,

    /// Log filter such as `debug` or `dotlink_world=trace`; `RUST_LOG` wins when set.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpawnRuleArg {
    Exact,
    Threshold,
}

impl From<SpawnRuleArg> for SpawnRuleMode {
    fn from(value: SpawnRuleArg) -> Self {
        match value {
            SpawnRuleArg::Exact => Self::Exact,
            SpawnRuleArg::Threshold => Self::Threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TriggerArg {
    Direct,
    Path,
}

impl From<TriggerArg> for ColorBombTrigger {
    fn from(value: TriggerArg) -> Self {
        match value {
            TriggerArg::Direct => Self::DirectInteraction,
            TriggerArg::Path => Self::PathConnection,
        }
    }
}

impl Options {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GameConfig::default(),
        };
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(colors) = self.colors {
            config.palette = Palette::with_len(colors).context("invalid --colors value")?;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rule) = self.spawn_rule {
            config.spawn_rules.mode = rule.into();
        }
        if let Some(trigger) = self.color_bomb_trigger {
            config.color_bomb_trigger = trigger.into();
        }
        config.validate().context("invalid game configuration")?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

enum Flow {
    Continue,
    Quit,
}

struct Client<W> {
    session: Session,
    legend: Legend,
    out: W,
}

impl<W: Write> Client<W> {
    fn execute(&mut self, command: LineCommand) -> Result<Flow> {
        let outcome = match command {
            LineCommand::Nothing => return Ok(Flow::Continue),
            LineCommand::Quit => return Ok(Flow::Quit),
            LineCommand::Show => {
                self.show(&[])?;
                return Ok(Flow::Continue);
            }
            LineCommand::Hint => {
                match self.session.find_hint() {
                    Some(hint) => {
                        let cells: Vec<CellCoord> = hint.cells().collect();
                        self.show(&cells)?;
                    }
                    None => writeln!(self.out, "no moves left; try `shuffle`")?,
                }
                return Ok(Flow::Continue);
            }
            LineCommand::Path(cells) => self.session.trace(&cells),
            LineCommand::Tap(cell) => self.session.activate(cell),
            LineCommand::Cycle(cell) => self.session.cycle_color(cell),
            LineCommand::Shuffle => self.session.shuffle(),
        };

        match outcome {
            Ok(events) => self.report(&events)?,
            Err(error) => {
                log::warn!("request refused: {error}");
                writeln!(self.out, "refused: {error}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn report(&mut self, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            writeln!(self.out, "nothing happened")?;
            return Ok(());
        }
        for event in events {
            writeln!(self.out, "  {}", self.legend.describe(event))?;
        }
        self.show(&[])?;
        if !self.session.has_moves() {
            writeln!(self.out, "no moves left; try `shuffle`")?;
        }
        Ok(())
    }

    fn show(&mut self, marked: &[CellCoord]) -> Result<()> {
        let board = self.legend.board(self.session.board_view(), marked);
        write!(self.out, "{board}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Entry point for the Dotlink command-line interface.
fn main() -> Result<()> {
    let options = Options::parse();
    let _logger = Logger::try_with_env_or_str(options.log_level.as_deref().unwrap_or("warn"))?
        .log_to_stderr()
        .adaptive_format_for_stderr(AdaptiveFormat::Default)
        .start()?;

    let config = options.game_config()?;
    log::info!(
        "starting a {}x{} board with {} colors",
        config.columns,
        config.rows,
        config.palette.len()
    );
    let legend = Legend::new(&config.palette);
    let session = Session::new(config).context("failed to set up the board")?;
    let mut client = Client {
        session,
        legend,
        out: io::stdout().lock(),
    };
    client.show(&[])?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let flow = match LineCommand::parse(&line) {
            Ok(command) => client.execute(command)?,
            Err(error) => {
                writeln!(client.out, "{error}")?;
                Flow::Continue
            }
        };
        if let Flow::Quit = flow {
            break;
        }
    }
    Ok(())
}
