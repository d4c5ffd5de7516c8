use std::path::PathBuf;

use bot_ai::config::Config;
use bot_ai::learn::item::environment::Exchange;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding state.json, training_data.json and result.json
    #[arg(short, long, default_value = ".", global = true)]
    dir: PathBuf,

    /// Training epochs (default: 500 for buy, 300 for use)
    #[arg(short, long, global = true)]
    epochs: Option<usize>,

    #[arg(long, default_value_t = 0.01, global = true)]
    learning_rate: f64,

    /// Width of the hidden layer
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(i64).range(1..), global = true)]
    hidden: i64,

    /// RNG seed for weight initialisation
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info", global = true)]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Command {
    /// Predict which item to buy and write {"itemToBuy": ...}
    Buy,
    /// Predict which owned item to use and write {"itemToUse": ...}
    Use,
    /// Count a purchase in training_data.json
    RecordBuy {
        #[arg(long)]
        item: String,
        #[arg(long)]
        round: i64,
    },
    /// Count an item use in training_data.json
    RecordUse {
        #[arg(long)]
        item: String,
        #[arg(long)]
        tile: i64,
    },
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config {
            learning_rate: self.learning_rate,
            hidden: self.hidden,
            seed: Some(self.seed.unwrap_or_else(rand::random)),
            ..Default::default()
        };
        if let Some(epochs) = self.epochs {
            config = config.with_epochs(epochs);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let mut exchange = Exchange::new(args.dir.clone());
    let config = args.config();
    match &args.command {
        Command::Buy => {
            info!(seed = ?config.seed, "Seeding weight initialisation");
            if let Some(decision) = bot_ai::run_purchase(&mut exchange, &config)? {
                println!("Decision saved: {}", decision.item());
            }
        }
        Command::Use => {
            info!(seed = ?config.seed, "Seeding weight initialisation");
            if let Some(decision) = bot_ai::run_use(&mut exchange, &config)? {
                println!("Item to use saved: {}", decision.item());
            }
        }
        Command::RecordBuy { item, round } => bot_ai::record_purchase(&exchange, item, *round)?,
        Command::RecordUse { item, tile } => bot_ai::record_use(&exchange, item, *tile)?,
    }
    Ok(())
}

#[test]
fn test_parse_args() {
    use clap::CommandFactory;
    Args::command().debug_assert();

    let args = Args::parse_from(["bot_ai", "use", "--epochs", "10", "--seed", "3"]);
    assert!(matches!(args.command, Command::Use));
    let config = args.config();
    assert_eq!(config.epochs_purchase, 10);
    assert_eq!(config.epochs_use, 10);
    assert_eq!(config.seed, Some(3));

    let args = Args::parse_from(["bot_ai", "record-buy", "--item", "Bomb", "--round", "2"]);
    assert!(matches!(args.command, Command::RecordBuy { round: 2, .. }));
    assert_eq!(args.config().epochs_purchase, 500);

    assert!(Args::try_parse_from(["bot_ai", "buy", "--hidden", "0"]).is_err());
    assert!(Args::try_parse_from(["bot_ai", "buy", "--hidden", "-3"]).is_err());
    assert_eq!(Args::parse_from(["bot_ai", "buy", "--hidden", "8"]).hidden, 8);
}
