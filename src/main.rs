//! QF Match - command-line entry point.
//!
//! ```text
//! qf-match --round [-d <pool>] [-t <token>] [-p <count>] [--data <path>]
//! qf-match --vote <votes.json> [--rates <rates.json>] [--data <path>]
//! ```
//!
//! `--round` writes a fresh round document. `--vote` loads the document,
//! applies the vote file and replaces the document. Both may be given, in
//! which case the votes are applied to the new round before anything is
//! saved. On any error nothing is written.

use std::{
    env,
    path::{Path, PathBuf},
    process,
    str::FromStr,
};

use qf_match::logging::init_logging;
use qf_match::store::{read_rates, read_votes};
use qf_match::types::amount::{format_amount, parse_amount};
use qf_match::{Denominated, MatchReceipt, QfError, RateTable, Round, RoundStore};
use log::info;
use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_MATCH_POOL: &str = "100";
const DEFAULT_TOKEN: &str = "eth";
const DEFAULT_PROJECT_COUNT: &str = "3";
const DEFAULT_DATA_PATH: &str = "data.json";
const DEFAULT_LOG_LEVEL: &str = "info";

const USAGE: &str = "\
usage: qf-match [options]

  -r, --round                  create a new round
  -d, --match-pool <value>     round pool amount (default 100)
  -t, --token <value>          round token (default eth)
  -p, --project-count <value>  projects to generate (default 3)
  -v, --vote <file>            apply a JSON vote file to the round
      --rates <file>           JSON rate table {token: {epoch: rate}}
      --data <file>            round document (default data.json)
      --log <level>            trace|debug|info|warn|error (default info)
  -h, --help                   show this help
  -V, --version                show version";

fn main() {
    if let Err(err) = run() {
        eprintln!("qf-match failed: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = CliArgs::parse(env::args().skip(1))?;

    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    if args.version {
        println!("qf-match {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if !args.create_round && args.vote_file.is_none() {
        return Err(AppError::Usage(
            "nothing to do; pass --round and/or --vote".to_string(),
        ));
    }

    let _logger = init_logging(&args.log_level).map_err(AppError::Logging)?;
    let store = RoundStore::new(&args.data_path);

    // Everything happens in memory; the document is written once at the end.
    let mut round = if args.create_round {
        new_round(&args)?
    } else {
        load_round(&store)?
    };
    let receipt = match &args.vote_file {
        Some(vote_file) => Some(apply_votes(
            &mut round,
            vote_file,
            args.rates_file.as_deref(),
        )?),
        None => None,
    };

    store.save(&round)?;

    match &receipt {
        Some(_) => println!("Round State (Post Vote)"),
        None => println!("Round State: Initialized"),
    }
    println!("Matching Pool: {} {}", format_amount(round.matching_pool), round.token);
    print_projects(&round);
    if let Some(receipt) = &receipt {
        print_receipt(receipt);
    }
    println!("Saved to {}", store.path().display());
    Ok(())
}

fn new_round(args: &CliArgs) -> Result<Round, AppError> {
    let pool = parse_match_pool(&args.match_pool)?;
    let count = parse_project_count(&args.project_count)?;
    Ok(Round::new(pool, args.token.clone(), count)?)
}

fn load_round(store: &RoundStore) -> Result<Round, AppError> {
    if !store.exists() {
        return Err(AppError::MissingRound(store.path().to_path_buf()));
    }
    Ok(store.load()?)
}

fn apply_votes(
    round: &mut Round,
    vote_file: &Path,
    rates_file: Option<&Path>,
) -> Result<MatchReceipt, AppError> {
    let votes = read_votes(vote_file)?;
    let table = match rates_file {
        Some(path) => read_rates(path)?,
        None => RateTable::new(),
    };
    table.check_denomination(&round.token)?;
    let entries = table.len();
    let rates = Denominated::new(round.token.clone(), table);

    info!(
        "event=rates_loaded entries={} denomination={} votes={}",
        entries,
        rates.denomination(),
        votes.len()
    );

    Ok(round.vote(&votes, &rates)?)
}

fn print_projects(round: &Round) {
    println!(
        "{:>8} {:>7} {:>7} {:>24} {:>24}",
        "id", "votes", "voters", "donated", "match"
    );
    println!("{:-<8} {:-<7} {:-<7} {:-<24} {:-<24}", "", "", "", "", "");
    for project in &round.projects {
        println!(
            "{:>8} {:>7} {:>7} {:>24} {:>24}",
            project.id,
            project.vote_count(),
            project.unique_voters(),
            format_amount(project.donated.round_dp(8)),
            format_amount(project.match_amount.round_dp(8)),
        );
    }
}

fn print_receipt(receipt: &MatchReceipt) {
    println!(
        "Votes: {} received, {} applied, {} ignored; {} projects updated",
        receipt.votes_received,
        receipt.votes_applied,
        receipt.votes_ignored,
        receipt.projects_updated
    );
    if receipt.is_empty() {
        println!("Empty vote batch.");
    } else if !receipt.distributed() {
        println!("No positive contributions; matching pool not distributed.");
    }
    println!("State root: {}", receipt.state_root_hex());
}

fn parse_match_pool(raw: &str) -> Result<Decimal, QfError> {
    parse_amount(raw).ok_or_else(|| {
        QfError::InvalidConfiguration(format!(
            "match pool `{raw}` is not a non-negative number"
        ))
    })
}

fn parse_project_count(raw: &str) -> Result<usize, QfError> {
    let count = i64::from_str(raw.trim()).map_err(|err| {
        QfError::InvalidConfiguration(format!("project count `{raw}` is not an integer: {err}"))
    })?;
    usize::try_from(count).map_err(|_| {
        QfError::InvalidConfiguration(format!("project count must be non-negative, got {count}"))
    })
}

struct CliArgs {
    create_round: bool,
    match_pool: String,
    token: String,
    project_count: String,
    vote_file: Option<PathBuf>,
    rates_file: Option<PathBuf>,
    data_path: PathBuf,
    log_level: String,
    help: bool,
    version: bool,
}

impl CliArgs {
    fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs {
            create_round: false,
            match_pool: DEFAULT_MATCH_POOL.to_string(),
            token: DEFAULT_TOKEN.to_string(),
            project_count: DEFAULT_PROJECT_COUNT.to_string(),
            vote_file: None,
            rates_file: None,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            help: false,
            version: false,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| -> Result<String, AppError> {
                match inline.clone() {
                    Some(v) => Ok(v),
                    None => args
                        .next()
                        .ok_or_else(|| AppError::Usage(format!("{name} expects a value"))),
                }
            };

            match flag.as_str() {
                "-r" | "--round" => parsed.create_round = true,
                "-d" | "--match-pool" => parsed.match_pool = value(&flag)?,
                "-t" | "--token" => parsed.token = value(&flag)?,
                "-p" | "--project-count" => parsed.project_count = value(&flag)?,
                "-v" | "--vote" => parsed.vote_file = Some(PathBuf::from(value(&flag)?)),
                "--rates" => parsed.rates_file = Some(PathBuf::from(value(&flag)?)),
                "--data" => parsed.data_path = PathBuf::from(value(&flag)?),
                "--log" => parsed.log_level = value(&flag)?,
                "-h" | "--help" => parsed.help = true,
                "-V" | "--version" => parsed.version = true,
                _ => return Err(AppError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}\n\n{usage}", usage = USAGE)]
    Usage(String),
    #[error("unknown argument: {0}")]
    UnknownArg(String),
    #[error("no round document at {}; create one with --round", .0.display())]
    MissingRound(PathBuf),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error(transparent)]
    Qf(#[from] QfError),
}
