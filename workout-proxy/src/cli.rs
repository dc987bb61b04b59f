use std::env;
use std::net::SocketAddr;
use std::process;

use getopts::Options;

pub const ADDRESS_VAR: &str = "WORKOUT_PROXY_ADDR";

/// One week.
const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub address: SocketAddr,
    pub duration_minutes: i64,
    pub link_lookahead: usize,
    pub uid_domain: String,
}

#[derive(Debug)]
pub enum Command {
    Help(String),
    Run(Args),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: $WORKOUT_PROXY_ADDR or 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "d",
        "duration",
        "Length of every exported workout [Default: 90]",
        "MINUTES",
    );
    opts.optopt(
        "l",
        "link-lookahead",
        "Lines after an entry searched for its Waze link [Default: 1]",
        "LINES",
    );
    opts.optopt(
        "u",
        "uid-domain",
        "Domain suffix of exported event identifiers [Default: workout-calendar]",
        "DOMAIN",
    );
    opts
}

pub fn try_parse(args: Vec<String>, env_address: Option<String>) -> Result<Command, String> {
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        let usage = opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME")));
        return Ok(Command::Help(usage));
    }

    let default_address = match env_address {
        Some(value) => value
            .parse()
            .map_err(|err| format!("Failed to parse `{ADDRESS_VAR}` environment variable: {err}"))?,
        None => SocketAddr::from(([127, 0, 0, 1], 8080)),
    };

    let address = matches
        .opt_get_default("address", default_address)
        .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?;

    let duration_minutes = matches
        .opt_get_default("duration", workout_parser::DEFAULT_DURATION_MINUTES)
        .map_err(|err| format!("Provided value for option 'duration' is invalid: {err}"))?;

    if !(1..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(format!(
            "Provided value for option 'duration' is invalid: expected 1 to {MAX_DURATION_MINUTES} minutes"
        ));
    }

    let link_lookahead = matches
        .opt_get_default("link-lookahead", 1)
        .map_err(|err| format!("Provided value for option 'link-lookahead' is invalid: {err}"))?;

    let uid_domain = matches
        .opt_str("uid-domain")
        .unwrap_or_else(|| "workout-calendar".into());

    Ok(Command::Run(Args {
        address,
        duration_minutes,
        link_lookahead,
        uid_domain,
    }))
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args, env::var(ADDRESS_VAR).ok()) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help(usage)) => {
            println!("{usage}");
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
