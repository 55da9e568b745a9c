use clap::{
    Arg, ArgAction, ArgGroup, ColorChoice, Command,
    builder::{
        ValueParser,
        styling::{AnsiColor, Effects, Styles},
    },
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        // Numeric levels follow `telemetry::level_from_verbosity`: 0 is ERROR, 4 is TRACE.
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 4 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Email address the access code is issued for")
        .required(true)
}

fn page_arg() -> Arg {
    Arg::new("page")
        .short('p')
        .long("page")
        .help("Protected page route, for example /admin/users")
        .required(true)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("pagegate")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .short('a')
                .long("api-url")
                .help("Base URL of the access API, example: https://api.example.org/v1")
                .env("PAGEGATE_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("store")
                .short('s')
                .long("store")
                .help("Token store file for this origin")
                .env("PAGEGATE_STORE")
                .default_value("pagegate-store.json")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Request timeout in seconds")
                .env("PAGEGATE_TIMEOUT")
                .default_value("10")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PAGEGATE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("request")
                .about("Ask for temporary access to a protected page")
                .arg(email_arg())
                .arg(page_arg()),
        )
        .subcommand(
            Command::new("verify")
                .about("Exchange an access code for a page grant")
                .arg(email_arg())
                .arg(page_arg())
                .arg(
                    Arg::new("code")
                        .short('c')
                        .long("code")
                        .help("Access code relayed by an administrator")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("pending")
                .about("List pending access requests and their codes")
                .arg(
                    Arg::new("copy")
                        .long("copy")
                        .value_name("ID")
                        .help("Print only the code of this request, for relaying"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Decide whether a protected page may be shown")
                .arg(page_arg()),
        )
        .subcommand(
            Command::new("session")
                .about("Manage the stored login token")
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help("Login token to store")
                        .env("PAGEGATE_SESSION_TOKEN")
                        .hide_env_values(true),
                )
                .arg(
                    Arg::new("clear")
                        .long("clear")
                        .help("Remove the stored login token")
                        .action(ArgAction::SetTrue),
                )
                .group(
                    ArgGroup::new("session-op")
                        .args(["token", "clear"])
                        .required(true),
                ),
        )
        .subcommand(Command::new("clear").about("Drop the temporary page grant"))
}
