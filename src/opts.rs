use std::path::PathBuf;
use structopt::StructOpt;

/// Serve the servers and stretch-upgrade documentation pages
#[derive(StructOpt, Debug)]
#[structopt(name = "hostdoc")]
pub struct Opts {
    /// Increase log verbosity, may be repeated
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,

    /// Path to the TOML configuration file
    #[structopt(
        short,
        long,
        parse(from_os_str),
        default_value = "/etc/hostdoc/config.toml"
    )]
    pub config: PathBuf,

    /// Override the host declaration file named in the configuration
    #[structopt(short, long, parse(from_os_str))]
    pub declarations: Option<PathBuf>,

    /// Override the address to listen on
    #[structopt(short, long)]
    pub bind: Option<String>,
}

impl Opts {
    pub fn new() -> Self {
        Self::from_args()
    }
}
