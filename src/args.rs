use clap::Parser;

pub fn get() -> Args {
    Args::parse()
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, after_help = "Overrides are saved and reused on the next run")]
pub struct Args {
    /// Minimum magnitude
    #[arg(short, long)]
    pub min_magnitude: Option<String>,

    /// Ordering: time, time-asc, magnitude, magnitude-asc
    #[arg(short, long)]
    pub order_by: Option<String>,

    /// Maximum number of earthquakes to fetch
    #[arg(short, long)]
    pub limit: Option<String>,

    /// Print the feed URL and exit
    #[arg(short, long)]
    pub print_url: bool,
}
