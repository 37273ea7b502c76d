use clap::{Parser, ValueEnum};
use unfold_page::PaginationKind;

#[derive(Parser, Debug)]
#[command(name = "unfold-page")]
#[command(about = "Extracts the full content of a page, paginating until nothing new appears")]
#[command(version)]
pub struct Args {
    /// URL of the page to scrape
    pub url: String,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Force a pagination strategy instead of auto-selecting one
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Scroll budget per scroll pass
    #[arg(long)]
    pub max_scrolls: Option<usize>,

    /// Highest page number URL pagination may reach
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Stop at the first fallback stage that finds new content
    #[arg(long)]
    pub prioritized: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Infinite,
    Click,
    Url,
    Parameter,
}

/// Convert from CLI argument strategy to the configured pagination kind
pub fn convert_strategy(arg: StrategyArg) -> PaginationKind {
    match arg {
        StrategyArg::Infinite => PaginationKind::Infinite,
        StrategyArg::Click => PaginationKind::Click,
        StrategyArg::Url => PaginationKind::Url,
        StrategyArg::Parameter => PaginationKind::Parameter,
    }
}
