use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use feed_engine::{ProfileFilter, SearchSort, SubredditSort, TimeRange};

#[derive(Parser)]
#[command(name = "feed")]
#[command(about = "Scrape listings and comment threads into JSON", long_about = None)]
pub struct Cli {
    /// Settings file (RON). Defaults to the user config directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs to this file as well as the terminal
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Posts of a subreddit
    Subreddit {
        name: String,
        #[arg(short, long, value_enum)]
        sort: Option<SortArg>,
        /// Time range for top and controversial
        #[arg(short, long, value_enum)]
        time: Option<TimeArg>,
        /// Cursor returned by a previous page
        #[arg(long)]
        after: Option<String>,
        /// Number of consecutive pages to gather
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Search posts, or subreddits with --subreddits
    Search {
        query: String,
        #[arg(long)]
        subreddits: bool,
        #[arg(short, long, value_enum, default_value_t = SearchSortArg::Relevance)]
        sort: SearchSortArg,
        #[arg(short, long, value_enum, default_value_t = TimeArg::All)]
        time: TimeArg,
        #[arg(long)]
        after: Option<String>,
    },
    /// Posts and comments of a user
    User {
        name: String,
        #[arg(short, long, value_enum, default_value_t = FilterArg::Overview)]
        filter: FilterArg,
        #[arg(long)]
        after: Option<String>,
    },
    /// Comment tree of a post
    Comments {
        /// Comments page URL, absolute or relative to the site
        url: String,
    },
    /// Download the tracking parameter list and replace the cache
    UpdateTrackingList,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Hot,
    New,
    Rising,
    Top,
    Controversial,
}

impl From<SortArg> for SubredditSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Hot => SubredditSort::Hot,
            SortArg::New => SubredditSort::New,
            SortArg::Rising => SubredditSort::Rising,
            SortArg::Top => SubredditSort::Top,
            SortArg::Controversial => SubredditSort::Controversial,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchSortArg {
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl From<SearchSortArg> for SearchSort {
    fn from(arg: SearchSortArg) -> Self {
        match arg {
            SearchSortArg::Relevance => SearchSort::Relevance,
            SearchSortArg::Hot => SearchSort::Hot,
            SearchSortArg::Top => SearchSort::Top,
            SearchSortArg::New => SearchSort::New,
            SearchSortArg::Comments => SearchSort::Comments,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TimeArg {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl From<TimeArg> for TimeRange {
    fn from(arg: TimeArg) -> Self {
        match arg {
            TimeArg::Hour => TimeRange::Hour,
            TimeArg::Day => TimeRange::Day,
            TimeArg::Week => TimeRange::Week,
            TimeArg::Month => TimeRange::Month,
            TimeArg::Year => TimeRange::Year,
            TimeArg::All => TimeRange::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    Overview,
    Submitted,
    Comments,
}

impl From<FilterArg> for ProfileFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Overview => ProfileFilter::Overview,
            FilterArg::Submitted => ProfileFilter::Submitted,
            FilterArg::Comments => ProfileFilter::Comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn subreddit_arguments_parse() {
        let cli = Cli::try_parse_from([
            "feed", "subreddit", "rust", "--sort", "top", "--time", "week", "--pages", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Subreddit {
                name, pages, sort, ..
            } => {
                assert_eq!(name, "rust");
                assert_eq!(pages, 3);
                assert!(sort.is_some());
            }
            _ => panic!("expected subreddit command"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["feed", "comments", "/r/rust/comments/x/", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Comments { .. }));
    }

    #[test]
    fn unknown_sort_is_rejected() {
        assert!(Cli::try_parse_from(["feed", "subreddit", "rust", "--sort", "best"]).is_err());
    }
}
