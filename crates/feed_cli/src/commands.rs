use std::sync::Arc;

use anyhow::Context;
use feed_core::FeedAccumulator;
use feed_engine::{
    FeedClient, FeedSettings, ReqwestFetcher, SearchQuery, SubredditQuery, TrackingListConfig,
    TrackingParams,
};
use feed_logging::{feed_info, feed_warn};
use serde::Serialize;

use crate::cli::Commands;

pub async fn run(command: Commands, settings: FeedSettings) -> anyhow::Result<()> {
    let tracking_config = TrackingListConfig::from_settings(&settings);
    let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch_settings()));

    if let Commands::UpdateTrackingList = command {
        let params = TrackingParams::new(tracking_config, fetcher);
        let count = params
            .update_tracking_list()
            .await
            .context("updating tracking list")?;
        println!("{count} tracking parameters saved to {}", params.config().cache_path.display());
        return Ok(());
    }

    let tracking = TrackingParams::initialize(tracking_config, fetcher).await;
    let client = FeedClient::from_settings(settings, tracking)?;

    match command {
        Commands::Subreddit {
            name,
            sort,
            time,
            after,
            pages,
        } => {
            let mut query = SubredditQuery::new(name);
            if let Some(sort) = sort {
                query = query.sorted(sort.into(), time.map(Into::into));
            }
            let mut feed = FeedAccumulator::new();
            let mut cursor = after;
            for page_number in 1..=pages.max(1) {
                let page = client.subreddit(&query, cursor.as_deref()).await?;
                let added = feed.extend(page);
                feed_info!("page {} added {} posts", page_number, added);
                if feed.is_exhausted() {
                    break;
                }
                cursor = feed.cursor().map(str::to_string);
            }
            print_json(&Listing {
                items: feed.items(),
                after: feed.cursor(),
            })
        }
        Commands::Search {
            query,
            subreddits,
            sort,
            time,
            after,
        } => {
            let mut search = SearchQuery::new(query);
            search.sort = sort.into();
            search.time = time.into();
            if subreddits {
                if after.is_some() {
                    feed_warn!("--after is ignored for subreddit search");
                }
                print_json(&client.search_subreddits(&search).await?)
            } else {
                print_json(&client.search_posts(&search, after.as_deref()).await?)
            }
        }
        Commands::User {
            name,
            filter,
            after,
        } => print_json(&client.profile(&name, filter.into(), after.as_deref()).await?),
        Commands::Comments { url } => print_json(&client.comments(&url).await?),
        Commands::UpdateTrackingList => Ok(()),
    }
}

#[derive(Serialize)]
struct Listing<'a, T> {
    items: &'a [T],
    after: Option<&'a str>,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("encoding output")?;
    println!("{text}");
    Ok(())
}
