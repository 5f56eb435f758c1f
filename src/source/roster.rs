//! Built-in news sources

use crate::source::{FeedSource, Link, Source, SourceOptions};
use crate::Result;
use std::sync::Arc;

pub const TOP_STORIES: &str = "Top stories";
pub const POLITICS: &str = "Politics";
pub const WORLD: &str = "World";
pub const SPORTS: &str = "Sports";
pub const BUSINESS: &str = "Business";
pub const LIFESTYLE: &str = "Lifestyle";
pub const ENTERTAINMENT: &str = "Entertainment";
pub const TECH: &str = "Tech";
pub const AFRICA: &str = "Africa";

/// Every built-in source, in crawl order
pub fn default_roster() -> Result<Vec<Arc<dyn Source>>> {
    let roster: Vec<Arc<dyn Source>> = vec![
        Arc::new(citinewsroom()?),
        Arc::new(myjoyonline()?),
        Arc::new(modernghana()?),
        Arc::new(ghanaweb()?),
        Arc::new(pulse()?),
        Arc::new(bbc()?),
    ];
    Ok(roster)
}

pub fn bbc() -> Result<FeedSource> {
    FeedSource::new(
        "bbc",
        "bbc.com",
        vec![
            Link::new(AFRICA, "http://feeds.bbci.co.uk/news/world/africa/rss.xml"),
            Link::new(WORLD, "http://feeds.bbci.co.uk/news/world/rss.xml"),
        ],
        SourceOptions::new(false, ".story-body__inner p"),
    )
}

pub fn citinewsroom() -> Result<FeedSource> {
    FeedSource::new(
        "citinewsroom",
        "citinewsroom.com",
        vec![
            Link::new(TOP_STORIES, "https://citinewsroom.com/ghana-news/top-stories/feed/"),
            Link::new(POLITICS, "https://citinewsroom.com/ghana-news/politics/feed/"),
            Link::new(SPORTS, "https://citinewsroom.com/ghana-news/sports/feed/"),
            Link::new(BUSINESS, "https://citinewsroom.com/ghana-news/business/feed/"),
            Link::new(ENTERTAINMENT, "https://citinewsroom.com/ghana-news/showbiz/feed/"),
        ],
        SourceOptions::new(true, ".entry-content p"),
    )
}

pub fn ghanaweb() -> Result<FeedSource> {
    FeedSource::new(
        "ghanaweb",
        "ghanaweb.com",
        vec![
            Link::new(TOP_STORIES, "https://cdn.ghanaweb.com/feed/newsfeed.xml"),
            Link::new(SPORTS, "https://cdn.ghanaweb.com/feed/soccerfeed.xml"),
            Link::new(SPORTS, "https://cdn.ghanaweb.com/feed/other_sportsfeed.xml"),
            Link::new(ENTERTAINMENT, "https://cdn.ghanaweb.com/feed/entertainmentfeed.xml"),
        ],
        SourceOptions::new(false, "#medsection1 > p:nth-child(8)"),
    )
}

pub fn modernghana() -> Result<FeedSource> {
    const FEED: &str = "https://rss.modernghana.com/news.xml";

    FeedSource::new(
        "modernghana",
        "modernghana.com",
        vec![
            Link::new(TOP_STORIES, &format!("{FEED}?cat_id=1&group_id=1")),
            Link::new(POLITICS, &format!("{FEED}?cat_id=1&group_id=5")),
            Link::new(SPORTS, &format!("{FEED}?cat_id=2")),
            Link::new(BUSINESS, &format!("{FEED}?cat_id=1&group_id=6")),
            Link::new(ENTERTAINMENT, &format!("{FEED}?cat_id=3")),
            Link::new(WORLD, &format!("{FEED}?cat_id=1&group_id=8")),
            Link::new(AFRICA, &format!("{FEED}?cat_id=1&group_id=2")),
        ],
        SourceOptions::new(false, ".blog-content p"),
    )
}

pub fn pulse() -> Result<FeedSource> {
    FeedSource::new(
        "pulse",
        "pulse.com.gh",
        vec![Link::new(TOP_STORIES, "http://www.pulse.com.gh/rss")],
        SourceOptions::new(false, ".article_text p"),
    )
}

pub fn myjoyonline() -> Result<FeedSource> {
    const FEED: &str = "https://www.myjoyonline.com/pages/rss";

    FeedSource::new(
        "myjoyonline",
        "myjoyonline.com",
        vec![
            Link::new(TOP_STORIES, &format!("{FEED}/site_edition.xml")),
            Link::new(POLITICS, &format!("{FEED}/site_politics.xml")),
            Link::new(WORLD, &format!("{FEED}/site_world.xml")),
            Link::new(SPORTS, &format!("{FEED}/site_sports.xml")),
            Link::new(BUSINESS, &format!("{FEED}/site_business.xml")),
            Link::new(LIFESTYLE, &format!("{FEED}/site_lifestyle.xml")),
            Link::new(ENTERTAINMENT, &format!("{FEED}/site_entertainment.xml")),
            Link::new(TECH, &format!("{FEED}/site_technology.xml")),
        ],
        SourceOptions::new(false, ".article-text p"),
    )
}
