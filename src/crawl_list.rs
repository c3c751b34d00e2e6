use std::time::Duration;

use log::info;

use crate::CRAWLER_LOG;

pub const WIKI_ARTICLES: [&str; 3] = [
    "https://en.wikipedia.org/wiki/Winged_Victory_of_Samothrace",
    "https://en.wikipedia.org/wiki/Girl_with_a_Pearl_Earring",
    "https://en.wikipedia.org/wiki/Elden_Ring",
];

pub struct CrawlListProvider {
    startup_delay: Duration,
}

impl CrawlListProvider {
    pub fn new(startup_delay: Duration) -> Self {
        Self { startup_delay }
    }

    /// Waits out the startup delay, then hands back the fixed article list.
    pub async fn get_crawl_list(&self) -> Vec<String> {
        if !self.startup_delay.is_zero() {
            info!(
                target: CRAWLER_LOG,
                "Waiting {}s before crawling",
                self.startup_delay.as_secs_f64()
            );
            tokio::time::sleep(self.startup_delay).await;
        }
        WIKI_ARTICLES.iter().map(|url| url.to_string()).collect()
    }
}
