pub mod feed;
pub mod parser;

pub use feed::SensorFeed;
pub use parser::{parse_daily_feed, DailyRecords};
