pub mod assemble;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod html_tables;
pub mod http_client;
pub mod metrics;
pub mod normalize;
pub mod page_cache;
pub mod player_profile;
pub mod table_export;
pub mod top_players;
pub mod zscore;
