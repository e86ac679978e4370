pub mod config;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod markup;
pub mod model;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod source;
pub mod sportsdb;
pub mod standings;
pub mod text;
