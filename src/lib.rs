//! News Hub library: the aggregation pipeline behind the `news_hub` server.
//!
//! Leaf modules first: [`utils`], [`classify`], and [`normalize`] shape raw
//! records into [`models::Article`]s; [`sources`] fetch them; [`cache`] and
//! [`aggregate`] decide when to fetch; [`paginate`] and [`routes`] serve them.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod paginate;
pub mod retry;
pub mod routes;
pub mod sources;
pub mod utils;

pub use error::NewsError;
