mod knn;
pub mod neighbour_search;
mod running_stats;
mod standardizer;
mod vote_aggregator;
mod window;

pub use knn::{Knn, KnnState};
pub use running_stats::RunningStats;
pub use standardizer::Standardizer;
pub use vote_aggregator::{VoteAggregator, VoteMode};
pub use window::Window;
