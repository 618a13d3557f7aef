mod failing_search;
mod oracle_classifier;
mod vec_stream;

pub use failing_search::FailingSearch;
pub use oracle_classifier::OracleClassifier;
pub use vec_stream::VecStream;
