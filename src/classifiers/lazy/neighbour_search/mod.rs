mod euclidean_distance;
mod kd_tree;
mod linear_nn_search;
mod nearest_neighbour_search;

pub use euclidean_distance::EuclideanDistance;
pub use kd_tree::KdTree;
pub use linear_nn_search::LinearNNSearch;
pub use nearest_neighbour_search::{
    NearestNeighbourSearch, Neighbour, SearchAlgorithm, SearchError, validate_query,
};
