//! Random forest classifier with JSON persistence.

mod model;
mod train;

pub use model::{DecisionTree, ForestModel, Node};
pub use train::{TrainDataset, TrainOptions, train_forest};
