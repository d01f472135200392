//! Column classification: statistical type inference plus semantic name matching.

mod classifier;
mod semantic;
mod statistical;

pub use classifier::{ClassifierConfig, ColumnClassifier, rank_candidates};
pub use semantic::{SemanticAnalysis, SemanticAnalyzer, normalize_name};
pub use statistical::{
    StatisticalAnalysis, StatisticalAnalyzer, first_delimiter, split_list_value,
};
