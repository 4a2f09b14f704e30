pub mod db;
pub mod merge;
pub mod normalize;
pub mod stats;
