// Pipeline processing: filtering, category normalization, damage costing and aggregation

pub mod aggregate;
pub mod damage;
pub mod filter;
pub mod normalize;
