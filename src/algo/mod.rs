/// Table-based value learning
pub mod tabular;
