//! Schema mapping: from classified columns to canonical products.

mod coerce;
mod mapper;

pub use coerce::{coerce_price, coerce_value, split_generated_list};
pub use mapper::{
    FieldMapping, MapperConfig, MappingConflict, MappingOutcome, MappingPlan, SchemaMapper,
};
