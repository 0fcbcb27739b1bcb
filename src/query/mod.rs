//! Query generation: fact + lexical patterns -> search queries.

pub mod error;
pub mod generator;
pub mod normalize;
pub mod types;


pub use error::{QueryError, QueryResult};
pub use generator::QueryGenerator;
pub use normalize::{
    Slot, TemplatePart, clean_query, normalize_predicate, normalize_query_key, render_query,
    template_parts,
};
pub use types::MetaQuery;
