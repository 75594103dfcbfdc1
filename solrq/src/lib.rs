//! solrq: build Solr query strings from a small boolean algebra
//!
//! - [`Q`] nodes combine field clauses with AND / OR / NOT
//! - [`Query`] compiles them into the `q` and `fq` parameters
//! - [`Search`] binds a [`SolrClient`] to its filter mapping and fixed parameters
//!
//! ```
//! use solrq::Q;
//!
//! let q = (Q::field("foo", "bar") | Q::field("foo", "test")) & !Q::field("xyz", "xyz");
//! assert_eq!(q.operands().len(), 2);
//! ```

pub mod client;
pub mod error;
pub mod escape;
pub mod params;
pub mod q;
pub mod query;
pub mod results;
pub mod search;

pub use client::{HttpSolrClient, SolrClient};
pub use error::{Error, Result};
pub use escape::{escape_colons, solr_escape};
pub use params::SolrParams;
pub use q::{Clause, Operand, Operator, Q};
pub use query::{Query, MATCH_ALL};
pub use results::{Document, SolrResults};
pub use search::Search;
