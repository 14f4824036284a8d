//! Query model and record stores
//!
//! `panelkit-query` knows nothing about modules, fields or uitypes. It owns
//! the vocabulary the rest of the workspace speaks when it talks to storage:
//!
//! - [`Record`] - a persisted row: primary key, JSON attributes, timestamps
//! - [`Predicate`] - a schema-agnostic filter expression
//! - [`Query`] - an unexecuted, cloneable description of what to fetch
//! - [`RecordStore`] - the storage collaborator that executes queries
//!
//! Building a [`Query`] never touches storage, so callers can build once and
//! then count and paginate progressively narrowed clones.

mod error;
mod eval;
mod predicate;
mod query;
mod record;
mod store;

pub use error::{QueryError, Result};
pub use eval::{compare_values, is_truthy, stored_datetime};
pub use predicate::{CompareOp, Predicate};
pub use query::{OrderBy, Query, SortDirection};
pub use record::{Record, RecordId, TIMESTAMP_FORMAT};
pub use store::{MemoryStore, RecordStore, StoreRegistry};
