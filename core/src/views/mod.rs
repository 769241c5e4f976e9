//! Pure derivations over fetched collections: search, ordering and classification.
//!
//! Nothing in here talks to the store. Every function takes rows by reference and
//! returns new values, so the same inputs always give the same view.

mod classify;
mod search;
mod sort;

pub use classify::{
	has_access, partition_by_access, residents, users_with_access, AccessPartition,
	ComplexStats, Occupancy,
};
pub use search::{filter, Searchable};
pub use sort::{
	sort, ApartmentField, Direction, GateField, PermissionField, ResidentField, SortKey,
	SortSpec, Sortable,
};
