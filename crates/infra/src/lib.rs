//! Infrastructure layer: counter storage, document lookups, allocation service.

pub mod allocator;
pub mod counter_store;
pub mod document_index;


pub use allocator::{AllocatedNumber, AllocationError, SequenceAllocator};
pub use counter_store::{CounterStore, InMemoryCounterStore, PostgresCounterStore, StoreError};
pub use document_index::{
    DocumentCollection, DocumentIndex, InMemoryDocumentIndex, PostgresDocumentIndex,
};
