//! Player directory: validation and create/update/delete rules over a
//! [`RecordStore`](crate::storage::RecordStore).

pub mod policy;
pub mod service;

pub use policy::DirectoryPolicy;
pub use service::DirectoryService;
