//! Repository methods, one module per table family.
//!
//! Each module pairs free `insert_*`/`load_*` functions that take a bare
//! `libsql::Connection` (a `Transaction` derefs to one) with the public
//! `impl TranscriptStore` methods that own transaction boundaries. The free
//! functions let [`persist`] compose a whole session into one commit.

pub mod ensemble;
pub mod judge;
pub mod message;
pub mod persist;
pub mod session;
