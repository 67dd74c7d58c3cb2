//! Document stores for users and medical records.
//!
//! Both stores keep one YAML document per entity in a sharded tree:
//!
//! ```text
//! <data_dir>/
//!   users/<s1>/<s2>/<uuid>/user.yaml
//!   records/<s1>/<s2>/<uuid>/record.yaml
//! ```
//!
//! Stores perform no locking; concurrent writers to the same document are last-write-wins.

pub(crate) mod records;
pub(crate) mod shared;
pub(crate) mod users;
