//! Identifier allowlisting.
//!
//! Every name that is interpolated into SQL text (tables, columns, ORDER BY
//! targets) passes through this module. Values never do: they always travel
//! as bound parameters.

mod column;

pub use column::{check_identifier, is_valid_identifier};
