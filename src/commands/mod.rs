pub mod import;
pub mod sync;
pub mod validate;
