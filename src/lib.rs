pub mod scrub;
pub mod table;
