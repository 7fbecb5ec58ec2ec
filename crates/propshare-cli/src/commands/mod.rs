pub mod categories;
pub mod distribute;
pub mod roi;
