pub mod evaluate;
pub mod measures;
