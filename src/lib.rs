pub mod loader;
pub mod measures;
pub mod model;
pub mod trec_format;
pub mod util;
