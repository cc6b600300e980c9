pub mod toml_loader;

pub use toml_loader::{load_dimension_catalog, load_secm_catalog};
