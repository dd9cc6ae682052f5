pub mod discovery;

pub use discovery::discover_layout;
