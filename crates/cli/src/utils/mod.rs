pub mod file;
pub mod parser;

pub use file::{resolve_against, resolve_project_root};
pub use parser::parse_env_pair;
