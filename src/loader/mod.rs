pub mod json_loader;
pub mod tsx_loader;
