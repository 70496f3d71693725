//! Command implementations

mod config;
mod edit;
mod export;
mod history;
mod import;
mod scan;
mod session;
mod show;
mod validate;

pub use config::execute as config;
pub use edit::execute as edit;
pub use export::execute as export;
pub use history::{redo, undo};
pub use import::execute as import;
pub use scan::execute as scan;
pub use session::execute as session;
pub use show::execute as show;
pub use validate::execute as validate;
