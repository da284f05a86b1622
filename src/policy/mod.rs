pub mod hot_reload;
pub mod loader;

pub use hot_reload::PolicyWatcher;
pub use loader::{load_ignore_list, load_policy, merge_ignore, PolicyError, PolicyLoader};
