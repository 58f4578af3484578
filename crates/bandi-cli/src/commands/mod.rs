//! Command implementations.

pub mod extract;
pub mod locate;
pub mod profile;
pub mod show;

pub use self::extract::execute_extract;
pub use self::locate::execute_locate;
pub use self::profile::execute_profile;
pub use self::show::execute_show;

use crate::config::Config;
use crate::error::Result;
use bandi_store::InMemoryFragmentIndex;
use tracing::debug;

/// Load the fragment index named on the command line or in the active profile.
pub(crate) fn load_index(config: &Config, index: Option<&str>) -> Result<InMemoryFragmentIndex> {
    let path = match index {
        Some(path) => path.to_string(),
        None => config.get_active_profile()?.index_path.clone(),
    };
    debug!("Loading fragment index from {}", path);
    Ok(InMemoryFragmentIndex::from_json_file(path)?)
}
