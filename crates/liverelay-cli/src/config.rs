//! Loads the shared relay configuration when the command line leaves the port
//! unset.
//!
//! The client's own flags are not `ortho_config` flags, so the loader only
//! sees the program name. Defaults, the configuration file and `LIVERELAY_*`
//! variables still apply, which keeps the client pointed at the same port as
//! a `liverelayd` started in the same environment.

use liverelay_config::Config;
use ortho_config::OrthoConfig;

use crate::errors::ClientError;

const PROGRAM_NAME: &str = "liverelay";

pub(crate) trait ConfigLoader {
    /// Loads the layered relay configuration.
    fn load(&self) -> Result<Config, ClientError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self) -> Result<Config, ClientError> {
        Config::load_from_iter([PROGRAM_NAME]).map_err(ClientError::LoadConfiguration)
    }
}

/// Port from `--port`, falling back to the layered configuration.
pub(crate) fn resolve_port<L: ConfigLoader>(
    flag: Option<u16>,
    loader: &L,
) -> Result<u16, ClientError> {
    match flag {
        Some(port) => Ok(port),
        None => loader.load().map(|config| config.port()),
    }
}
