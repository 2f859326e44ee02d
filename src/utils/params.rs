//! Parameter file loading

use std::fs::read_to_string;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;

use crate::common::PlannerResult;

/// Load a TOML parameter file into `P`.
///
/// Keys missing from the file take the values of `P`'s `Default` when `P`
/// is marked `#[serde(default)]`.
pub fn load<P, Q>(param_file_path: Q) -> PlannerResult<P>
where
    P: DeserializeOwned,
    Q: AsRef<Path>,
{
    let params_str = read_to_string(param_file_path.as_ref())?;
    let params = from_str(&params_str)?;
    debug!("Loaded parameters from {:?}", param_file_path.as_ref());
    Ok(params)
}

/// Parse parameters from a TOML string
pub fn from_str<P: DeserializeOwned>(params_str: &str) -> PlannerResult<P> {
    Ok(toml::from_str(params_str)?)
}
