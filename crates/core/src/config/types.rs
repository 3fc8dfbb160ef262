use serde::{Deserialize, Serialize};

use crate::converter::ConverterConfig;
use crate::media::MediaPolicy;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub policy: MediaPolicy,
}
