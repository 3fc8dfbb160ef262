pub mod config;
pub mod converter;
pub mod media;
pub mod normalizer;
pub mod planner;
pub mod testing;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use converter::{ConverterConfig, ConverterError, FfmpegTools, StreamProber, TranscodeRunner};
pub use media::{MediaFile, MediaPolicy, StreamSelection};
pub use normalizer::{FileOutcome, NormalizeError, NormalizeOptions, RunReport, TreeWalker};
