/// Environment variable overriding the location of the registry configuration file.
pub const ENV_ASSOC_CONFIG_PATH: &str = "HY_ASSOC_CONFIG_PATH";

/// Directory (relative to the platform configuration root) holding Hyperion configuration files.
pub const CONFIG_DIR_NAME: &str = "hyperion";

/// File name of the registry configuration.
pub const CONFIG_FILE_NAME: &str = "assoc.toml";

/// Largest `initial_capacity` a registry configuration may request. Anything above would make
/// the up-front allocation of the instance map overflow or abort.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;
