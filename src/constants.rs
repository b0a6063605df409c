//! Global constants used throughout the envrender codebase.
//!
//! Well-known environment variables, parameter path suffixes, and the
//! template delimiters are defined here so the bootstrap, the resolver,
//! and the renderer agree on the same literal strings.

/// Environment variable that supplies the environment name by default.
pub const DEFAULT_ENV_NAME_VAR: &str = "ENV_NAME";

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "ENVRENDER_CONFIG";

/// Directory name under the platform config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "envrender";

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Relative key, under the environment scope, naming the environment's foundation.
pub const FOUNDATION_NAME_KEY: &str = "fnd-name";

/// Relative key, under the foundation scope, naming the foundation's organization.
pub const ORGANIZATION_NAME_KEY: &str = "org-name";

/// Relative key holding the identifier of a scope's main secret bundle.
pub const MAIN_SECRET_KEY: &str = "secrets-manager/main";

/// Relative key, under the foundation scope, holding the database secret identifier.
pub const DATABASE_SECRET_KEY: &str = "secrets-manager/database";

/// Sentinel option name used by `by_env` when no environment-specific value matches.
pub const DEFAULT_OPTION: &str = "default";

/// Expression delimiters (`<<< expr >>>`).
pub const VARIABLE_START: &str = "<<<";
/// Closing expression delimiter.
pub const VARIABLE_END: &str = ">>>";

/// Block delimiters (`<<% if ... %>>`).
pub const BLOCK_START: &str = "<<%";
/// Closing block delimiter.
pub const BLOCK_END: &str = "%>>";

/// Comment delimiters (`<<# ... #>>`).
pub const COMMENT_START: &str = "<<#";
/// Closing comment delimiter.
pub const COMMENT_END: &str = "#>>";

/// Default name of the AWS command line binary.
pub const DEFAULT_AWS_COMMAND: &str = "aws";
