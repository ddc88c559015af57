/// Application name
pub const APP_NAME: &str = "Hyper";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Owner recorded for components the application registers itself
pub const BUILTIN_OWNER: &str = "hyper";

/// Per-project directory created by `init`
pub const PROJECT_DIR: &str = ".hyper";

/// Default plugin search directory, relative to the working directory
pub const DEFAULT_PLUGINS_DIR: &str = ".hyper/plugins";

/// Container key under which the application configuration is registered
pub const CONFIG_SERVICE_KEY: &str = "app.config";

/// Container key under which the active theme name is registered
pub const THEME_SERVICE_KEY: &str = "app.theme";

/// Theme used when the configuration names none (or an unknown one)
pub const DEFAULT_THEME: &str = "default";

/// Default log level filter for the binary
pub const DEFAULT_LOG_LEVEL: &str = "info";
