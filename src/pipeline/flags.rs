//! Build-configuration feature flags read from unit defines

/// Master switch; units without it are never woven
pub const WEAVER_ENABLED: &str = "WEAVER_ENABLED";

/// Restrict weaving to release builds
pub const WEAVER_BUILDS_ONLY: &str = "WEAVER_BUILDS_ONLY";

/// Opt editor-only units into weaving
pub const WEAVER_INCLUDE_EDITOR_UNIT: &str = "WEAVER_INCLUDE_EDITOR_UNIT";

/// Trace skip/replace decisions at info level
pub const WEAVER_VERBOSE_LOGGING: &str = "WEAVER_VERBOSE_LOGGING";
