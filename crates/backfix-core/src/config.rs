//! Static configuration for the conversion core.

/// Application naming used in reports and export filenames.
pub struct AppConfig;

impl AppConfig {
    /// Name of the application that produced the source backups.
    pub const SOURCE_APP_NAME: &'static str = "Kreate";

    /// Name of the application the generated database targets.
    pub const TARGET_APP_NAME: &'static str = "Cubic Music";

    /// Prefix for suggested export filenames.
    pub const EXPORT_FILE_PREFIX: &'static str = "cubic_music";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config() {
        assert_eq!(AppConfig::SOURCE_APP_NAME, "Kreate");
        assert_eq!(AppConfig::TARGET_APP_NAME, "Cubic Music");
        assert_eq!(AppConfig::EXPORT_FILE_PREFIX, "cubic_music");
    }
}
