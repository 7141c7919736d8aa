use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MwachMessaging";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the data directory (deployments keep the catalog next to the
/// web application's own data).
pub const DATA_DIR_ENV: &str = "MWACH_DATA_DIR";

/// Catalog database file name inside the data directory.
pub const CATALOG_DB_FILE: &str = "templates.db";

/// Get the application data directory
/// `$MWACH_DATA_DIR` if set, else ~/MwachMessaging/
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the template catalog database path
pub fn catalog_db_path() -> PathBuf {
    app_data_dir().join(CATALOG_DB_FILE)
}

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "mwach_messaging=debug"
    } else {
        "mwach_messaging=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_db_under_app_data() {
        let db = catalog_db_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with(CATALOG_DB_FILE));
    }

    #[test]
    fn default_data_dir_named_after_app() {
        if std::env::var_os(DATA_DIR_ENV).is_none() {
            assert!(app_data_dir().ends_with(APP_NAME));
        }
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().starts_with("mwach_messaging="));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
