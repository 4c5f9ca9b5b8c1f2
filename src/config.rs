use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub appwrite: AppwriteConfig,
    pub seeder: SeederConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub bucket_id: String,
    pub tables: TableNames,
}

/// Table names for the four seeded collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableNames {
    pub categories: String,
    pub customisations: String,
    pub menu: String,
    pub menu_customisations: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeederConfig {
    /// Upper bound on concurrent remote operations within one phase.
    pub max_concurrency: usize,
    /// Staging directory for downloaded images; system temp dir when unset.
    pub staging_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            appwrite: AppwriteConfig::default(),
            seeder: SeederConfig::default(),
        }
    }
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            api_key: String::new(),
            database_id: String::new(),
            bucket_id: String::new(),
            tables: TableNames::default(),
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            categories: "categories".to_string(),
            customisations: "customisations".to_string(),
            menu: "menu".to_string(),
            menu_customisations: "menu_customisations".to_string(),
        }
    }
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            staging_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "SEEDER_"
        config = config.add_source(
            config::Environment::with_prefix("SEEDER")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }
}
