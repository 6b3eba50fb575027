use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
}

#[derive(Clone)]
pub struct Config {
    pub secret_key: String,
    pub gemini_api_key: String,
    pub upload_folder: PathBuf,
    pub client_secret_file: PathBuf,
    pub external_base_url: String,
    pub drive_folder_id: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let secret_key = std::env::var("SECRET_KEY")
            .unwrap_or_else(|_| "dev-secret-change-me".to_string());

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let upload_folder = base_dir.join(
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
        );

        let client_secret_file = PathBuf::from(
            std::env::var("CLIENT_SECRET_FILE")
                .unwrap_or_else(|_| "client_secret.json".to_string()),
        );

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .unwrap_or(10000);

        let external_base_url = std::env::var("EXTERNAL_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let drive_folder_id = std::env::var("DRIVE_FOLDER_ID").ok();

        Ok(Self {
            secret_key,
            gemini_api_key,
            upload_folder,
            client_secret_file,
            external_base_url,
            drive_folder_id,
            host,
            port,
        })
    }

    /// Public callback address registered with the OAuth provider.
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}/oauth2callback",
            self.external_base_url.trim_end_matches('/')
        )
    }
}
