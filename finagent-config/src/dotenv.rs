use anyhow::Result;

/// Load environment variables from a `.env` file in the current directory.
///
/// A missing file is not an error. A file that exists but cannot be parsed
/// is logged and ignored so deployments without a `.env` keep working.
pub fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment variables from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            tracing::warn!("Failed to load .env file: {}", e);
            Ok(())
        }
    }
}
