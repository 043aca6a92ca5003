use anyhow::Result;
use biblio_core::{Config, SessionBackend};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub base_url: Option<String>,
    pub session_backend: Option<SessionBackend>,
}

impl GlobalArgs {
    /// Saved configuration with the command line applied on top.
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load()?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(backend) = self.session_backend {
            config.session_backend = backend;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = GlobalArgs {
            base_url: Some("https://library.example.org/".to_string()),
            session_backend: Some(SessionBackend::Memory),
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.api_base(), "https://library.example.org");
        assert_eq!(config.session_backend, SessionBackend::Memory);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config {
            base_url: "http://books.local".to_string(),
            ..Config::default()
        };
        GlobalArgs::default().apply(&mut config);

        assert_eq!(config.base_url, "http://books.local");
        assert_eq!(config.session_backend, SessionBackend::File);
    }
}
