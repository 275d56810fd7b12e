use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub base_url: String,
    /// Relay credential. Resolved from the config file, the
    /// `SPEECH_COACH_OPENAI__API_KEY` override, or `OPENAI_API_KEY`;
    /// absence is fatal at startup.
    pub api_key: String,
    pub transcription_model: String,
    pub feedback_model: String,
    pub paragraph_model: String,
    /// Bound on every outbound call; a timeout surfaces as that step's
    /// upstream error.
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from an optional TOML file plus environment
    /// overrides, then validate the credential is present.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "speech-coach")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 3000)?
            .set_default("openai.base_url", "https://api.openai.com")?
            .set_default("openai.api_key", "")?
            .set_default("openai.transcription_model", "whisper-1")?
            .set_default("openai.feedback_model", "gpt-3.5-turbo")?
            .set_default("openai.paragraph_model", "gpt-3.5-turbo-instruct")?
            .set_default("openai.timeout_secs", 30)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SPEECH_COACH").separator("__"))
            .build()?;

        let mut cfg: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;

        if cfg.openai.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                cfg.openai.api_key = key;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Startup-time checks; the service refuses to start on failure rather
    /// than failing per-request.
    pub fn validate(&self) -> Result<()> {
        if self.openai.api_key.is_empty() {
            bail!(
                "Missing OpenAI API key: set OPENAI_API_KEY or openai.api_key in the config file"
            );
        }
        if self.openai.timeout_secs == 0 {
            bail!("openai.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_config(api_key: &str) -> Config {
        Config {
            service: ServiceConfig {
                name: "speech-coach".to_string(),
                http: HttpConfig {
                    bind: "127.0.0.1".to_string(),
                    port: 3000,
                },
            },
            openai: OpenAiConfig {
                base_url: "https://api.openai.com".to_string(),
                api_key: api_key.to_string(),
                transcription_model: "whisper-1".to_string(),
                feedback_model: "gpt-3.5-turbo".to_string(),
                paragraph_model: "gpt-3.5-turbo-instruct".to_string(),
                timeout_secs: 30,
            },
        }
    }

    #[test]
    fn missing_api_key_fails_validation() {
        assert!(base_config("").validate().is_err());
    }

    #[test]
    fn present_api_key_passes_validation() {
        assert!(base_config("sk-test").validate().is_ok());
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut cfg = base_config("sk-test");
        cfg.openai.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech-coach.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[service]
name = "speech-coach-test"

[service.http]
bind = "127.0.0.1"
port = 8081

[openai]
api_key = "sk-from-file"
timeout_secs = 5
"#
        )
        .unwrap();

        let cfg = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.service.name, "speech-coach-test");
        assert_eq!(cfg.service.http.port, 8081);
        assert_eq!(cfg.openai.api_key, "sk-from-file");
        assert_eq!(cfg.openai.timeout_secs, 5);
        // Defaults fill everything the file omits.
        assert_eq!(cfg.openai.transcription_model, "whisper-1");
        assert_eq!(cfg.openai.base_url, "https://api.openai.com");
    }
}
