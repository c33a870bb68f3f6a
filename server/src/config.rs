use anyhow::{Context, Result, anyhow};
use platform_db::DatabaseSettings;

const DEFAULT_REPORTING_MAX_DEPTH: usize = 64;
// Response trees nest one level per loaded level.
const REPORTING_DEPTH_LIMIT: usize = 256;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub cors_allowed_origins: Vec<String>,
    /// How many levels below an employee the reporting structure endpoint loads.
    pub reporting_max_depth: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            cors_allowed_origins: vec!["http://localhost:5173".into()],
            reporting_max_depth: DEFAULT_REPORTING_MAX_DEPTH,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let database = DatabaseSettings::from_env().context("invalid database settings")?;

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let reporting_max_depth = match std::env::var("REPORTING_MAX_DEPTH") {
            Ok(raw) => parse_depth(&raw)?,
            Err(_) => DEFAULT_REPORTING_MAX_DEPTH,
        };

        Ok(Self {
            database,
            cors_allowed_origins,
            reporting_max_depth,
        })
    }
}

fn parse_depth(raw: &str) -> Result<usize> {
    let depth: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid REPORTING_MAX_DEPTH {raw:?}"))?;
    if depth == 0 {
        return Err(anyhow!("REPORTING_MAX_DEPTH must be at least 1"));
    }
    if depth > REPORTING_DEPTH_LIMIT {
        return Err(anyhow!(
            "REPORTING_MAX_DEPTH must be at most {REPORTING_DEPTH_LIMIT}, got {depth}"
        ));
    }
    Ok(depth)
}
