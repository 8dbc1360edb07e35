//! Server configuration
//!
//! Every knob is an environment variable with a default:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/farmgate | Working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | JWT_SECRET | (dev fallback) | HS256 secret shared with the identity boundary |
//! | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
//! | PAYMENT_GATEWAY_URL | https://api.razorpay.com | Gateway base URL |
//! | PAYMENT_KEY_ID | (empty) | Gateway key id |
//! | PAYMENT_KEY_SECRET | (empty) | Gateway key secret, also signs assertions |
//! | PAYMENT_CURRENCY | INR | Charge currency |
//! | SETTLEMENT_ATOMICITY | auto | auto \| transactional \| best-effort |

use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::settlement::AtomicityPreference;

/// Payment gateway collaborator settings
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub gateway_url: String,
    pub key_id: String,
    pub key_secret: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// JWT validation configuration
    pub jwt: JwtConfig,
    /// Payment gateway configuration
    pub payment: PaymentConfig,
    /// Settlement execution preference; resolved once at startup
    pub atomicity: AtomicityPreference,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/farmgate".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::default(),
            payment: PaymentConfig {
                gateway_url: std::env::var("PAYMENT_GATEWAY_URL")
                    .unwrap_or_else(|_| "https://api.razorpay.com".into()),
                key_id: std::env::var("PAYMENT_KEY_ID").unwrap_or_default(),
                key_secret: std::env::var("PAYMENT_KEY_SECRET").unwrap_or_default(),
                currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".into()),
            },
            atomicity: std::env::var("SETTLEMENT_ATOMICITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Make sure the working directory layout exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}
