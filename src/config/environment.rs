use std::env;

/// SMTP settings for outbound mail. Present only when `SMTP_HOST` is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    Smtp,
    /// Writes messages to the log instead of sending them. Local development only.
    Log,
}

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub frontend_url: String,
    pub mail_transport: MailTransport,
    pub mail_from: String,
    pub smtp: Option<SmtpConfig>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = non_empty("DATABASE_URL");

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .trim_end_matches('/')
            .to_string();

        let mail_transport = match env::var("MAIL_TRANSPORT").as_deref() {
            Ok("log") => MailTransport::Log,
            Ok("smtp") | Err(_) => MailTransport::Smtp,
            Ok(other) => return Err(format!("MAIL_TRANSPORT must be 'smtp' or 'log', got '{other}'")),
        };

        let mail_from = env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Telemedecine <no-reply@localhost>".to_string());

        let smtp = match non_empty("SMTP_HOST") {
            Some(host) => {
                let port = match env::var("SMTP_PORT") {
                    Ok(raw) => raw
                        .parse::<u16>()
                        .map_err(|_| format!("SMTP_PORT must be a port number, got '{raw}'"))?,
                    Err(_) => 587,
                };
                Some(SmtpConfig {
                    host,
                    port,
                    username: non_empty("SMTP_USERNAME"),
                    password: non_empty("SMTP_PASSWORD"),
                })
            }
            None => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            frontend_url,
            mail_transport,
            mail_from,
            smtp,
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
