use std::str::FromStr;

use anyhow::Context;
use argon2::PasswordHash;
use jsonwebtoken::Algorithm;

/// One year; keeps `exp` arithmetic far from overflow.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

/// The single account allowed to log in.
#[derive(Debug, Clone)]
pub struct StaticUserConfig {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub encrypted_data_url: String,
    pub decrypt_url: String,
    pub result_url: String,
    pub username: String,
    pub password: String,
    pub submitter_name: String,
    pub repo_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub user: StaticUserConfig,
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("SECRET_KEY").context("SECRET_KEY is not set")?,
            algorithm: parse_algorithm(
                &std::env::var("ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            )?,
            ttl_minutes: parse_ttl_minutes(std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES").ok())?,
        };
        let user = StaticUserConfig {
            username: std::env::var("AUTH_USERNAME").unwrap_or_else(|_| "admin".into()),
            password_hash: check_password_hash(
                std::env::var("AUTH_PASSWORD_HASH")
                    .context("AUTH_PASSWORD_HASH is not set (see `cryptorelay hash-password`)")?,
            )
            .context("AUTH_PASSWORD_HASH is not a valid PHC string")?,
        };
        let upstream = UpstreamConfig {
            encrypted_data_url: std::env::var("ENCRYPTED_DATA_URL")
                .unwrap_or_else(|_| "http://yarlikvid.ru:9999/api/top-secret-data".into()),
            decrypt_url: std::env::var("DECRYPT_URL")
                .unwrap_or_else(|_| "http://yarlikvid.ru:9999/api/decrypt".into()),
            result_url: std::env::var("RESULT_URL")
                .unwrap_or_else(|_| "http://yarlikvid.ru:9999/api/result".into()),
            username: std::env::var("USER").context("USER is not set")?,
            password: std::env::var("PASSWORD").context("PASSWORD is not set")?,
            submitter_name: std::env::var("SUBMITTER_NAME")
                .unwrap_or_else(|_| "Мясищев Максим".into()),
            repo_url: std::env::var("REPO_URL")
                .unwrap_or_else(|_| "https://github.com/mnmyasis/test_for_qummy".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            user,
            upstream,
        })
    }
}

/// Only HMAC algorithms make sense with a shared `SECRET_KEY`.
pub fn parse_algorithm(name: &str) -> anyhow::Result<Algorithm> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|e| anyhow::anyhow!("unknown ALGORITHM {name:?}: {e}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => anyhow::bail!("ALGORITHM {other:?} is not supported with a shared secret"),
    }
}

pub fn parse_ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(30);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("ACCESS_TOKEN_EXPIRE_MINUTES {raw:?} is not a number"))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TTL_MINUTES}");
    }
    Ok(minutes)
}

pub fn check_password_hash(hash: String) -> anyhow::Result<String> {
    PasswordHash::new(&hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(hash)
}
