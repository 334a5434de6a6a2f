//! Runtime configuration, read once per cold start.

use std::time::Duration;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::config::{Credentials, Region};
use thiserror::Error;

const TODOS_TABLE_DEFAULT: &str = "Todos-dev";
const CREATED_AT_INDEX_DEFAULT: &str = "CreatedAtIndex";
const ATTACHMENT_BUCKET_DEFAULT: &str = "todo-attachments-dev";
const SIGNED_URL_EXPIRATION_DEFAULT: u64 = 300;
/// S3 refuses presigned URLs valid for longer than a week.
const SIGNED_URL_EXPIRATION_MAX: u64 = 7 * 24 * 60 * 60;
const REGION_DEFAULT: &str = "us-east-1";

const OFFLINE_REGION: &str = "localhost";
const OFFLINE_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";
const OFFLINE_S3_ENDPOINT: &str = "http://localhost:4569";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub todos_table: String,
    pub created_at_index: String,
    pub attachment_bucket: String,
    pub signed_url_expiration: Duration,
    /// Talk to locally emulated DynamoDB/S3 instead of AWS.
    pub is_offline: bool,
    pub region: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let signed_url_expiration = match lookup("SIGNED_URL_EXPIRATION") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if (1..=SIGNED_URL_EXPIRATION_MAX).contains(&secs) => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "SIGNED_URL_EXPIRATION",
                        value: raw,
                    })
                }
            },
            None => SIGNED_URL_EXPIRATION_DEFAULT,
        };

        let is_offline = lookup("IS_OFFLINE")
            .map(|raw| !matches!(raw.trim().to_ascii_lowercase().as_str(), "" | "false" | "0"))
            .unwrap_or(false);

        Ok(Self {
            todos_table: lookup("TODOS_TABLE").unwrap_or(TODOS_TABLE_DEFAULT.into()),
            created_at_index: lookup("TODOS_CREATED_AT_INDEX")
                .unwrap_or(CREATED_AT_INDEX_DEFAULT.into()),
            attachment_bucket: lookup("ATTACHMENT_S3_BUCKET")
                .unwrap_or(ATTACHMENT_BUCKET_DEFAULT.into()),
            signed_url_expiration: Duration::from_secs(signed_url_expiration),
            is_offline,
            region: lookup("AWS_REGION").unwrap_or(REGION_DEFAULT.into()),
        })
    }

    /// Public location an attachment will be served from once uploaded.
    ///
    /// Uses the same addressing style the presigner produces, so the stored
    /// URL and the upload URL point at the same object.
    pub fn attachment_url(&self, attachment_id: &str) -> String {
        if self.is_offline {
            format!(
                "{}/{}/{}",
                OFFLINE_S3_ENDPOINT, self.attachment_bucket, attachment_id
            )
        } else if self.attachment_bucket.contains('.') {
            // Dotted bucket names are addressed by path over https.
            format!(
                "https://s3.{}.amazonaws.com/{}/{}",
                self.region, self.attachment_bucket, attachment_id
            )
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.attachment_bucket, self.region, attachment_id
            )
        }
    }

    pub async fn sdk_config(&self) -> SdkConfig {
        let loader = aws_config::defaults(BehaviorVersion::latest());
        let loader = if self.is_offline {
            tracing::info!("Using locally emulated DynamoDB and S3");
            loader
                .region(Region::new(OFFLINE_REGION))
                .credentials_provider(Credentials::new(
                    "offline", "offline", None, None, "offline",
                ))
        } else {
            loader.region(Region::new(self.region.clone()))
        };

        loader.load().await
    }

    pub fn dynamodb_client(&self, sdk_config: &SdkConfig) -> aws_sdk_dynamodb::Client {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if self.is_offline {
            builder = builder.endpoint_url(OFFLINE_DYNAMODB_ENDPOINT);
        }

        aws_sdk_dynamodb::Client::from_conf(builder.build())
    }

    pub fn s3_client(&self, sdk_config: &SdkConfig) -> aws_sdk_s3::Client {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if self.is_offline {
            builder = builder
                .endpoint_url(OFFLINE_S3_ENDPOINT)
                .force_path_style(true);
        }

        aws_sdk_s3::Client::from_conf(builder.build())
    }
}
