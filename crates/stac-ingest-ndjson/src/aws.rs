//! AWS client construction for the builder.

use std::time::SystemTime;

use aws_config::SdkConfig;
use aws_sdk_s3::config::Credentials;
use aws_sdk_sts::error::DisplayErrorContext;
use tracing::info;

use crate::error::BuildError;

/// Session name used for every assumed role.
pub const ROLE_SESSION_NAME: &str = "RoleSession";

/// Assume `role_arn` and return its temporary credentials.
pub async fn assume_role(
  sts: &aws_sdk_sts::Client,
  role_arn: &str,
) -> Result<Credentials, BuildError> {
  let failed = |message: String| BuildError::Credentials {
    role_arn: role_arn.to_string(),
    message,
  };

  let output = sts
    .assume_role()
    .role_arn(role_arn)
    .role_session_name(ROLE_SESSION_NAME)
    .send()
    .await
    .map_err(|e| failed(DisplayErrorContext(&e).to_string()))?;

  let assumed = output
    .credentials()
    .ok_or_else(|| failed("response carried no credentials".to_string()))?;

  let expiry = SystemTime::try_from(*assumed.expiration()).ok();
  info!(role_arn = %role_arn, "role assumed");

  Ok(Credentials::new(
    assumed.access_key_id(),
    assumed.secret_access_key(),
    Some(assumed.session_token().to_string()),
    expiry,
    "AssumeRole",
  ))
}

/// Build an S3 client from shared config.
///
/// `credentials` replaces the default chain when given. `force_path_style`
/// is needed for endpoint overrides such as LocalStack.
pub fn s3_client(
  sdk_config: &SdkConfig,
  credentials: Option<Credentials>,
  force_path_style: bool,
) -> aws_sdk_s3::Client {
  let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
  if let Some(credentials) = credentials {
    builder = builder.credentials_provider(credentials);
  }
  if force_path_style {
    builder = builder.force_path_style(true);
  }
  aws_sdk_s3::Client::from_conf(builder.build())
}

/// S3 client for item reads: assumed-role credentials when `role_arn` is
/// set, the default chain otherwise.
pub async fn item_s3_client(
  sdk_config: &SdkConfig,
  role_arn: Option<&str>,
  force_path_style: bool,
) -> Result<aws_sdk_s3::Client, BuildError> {
  let credentials = match role_arn {
    Some(role_arn) => {
      let sts = aws_sdk_sts::Client::new(sdk_config);
      Some(assume_role(&sts, role_arn).await?)
    }
    None => None,
  };
  Ok(s3_client(sdk_config, credentials, force_path_style))
}
