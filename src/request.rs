// Onboarding request types and their construction from raw user input.
//
// Everything here is pure: the terminal layer hands in strings exactly as
// typed and gets back a validated request or a [`ValidationError`].

use serde::{Serialize, Serializer};
use thiserror::Error;

pub const DEFAULT_BUCKET_REGION: &str = "us-east-1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Required(&'static str),

    #[error("{field} must be 1 or 0, got {value:?}")]
    InvalidFlag { field: &'static str, value: String },

    #[error("Reseller Customer Domain is required for a self-managed customer")]
    DomainRequired,

    #[error("Account Name cannot contain path separators or be {0:?}")]
    InvalidAccountName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Dedicated,
    Shared,
}

impl AccountType {
    /// Truthy selects a dedicated account, falsy a shared one.
    pub fn from_flag(dedicated: bool) -> Self {
        if dedicated {
            AccountType::Dedicated
        } else {
            AccountType::Shared
        }
    }
}

/// Payload for `POST /onboarding/aws/{accountId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsOnboardingRequest {
    /// Goes in the URL, not the body.
    #[serde(skip)]
    pub account_id: String,
    pub account_name: String,
    pub bucket_name: String,
    pub bucket_region: String,
}

impl AwsOnboardingRequest {
    /// Request with the default bucket `cur-{account_id}` in `us-east-1`.
    pub fn new(account_id: impl Into<String>, account_name: impl Into<String>) -> Self {
        let account_id = account_id.into();
        Self {
            bucket_name: default_bucket_name(&account_id),
            account_id,
            account_name: account_name.into(),
            bucket_region: DEFAULT_BUCKET_REGION.to_string(),
        }
    }

    /// Override the bucket name; `None` or empty keeps the default.
    pub fn bucket_name(mut self, name: Option<String>) -> Self {
        if let Some(name) = non_empty(name) {
            self.bucket_name = name;
        }
        self
    }

    /// Override the bucket region; `None` or empty keeps `us-east-1`.
    pub fn bucket_region(mut self, region: Option<String>) -> Self {
        if let Some(region) = non_empty(region) {
            self.bucket_region = region;
        }
        self
    }
}

/// Payload for the MSP (reseller) variant of AWS onboarding.
///
/// Optional fields that are `None` are left out of the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MspOnboardingRequest {
    #[serde(flatten)]
    pub aws: AwsOnboardingRequest,
    pub account_type: AccountType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reseller_customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reseller_customer_name: Option<String>,
    #[serde(serialize_with = "serialize_flag")]
    pub is_customer_self_managed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reseller_customer_domain: Option<String>,
    #[serde(serialize_with = "serialize_flag")]
    pub auto_assign_linked_accounts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_linked_account_match: Option<String>,
}

impl MspOnboardingRequest {
    pub fn account_id(&self) -> &str {
        &self.aws.account_id
    }

    pub fn account_name(&self) -> &str {
        &self.aws.account_name
    }
}

// The API wants 0/1 rather than JSON booleans.
fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Raw answers for the standard onboarding prompts.
#[derive(Debug, Default, Clone)]
pub struct AwsOnboardingForm {
    pub account_id: String,
    pub account_name: String,
}

impl AwsOnboardingForm {
    pub fn validate(&self) -> Result<AwsOnboardingRequest, ValidationError> {
        let account_id = required("Account ID", &self.account_id)?;
        let account_name = account_name(&self.account_name)?;
        Ok(AwsOnboardingRequest::new(account_id, account_name))
    }
}

/// Raw answers for the MSP onboarding prompts.
#[derive(Debug, Default, Clone)]
pub struct MspOnboardingForm {
    pub account_id: String,
    pub account_name: String,
    pub bucket_name: String,
    pub bucket_region: String,
    /// "1" for dedicated, "0" for shared.
    pub account_type: String,
    pub reseller_customer_id: String,
    pub reseller_customer_name: String,
    pub is_customer_self_managed: String,
    pub reseller_customer_domain: String,
    pub auto_assign_linked_accounts: String,
    pub excluded_linked_account_match: String,
}

impl MspOnboardingForm {
    pub fn validate(&self) -> Result<MspOnboardingRequest, ValidationError> {
        let account_id = required("Account ID", &self.account_id)?;
        let account_name = account_name(&self.account_name)?;
        let account_type = parse_flag("Account Type", &self.account_type)?;
        let reseller_customer_name = required("Reseller Customer Name", &self.reseller_customer_name)?;
        let self_managed = parse_flag("Is Customer Self Managed", &self.is_customer_self_managed)?;
        let domain = optional(&self.reseller_customer_domain);
        if self_managed && domain.is_none() {
            return Err(ValidationError::DomainRequired);
        }
        let auto_assign = parse_flag("Auto Assign Linked Accounts", &self.auto_assign_linked_accounts)?;

        let aws = AwsOnboardingRequest::new(account_id, account_name)
            .bucket_name(optional(&self.bucket_name))
            .bucket_region(optional(&self.bucket_region));

        Ok(MspOnboardingRequest {
            aws,
            account_type: AccountType::from_flag(account_type),
            reseller_customer_id: optional(&self.reseller_customer_id),
            reseller_customer_name: Some(reseller_customer_name),
            is_customer_self_managed: self_managed,
            reseller_customer_domain: domain,
            auto_assign_linked_accounts: auto_assign,
            excluded_linked_account_match: optional(&self.excluded_linked_account_match),
        })
    }
}

pub fn default_bucket_name(account_id: &str) -> String {
    format!("cur-{account_id}")
}

/// Trimmed input, rejecting empty strings.
pub fn required(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    optional(raw).ok_or(ValidationError::Required(field))
}

/// Account names end up in a folder name, so they must stay a single
/// path component.
pub fn account_name(raw: &str) -> Result<String, ValidationError> {
    let name = required("Account Name", raw)?;
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ValidationError::InvalidAccountName(name));
    }
    Ok(name)
}

/// Trimmed input, with empty meaning absent.
pub fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accept exactly "1" or "0".
pub fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ValidationError::InvalidFlag {
            field,
            value: other.to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| optional(&v))
}
