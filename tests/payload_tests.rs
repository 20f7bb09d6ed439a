//! Property tests for the onboarding payloads.
//!
//! # Invariants
//! - Absent optional fields never appear in the JSON body, not even as `null`
//! - Every present field appears under its camelCase name

use pileus_cli::request::{AccountType, AwsOnboardingRequest, MspOnboardingRequest};
use proptest::option;
use proptest::prelude::*;
use serde_json::Value;

fn field() -> impl Strategy<Value = Option<String>> {
    option::of("[a-z0-9-]{1,12}")
}

proptest! {
    #[test]
    fn prop_msp_payload_has_no_nulls(
        account_id in "[0-9]{1,12}",
        dedicated in any::<bool>(),
        self_managed in any::<bool>(),
        auto_assign in any::<bool>(),
        reseller_customer_id in field(),
        reseller_customer_name in field(),
        reseller_customer_domain in field(),
        excluded in field(),
    ) {
        let req = MspOnboardingRequest {
            aws: AwsOnboardingRequest::new(account_id.clone(), "Acme"),
            account_type: AccountType::from_flag(dedicated),
            reseller_customer_id: reseller_customer_id.clone(),
            reseller_customer_name: reseller_customer_name.clone(),
            is_customer_self_managed: self_managed,
            reseller_customer_domain: reseller_customer_domain.clone(),
            auto_assign_linked_accounts: auto_assign,
            excluded_linked_account_match: excluded.clone(),
        };
        let body = serde_json::to_value(&req).unwrap();
        let object = body.as_object().unwrap();

        prop_assert!(object.values().all(|v| !v.is_null()));
        prop_assert!(!object.contains_key("accountId"));
        let bucket = format!("cur-{account_id}");
        let account_type = if dedicated { "dedicated" } else { "shared" };
        prop_assert_eq!(object["bucketName"].as_str(), Some(bucket.as_str()));
        prop_assert_eq!(object["accountType"].as_str(), Some(account_type));
        prop_assert_eq!(object["isCustomerSelfManaged"].as_u64(), Some(u64::from(self_managed)));
        prop_assert_eq!(object["autoAssignLinkedAccounts"].as_u64(), Some(u64::from(auto_assign)));

        for (key, input) in [
            ("resellerCustomerId", &reseller_customer_id),
            ("resellerCustomerName", &reseller_customer_name),
            ("resellerCustomerDomain", &reseller_customer_domain),
            ("excludedLinkedAccountMatch", &excluded),
        ] {
            prop_assert_eq!(
                object.get(key).and_then(Value::as_str),
                input.as_deref(),
                "field {}", key
            );
        }
    }
}
