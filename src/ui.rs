// UI layer: the interactive two-level menu, built on `dialoguer`.
// Prompts only collect strings; validation and defaulting live in
// `request`, and all API traffic goes through `api::ApiClient`.

use crate::api::{ApiClient, OnboardingOutcome};
use crate::artifact;
use crate::error::ApiError;
use crate::request::{self, AwsOnboardingForm, MspOnboardingForm};
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const MAIN_ITEMS: [&str; 5] = [
    "Onboarding",
    "API ID (with customer Name)",
    "Assets",
    "Alerts",
    "Exit",
];

const ONBOARDING_ITEMS: [&str; 5] = [
    "Get List of Users",
    "Get Users and Roles",
    "Onboard AWS Account",
    "Onboard AWS Account for MSP",
    "Back to Main Menu",
];

/// Main interactive menu. Runs until the user chooses "Exit".
///
/// Setup scripts returned by onboarding are saved under `workdir`.
pub fn main_menu(api: &ApiClient, workdir: &Path) -> Result<()> {
    loop {
        println!();
        let selection = Select::new()
            .with_prompt("Main Menu")
            .items(&MAIN_ITEMS)
            .default(0)
            .interact()?;
        match selection {
            0 => onboarding_menu(api, workdir)?,
            4 => {
                println!("Exiting.");
                break;
            }
            _ => println!("Feature not implemented yet."),
        }
    }
    Ok(())
}

fn onboarding_menu(api: &ApiClient, workdir: &Path) -> Result<()> {
    loop {
        println!();
        let selection = Select::new()
            .with_prompt("Onboarding Menu")
            .items(&ONBOARDING_ITEMS)
            .default(0)
            .interact()?;
        match selection {
            0 => {
                let users = with_spinner("Fetching users...", || api.list_users());
                print_json(users, "Failed to retrieve users");
            }
            1 => {
                let users = with_spinner("Fetching users and roles...", || {
                    api.list_users_with_roles()
                });
                print_json(users, "Failed to retrieve users with roles");
            }
            2 => handle_onboard(api, workdir)?,
            3 => handle_onboard_msp(api, workdir)?,
            4 => break,
            _ => {}
        }
    }
    Ok(())
}

/// Collect the standard onboarding fields and call the API.
fn handle_onboard(api: &ApiClient, workdir: &Path) -> Result<()> {
    let form = AwsOnboardingForm {
        account_id: prompt_required("Enter Account ID", "Account ID")?,
        account_name: prompt_account_name()?,
    };
    let req = match form.validate() {
        Ok(req) => req,
        Err(e) => {
            println!("Invalid input: {e}");
            return Ok(());
        }
    };

    let result = with_spinner("Onboarding account...", || api.onboard_aws_account(&req));
    handle_outcome(result, workdir, &req.account_name, &req.account_id)
}

/// Collect the MSP onboarding fields and call the API.
fn handle_onboard_msp(api: &ApiClient, workdir: &Path) -> Result<()> {
    let account_id = prompt_required("Enter Account ID", "Account ID")?;
    let account_name = prompt_account_name()?;
    let bucket_name = prompt_optional(&format!(
        "Enter Bucket Name (default: {})",
        request::default_bucket_name(&account_id)
    ))?;
    let bucket_region = prompt_optional(&format!(
        "Enter Bucket Region (default: {})",
        request::DEFAULT_BUCKET_REGION
    ))?;
    let account_type = prompt_flag("Enter Account Type (dedicated (1) / shared (0))", "Account Type")?;
    let reseller_customer_id = prompt_optional("Enter Reseller Customer ID (optional)")?;
    let reseller_customer_name =
        prompt_required("Enter Reseller Customer Name", "Reseller Customer Name")?;
    let is_customer_self_managed = prompt_flag(
        "Is Customer Self Managed? (1=True / 0=False)",
        "Is Customer Self Managed",
    )?;
    let domain_prompt = "Enter Reseller Customer Domain (required for self-managed customer)";
    let reseller_customer_domain = if is_customer_self_managed == "1" {
        prompt_required(domain_prompt, "Reseller Customer Domain")?
    } else {
        prompt_optional(domain_prompt)?
    };
    let auto_assign_linked_accounts = prompt_flag(
        "Auto Assign Linked Accounts? (1=True / 0=False)",
        "Auto Assign Linked Accounts",
    )?;
    let excluded_linked_account_match = prompt_optional("Excluded Linked Account Match (optional)")?;

    let form = MspOnboardingForm {
        account_id,
        account_name,
        bucket_name,
        bucket_region,
        account_type,
        reseller_customer_id,
        reseller_customer_name,
        is_customer_self_managed,
        reseller_customer_domain,
        auto_assign_linked_accounts,
        excluded_linked_account_match,
    };
    let req = match form.validate() {
        Ok(req) => req,
        Err(e) => {
            println!("Invalid input: {e}");
            return Ok(());
        }
    };

    let result = with_spinner("Onboarding account...", || api.onboard_aws_account_msp(&req));
    handle_outcome(result, workdir, req.account_name(), req.account_id())
}

/// Print a JSON confirmation, or save a returned script and offer to open
/// its folder.
fn handle_outcome(
    result: Result<OnboardingOutcome, ApiError>,
    workdir: &Path,
    account_name: &str,
    account_id: &str,
) -> Result<()> {
    match result {
        Ok(OnboardingOutcome::Structured(Value::Null)) => println!("Onboarding request accepted."),
        Ok(OnboardingOutcome::Structured(body)) => print_json(Ok(body), "Onboarding failed"),
        Ok(OnboardingOutcome::RawArtifact(script)) => {
            match artifact::save_setup_script(workdir, account_name, account_id, &script) {
                Ok(path) => println!("Script saved to {}", path.display()),
                Err(e) => {
                    println!("Could not save setup script: {e}");
                    return Ok(());
                }
            }
            let open_it = Confirm::new()
                .with_prompt("Do you want to open the folder?")
                .default(false)
                .interact()?;
            if open_it {
                let dir = artifact::artifact_dir(workdir, account_name, account_id);
                println!("Opening folder: {}", dir.display());
                if let Err(e) = artifact::open_folder(&dir) {
                    println!("Could not open folder: {e}");
                }
            }
        }
        Err(e) => report_failure("Onboarding failed", &e),
    }
    Ok(())
}

fn print_json(result: Result<Value, ApiError>, failure: &str) {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{value}"),
        },
        Err(e) => report_failure(failure, &e),
    }
}

fn report_failure(failure: &str, err: &ApiError) {
    println!("{failure}: {err}");
    if let Some(hint) = err.hint() {
        println!("{hint}");
    }
}

/// Show a spinner while `f` blocks on the network.
fn with_spinner<T>(message: &'static str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

fn prompt_required(prompt: &str, field: &'static str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .validate_with(move |input: &String| request::required(field, input).map(|_| ()))
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_account_name() -> Result<String> {
    let value: String = Input::new()
        .with_prompt("Enter Account Name")
        .validate_with(|input: &String| request::account_name(input).map(|_| ()))
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// Empty answers are allowed and mean "use the default" or "absent".
fn prompt_optional(prompt: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

fn prompt_flag(prompt: &str, field: &'static str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .validate_with(move |input: &String| request::parse_flag(field, input).map(|_| ()))
        .interact_text()?;
    Ok(value.trim().to_string())
}
