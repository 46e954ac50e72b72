//! Test-email command implementation

use crate::cli::TestEmailArgs;
use crate::config::Config;
use crate::error::{DeliveryError, Result};
use crate::report::EmailReporter;

/// Send a plain-text probe message using the configured SMTP settings.
pub fn run(args: TestEmailArgs, config: &Config) -> Result<()> {
    let email = config
        .email
        .clone()
        .ok_or(DeliveryError::NotConfigured)?;

    let recipients = email.to_addresses.len();
    EmailReporter::new(email).send_test_email(&args.subject)?;

    println!("Test email sent to {} recipient(s)", recipients);
    Ok(())
}
