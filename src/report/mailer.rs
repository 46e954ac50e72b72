use chrono::Local;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::EmailConfig;
use crate::error::DeliveryError;

use super::Report;

/// Sends reports over SMTP. Pure message building is separated from
/// transmission so it can be tested without a server.
pub struct EmailReporter {
    config: EmailConfig,
}

impl EmailReporter {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a multipart/alternative (text + HTML) report to every recipient.
    pub fn send_report(&self, subject: &str, report: &Report) -> Result<(), DeliveryError> {
        let message = self.build_report_message(subject, report)?;
        self.send(&message)?;
        tracing::info!(
            recipients = self.config.to_addresses.len(),
            "Email report sent"
        );
        Ok(())
    }

    /// Send a plain-text probe to verify the SMTP settings end to end.
    pub fn send_test_email(&self, subject: &str) -> Result<(), DeliveryError> {
        let body = format!(
            "This is a test email from backup-monitor.\n\n\
             Configuration:\n\
             - SMTP server: {}:{}\n\
             - From: {}\n\
             - Recipients: {}\n\
             - STARTTLS: {}\n\n\
             If you received this, the email configuration works.\n\n\
             Generated at: {}\n",
            self.config.smtp_server,
            self.config.smtp_port,
            self.config.from_address,
            self.config.to_addresses.join(", "),
            self.config.use_tls,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
        );

        let message = self.builder(subject)?.body(body)?;
        self.send(&message)?;
        tracing::info!("Test email sent");
        Ok(())
    }

    /// Build the report message without sending it.
    pub fn build_report_message(
        &self,
        subject: &str,
        report: &Report,
    ) -> Result<Message, DeliveryError> {
        let message = self.builder(subject)?.multipart(
            MultiPart::alternative_plain_html(report.text.clone(), report.html.clone()),
        )?;
        Ok(message)
    }

    fn builder(&self, subject: &str) -> Result<lettre::message::MessageBuilder, DeliveryError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.from_address)?)
            .subject(subject);
        for addr in &self.config.to_addresses {
            builder = builder.to(parse_mailbox(addr)?);
        }
        Ok(builder)
    }

    fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        tracing::debug!(
            server = %self.config.smtp_server,
            port = self.config.smtp_port,
            tls = self.config.use_tls,
            "Connecting to SMTP server"
        );

        let mut builder = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_server)?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_server)
        };
        builder = builder.port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        builder.build().send(message)?;
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e| DeliveryError::Address {
        address: address.to_string(),
        source: e,
    })
}
