//! SMTP delivery for password-reset codes.
//!
//! Delivery is fire-and-forget from the workflow's perspective: callers get
//! a boolean back and the main success path never waits on it.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use tracing::error;

use crate::config::EmailConfig;

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl Mailer {
    /// Build the SMTP transport from configuration.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a password-reset code. Returns whether delivery was accepted;
    /// failures are logged and never escalate.
    pub async fn send_reset_email(&self, to: &str, code: &str, name: &str) -> bool {
        let subject = "Recupera tu contraseña - Cosecha";
        let text = format!(
            "Hola {name},\n\n\
             Recibimos una solicitud para recuperar tu contraseña.\n\
             Usa el siguiente código para continuar:\n\n\
             {code}\n\n\
             Este código expira en 1 hora.\n\
             Si no solicitaste recuperar tu contraseña, ignora este correo.\n"
        );
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
               <h2>Hola {name},</h2>\
               <p>Recibimos una solicitud para recuperar tu contraseña. \
                  Usa el siguiente código para continuar:</p>\
               <p style=\"font-size: 28px; letter-spacing: 4px;\"><strong>{code}</strong></p>\
               <p>Este código expira en <strong>1 hora</strong>.</p>\
               <p>Si no solicitaste recuperar tu contraseña, ignora este correo.</p>\
             </div>"
        );

        let message = match self.build_multipart(to, subject, &text, &html) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to build reset email for {to}: {e}");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to send reset email to {to}: {e}");
                false
            }
        }
    }

    fn build_multipart(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> anyhow::Result<Message> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid from address: {}", self.from_address))?,
            )
            .to(to
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid recipient address: {to}"))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        Ok(message)
    }
}
