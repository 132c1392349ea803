use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ara_messaging::config::Settings;
use ara_messaging::message::{Content, EmailAddress, PhoneNumber};
use ara_messaging::sender::LoggingSender;
use ara_messaging::template::TemplateContext;
use ara_messaging::{Email, MessagingBuilder, Sms};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::new()?;
    tracing::info!("Configuration loaded");

    let service = MessagingBuilder::from_settings(&settings)
        .sender(Arc::new(LoggingSender::new()))
        .build()?;

    let context = TemplateContext::new()
        .insert("name", "Ada")
        .insert("order", serde_json::json!({ "id": "ORD-42", "total": 120 }))
        .with_locale("en");

    let sms = Sms::new(Content::template(
        "string:Hello {{name}}, order {{order.id}} is on its way",
        context.clone(),
    ))
    .to(PhoneNumber::parse("+33 6 12 34 56 78")?);
    service.send(sms).await?;

    let html = concat!(
        "string:<html><head><title>Order {{ order.id }}</title>",
        "<style>p { color: #333; font-family: sans-serif }</style></head>",
        "<body>{% if order.total > 100 %}<p>Free shipping, {{ name }}!</p>{% endif %}</body></html>",
    );
    let email = Email::new(Content::template(html, context))
        .from_address(EmailAddress::parse("Ara <noreply@example.com>")?)
        .to(EmailAddress::parse("ada@example.com")?);
    service.send(email).await?;

    tracing::info!("Demo messages sent");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
