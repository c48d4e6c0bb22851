//! Consent gateway entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    consent_gateway::server::run().await
}
