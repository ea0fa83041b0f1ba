//! Lists the groups of a MailUp list.
//!
//! ```sh
//! MAILUP_USERNAME=m12345 MAILUP_PASSWORD=... \
//! MAILUP_CLIENT_ID=... MAILUP_CLIENT_SECRET=... \
//! RUST_LOG=integrations_mailup=debug \
//! cargo run --example list_groups -- 1
//! ```

use integrations_mailup::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let list_id: i64 = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "1".to_string())
        .parse()?;

    let config = MailUpConfig::from_env()?;
    let client = MailUpClient::connect(config).await?;

    let groups = client.lists().groups(list_id).await?;
    println!("{} groups in list {}", groups.items.len(), list_id);
    for group in &groups.items {
        println!("  {:>6}  {}", group["idGroup"], group["Name"]);
    }

    Ok(())
}
