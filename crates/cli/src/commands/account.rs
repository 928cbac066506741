//! Profile and order-history commands.

use campus_hub_core::OrderId;
use campus_hub_client::models::ProfilePatch;
use clap::Subcommand;

use super::{CliError, connect};

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List your orders
    List,
    /// Cancel a pending order
    Cancel {
        /// Order ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show your profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },
    /// List your own listings
    Items,
}

pub async fn run_orders(action: OrdersAction) -> Result<(), CliError> {
    let hub = connect().await?;

    match action {
        OrdersAction::List => {
            hub.user().fetch_orders().await?;
            let state = hub.user().state();
            if state.orders.is_empty() {
                println!("No orders yet");
            }
            for order in &state.orders {
                println!(
                    "{:>6}  {:<10}  {:>10}  {} line(s)",
                    order.id.to_string(),
                    order.status.to_string(),
                    order.total_amount.to_string(),
                    order.items.len()
                );
            }
        }
        OrdersAction::Cancel { id } => {
            let order = hub.user().cancel_order(OrderId::new(id)).await?;
            println!("Order #{} is now {}", order.id, order.status);
        }
    }
    Ok(())
}

pub async fn run_profile(action: ProfileAction) -> Result<(), CliError> {
    let hub = connect().await?;

    match action {
        ProfileAction::Show => {
            let profile = hub.user().fetch_profile().await?;
            println!("{} (#{})", profile.username, profile.id);
            if !profile.email.is_empty() {
                println!("  email:    {}", profile.email);
            }
            let full_name = format!("{} {}", profile.first_name, profile.last_name);
            if !full_name.trim().is_empty() {
                println!("  name:     {}", full_name.trim());
            }
            println!("  listings: {}", profile.items_count);
        }
        ProfileAction::Update {
            email,
            first_name,
            last_name,
        } => {
            let patch = ProfilePatch {
                email,
                first_name,
                last_name,
                ..ProfilePatch::default()
            };
            hub.user().update_profile(&patch).await?;
            println!("Profile updated");
        }
        ProfileAction::Items => {
            hub.user().fetch_my_items().await?;
            for item in &hub.user().state().items {
                let price = item
                    .price
                    .map_or_else(|| "swap".to_owned(), |p| p.to_string());
                println!("{:>6}  {:>10}  {}", item.id.to_string(), price, item.name);
            }
        }
    }
    Ok(())
}
