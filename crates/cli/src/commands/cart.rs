//! Cart commands.

use campus_hub_core::{CartEntryId, ItemId};
use campus_hub_client::models::CheckoutPayload;
use clap::Subcommand;

use super::{CliError, connect};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart with totals
    Show,
    /// Add an item
    Add {
        /// Item ID
        item_id: i64,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a cart line
    Rm {
        /// Cart line ID (see `cart show`)
        entry_id: i64,
    },
    /// Change a line's quantity
    Qty {
        /// Cart line ID
        entry_id: i64,

        /// New quantity
        quantity: u32,
    },
    /// Convert the cart into an order
    Checkout {
        /// Shipping address
        #[arg(short = 'a', long)]
        address: String,

        /// Payment method, e.g. cash, transfer
        #[arg(short = 'm', long, default_value = "cash")]
        method: String,
    },
}

pub async fn run(action: CartAction) -> Result<(), CliError> {
    let hub = connect().await?;

    match action {
        CartAction::Show => {
            hub.cart().fetch().await?;
            print_cart(&hub);
        }
        CartAction::Add { item_id, quantity } => {
            hub.cart().add(ItemId::new(item_id), quantity).await?;
            hub.cart().fetch().await?;
            print_cart(&hub);
        }
        CartAction::Rm { entry_id } => {
            hub.cart().fetch().await?;
            hub.cart().remove(CartEntryId::new(entry_id)).await?;
            print_cart(&hub);
        }
        CartAction::Qty { entry_id, quantity } => {
            hub.cart().fetch().await?;
            hub.cart()
                .update_quantity(CartEntryId::new(entry_id), quantity)
                .await?;
            print_cart(&hub);
        }
        CartAction::Checkout { address, method } => {
            let order = hub
                .cart()
                .checkout(&CheckoutPayload {
                    shipping_address: Some(address),
                    payment_method: Some(method),
                })
                .await?;
            println!(
                "Order #{} placed: {} ({})",
                order.id, order.total_amount, order.status
            );
        }
    }
    Ok(())
}

fn print_cart(hub: &campus_hub_client::HubClient) {
    let state = hub.cart().state();
    if state.entries.is_empty() {
        println!("Cart is empty");
        return;
    }
    for entry in &state.entries {
        println!(
            "{:>6}  {:>3} x {:>10}  {}",
            entry.id.to_string(),
            entry.quantity,
            entry.item.price_or_zero().to_string(),
            entry.item.name
        );
    }
    println!("total: {} item(s), {}", state.total_items, state.total_price);
}
