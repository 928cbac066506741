//! Listing commands: browse, search, show, create, edit, delete.

use std::path::Path;

use campus_hub_core::{Category, ItemId, Price, UserId};
use campus_hub_client::models::{
    ImageAttachment, Item, ItemFilters, ItemPatch, NewItem, SearchQuery,
};
use clap::Subcommand;

use super::{CliError, connect};

#[derive(Subcommand)]
pub enum ItemsAction {
    /// List items, optionally filtered
    List {
        /// Category filter (textbook, equipment, decor, appliance, other)
        #[arg(short, long)]
        category: Option<String>,

        /// Only items by this seller ID
        #[arg(short, long)]
        seller: Option<i64>,

        /// Server-side ordering key, e.g. `-created_at`, `price`
        #[arg(short, long)]
        ordering: Option<String>,

        /// Page number
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Full-text search
    Search {
        /// Search terms
        query: String,

        /// Category filter
        #[arg(short, long)]
        category: Option<String>,

        /// Minimum price
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum price
        #[arg(long)]
        max_price: Option<String>,

        /// Sort key (name, price, created_at, or `-` prefixed)
        #[arg(long)]
        sort_by: Option<String>,
    },
    /// Show one item
    Show {
        /// Item ID
        id: i64,
    },
    /// Create a listing
    New {
        /// Listing title
        #[arg(short, long)]
        name: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Category
        #[arg(short, long, default_value = "other")]
        category: String,

        /// Asking price; omit for swap-only listings
        #[arg(short, long)]
        price: Option<String>,

        /// Image files to attach
        #[arg(short, long)]
        image: Vec<String>,
    },
    /// Edit a listing you own
    Edit {
        /// Item ID
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        price: Option<String>,

        /// Hide the listing without deleting it
        #[arg(long)]
        deactivate: bool,
    },
    /// Delete a listing you own
    Rm {
        /// Item ID
        id: i64,
    },
}

pub async fn run(action: ItemsAction) -> Result<(), CliError> {
    let hub = connect().await?;

    match action {
        ItemsAction::List {
            category,
            seller,
            ordering,
            page,
        } => {
            hub.catalog().set_filters(ItemFilters {
                category: category.as_deref().map(parse_category).transpose()?,
                seller: seller.map(UserId::new),
                ordering,
                page,
            });
            hub.catalog().list().await?;

            let state = hub.catalog().state();
            for item in &state.items {
                print_row(item);
            }
            println!("{} item(s) total", state.pagination.count);
        }
        ItemsAction::Search {
            query,
            category,
            min_price,
            max_price,
            sort_by,
        } => {
            let query = SearchQuery {
                query: Some(query),
                category: category.as_deref().map(parse_category).transpose()?,
                min_price: min_price.as_deref().map(parse_price).transpose()?,
                max_price: max_price.as_deref().map(parse_price).transpose()?,
                sort_by,
            };
            hub.catalog().search(&query).await?;

            for item in &hub.catalog().state().search_results {
                print_row(item);
            }
        }
        ItemsAction::Show { id } => {
            let item = hub.catalog().get(ItemId::new(id)).await?;
            print_detail(&item);
        }
        ItemsAction::New {
            name,
            description,
            category,
            price,
            image,
        } => {
            let new_item = NewItem {
                name,
                description,
                category: parse_category(&category)?,
                price: price.as_deref().map(parse_price).transpose()?,
                images: image.iter().map(|p| read_image(p)).collect::<Result<_, _>>()?,
            };
            let created = hub.catalog().create(&new_item).await?;
            println!("Created item {}", created.id);
        }
        ItemsAction::Edit {
            id,
            name,
            description,
            category,
            price,
            deactivate,
        } => {
            let patch = ItemPatch {
                name,
                description,
                category: category.as_deref().map(parse_category).transpose()?,
                price: price.as_deref().map(parse_price).transpose()?,
                is_active: deactivate.then_some(false),
            };
            let updated = hub.catalog().update(ItemId::new(id), &patch).await?;
            print_detail(&updated);
        }
        ItemsAction::Rm { id } => {
            hub.catalog().delete(ItemId::new(id)).await?;
            println!("Deleted item {id}");
        }
    }
    Ok(())
}

fn parse_category(s: &str) -> Result<Category, CliError> {
    s.parse().map_err(|_| CliError::InvalidCategory(s.to_owned()))
}

fn parse_price(s: &str) -> Result<Price, CliError> {
    s.parse().map_err(|_| CliError::InvalidPrice(s.to_owned()))
}

fn read_image(path: &str) -> Result<ImageAttachment, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::ImageRead {
        path: path.to_owned(),
        source,
    })?;

    let file_name = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_owned(), |n| n.to_string_lossy().into_owned());
    let content_type = match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };

    Ok(ImageAttachment {
        file_name,
        content_type: content_type.to_owned(),
        bytes,
    })
}

fn print_row(item: &Item) {
    let price = item
        .price
        .map_or_else(|| "swap".to_owned(), |p| p.to_string());
    println!(
        "{:>6}  {:<12}  {:>10}  {}",
        item.id.to_string(),
        item.category.code(),
        price,
        item.name
    );
}

fn print_detail(item: &Item) {
    println!("#{} {}", item.id, item.name);
    println!("  category: {}", item.category.display_name());
    match item.price {
        Some(price) => println!("  price:    {price}"),
        None => println!("  price:    swap only"),
    }
    if let Some(seller) = &item.seller {
        println!("  seller:   {} (#{})", seller.username, seller.id);
    }
    if !item.is_active {
        println!("  inactive");
    }
    if !item.description.is_empty() {
        println!("\n{}", item.description);
    }
}
