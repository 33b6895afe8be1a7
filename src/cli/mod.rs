//! CLI module for the Bazar command-line client.
//!
//! Subcommands talk to the marketplace API through [`ApiClient`]:
//! - `login` / `logout` / `whoami` - Session management
//! - `catalog ...` - Browse services, trees, products and breadcrumbs
//! - `cart ...` / `wishlist ...` - Manage saved items
//! - `orders ...` / `custom-orders ...` - Checkout, history, tracking, admin status
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::{ApiClient, ClientError, ListQuery, Page};
use crate::catalog::BreadcrumbResolver;
use crate::config::{Config, API_URL_ENV};
use crate::mirror::{CartMirror, CustomOrderMirror, OrderMirror, Scope};
use crate::models::{
    CheckoutItem, CheckoutRequest, CustomOrderItem, CustomOrderRequest, Money, OrderStatus,
    PaymentMethod, PaymentStatus, ShippingAddress,
};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "bazar")]
#[command(author, version, about = "Storefront and admin client for the Bazar marketplace", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bazar.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API base URL (overrides the configuration file)
    #[arg(long, env = API_URL_ENV)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Password (can also be set via BAZAR_PASSWORD env var)
        #[arg(long, env = "BAZAR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse the catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Manage the cart
    #[command(subcommand)]
    Cart(CartCommands),

    /// Manage the wishlist
    #[command(subcommand)]
    Wishlist(WishlistCommands),

    /// Orders: history, tracking, checkout and status updates
    #[command(subcommand)]
    Orders(OrderCommands),

    /// Custom bazar orders
    #[command(subcommand)]
    CustomOrders(CustomOrderCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Paging options shared by list commands
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u64>,
    #[arg(long)]
    pub limit: Option<u64>,
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,
}

impl PageArgs {
    fn query(&self) -> ListQuery {
        let mut query = ListQuery::new();
        if let Some(page) = self.page {
            query = query.page(page);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(search) = &self.search {
            query = query.search(search.as_str());
        }
        query
    }
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List services
    Services(PageArgs),
    /// Show a service with its categories and subcategories
    Tree { service: String },
    /// List products
    Products {
        #[command(flatten)]
        paging: PageArgs,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
    },
    /// Show one product
    Product { id: String },
    /// Show the service > category [> subcategory] path for a catalog page
    Breadcrumb {
        #[arg(required_unless_present = "category")]
        subcategory: Option<String>,
        /// Category page instead of a subcategory page
        #[arg(long, conflicts_with = "subcategory")]
        category: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CartCommands {
    Show,
    Add {
        product: String,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Set { product: String, quantity: u32 },
    Remove { product: String },
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum WishlistCommands {
    Show,
    Add { product: String },
    Remove { product: String },
}

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List your orders (or every order with --all, admin only)
    List {
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        paging: PageArgs,
    },
    /// Track an order by invoice id
    Track { invoice: String },
    /// Place an order for everything in the cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long)]
        postal_code: Option<String>,
        /// Pay online instead of cash on delivery
        #[arg(long)]
        online: bool,
    },
    /// Update order or payment status (admin only)
    SetStatus {
        id: String,
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        payment: Option<PaymentStatus>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomOrderCommands {
    List {
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        paging: PageArgs,
    },
    Track { invoice: String },
    /// Place a custom order, items as `name:quantity[:note]`
    Create {
        #[arg(long = "item", required = true, value_parser = parse_custom_item)]
        items: Vec<CustomOrderItem>,
        #[arg(long)]
        address: String,
        #[arg(long)]
        phone: String,
    },
    SetStatus {
        id: String,
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        payment: Option<PaymentStatus>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

fn parse_custom_item(s: &str) -> std::result::Result<CustomOrderItem, String> {
    let mut parts = s.splitn(3, ':');
    let name = parts.next().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err("item name is empty".to_string());
    }
    let quantity = match parts.next() {
        Some(q) => q
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid quantity '{}'", q))?,
        None => 1,
    };
    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    let note = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(CustomOrderItem {
        name: name.to_string(),
        quantity,
        note,
    })
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Create the API client from configuration and the persisted session
fn create_client(config: &Config) -> Result<ApiClient> {
    ApiClient::from_config(config).context("Failed to create API client")
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: &Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli);
    }

    let client = create_client(config)?;
    let currency = config.display.currency.as_str();

    match &cli.command {
        Commands::Login { email, password } => cmd_login(&client, email, password).await,
        Commands::Logout => {
            client.logout().await;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&client).await,
        Commands::Catalog(command) => cmd_catalog(&client, command, currency).await,
        Commands::Cart(command) => cmd_cart(&client, command, currency).await,
        Commands::Wishlist(command) => cmd_wishlist(&client, command, currency).await,
        Commands::Orders(command) => cmd_orders(&client, command, currency).await,
        Commands::CustomOrders(command) => cmd_custom_orders(&client, command).await,
        Commands::Config(_) => Ok(()),
    }
}

async fn cmd_login(client: &ApiClient, email: &str, password: &str) -> Result<()> {
    let user = client.login(email, password).await?;
    println!("[OK] Logged in as {} ({})", user.subject_id, user.role);
    println!("Session expires: {}", user.expires_at.format("%Y-%m-%d %H:%M UTC"));
    Ok(())
}

async fn cmd_whoami(client: &ApiClient) -> Result<()> {
    let Some(user) = client.current_user() else {
        println!("Not logged in.");
        return Ok(());
    };

    println!();
    println!("User ID:  {}", user.subject_id);
    println!("Role:     {}", user.role);
    println!("Issued:   {}", user.issued_at.format("%Y-%m-%d %H:%M UTC"));
    println!("Expires:  {}", user.expires_at.format("%Y-%m-%d %H:%M UTC"));

    // Profile details are optional; the token alone identifies the user
    match client.me().await {
        Ok(profile) => {
            println!("Name:     {}", profile.name);
            println!("Email:    {}", profile.email);
        }
        Err(e) => tracing::debug!(error = %e, "Could not load profile"),
    }
    println!();
    Ok(())
}

async fn cmd_catalog(client: &ApiClient, command: &CatalogCommands, currency: &str) -> Result<()> {
    match command {
        CatalogCommands::Services(paging) => {
            let page = client.services(&paging.query()).await?;
            if page.is_empty() {
                println!("No services found.");
                return Ok(());
            }
            println!();
            println!("{:<26}  {:<30}", "ID", "NAME");
            println!("{}", "-".repeat(58));
            for service in &page.items {
                println!("{:<26}  {:<30}", service.id, truncate(&service.name, 30));
            }
            print_paging(&page);
        }
        CatalogCommands::Tree { service } => {
            let tree = client.full_tree(service).await?;
            println!();
            println!("{} ({})", tree.service.name, tree.service.id);
            if tree.categories.is_empty() {
                println!("  No categories.");
            }
            for node in &tree.categories {
                println!("  {} ({})", node.category.name, node.category.id);
                for sub in &node.subcategories {
                    let sub = sub.subcategory();
                    println!("    {} ({})", sub.name, sub.id);
                }
            }
            println!();
        }
        CatalogCommands::Products {
            paging,
            category,
            subcategory,
        } => {
            let mut query = paging.query();
            if let Some(category) = category {
                query = query.filter("category", category.as_str());
            }
            if let Some(subcategory) = subcategory {
                query = query.filter("subcategory", subcategory.as_str());
            }
            let page = client.products(&query).await?;
            if page.is_empty() {
                println!("No products found.");
                return Ok(());
            }
            println!();
            println!("{:<26}  {:<32}  {:>12}  {:>6}", "ID", "TITLE", "PRICE", "STOCK");
            println!("{}", "-".repeat(82));
            for product in &page.items {
                println!(
                    "{:<26}  {:<32}  {:>12}  {:>6}",
                    product.id,
                    truncate(&product.title, 32),
                    Money::from_major(product.price).display_with(currency),
                    product.stock
                );
            }
            print_paging(&page);
        }
        CatalogCommands::Product { id } => {
            let product = client.product(id).await?;
            println!();
            println!("=== {} ===", product.title);
            println!();
            println!("ID:          {}", product.id);
            println!(
                "Price:       {}",
                Money::from_major(product.price).display_with(currency)
            );
            println!(
                "Stock:       {}",
                if product.in_stock() {
                    product.stock.to_string()
                } else {
                    "Out of stock".to_string()
                }
            );
            if let Some(description) = &product.description {
                println!("Description: {}", description);
            }
            println!();
        }
        CatalogCommands::Breadcrumb {
            subcategory,
            category,
        } => {
            let resolver = BreadcrumbResolver::new();
            let crumbs = match (subcategory, category) {
                (Some(subcategory), _) => {
                    let query =
                        ListQuery::new().limit(1).filter("subcategory", subcategory.as_str());
                    let products = client.products(&query).await?;
                    resolver.resolve(client, &products.items, subcategory).await
                }
                (None, Some(category)) => {
                    let query = ListQuery::new().limit(1).filter("category", category.as_str());
                    let products = client.products(&query).await?;
                    resolver.resolve_for_category(client, &products.items).await
                }
                (None, None) => Vec::new(),
            };
            if crumbs.is_empty() {
                println!("No breadcrumb available.");
            } else {
                let path: Vec<&str> = crumbs.iter().map(|c| c.name.as_str()).collect();
                println!("{}", path.join(" > "));
            }
        }
    }
    Ok(())
}

async fn cmd_cart(client: &ApiClient, command: &CartCommands, currency: &str) -> Result<()> {
    let mirror = CartMirror::new();
    match command {
        CartCommands::Show => {
            mirror.load(client).await?;
        }
        CartCommands::Add { product, quantity } => {
            client.add_to_cart(product, *quantity).await?;
            println!("[OK] Added {} x {}", quantity, product);
            mirror.load(client).await?;
        }
        CartCommands::Set { product, quantity } => {
            mirror.load(client).await?;
            mirror.set_quantity(client, product, *quantity).await?;
            println!("[OK] Updated {}", product);
        }
        CartCommands::Remove { product } => {
            mirror.load(client).await?;
            mirror.remove(client, product).await?;
            println!("[OK] Removed {}", product);
        }
        CartCommands::Clear => {
            mirror.clear(client).await?;
            println!("[OK] Cart cleared");
        }
    }
    print_cart(&mirror, currency);
    Ok(())
}

fn print_cart(mirror: &CartMirror, currency: &str) {
    if mirror.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    println!();
    println!("{:<26}  {:<30}  {:>5}  {:>12}", "PRODUCT", "TITLE", "QTY", "TOTAL");
    println!("{}", "-".repeat(79));
    for item in mirror.items().iter() {
        println!(
            "{:<26}  {:<30}  {:>5}  {:>12}",
            item.product_id,
            truncate(&item.title, 30),
            item.quantity,
            item.line_total().display_with(currency)
        );
    }
    println!("{}", "-".repeat(79));
    println!(
        "{:<26}  {:<30}  {:>5}  {:>12}",
        "",
        "Total",
        mirror.total_quantity(),
        mirror.total_amount().display_with(currency)
    );
    println!();
}

async fn cmd_wishlist(
    client: &ApiClient,
    command: &WishlistCommands,
    currency: &str,
) -> Result<()> {
    match command {
        WishlistCommands::Show => {
            let page = match client.wishlist().await {
                Ok(page) => page,
                Err(ClientError::SessionEnded) => {
                    println!("No items in your wishlist.");
                    println!("Log in to see your saved items.");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            if page.is_empty() {
                println!("No items in your wishlist.");
                return Ok(());
            }
            println!();
            for item in &page.items {
                println!(
                    "{:<26}  {:<32}  {:>12}",
                    item.product_id,
                    truncate(&item.title, 32),
                    Money::from_major(item.price).display_with(currency)
                );
            }
            println!();
        }
        WishlistCommands::Add { product } => {
            client.add_to_wishlist(product).await?;
            println!("[OK] Saved {} to your wishlist", product);
        }
        WishlistCommands::Remove { product } => {
            client.remove_from_wishlist(product).await?;
            println!("[OK] Removed {} from your wishlist", product);
        }
    }
    Ok(())
}

async fn cmd_orders(client: &ApiClient, command: &OrderCommands, currency: &str) -> Result<()> {
    match command {
        OrderCommands::List { all, paging } => {
            let mirror = OrderMirror::new(if *all { Scope::All } else { Scope::Mine });
            mirror.load(client, &paging.query()).await?;
            let orders = mirror.orders();
            if orders.is_empty() {
                println!("No orders yet.");
                return Ok(());
            }
            println!();
            println!(
                "{:<14}  {:<12}  {:<10}  {:>12}  {:<16}",
                "INVOICE", "STATUS", "PAYMENT", "TOTAL", "PLACED"
            );
            println!("{}", "-".repeat(72));
            for order in orders.iter() {
                println!(
                    "{:<14}  {:<12}  {:<10}  {:>12}  {:<16}",
                    order.invoice_id,
                    order.status,
                    order.payment_status,
                    order.total().display_with(currency),
                    order
                        .created_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string())
                );
            }
            let meta = mirror.meta();
            println!();
            println!("Page {} of {} ({} total)", meta.page, meta.total_pages.max(1), meta.total);
        }
        OrderCommands::Track { invoice } => {
            let order = client.track_order(invoice).await?;
            println!();
            println!("=== Order {} ===", order.invoice_id);
            println!();
            println!("Status:   {}", order.status);
            println!("Payment:  {}", order.payment_status);
            println!("Total:    {}", order.total().display_with(currency));
            for item in &order.items {
                println!(
                    "  {} x {} @ {}",
                    item.quantity,
                    item.title,
                    Money::from_major(item.price).display_with(currency)
                );
            }
            println!();
        }
        OrderCommands::Checkout {
            name,
            phone,
            address,
            city,
            postal_code,
            online,
        } => {
            let items = client
                .cart()
                .await?
                .into_iter()
                .map(|item| CheckoutItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect();
            let request = CheckoutRequest {
                items,
                shipping_address: ShippingAddress {
                    name: name.clone(),
                    phone: phone.clone(),
                    address: address.clone(),
                    city: city.clone(),
                    postal_code: postal_code.clone(),
                },
                payment_method: if *online {
                    PaymentMethod::Online
                } else {
                    PaymentMethod::CashOnDelivery
                },
            };
            let order = client.checkout(&request).await?;
            println!("[OK] Order placed. Invoice: {}", order.invoice_id);
            println!("Total: {}", order.total().display_with(currency));
        }
        OrderCommands::SetStatus {
            id,
            status,
            payment,
        } => {
            if status.is_none() && payment.is_none() {
                anyhow::bail!("Nothing to update. Pass --status and/or --payment.");
            }
            if let Some(status) = status {
                client.update_order_status(id, *status).await?;
                println!("[OK] Order {} is now {}", id, status);
            }
            if let Some(payment) = payment {
                client.update_payment_status(id, *payment).await?;
                println!("[OK] Payment for {} is now {}", id, payment);
            }
        }
    }
    Ok(())
}

async fn cmd_custom_orders(client: &ApiClient, command: &CustomOrderCommands) -> Result<()> {
    match command {
        CustomOrderCommands::List { all, paging } => {
            let mirror = CustomOrderMirror::new(if *all { Scope::All } else { Scope::Mine });
            mirror.load(client, &paging.query()).await?;
            let orders = mirror.orders();
            if orders.is_empty() {
                println!("No custom orders yet.");
                return Ok(());
            }
            println!();
            println!("{:<14}  {:<12}  {:<10}  {:>5}", "INVOICE", "STATUS", "PAYMENT", "ITEMS");
            println!("{}", "-".repeat(47));
            for order in orders.iter() {
                println!(
                    "{:<14}  {:<12}  {:<10}  {:>5}",
                    order.invoice_id,
                    order.status,
                    order.payment_status,
                    order.items.len()
                );
            }
            println!();
        }
        CustomOrderCommands::Track { invoice } => {
            let order = client.track_custom_order(invoice).await?;
            println!();
            println!("=== Custom order {} ===", order.invoice_id);
            println!();
            println!("Status:   {}", order.status);
            println!("Payment:  {}", order.payment_status);
            for item in &order.items {
                match &item.note {
                    Some(note) => println!("  {} x {} ({})", item.quantity, item.name, note),
                    None => println!("  {} x {}", item.quantity, item.name),
                }
            }
            println!();
        }
        CustomOrderCommands::Create {
            items,
            address,
            phone,
        } => {
            let order = client
                .create_custom_order(&CustomOrderRequest {
                    items: items.clone(),
                    address: address.clone(),
                    phone: phone.clone(),
                })
                .await?;
            println!("[OK] Custom order placed. Invoice: {}", order.invoice_id);
        }
        CustomOrderCommands::SetStatus {
            id,
            status,
            payment,
        } => {
            if status.is_none() && payment.is_none() {
                anyhow::bail!("Nothing to update. Pass --status and/or --payment.");
            }
            if let Some(status) = status {
                client.update_custom_order_status(id, *status).await?;
                println!("[OK] Custom order {} is now {}", id, status);
            }
            if let Some(payment) = payment {
                client.update_custom_order_payment_status(id, *payment).await?;
                println!("[OK] Payment for {} is now {}", id, payment);
            }
        }
    }
    Ok(())
}

/// Validate the configuration file
fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used. Set {} to point at the API.", API_URL_ENV);
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(mut config) => {
            let base_url = config.resolve_base_url(cli.api_url.as_deref()).to_string();
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:     {}", base_url);
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!();
            println!("Session:");
            println!("  Store:        {}", config.session.store_path.display());
            println!();
            println!("Cache TTL:      {}s", config.cache.ttl_secs);
            println!("Currency:       {}", config.display.currency);
            println!();

            let mut warnings = Vec::new();
            if base_url.starts_with("http://")
                && !base_url.contains("localhost")
                && !base_url.contains("127.0.0.1")
            {
                warnings.push("API base URL is not HTTPS - tokens will be sent in plaintext");
            }
            if config.cache.ttl_secs == 0 {
                warnings.push("Cache TTL is 0 - every query goes to the API");
            }

            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            anyhow::bail!("Invalid configuration file");
        }
    }
}

fn print_paging<T>(page: &Page<T>) {
    println!();
    println!(
        "Page {} of {} ({} total)",
        page.meta.page,
        page.meta.total_pages.max(1),
        page.meta.total
    );
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_custom_item() {
        let item = parse_custom_item("Hilsa fish:2:large ones").unwrap();
        assert_eq!(item.name, "Hilsa fish");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.note.as_deref(), Some("large ones"));

        assert_eq!(parse_custom_item("Eggs").unwrap().quantity, 1);
        assert!(parse_custom_item(":3").is_err());
        assert!(parse_custom_item("Eggs:0").is_err());
        assert!(parse_custom_item("Eggs:many").is_err());
    }

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("চাল ও ডাল", 20), "চাল ও ডাল");
        assert_eq!(truncate("Basmati Rice Premium", 10), "Basmati...");
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "bazar",
            "orders",
            "set-status",
            "o1",
            "--status",
            "shipped",
            "--payment",
            "paid",
        ])
        .unwrap();
        match cli.command {
            Commands::Orders(OrderCommands::SetStatus {
                id,
                status,
                payment,
            }) => {
                assert_eq!(id, "o1");
                assert_eq!(status, Some(OrderStatus::Shipped));
                assert_eq!(payment, Some(PaymentStatus::Paid));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_breadcrumb_takes_subcategory_or_category() {
        let cli = Cli::try_parse_from(["bazar", "catalog", "breadcrumb", "--category", "c1"]).unwrap();
        match cli.command {
            Commands::Catalog(CatalogCommands::Breadcrumb {
                subcategory,
                category,
            }) => {
                assert_eq!(subcategory, None);
                assert_eq!(category.as_deref(), Some("c1"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["bazar", "catalog", "breadcrumb", "s1"]).is_ok());
        assert!(Cli::try_parse_from(["bazar", "catalog", "breadcrumb"]).is_err());
        assert!(
            Cli::try_parse_from(["bazar", "catalog", "breadcrumb", "s1", "--category", "c1"])
                .is_err()
        );
    }

    #[test]
    fn test_custom_order_create_requires_items() {
        assert!(Cli::try_parse_from([
            "bazar",
            "custom-orders",
            "create",
            "--address",
            "Mirpur",
            "--phone",
            "019"
        ])
        .is_err());
    }
}
