use std::path::PathBuf;
use std::process::ExitCode;

use burgermafia::error::ErrorCode;
use burgermafia::forms::{BannerDraft, BlogDraft, ContactForm, ImageSource, ImageUpload, InterestForm, ProductDraft};
use burgermafia::models::{Category, Page, Pagination, ProductFilter};
use burgermafia::{ConfigError, GatewayConfig, GatewayError, SessionGateway};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("login failed; check the email and password")]
    LoginFailed,
    #[error("not signed in; run `burgermafia login` first")]
    NotSignedIn,
    #[error("output encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "burgermafia", about = "Burger Mafia back-office client")]
struct Cli {
    #[arg(long, env = "BURGERMAFIA_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "BURGERMAFIA_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BURGERMAFIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Products(ProductsCommand),
    Blogs(BlogsCommand),
    Banner(BannerCommand),
    Leads(PagedCommand),
    Interests(PagedCommand),
    /// Submit the public contact form.
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Submit the public franchise interest form.
    Interest {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value_t = false)]
        franchise: bool,
    },
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// Local image file, sent as multipart.
    #[arg(long, conflicts_with = "image_url")]
    image: Option<PathBuf>,

    /// Already-hosted image URL.
    #[arg(long)]
    image_url: Option<String>,
}

impl ImageArgs {
    fn source(self) -> Result<Option<ImageSource>, GatewayError> {
        if let Some(path) = self.image {
            return Ok(Some(ImageSource::Upload(ImageUpload::from_path(&path)?)));
        }
        Ok(self.image_url.map(ImageSource::Url))
    }
}

#[derive(Args, Debug)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    description: String,
    #[arg(long)]
    category: Category,
    #[command(flatten)]
    image: ImageArgs,
}

impl ProductFields {
    fn into_draft(self) -> Result<ProductDraft, GatewayError> {
        Ok(ProductDraft {
            name: self.name,
            price: self.price,
            description: self.description,
            category: self.category,
            image: self.image.source()?,
        })
    }
}

#[derive(Args, Debug)]
struct ProductsCommand {
    #[command(subcommand)]
    command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductsSubcommand {
    List {
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        search: Option<String>,
    },
    Create(ProductFields),
    Update {
        id: u64,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct BlogsCommand {
    #[command(subcommand)]
    command: BlogsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BlogsSubcommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: PathBuf,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct BannerCommand {
    #[command(subcommand)]
    command: BannerSubcommand,
}

#[derive(Subcommand, Debug)]
enum BannerSubcommand {
    Show,
    Update {
        id: u64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        subtitle: String,
        #[command(flatten)]
        image: ImageArgs,
    },
}

#[derive(Args, Debug)]
struct PagedCommand {
    #[command(subcommand)]
    command: PagedSubcommand,
}

#[derive(Subcommand, Debug)]
enum PagedSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Delete {
        id: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Gateway(e)) => {
            for line in e.user_messages() {
                eprintln!("error: {line}");
            }
            if e.requires_login() {
                eprintln!("hint: run `burgermafia login` to sign in again");
            }
            tracing::debug!(code = e.error_code(), "command failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<GatewayConfig, CliError> {
    let mut config = GatewayConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.api_base_url.clone_from(base_url);
    }
    if let Some(token_file) = &cli.token_file {
        config.token_file.clone_from(token_file);
    }
    Ok(config.validated()?)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let gateway = SessionGateway::from_config(&config)?;
    gateway.verify_session().await;

    match cli.command {
        Command::Login { email, password } => {
            if !gateway.login(&email, &password).await {
                return Err(CliError::LoginFailed);
            }
            print_json(&gateway.current_user())
        }
        Command::Logout => {
            gateway.logout().await;
            eprintln!("signed out");
            Ok(())
        }
        Command::Whoami => {
            if !gateway.session().is_authenticated() {
                return Err(CliError::NotSignedIn);
            }
            print_json(&gateway.current_user())
        }
        Command::Products(products) => run_products(&gateway, products).await,
        Command::Blogs(blogs) => run_blogs(&gateway, blogs).await,
        Command::Banner(banner) => run_banner(&gateway, banner).await,
        Command::Leads(leads) => match leads.command {
            PagedSubcommand::List { page } => show_page(gateway.fetch_leads(page).await),
            PagedSubcommand::Delete { id } => {
                gateway.delete_lead(id).await?;
                show_page(gateway.fetch_leads(1).await)
            }
        },
        Command::Interests(interests) => match interests.command {
            PagedSubcommand::List { page } => show_page(gateway.fetch_interests(page).await),
            PagedSubcommand::Delete { id } => {
                gateway.delete_interest(id).await?;
                show_page(gateway.fetch_interests(1).await)
            }
        },
        Command::Contact { name, phone, email, message } => {
            let form = ContactForm { customer_name: name, customer_phone: phone, customer_email: email, message };
            print_json(&gateway.submit_contact(&form).await?)
        }
        Command::Interest { name, phone, email, message, franchise } => {
            let form = InterestForm { name, phone, email, message, franchise_interest: franchise };
            let message = gateway.submit_interest(&form).await?;
            eprintln!("{}", message.as_deref().unwrap_or("submitted"));
            Ok(())
        }
    }
}

async fn run_products(gateway: &SessionGateway, products: ProductsCommand) -> Result<(), CliError> {
    match products.command {
        ProductsSubcommand::List { category, search } => {
            let filter = ProductFilter { category, search };
            let shown = gateway
                .fetch_products()
                .await
                .map(|all| filter.apply(&all).into_iter().cloned().collect::<Vec<_>>());
            show_or_empty(shown, json!([]))
        }
        ProductsSubcommand::Create(fields) => {
            gateway.create_product(&fields.into_draft()?).await?;
            show_or_empty(gateway.fetch_products().await, json!([]))
        }
        ProductsSubcommand::Update { id, fields } => {
            gateway.update_product(id, &fields.into_draft()?).await?;
            show_or_empty(gateway.fetch_products().await, json!([]))
        }
        ProductsSubcommand::Delete { id } => {
            gateway.delete_product(id).await?;
            show_or_empty(gateway.fetch_products().await, json!([]))
        }
    }
}

async fn run_blogs(gateway: &SessionGateway, blogs: BlogsCommand) -> Result<(), CliError> {
    match blogs.command {
        BlogsSubcommand::List => show_or_empty(gateway.fetch_blogs().await, json!([])),
        BlogsSubcommand::Create { name, image } => {
            let draft = BlogDraft { blog_name: name, image: Some(ImageUpload::from_path(&image)?) };
            gateway.create_blog(&draft).await?;
            show_or_empty(gateway.fetch_blogs().await, json!([]))
        }
        BlogsSubcommand::Update { id, name, image } => {
            let image = image.as_deref().map(ImageUpload::from_path).transpose()?;
            gateway.update_blog(id, &BlogDraft { blog_name: name, image }).await?;
            show_or_empty(gateway.fetch_blogs().await, json!([]))
        }
        BlogsSubcommand::Delete { id } => {
            gateway.delete_blog(id).await?;
            show_or_empty(gateway.fetch_blogs().await, json!([]))
        }
    }
}

async fn run_banner(gateway: &SessionGateway, banner: BannerCommand) -> Result<(), CliError> {
    match banner.command {
        BannerSubcommand::Show => show_or_empty(gateway.fetch_banner().await, Value::Null),
        BannerSubcommand::Update { id, title, subtitle, image } => {
            let draft = BannerDraft { title, subtitle, image: image.source()? };
            gateway.update_banner(id, &draft).await?;
            show_or_empty(gateway.fetch_banner().await, Value::Null)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// Render a read result. A failed read yields the empty view alongside the
/// error so the caller can show both.
fn view_or_empty<T: Serialize>(
    result: Result<T, GatewayError>,
    empty: Value,
) -> Result<(Value, Option<GatewayError>), CliError> {
    match result {
        Ok(value) => Ok((serde_json::to_value(&value)?, None)),
        Err(e) => Ok((empty, Some(e))),
    }
}

fn show_or_empty<T: Serialize>(result: Result<T, GatewayError>, empty: Value) -> Result<(), CliError> {
    let (view, error) = view_or_empty(result, empty)?;
    print_json(&view)?;
    error.map_or(Ok(()), |e| Err(e.into()))
}

fn show_page<T: Serialize>(result: Result<Page<T>, GatewayError>) -> Result<(), CliError> {
    if let Ok(page) = &result {
        eprintln!("{}", page_hint(&page.pagination));
    }
    show_or_empty(result, json!({ "items": [] }))
}

fn page_hint(pagination: &Pagination) -> String {
    let mut hint = format!("page {} of {} ({} total)", pagination.current_page, pagination.last_page, pagination.total);
    if pagination.has_prev() {
        hint.push_str(&format!("; previous: --page {}", pagination.current_page - 1));
    }
    if pagination.has_next() {
        hint.push_str(&format!("; next: --page {}", pagination.current_page + 1));
    }
    hint
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
