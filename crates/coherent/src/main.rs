use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use coherent::cache::MemoryCache;
use coherent::storage::{CachedRepository, SqliteStore};
use coherent::{CacheBackend, Config};
use coherent_core::cache::Cache;
use coherent_core::convention::SystemClock;
use coherent_core::entity::{Chat, Confbridge, Conference, Entity, Recording, Trunk};
use coherent_core::storage::schema::CUSTOMER_ID;
use coherent_core::storage::{ListQuery, PageToken, Store};

/// Coherent - inspect and maintain the entity store
#[derive(Parser, Debug)]
#[command(name = "coherent")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, env = "SQLITE_PATH")]
    sqlite_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create every entity table and index
    Init,
    /// Print one entity, tombstoned or not
    Get { kind: Kind, id: Uuid },
    /// Print one page of alive entities, newest first
    List {
        kind: Kind,
        #[arg(long)]
        customer_id: Option<Uuid>,
        #[arg(long, default_value = "10")]
        page_size: usize,
        /// Token printed as `next_page_token` by the previous page
        #[arg(long)]
        page_token: Option<String>,
        #[arg(long)]
        include_deleted: bool,
    },
    /// Tombstone one entity and print it
    Delete { kind: Kind, id: Uuid },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Chat,
    Conference,
    Confbridge,
    Recording,
    Trunk,
}

/// Runs a generic call with `E` bound to the entity type of `kind`.
macro_rules! dispatch {
    ($kind:expr, |$e:ident| $call:expr) => {
        match $kind {
            Kind::Chat => {
                type $e = Chat;
                $call
            }
            Kind::Conference => {
                type $e = Conference;
                $call
            }
            Kind::Confbridge => {
                type $e = Confbridge;
                $call
            }
            Kind::Recording => {
                type $e = Recording;
                $call
            }
            Kind::Trunk => {
                type $e = Trunk;
                $call
            }
        }
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coherent=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(path) = cli.sqlite_path {
        config.sqlite_path = path;
    }

    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::new(&config.sqlite_path)
            .await
            .with_context(|| format!("opening {}", config.sqlite_path))?,
    );
    let cache = init_cache(&config).await?;

    let app = App {
        store,
        cache,
        config,
    };
    match cli.command {
        Command::Init => app.init().await,
        Command::Get { kind, id } => dispatch!(kind, |E| app.get::<E>(id).await),
        Command::List {
            kind,
            customer_id,
            page_size,
            page_token,
            include_deleted,
        } => {
            let token = PageToken::parse_opt(page_token.as_deref().unwrap_or_default())?;
            let mut query = ListQuery::new(page_size)
                .after(token)
                .include_deleted(include_deleted);
            if let Some(customer_id) = customer_id {
                query = query.filter(CUSTOMER_ID, customer_id);
            }
            dispatch!(kind, |E| app.list::<E>(&query).await)
        }
        Command::Delete { kind, id } => dispatch!(kind, |E| app.delete::<E>(id).await),
    }
}

async fn init_cache(config: &Config) -> Result<Arc<dyn Cache>> {
    match config.cache_backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::new(config.cache_max_entries))),
        #[cfg(feature = "redis")]
        CacheBackend::Redis => {
            let cache = coherent::cache::RedisCache::new(&config.redis_url)
                .await
                .with_context(|| format!("connecting to {}", config.redis_url))?;
            Ok(Arc::new(cache))
        }
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => {
            anyhow::bail!("CACHE_BACKEND=redis needs a build with the `redis` feature")
        }
    }
}

struct App {
    store: Arc<dyn Store>,
    cache: Arc<dyn Cache>,
    config: Config,
}

impl App {
    fn repository<E: Entity>(&self) -> CachedRepository<E, dyn Store, dyn Cache> {
        CachedRepository::new(
            Arc::clone(&self.store),
            Arc::clone(&self.cache),
            Arc::new(SystemClock),
            self.config.repository_options(),
        )
    }

    async fn init(&self) -> Result<()> {
        for schema in [
            <Chat as Entity>::SCHEMA,
            <Conference as Entity>::SCHEMA,
            <Confbridge as Entity>::SCHEMA,
            <Recording as Entity>::SCHEMA,
            <Trunk as Entity>::SCHEMA,
        ] {
            self.store.ensure_table(schema).await?;
            tracing::info!(table = schema.table, "Table ready");
        }
        Ok(())
    }

    async fn get<E: Entity>(&self, id: Uuid) -> Result<()> {
        let entity = self.repository::<E>().get(id).await?;
        println!("{}", serde_json::to_string_pretty(&entity)?);
        Ok(())
    }

    async fn list<E: Entity>(&self, query: &ListQuery) -> Result<()> {
        let page = self.repository::<E>().list(query).await?;
        println!("{}", serde_json::to_string_pretty(&page)?);
        Ok(())
    }

    async fn delete<E: Entity>(&self, id: Uuid) -> Result<()> {
        let repository = self.repository::<E>();
        repository.delete(id).await?;
        let entity = repository.get(id).await?;
        println!("{}", serde_json::to_string_pretty(&entity)?);
        Ok(())
    }
}
