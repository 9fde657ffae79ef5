mod demo;

use std::path::PathBuf;

use clap::Parser;
use mvu_runtime::config::RuntimeConfig;
use mvu_runtime::devtools::MemoryDevtools;
use mvu_runtime::logging::init_tracing;
use mvu_runtime::router::MemoryLocation;
use mvu_runtime::storage::FileStore;
use mvu_runtime::App;

use demo::counter::{self, Counter};
use demo::pages;

#[derive(Debug, Parser)]
#[command(name = "mvu-demo", about = "Terminal counter running on the MVU runtime")]
struct Args {
    /// Config file (default: the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the persisted model
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Storage key of the persisted model
    #[arg(long, default_value = "counter")]
    key: String,

    /// Initial URL
    #[arg(long, default_value = "/counter")]
    url: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RuntimeConfig::load_from(path)?,
        None => RuntimeConfig::load()?,
    };
    if let Some(dir) = args.store_dir {
        config.storage.directory = Some(dir);
    }
    init_tracing(&config.logging);

    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()?;
    let _enter = tokio_runtime.enter();

    let location = MemoryLocation::new(args.url);
    let devtools = MemoryDevtools::new();
    let store = FileStore::from_settings(&config.storage);
    tracing::info!(dir = %store.dir().display(), key = %args.key, "Starting demo");

    let mut running = App::create(Counter::default, counter::update, pages::mount)
        .with_config(config)
        .with_routing(counter::router(), location.clone(), counter::route_lens())
        .with_local_storage(args.key, store)
        .with_remote_dev(devtools.clone())
        .run()?;

    demo::run(&mut running, &location, &devtools)
}
