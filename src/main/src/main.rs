// Copyright © moonhollow 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use config::{Config, Environment, File};
use data::config::EngineConfig;
use database::sled_database::SledDatabase;
use directories::ProjectDirs;
use server::engine::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the persistent store. Defaults to the platform data
    /// dir.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// Layered configuration: built-in defaults, then the optional file, then
/// `MOONHOLLOW_*` environment variables.
fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut builder =
        Config::builder().add_source(Config::try_from(&EngineConfig::default())?);
    if let Some(path) = &args.config {
        builder = builder.add_source(File::from(path.clone()));
    }
    builder = builder.add_source(Environment::with_prefix("MOONHOLLOW").separator("__"));
    Ok(builder.build()?.try_deserialize()?)
}

fn data_dir(args: &Args) -> Result<PathBuf> {
    if let Some(dir) = &args.data_dir {
        return Ok(dir.clone());
    }
    let dirs = ProjectDirs::from("", "", "moonhollow")
        .ok_or_else(|| eyre!("Unable to determine a data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let data_dir = data_dir(&args)?;
    info!(?data_dir, "Opening store");

    let database = Arc::new(SledDatabase::new(data_dir.to_string_lossy().to_string()));
    let engine = Engine::new(config, database);
    engine.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    engine.shutdown().await;
    Ok(())
}
