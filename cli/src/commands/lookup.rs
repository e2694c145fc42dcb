//! Lookup command - show the process owning a port.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use portpeek_core::{
    ConfigStore, LookupConfig, LookupResult, LookupService, Port, PortScanner, SocketScannerPort,
};
use tracing::warn;

use crate::output;

pub struct LookupArgs {
    pub port: String,
    pub all: bool,
    pub json: bool,
    pub tcp_only: bool,
    pub listen_only: bool,
    pub config: Option<PathBuf>,
}

pub async fn run(args: LookupArgs) -> Result<ExitCode> {
    run_with(PortScanner::new(), args).await
}

/// Look up `args.port` through `scanner`.
///
/// Query failures come back as errors; the caller reports them and exits 4.
async fn run_with<S: SocketScannerPort>(scanner: S, args: LookupArgs) -> Result<ExitCode> {
    // Validate before touching the OS.
    let port = match Port::parse(&args.port) {
        Ok(port) => port,
        Err(reason) => {
            let result = LookupResult::InvalidPort { reason };
            return output::emit(&result, false, args.json);
        }
    };

    let mut config = load_config(args.config).await?;
    if args.tcp_only {
        config.include_udp = false;
    }
    if args.listen_only {
        config.include_established = false;
    }
    if args.all {
        config.show_all = true;
    }

    let service = LookupService::new(scanner, config);
    let result = service
        .lookup(port)
        .await
        .with_context(|| format!("could not look up port {}", port))?;

    output::emit(&result, service.config().show_all, args.json)
}

/// Load settings from an explicit path (which must exist) or the default
/// location (where problems are logged and defaults used).
async fn load_config(path: Option<PathBuf>) -> Result<LookupConfig> {
    if let Some(path) = path {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        let store = ConfigStore::with_path(path);
        return store
            .load()
            .await
            .with_context(|| format!("invalid config file {}", store.path().display()));
    }

    let store = match ConfigStore::new() {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "using default settings");
            return Ok(LookupConfig::default());
        }
    };

    match store.load().await {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(path = %store.path().display(), error = %e, "ignoring config file");
            Ok(LookupConfig::default())
        }
    }
}
