use std::io::{self, Write};

use anyhow::{bail, Context};
use colored::Colorize;
use twinkv_store::{Store, StoreConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli.store)?;
    tracing::debug!(backend = %config.backend, "opening store");
    let mut store = config
        .open()
        .with_context(|| format!("opening {} store", config.backend))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_and_close(store.as_mut(), cli.command, &cli.format, &mut out)
}

/// Run one command, then close the store. A command error wins over a
/// close error.
fn execute_and_close(
    store: &mut dyn Store,
    command: Command,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let result = execute(store, command, format, out);
    let closed = store.close().context("closing store");
    result.and(closed)
}

/// Merge `--config` with the individual backend flags.
fn resolve_config(args: &StoreArgs) -> anyhow::Result<StoreConfig> {
    let mut config = match &args.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(backend) = args.backend {
        config.backend = backend.into();
    }
    if let Some(path) = &args.path {
        config.path = Some(path.clone());
    }
    if let Some(address) = &args.address {
        config.address = Some(address.clone());
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = Some(timeout);
    }
    Ok(config)
}

fn execute(
    store: &dyn Store,
    command: Command,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Get(args) => cmd_get(store, args, out),
        Command::Put(args) => cmd_put(store, args, out),
        Command::Delete(args) => cmd_delete(store, args, out),
        Command::List(args) => cmd_list(store, args, format, out),
        Command::DeleteTree(args) => cmd_delete_tree(store, args, out),
    }
}

fn cmd_get(store: &dyn Store, args: GetArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let value = store.get(&args.key)?;
    out.write_all(&value)?;
    out.flush()?;
    Ok(())
}

fn cmd_put(store: &dyn Store, args: PutArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let value = match (args.value, args.file) {
        (Some(value), _) => value.into_bytes(),
        (None, Some(file)) => std::fs::read(&file)
            .with_context(|| format!("reading {}", file.display()))?,
        (None, None) => bail!("put needs a value or --file"),
    };
    store.put(&args.key, &value)?;
    writeln!(out, "{} {} ({} bytes)", "✓".green(), args.key.bold(), value.len())?;
    Ok(())
}

fn cmd_delete(store: &dyn Store, args: DeleteArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    store.delete(&args.key)?;
    writeln!(out, "{} Deleted {}", "✓".green(), args.key.bold())?;
    Ok(())
}

fn cmd_list(
    store: &dyn Store,
    args: ListArgs,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let names = store.list(&args.arg)?;
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&names)?)?,
        OutputFormat::Text => {
            for name in &names {
                writeln!(out, "{name}")?;
            }
        }
    }
    Ok(())
}

fn cmd_delete_tree(
    store: &dyn Store,
    args: DeleteTreeArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    store.delete_tree(&args.arg)?;
    writeln!(out, "{} Deleted tree {}", "✓".green(), args.arg.yellow())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use twinkv_store::{BackendKind, EmbeddedStore, StoreError, StoreResult};

    fn open_temp() -> (tempfile::TempDir, EmbeddedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = EmbeddedStore::open(dir.path().join("cli.redb")).unwrap();
        (dir, store)
    }

    fn run(store: &dyn Store, argv: &[&str]) -> anyhow::Result<Vec<u8>> {
        let cli = Cli::try_parse_from(std::iter::once("twinkv").chain(argv.iter().copied()))?;
        let mut out = Vec::new();
        execute(store, cli.command, &cli.format, &mut out)?;
        Ok(out)
    }

    /// Store whose reads miss and whose close always fails.
    struct FailingClose {
        closed: bool,
    }

    impl Store for FailingClose {
        fn init(_options: &[String]) -> StoreResult<Self> {
            Ok(Self { closed: false })
        }
        fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
            Err(StoreError::NotFound { key: key.to_string() })
        }
        fn put(&self, _key: &str, _value: &[u8]) -> StoreResult<()> {
            Ok(())
        }
        fn delete(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
        fn list(&self, _arg: &str) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn delete_tree(&self, _arg: &str) -> StoreResult<()> {
            Ok(())
        }
        fn close(&mut self) -> StoreResult<()> {
            self.closed = true;
            Err(StoreError::Network("connection reset".into()))
        }
    }

    fn run_and_close(store: &mut dyn Store, argv: &[&str]) -> anyhow::Result<Vec<u8>> {
        let cli = Cli::try_parse_from(std::iter::once("twinkv").chain(argv.iter().copied()))?;
        let mut out = Vec::new();
        execute_and_close(store, cli.command, &cli.format, &mut out)?;
        Ok(out)
    }

    #[test]
    fn command_error_survives_close_error() {
        let mut store = FailingClose::init(&[]).unwrap();
        let err = run_and_close(&mut store, &["get", "missing"]).unwrap_err();
        assert!(store.closed);
        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert!(matches!(store_err, StoreError::NotFound { .. }));
    }

    #[test]
    fn close_error_reported_after_successful_command() {
        let mut store = FailingClose::init(&[]).unwrap();
        let err = run_and_close(&mut store, &["put", "k", "v"]).unwrap_err();
        assert!(format!("{err:#}").contains("closing store"));
        assert!(format!("{err:#}").contains("connection reset"));
    }

    #[test]
    fn closes_real_store_after_command() {
        let (_dir, mut store) = open_temp();
        run_and_close(&mut store, &["put", "k", "v"]).unwrap();
        assert!(matches!(store.get("k").unwrap_err(), StoreError::Closed));
    }

    #[test]
    fn put_then_get_prints_raw_value() {
        let (_dir, store) = open_temp();
        run(&store, &["put", "users/alice", "hello"]).unwrap();
        assert_eq!(run(&store, &["get", "users/alice"]).unwrap(), b"hello");
    }

    #[test]
    fn put_from_file() {
        let (dir, store) = open_temp();
        let file = dir.path().join("payload.bin");
        std::fs::write(&file, [0u8, 1, 2, 255]).unwrap();
        run(&store, &["put", "blob", "--file", file.to_str().unwrap()]).unwrap();
        assert_eq!(store.get("blob").unwrap(), vec![0u8, 1, 2, 255]);
    }

    #[test]
    fn put_without_value_fails() {
        let (_dir, store) = open_temp();
        assert!(run(&store, &["put", "k"]).is_err());
    }

    #[test]
    fn get_missing_key_surfaces_not_found() {
        let (_dir, store) = open_temp();
        let err = run(&store, &["get", "missing"]).unwrap_err();
        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert!(store_err.is_not_found());
    }

    #[test]
    fn list_json_output() {
        let (_dir, store) = open_temp();
        run(&store, &["put", "c/b", "2"]).unwrap();
        run(&store, &["put", "c/a", "1"]).unwrap();
        let out = run(&store, &["--format", "json", "list", "c"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), r#"["a","b"]"#);
    }

    #[test]
    fn list_without_argument_shows_containers() {
        let (_dir, store) = open_temp();
        let out = String::from_utf8(run(&store, &["list"]).unwrap()).unwrap();
        assert!(out.lines().any(|line| line == "default"));
    }

    #[test]
    fn delete_tree_then_list_fails() {
        let (_dir, store) = open_temp();
        run(&store, &["put", "c/x", "v"]).unwrap();
        run(&store, &["delete-tree", "c"]).unwrap();
        assert!(run(&store, &["list", "c"]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("twinkv.toml");
        std::fs::write(&file, "backend = \"embedded\"\npath = \"from-file.redb\"\n").unwrap();

        let args = StoreArgs {
            config: Some(file),
            backend: Some(BackendArg::Distributed),
            address: Some("kv:8500".into()),
            timeout: Some(2),
            ..StoreArgs::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.backend, BackendKind::Distributed);
        assert_eq!(config.options().unwrap(), vec!["kv:8500", "2"]);
    }
}
