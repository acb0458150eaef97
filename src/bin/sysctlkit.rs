//! sysctlkit - browse, edit, import and export kernel tunables.
//!
//! Every tunable read and write is shelled out through an elevation binary
//! (`su -c` by default); the process itself never touches `/proc/sys`
//! contents directly.

use clap::{Parser, Subcommand};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use sysctlkit::apply::{ApplyEngine, ApplyOutcome};
use sysctlkit::browser::BrowserSession;
use sysctlkit::fs::RealFs;
use sysctlkit::param::{KernelParam, PROC_SYS_ROOT};
use sysctlkit::port;
use sysctlkit::runner::SuRunner;
use sysctlkit::store::{BlobStore, FileBlobStore, ParamStore, keys};

/// Kernel tunable manager for /proc/sys.
#[derive(Parser)]
#[command(name = "sysctlkit", about = "Browse, edit, import and export kernel tunables", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Elevation binary used for privileged commands (must accept -c).
    #[arg(long, default_value = "su")]
    su: String,

    /// Prefix privileged commands with busybox (overrides the stored preference).
    #[arg(long)]
    busybox: bool,

    /// Blob store file holding saved parameters and preferences.
    #[arg(long, default_value = "sysctlkit.json")]
    store: String,

    /// Root of the sysctl tree (for testing against a fake tree).
    #[arg(long, default_value = PROC_SYS_ROOT)]
    sysctl_root: String,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List entries under a directory of the sysctl tree.
    Ls {
        /// Directory to list; defaults to the tree root.
        path: Option<String>,
        /// Case-insensitive name filter.
        #[arg(long)]
        filter: Option<String>,
        /// Order directories before files (also a stored preference).
        #[arg(long)]
        folders_first: bool,
    },
    /// Read the current value of a tunable.
    Get { path: String },
    /// Write a value to a tunable.
    Set {
        path: String,
        value: String,
        /// Save the parameter on success.
        #[arg(long)]
        save: bool,
        /// Grouping tag recorded with --save.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show saved parameters.
    Saved,
    /// Remove a saved parameter by path.
    Rm { path: String },
    /// Export saved parameters to a JSON document.
    Export {
        /// Output file; defaults to a timestamped name.
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Apply parameters from a JSON document and replace the saved list.
    Import { file: String },
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("sysctlkit={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let blob = FileBlobStore::open(&args.store);
    let mut store = ParamStore::new(blob);

    let use_busybox = args.busybox || store.blob().get_bool(keys::USE_BUSYBOX, false);
    let engine = ApplyEngine::new(SuRunner::with_binary(&args.su)).use_busybox(use_busybox);

    let exit_code = match args.command {
        Command::Ls {
            path,
            filter,
            folders_first,
        } => cmd_ls(&args.sysctl_root, path, filter, folders_first, &store),
        Command::Get { path } => cmd_get(&engine, &path),
        Command::Set {
            path,
            value,
            save,
            tag,
        } => cmd_set(&engine, &mut store, path, value, save, tag),
        Command::Saved => cmd_saved(&store),
        Command::Rm { path } => cmd_rm(&mut store, &path),
        Command::Export { output } => cmd_export(&store, output),
        Command::Import { file } => cmd_import(&engine, &mut store, &file),
    };

    std::process::exit(exit_code);
}

fn cmd_ls(
    root: &str,
    path: Option<String>,
    filter: Option<String>,
    folders_first: bool,
    store: &ParamStore<FileBlobStore>,
) -> i32 {
    let folders_first = folders_first || store.blob().get_bool(keys::FOLDERS_FIRST, false);
    let mut session = BrowserSession::with_root(RealFs::new(), root).folders_first(folders_first);

    if let Some(path) = path {
        if let Err(e) = session.change_directory(&path) {
            error!("cannot browse {}: {}", path, e);
            return 1;
        }
    }

    for entry in session.list_children(filter.as_deref()) {
        if entry.is_directory {
            println!("{}/", entry.file_name());
        } else {
            println!("{}", entry.file_name());
        }
    }
    0
}

fn cmd_get(engine: &ApplyEngine<SuRunner>, path: &str) -> i32 {
    println!("{}", engine.read_value(path));
    0
}

fn cmd_set(
    engine: &ApplyEngine<SuRunner>,
    store: &mut ParamStore<FileBlobStore>,
    path: String,
    value: String,
    save: bool,
    tag: Option<String>,
) -> i32 {
    let mut param = KernelParam::new(path, value);
    if let Some(tag) = tag {
        param = param.with_tag(tag);
    }

    let outcome = if save {
        engine.apply_and_persist(&param, store)
    } else {
        engine.apply(&param)
    };

    match outcome {
        ApplyOutcome::Success => {
            info!("{} = {}", param.path, param.value);
            0
        }
        ApplyOutcome::CustomApply(param) => {
            info!("{} applied through its custom handler", param.path);
            0
        }
        ApplyOutcome::EmptyValue => {
            error!("refusing to write an empty value to {}", param.path);
            1
        }
        ApplyOutcome::Feedback(msg) => {
            error!("{}", msg);
            1
        }
    }
}

fn cmd_saved(store: &ParamStore<FileBlobStore>) -> i32 {
    for param in store.list() {
        if param.tag.is_empty() {
            println!("{} = {}", param.path, param.value);
        } else {
            println!("{} = {} [{}]", param.path, param.value, param.tag);
        }
    }
    0
}

fn cmd_rm(store: &mut ParamStore<FileBlobStore>, path: &str) -> i32 {
    match store.remove(path) {
        Ok(true) => 0,
        Ok(false) => {
            error!("{} is not in the saved list", path);
            1
        }
        Err(e) => {
            error!("cannot update the saved list: {}", e);
            1
        }
    }
}

fn cmd_export(store: &ParamStore<FileBlobStore>, output: Option<String>) -> i32 {
    let doc = match port::export_json(&store.list()) {
        Ok(doc) => doc,
        Err(e) => {
            error!("export failed: {}", e);
            return 1;
        }
    };

    let output = output.unwrap_or_else(|| {
        format!(
            "sysctl-params-{}.json",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        )
    });

    if let Err(e) = std::fs::write(&output, doc) {
        error!("cannot write {}: {}", output, e);
        return 1;
    }
    info!("exported to {}", output);
    0
}

fn cmd_import(
    engine: &ApplyEngine<SuRunner>,
    store: &mut ParamStore<FileBlobStore>,
    file: &str,
) -> i32 {
    let doc = match std::fs::read_to_string(file) {
        Ok(doc) => doc,
        Err(e) => {
            error!("cannot read {}: {}", file, e);
            return 1;
        }
    };

    match port::import_document(&doc, engine, store) {
        Ok(report) => {
            info!(
                "applied {} of {} parameters",
                report.applied, report.candidates
            );
            0
        }
        Err(e) => {
            error!("import failed: {}", e);
            1
        }
    }
}
