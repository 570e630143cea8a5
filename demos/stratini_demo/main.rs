//! # stratini demo application
//!
//! A sample disk-watch tool that shows how stratini fits into a real
//! application. It does not watch anything; it only loads its config and
//! prints what it would do.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example stratini_demo -- --dir demos/stratini_demo watches
//! cargo run --example stratini_demo -- --dir demos/stratini_demo config list --raw
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                         |
//! |--------------------------|----------------------------------------------------------------------------|
//! | Config discovery         | Put `stratini-demo.ini` in cwd, `~/.stratini-demo/` or pass `--dir`        |
//! | Override                 | `... --root /srv watches` sets `DEFAULT.root`                              |
//! | Components and mixins    | `... watches`                                                              |
//! | Synced rates             | `... watches` prints the next poll time                                    |
//! | Callbacks                | `... watches` resolves `alert.*` through the registry                      |
//! | `config list/get`        | `... config get monitor watch.*.path --raw`                                |
//! | `config components`      | `... config components monitor watches --prefix watch`                     |
//! | Logging                  | `RUST_LOG=stratini=debug cargo run --example stratini_demo -- watches`     |

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use tracing_subscriber::EnvFilter;

use stratini::{
    CallbackRegistry, Component, ConfigArgs, ConfigError, Fallback, Rate, SearchPath,
    SectionView, Stratini, StratiniBuilder, Timespan,
};

/// stratini demo: a pretend disk watcher configured through stratini.
#[derive(Parser, Debug)]
#[command(name = "stratini-demo")]
struct Cli {
    /// Extra directory to search for `stratini-demo.ini` (highest priority).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Override `DEFAULT.root`.
    #[arg(long, global = true)]
    root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the watch components and print them.
    Watches,
    /// Inspect the configuration (sections, list, get, components).
    Config(ConfigArgs),
}

type Alert = fn(&str, &str);

fn console_alert(watch: &str, message: &str) {
    println!("  ! {watch}: {message}");
}

fn silent_alert(_watch: &str, _message: &str) {}

fn registry() -> CallbackRegistry<Alert> {
    let mut registry = CallbackRegistry::new();
    registry
        .register("notify", "console", console_alert as Alert)
        .register("notify", "silent", silent_alert as Alert)
        .register_init("notify", "banner", || println!("(alerts go to the console)"));
    registry
}

fn make_builder(cli: &Cli) -> StratiniBuilder {
    let mut paths = vec![
        SearchPath::Platform,
        SearchPath::Home(".stratini-demo"),
        SearchPath::Cwd,
    ];
    if let Some(dir) = &cli.dir {
        paths.push(SearchPath::Path(dir.clone()));
    }

    Stratini::builder()
        .app_name("stratini-demo")
        .search_paths(paths)
        .set_override("DEFAULT", "root", cli.root.clone())
}

/// The application object components hang off.
struct Monitor {
    alert: Alert,
}

#[derive(Debug)]
struct State {
    label: String,
}

struct Watch {
    name: String,
    path: PathBuf,
    threshold: i64,
    max_size: Option<u64>,
    retention: Timespan,
    states: IndexMap<String, State>,
    alert: Alert,
}

impl Watch {
    fn build(component: Component, monitor: &Monitor) -> Result<Self, ConfigError> {
        let states = component.get_components("states", "state", &(), |state, _| {
            Ok::<_, ConfigError>(State {
                label: state
                    .get("label", Fallback::Value(state.name().to_string()))?
                    .unwrap_or_default(),
            })
        })?;

        Ok(Self {
            name: component.name().to_string(),
            path: component
                .get_path("path", Fallback::Required)?
                .unwrap_or_default(),
            threshold: component
                .get_int("threshold", Fallback::Required)?
                .unwrap_or_default(),
            max_size: component.get_bytes("max_size", Fallback::None)?,
            retention: component
                .get_timespan("retention", Fallback::Value(Timespan::default()))?
                .unwrap_or_default(),
            states,
            alert: monitor.alert,
        })
    }
}

fn show_watches(builder: StratiniBuilder) -> Result<(), ConfigError> {
    let store = builder.load()?;
    let section = store.section("monitor")?;

    let alert = section
        .get_callback("alert", &registry(), Fallback::raw("notify.silent"))?
        .unwrap_or(silent_alert);
    let monitor = Monitor { alert };

    let poll = section
        .get_rate("poll", Fallback::Value(Rate::new(Duration::from_secs(60))))?
        .unwrap_or_default();
    let now = Utc::now();
    println!("poll {poll}; next at {}", poll.next_time(now).format("%H:%M:%S"));

    let watches = section.get_components("watches", "watch", &monitor, Watch::build)?;
    for watch in watches.values() {
        println!(
            "{}: {} (threshold {}%, keep {})",
            watch.name,
            watch.path.display(),
            watch.threshold,
            watch.retention
        );
        if let Some(max) = watch.max_size {
            println!("  max size {max} bytes");
        }
        for (name, state) in &watch.states {
            println!("  state {name}: {}", state.label);
        }
        if watch.threshold < 80 {
            (watch.alert)(&watch.name, "low threshold");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let builder = make_builder(&cli);

    match cli.command {
        Commands::Watches => {
            show_watches(builder).unwrap_or_else(|e| {
                eprintln!("Failed to load config:\n{e}");
                std::process::exit(1);
            });
        }
        Commands::Config(args) => {
            let action = args.into_action();
            builder.handle_and_print(&action).unwrap_or_else(|e| {
                eprintln!("Config error:\n{e}");
                std::process::exit(1);
            });
        }
    }
}
