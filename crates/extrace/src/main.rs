use std::collections::HashMap;
use std::fmt;
use std::process;

use clap::{Parser, Subcommand};
use extrace_core::capture::{install_backend, CaptureBackend};
use extrace_core::introspect::{Introspect, LoadFlags, UnitSink};
use extrace_core::traced::ErrorChain;
use extrace_core::types::{RawFrame, TypeHandle, UnitHandle};
use extrace_core::{Result as TraceResult, TraceError, Traced, TraceSnapshot};
use extrace_utils::{info, init_logging, init_logging_to_file, init_logging_with_level, LogFormat, LogLevel, LoggingError};

/// Extended stack traces with lazy symbol resolution and chained-event printing.
#[derive(Parser, Debug)]
#[command(name = "extrace")]
#[command(version)]
#[command(about = "Extended stack traces with lazy symbol resolution and chained-event printing", long_about = None)]
struct Cli
{
    /// Write logs to a dated file under ~/.extrace instead of the console
    #[arg(long, global = true, default_value_t = false)]
    log_file: bool,

    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Print a sample chained event (cause plus suppressed) to stderr
    Demo
    {
        /// Resolve owning types and units against the sample host first
        #[arg(long, default_value_t = false)]
        resolve: bool,
    },
    /// Capture the current point through the sample backend and print it
    Here,
    /// Print a plain std error chain through the cause-chain adapter
    Error,
}

fn main()
{
    let cli = Cli::parse();

    if let Err(e) = init_cli_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    run_command(cli);
}

/// Pick the logging mode from the global flags: file-only with `--log-file`
/// (keeps log lines away from the stderr trace output), explicit level with
/// `--log-level`, environment-driven defaults otherwise.
fn init_cli_logging(cli: &Cli) -> Result<(), LoggingError>
{
    if cli.log_file {
        let path = init_logging_to_file(cli.log_level)?;
        info!("logging to {}", path.display());
        Ok(())
    } else if let Some(level) = cli.log_level {
        init_logging_with_level(level, LogFormat::Pretty)
    } else {
        // Reads RUST_LOG and EXTRACE_LOG_FORMAT, defaults to INFO / Pretty
        init_logging()
    }
}

fn run_command(cli: Cli)
{
    match cli.command {
        Commands::Demo { resolve } => {
            info!("rendering sample chained event (resolve: {})", resolve);
            let event = sample_event();
            let snapshot = TraceSnapshot::of(&event);
            if resolve {
                snapshot.resolve(&sample_host());
            }
            snapshot.print();
        }
        Commands::Here => {
            info!("capturing the current point through the sample backend");
            install_backend(Box::new(SampleBackend));
            let snapshot = TraceSnapshot::here();
            snapshot.resolve(&sample_host());
            snapshot.print();
        }
        Commands::Error => {
            info!("rendering a std error chain");
            let error = ConfigError {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml not found"),
            };
            let chain = ErrorChain::new(&error);
            TraceSnapshot::of(&chain).print();
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cannot load configuration")]
struct ConfigError
{
    #[source]
    source: std::io::Error,
}

/// Chained event whose cause shares a call-path suffix with it, so the
/// rendered output shows the `... N more` elision.
struct SampleEvent
{
    label: String,
    frames: Vec<RawFrame>,
    cause: Option<Box<SampleEvent>>,
    suppressed: Vec<SampleEvent>,
}

impl fmt::Display for SampleEvent
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.label)
    }
}

impl Traced for SampleEvent
{
    fn raw_frames(&self) -> Vec<RawFrame>
    {
        self.frames.clone()
    }

    fn cause(&self) -> Option<&dyn Traced>
    {
        self.cause.as_deref().map(|cause| cause as &dyn Traced)
    }

    fn suppressed(&self) -> Vec<&dyn Traced>
    {
        self.suppressed.iter().map(|event| event as &dyn Traced).collect()
    }
}

fn sample_event() -> SampleEvent
{
    let shared = vec![
        RawFrame::new("app.Scheduler", "tick", Some("Scheduler.java".to_string()), 35),
        RawFrame::new("app.Main", "main", Some("Main.java".to_string()), 12),
    ];

    let mut root_frames = vec![RawFrame::new(
        "app.Store",
        "flush",
        Some("Store.java".to_string()),
        78,
    )];
    root_frames.extend(shared.iter().cloned());
    let root = SampleEvent {
        label: "store flush failed".to_string(),
        frames: root_frames,
        cause: None,
        suppressed: Vec::new(),
    };

    let cleanup = SampleEvent {
        label: "cleanup failed".to_string(),
        frames: vec![RawFrame::new(
            "app.Store",
            "close",
            Some("Store.java".to_string()),
            91,
        )],
        cause: None,
        suppressed: Vec::new(),
    };

    let mut outer_frames = vec![RawFrame::new(
        "app.Scheduler",
        "run",
        Some("Scheduler.java".to_string()),
        15,
    )];
    outer_frames.extend(shared);
    SampleEvent {
        label: "scheduled task aborted".to_string(),
        frames: outer_frames,
        cause: Some(Box::new(root)),
        suppressed: vec![cleanup],
    }
}

/// In-memory host with one overloaded unit, so `--resolve` demonstrates
/// line-interval disambiguation: `run` at line 15 resolves to the no-arg
/// overload, `tick` resolves on the fast path.
struct SampleHost
{
    types: HashMap<String, TypeHandle>,
    intervals: HashMap<String, Vec<(String, String, Vec<u32>)>>,
}

impl Introspect for SampleHost
{
    fn find_type(&self, name: &str) -> Option<TypeHandle>
    {
        self.types.get(name).cloned()
    }

    fn visit_units(&self, name: &str, _flags: LoadFlags, sink: &mut dyn UnitSink) -> TraceResult<()>
    {
        let members = self.intervals.get(name).ok_or_else(|| TraceError::MetadataUnavailable {
            type_name: name.to_string(),
            details: "type not in the sample metadata".to_string(),
        })?;
        for (unit_name, descriptor, lines) in members {
            if sink.begin_unit(unit_name, descriptor, 0) {
                for (offset, line) in lines.iter().enumerate() {
                    sink.line_entry(offset as u32, *line);
                }
                sink.end_unit();
            }
        }
        Ok(())
    }
}

fn sample_host() -> SampleHost
{
    let scheduler = TypeHandle::new(
        "app.Scheduler",
        vec![
            UnitHandle::method("app.Scheduler", "run", "()V", Vec::new()),
            UnitHandle::method("app.Scheduler", "run", "(J)V", vec!["long".to_string()]),
            UnitHandle::method("app.Scheduler", "tick", "()V", Vec::new()),
        ],
    );
    let store = TypeHandle::new(
        "app.Store",
        vec![
            UnitHandle::method("app.Store", "flush", "()V", Vec::new()),
            UnitHandle::method("app.Store", "close", "()V", Vec::new()),
        ],
    );
    let main = TypeHandle::new(
        "app.Main",
        vec![UnitHandle::method(
            "app.Main",
            "main",
            "([Ljava/lang/String;)V",
            vec!["String[]".to_string()],
        )],
    );

    let mut types = HashMap::new();
    for handle in [&scheduler, &store, &main] {
        types.insert(handle.name().to_string(), handle.clone());
    }

    let mut intervals = HashMap::new();
    intervals.insert(
        "app.Scheduler".to_string(),
        vec![
            ("run".to_string(), "()V".to_string(), vec![10, 20]),
            ("run".to_string(), "(J)V".to_string(), vec![25, 31]),
            ("tick".to_string(), "()V".to_string(), vec![33, 40]),
        ],
    );
    intervals.insert(
        "app.Store".to_string(),
        vec![
            ("flush".to_string(), "()V".to_string(), vec![70, 82]),
            ("close".to_string(), "()V".to_string(), vec![88, 95]),
        ],
    );
    intervals.insert(
        "app.Main".to_string(),
        vec![("main".to_string(), "([Ljava/lang/String;)V".to_string(), vec![8, 16])],
    );

    SampleHost { types, intervals }
}

/// Degraded backend standing in for a host runtime: it reports a canned
/// basic walk plus the matching per-thread type context.
struct SampleBackend;

impl CaptureBackend for SampleBackend
{
    fn basic_frames_here(&self) -> Vec<RawFrame>
    {
        vec![
            RawFrame::new("extrace.Capture", "here", None, 1),
            RawFrame::new("app.Scheduler", "tick", Some("Scheduler.java".to_string()), 35),
            RawFrame::new("app.Main", "main", Some("Main.java".to_string()), 12),
        ]
    }

    fn type_context(&self) -> Vec<TypeHandle>
    {
        let host = sample_host();
        vec![
            TypeHandle::new("extrace.Context", Vec::new()),
            TypeHandle::new("extrace.Capture", Vec::new()),
            host.types["app.Scheduler"].clone(),
            host.types["app.Main"].clone(),
        ]
    }
}
