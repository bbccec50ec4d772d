//! CLI entrypoint for leadflow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use leadflow_application::{
    AssignLeadsError, AssignLeadsInput, AssignLeadsUseCase, AssignmentSettings, AuditLog,
    BuildReportUseCase, DealOptions, DistributeLeadsError, DistributeLeadsInput,
    DistributeLeadsUseCase, FindOrphansUseCase, NoAuditLog, NoProgress, ProgressNotifier,
    ProjectDealsInput, ProjectDealsUseCase, TableNames, TransferLeadsInput, TransferLeadsUseCase,
    UnassignLeadsUseCase,
};
use leadflow_domain::{OutputFormat, PercentageAllocationRequest};
use leadflow_infrastructure::{ConfigLoader, FileConfig, InMemoryRecordStore, JsonlAuditLog};
use leadflow_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting leadflow");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    check_config(&config)?;

    let Some(command) = cli.command else {
        bail!("No command given. Run `leadflow --help` for usage.");
    };

    ConsoleFormatter::set_color(config.output.color);
    let format = config.output.resolve_format(cli.output.map(Into::into));

    // === Dependency Injection ===
    let tables = config.to_table_names();
    let (settings, _) = config.to_settings();
    let data_file = cli
        .data
        .clone()
        .unwrap_or_else(|| config.store.data_file.clone());

    let store = Arc::new(
        InMemoryRecordStore::load_snapshot(&data_file, tables.all())
            .await
            .context("Failed to load data file")?,
    );

    let audit: Arc<dyn AuditLog> = match config
        .audit
        .resolve_path(&data_file)
        .and_then(JsonlAuditLog::open)
    {
        Some(log) => {
            info!("Audit log: {}", log.path().display());
            Arc::new(log)
        }
        None => Arc::new(NoAuditLog),
    };

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    let ctx = AppContext {
        store: Arc::clone(&store),
        tables,
        settings,
        audit,
        format,
    };

    let mutating = command.is_mutating();
    let result = run(command, &ctx, progress.as_ref()).await;

    // Allocations committed before a later failure must still reach disk
    let committed = match &result {
        Ok(_) => true,
        Err(e) => has_partial_effect(e),
    };
    if mutating && committed {
        store
            .save_snapshot(&data_file)
            .await
            .context("Failed to save data file")?;
    }

    println!("{}", result?);
    Ok(())
}

/// Everything a command needs, built once in `main`
struct AppContext {
    store: Arc<InMemoryRecordStore>,
    tables: TableNames,
    settings: AssignmentSettings,
    audit: Arc<dyn AuditLog>,
    format: OutputFormat,
}

async fn run(command: Command, ctx: &AppContext, progress: &dyn ProgressNotifier) -> Result<String> {
    let json = ctx.format == OutputFormat::Json;
    let store = Arc::clone(&ctx.store);
    let tables = ctx.tables.clone();

    match command {
        Command::Distribute {
            shares,
            course,
            create_deals,
            pipeline,
            seed,
        } => {
            let deals = resolve_deals(&ctx.settings, create_deals, pipeline.as_deref())?;

            let mut input = DistributeLeadsInput::new(
                PercentageAllocationRequest::new(shares),
                ctx.settings.assigned_by.clone(),
            );
            if let Some(course) = course {
                input = input.with_course(course);
            }
            if let Some(options) = deals {
                input = input.with_deals(options);
            }

            let mut use_case = DistributeLeadsUseCase::new(store, tables)
                .with_rounding(ctx.settings.rounding)
                .with_audit_log(Arc::clone(&ctx.audit));
            if let Some(seed) = seed {
                use_case = use_case.with_seed(seed);
            }

            let output = use_case.execute_with_progress(input, progress).await?;
            Ok(if json {
                ConsoleFormatter::format_distribution_json(&output)
            } else {
                ConsoleFormatter::format_distribution(&output)
            })
        }

        Command::Assign {
            agent,
            leads,
            create_deals,
            pipeline,
        } => {
            let deals = resolve_deals(&ctx.settings, create_deals, pipeline.as_deref())?;

            let mut input = AssignLeadsInput::new(agent, leads, ctx.settings.assigned_by.clone());
            if let Some(options) = deals {
                input = input.with_deals(options);
            }

            let output = AssignLeadsUseCase::new(store, tables)
                .with_audit_log(Arc::clone(&ctx.audit))
                .execute(input)
                .await?;
            Ok(if json {
                ConsoleFormatter::format_assignment_json(&output)
            } else {
                ConsoleFormatter::format_assignment(&output)
            })
        }

        Command::Transfer { from, to } => {
            let output = TransferLeadsUseCase::new(store, tables)
                .with_audit_log(Arc::clone(&ctx.audit))
                .execute(TransferLeadsInput {
                    from,
                    to,
                    assigned_by: ctx.settings.assigned_by.clone(),
                })
                .await?;
            Ok(if json {
                ConsoleFormatter::format_json(&output)
            } else {
                ConsoleFormatter::format_transfer(from, to, &output)
            })
        }

        Command::Unassign { leads } => {
            let released = UnassignLeadsUseCase::new(store, tables)
                .with_audit_log(Arc::clone(&ctx.audit))
                .execute(&leads)
                .await?;
            Ok(if json {
                ConsoleFormatter::format_json(&released_count(released))
            } else {
                ConsoleFormatter::format_unassigned(released)
            })
        }

        Command::Orphans => {
            let orphans = FindOrphansUseCase::new(store, tables).execute().await?;
            if !orphans.is_empty() {
                warn!("{} agents hold orphaned leads", orphans.len());
            }
            Ok(if json {
                ConsoleFormatter::format_json(&orphans)
            } else {
                ConsoleFormatter::format_orphans(&orphans)
            })
        }

        Command::Deals { pipeline, leads } => {
            let Some(pipeline_id) = pipeline.or_else(|| ctx.settings.pipeline_id.clone()) else {
                bail!("No pipeline given. Use --pipeline or set [distribution] pipeline_id.");
            };
            let projection = ProjectDealsUseCase::new(store, tables)
                .with_audit_log(Arc::clone(&ctx.audit))
                .execute(ProjectDealsInput {
                    pipeline_id,
                    lead_ids: leads,
                })
                .await?;
            Ok(if json {
                ConsoleFormatter::format_json(&projection)
            } else {
                ConsoleFormatter::format_deals(&projection)
            })
        }

        Command::Report { agent } => {
            let report = BuildReportUseCase::new(store, tables).execute(agent).await?;
            Ok(if json {
                ConsoleFormatter::format_json(&report)
            } else {
                ConsoleFormatter::format_report(&report)
            })
        }
    }
}

fn released_count(released: usize) -> std::collections::BTreeMap<&'static str, usize> {
    std::collections::BTreeMap::from([("released", released)])
}

/// Deal options for a run, or an error when deals are wanted but no pipeline is known
fn resolve_deals(
    settings: &AssignmentSettings,
    requested: bool,
    pipeline: Option<&str>,
) -> Result<Option<DealOptions>> {
    match settings.deal_pipeline(requested, pipeline) {
        Some(pipeline_id) => Ok(Some(DealOptions::new(pipeline_id))),
        None if requested || settings.create_deals => {
            bail!("Deal creation needs a pipeline. Use --pipeline or set [distribution] pipeline_id.")
        }
        None => Ok(None),
    }
}

fn has_partial_effect(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<DistributeLeadsError>() {
        return e.has_partial_effect();
    }
    matches!(
        err.downcast_ref::<AssignLeadsError>(),
        Some(AssignLeadsError::PartialFailure { .. })
    )
}

/// Print config issues; errors abort the run
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("config error: {}", issue.message);
        } else {
            eprintln!("config warning: {}", issue.message);
        }
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("Configuration has {} error(s)", errors);
    }
    Ok(())
}

/// Initialize logging based on verbosity level, optionally teeing to a file
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
