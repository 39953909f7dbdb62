// starload-core/src/application/pipeline.rs

use chrono::{NaiveDate, NaiveDateTime};
use futures::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::StarloadError;
use crate::ports::clock::Clock;
use crate::ports::connector::Connector;

// Application Services
use crate::application::extract::SourceExtractor;
use crate::application::fact_loader::{self, FactLoad};
use crate::application::status::{WarehouseStatus, warehouse_status};
use crate::application::{bootstrap, freshness, run_log, writer};

// Domain
use crate::domain::dimension::DimensionKind;
use crate::domain::fact::{FactDimensions, FactKind};
use crate::domain::project::{EtlSettings, FactPolicy, ProjectConfig, ValidationPolicy};
use crate::domain::run_log::{RunLogEntry, RunStatus, process};
use crate::domain::table::Table;
use crate::domain::validation::{ValidationReport, validate};
use crate::domain::warehouse::{TableSchema, catalog};
use crate::domain::watermark::Freshness;

// Infrastructure
use crate::infrastructure::fs::write_json;

pub const RUN_RESULTS_FILE: &str = "run_results.json";

/// Handles the refresh works against. Nothing is read from globals.
#[derive(Clone, Copy)]
pub struct RefreshContext<'a> {
    pub source: &'a dyn Connector,
    pub warehouse: &'a dyn Connector,
    pub clock: &'a dyn Clock,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionLoad {
    pub table: &'static str,
    pub extracted: usize,
    pub written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactOutcome {
    pub process: &'static str,
    pub status: RunStatus,
    /// `None` when validation failed under the `skip` policy.
    pub load: Option<FactLoad>,
    pub validation: ValidationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub project: String,
    pub status: RunStatus,
    pub started_at: NaiveDateTime,
    pub duration_secs: f64,
    pub freshness: Freshness,
    pub dimensions_loaded: bool,
    pub dimensions: Vec<DimensionLoad>,
    pub dimension_validation: Vec<ValidationReport>,
    pub facts: Vec<FactOutcome>,
    pub status_before: WarehouseStatus,
    pub status_after: WarehouseStatus,
}

impl RunReport {
    pub fn dimension_rows_written(&self) -> usize {
        self.dimensions.iter().map(|d| d.written).sum()
    }

    pub fn fact_rows_written(&self) -> usize {
        self.facts
            .iter()
            .filter_map(|f| f.load.as_ref())
            .map(|l| l.written)
            .sum()
    }
}

/// One refresh cycle: freshness gate, dimensions, facts, run log.
///
/// Stages run in order and the first hard failure stops the run; what earlier
/// stages committed stays committed. The report is saved under the project's
/// target path.
#[instrument(skip_all, fields(project = %config.name))]
pub async fn run_refresh(
    ctx: RefreshContext<'_>,
    config: &ProjectConfig,
    project_dir: &Path,
) -> Result<RunReport, StarloadError> {
    let settings = &config.etl;
    settings.validate()?;

    let timer = Instant::now();
    let started_at = ctx.clock.now();
    let today = started_at.date();

    // 1. SETUP
    let target_dir = project_dir.join(&config.target_path);
    if !target_dir.exists() {
        fs::create_dir_all(&target_dir)?;
    }

    if bootstrap::needs_bootstrap(ctx.warehouse).await? {
        info!("Empty warehouse, creating declared tables");
        bootstrap::bootstrap_warehouse(ctx.warehouse).await?;
    }

    // 2. FRESHNESS GATE
    let freshness =
        match freshness::check_freshness(ctx.source, ctx.warehouse, settings.on_freshness_error)
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => return Err(fail(&ctx, process::ETL_RUN, "freshness", e).await),
        };

    // A full reload runs even when nothing changed at the source
    if !freshness.has_new_data() && settings.fact_policy == FactPolicy::Incremental {
        info!(?freshness, "Warehouse is up to date, nothing to load");
        run_log::record(
            ctx.warehouse,
            RunLogEntry::new(process::ETL_RUN, RunStatus::NoNewData, ctx.clock.now())
                .details("source has no orders newer than the warehouse"),
        )
        .await;

        let status = warehouse_status(ctx.warehouse).await?;
        let report = RunReport {
            project: config.name.clone(),
            status: RunStatus::NoNewData,
            started_at,
            duration_secs: timer.elapsed().as_secs_f64(),
            freshness,
            dimensions_loaded: false,
            dimensions: Vec::new(),
            dimension_validation: Vec::new(),
            facts: Vec::new(),
            status_before: status.clone(),
            status_after: status,
        };
        write_json(&target_dir.join(RUN_RESULTS_FILE), &report)?;
        return Ok(report);
    }

    let status_before = warehouse_status(ctx.warehouse).await?;

    // 3. DIMENSIONS
    let customers = status_before
        .rows(catalog::DIM_CUSTOMER.name)
        .unwrap_or(0);
    let dimensions_loaded = settings.load_dimensions || customers == 0;

    let (dimensions, dimension_validation) = if dimensions_loaded {
        match load_dimensions(&ctx, settings, today).await {
            Ok((loads, reports)) => {
                let written: usize = loads.iter().map(|l| l.written).sum();
                run_log::record(
                    ctx.warehouse,
                    RunLogEntry::new(process::DIMENSIONS, RunStatus::Success, ctx.clock.now())
                        .records(written)
                        .details(format!(
                            "{} dimensions written ({:?})",
                            loads.len(),
                            settings.dimension_policy
                        )),
                )
                .await;
                (loads, reports)
            }
            Err(e) => return Err(fail(&ctx, process::DIMENSIONS, "dimensions", e).await),
        }
    } else {
        info!("Dimension reload disabled");
        run_log::record(
            ctx.warehouse,
            RunLogEntry::new(process::DIMENSIONS, RunStatus::Skipped, ctx.clock.now())
                .details("load_dimensions is off"),
        )
        .await;
        (Vec::new(), Vec::new())
    };

    // 4. FACTS (dimensions are committed and queryable from here on)
    let dims = match fact_loader::load_fact_dimensions(ctx.warehouse).await {
        Ok(dims) => dims,
        Err(e) => return Err(fail(&ctx, process::ETL_RUN, "dimension lookups", e).await),
    };

    let mut facts = Vec::new();
    for kind in FactKind::ALL {
        match load_fact_stage(&ctx, settings, &dims, kind, today).await {
            Ok(outcome) => {
                let entry = RunLogEntry::new(kind.process_name(), outcome.status, ctx.clock.now());
                let entry = match &outcome.load {
                    Some(load) => entry.records(load.written).details(format!(
                        "built {}, written {} ({:?})",
                        load.built, load.written, load.policy
                    )),
                    None => entry.details(format!(
                        "validation failed: {} violation(s)",
                        outcome.validation.violations.len()
                    )),
                };
                run_log::record(ctx.warehouse, entry).await;
                facts.push(outcome);
            }
            Err(e) => return Err(fail(&ctx, kind.process_name(), kind.process_name(), e).await),
        }
    }

    // 5. FINALIZE
    let status_after = warehouse_status(ctx.warehouse).await?;
    let total = usize::try_from(status_after.total()).unwrap_or(usize::MAX);

    let mut report = RunReport {
        project: config.name.clone(),
        status: RunStatus::Success,
        started_at,
        duration_secs: 0.0,
        freshness,
        dimensions_loaded,
        dimensions,
        dimension_validation,
        facts,
        status_before,
        status_after,
    };

    run_log::record(
        ctx.warehouse,
        RunLogEntry::new(process::ETL_RUN, RunStatus::Success, ctx.clock.now())
            .records(total)
            .details(format!(
                "{} dimension rows, {} fact rows written",
                report.dimension_rows_written(),
                report.fact_rows_written()
            )),
    )
    .await;

    if ctx.warehouse.engine_name() == "duckdb"
        && let Err(e) = ctx.warehouse.execute("CHECKPOINT").await
    {
        debug!(error = %e, "Checkpoint skipped");
    }

    report.duration_secs = timer.elapsed().as_secs_f64();
    info!(
        duration = report.duration_secs,
        rows = total,
        "Refresh complete"
    );
    write_json(&target_dir.join(RUN_RESULTS_FILE), &report)?;

    Ok(report)
}

// --- STAGES ---

/// Extract + build fan out; writes then run one dimension at a time.
async fn load_dimensions(
    ctx: &RefreshContext<'_>,
    settings: &EtlSettings,
    today: NaiveDate,
) -> Result<(Vec<DimensionLoad>, Vec<ValidationReport>), StarloadError> {
    let extractor = SourceExtractor::new(ctx.source);
    let extractor = &extractor;

    let tasks = DimensionKind::ALL.into_iter().map(|kind| async move {
        let result = async {
            let raw = extractor.dimension(kind).await?;
            let batch = kind.build(&raw, today)?;
            Ok::<_, StarloadError>((raw.len(), batch))
        }
        .await;
        (kind, result)
    });

    let results: Vec<_> = futures::stream::iter(tasks)
        .buffer_unordered(settings.max_concurrency)
        .collect()
        .await;

    let mut batches: HashMap<DimensionKind, (usize, Table)> = HashMap::new();
    for (kind, result) in results {
        let built = result.map_err(|e| StarloadError::in_stage(kind.schema().name, e))?;
        debug!(table = kind.schema().name, rows = built.1.len(), "Dimension built");
        batches.insert(kind, built);
    }

    let mut loads = Vec::new();
    for kind in DimensionKind::ALL {
        let Some((extracted, batch)) = batches.remove(&kind) else {
            continue;
        };
        let schema = kind.schema();
        let written =
            writer::write_dimension(ctx.warehouse, schema, &batch, settings.dimension_policy)
                .await
                .map_err(|e| StarloadError::in_stage(schema.name, e))?;
        info!(table = schema.name, written, "Dimension loaded");
        loads.push(DimensionLoad {
            table: schema.name,
            extracted,
            written,
        });
    }

    let mut reports = Vec::new();
    for kind in DimensionKind::ALL {
        if let Some(report) = validate_persisted(ctx.warehouse, kind.schema()).await? {
            reports.push(report);
        }
    }

    Ok((loads, reports))
}

/// Runs the validator over the identifier columns of a persisted table.
async fn validate_persisted(
    warehouse: &dyn Connector,
    schema: &TableSchema,
) -> Result<Option<ValidationReport>, StarloadError> {
    if !warehouse.table_exists(schema.name).await? {
        return Ok(None);
    }
    let columns: Vec<&str> = schema.identifier_columns().map(|c| c.name).collect();
    let persisted = warehouse
        .query(
            &format!("SELECT {} FROM {}", columns.join(", "), schema.name),
            &[],
        )
        .await?;

    let report = validate(schema, &persisted);
    for violation in &report.violations {
        warn!(table = schema.name, "{}", violation);
    }
    Ok(Some(report))
}

async fn load_fact_stage(
    ctx: &RefreshContext<'_>,
    settings: &EtlSettings,
    dims: &FactDimensions,
    kind: FactKind,
    today: NaiveDate,
) -> Result<FactOutcome, StarloadError> {
    let schema = kind.schema();
    let lines = SourceExtractor::new(ctx.source)
        .fact_lines(kind, settings.start_date)
        .await?;
    let batch = kind.build(&lines, dims, today)?;

    let validation = validate(schema, &batch);
    if !validation.passed() {
        for violation in &validation.violations {
            warn!(table = schema.name, "{}", violation);
        }
        if settings.on_validation_failure == ValidationPolicy::Skip {
            warn!(table = schema.name, "Validation failed, load skipped");
            return Ok(FactOutcome {
                process: kind.process_name(),
                status: RunStatus::Skipped,
                load: None,
                validation,
            });
        }
    }

    let load = fact_loader::load_fact(ctx.warehouse, schema, batch, settings.fact_policy).await?;
    info!(
        table = schema.name,
        built = load.built,
        written = load.written,
        "Fact loaded"
    );

    let status = if load.written == 0 && load.policy == FactPolicy::Incremental {
        RunStatus::NoNewData
    } else {
        RunStatus::Success
    };

    Ok(FactOutcome {
        process: kind.process_name(),
        status,
        load: Some(load),
        validation,
    })
}

// --- HELPER FUNCTIONS ---

/// Logs a failed stage (and the overall run) before handing the error back.
async fn fail(
    ctx: &RefreshContext<'_>,
    process_name: &str,
    stage: &str,
    error: StarloadError,
) -> StarloadError {
    let now = ctx.clock.now();
    let details = error.to_string();

    run_log::record(
        ctx.warehouse,
        RunLogEntry::new(process_name, RunStatus::Failed, now).details(details.clone()),
    )
    .await;
    if process_name != process::ETL_RUN {
        run_log::record(
            ctx.warehouse,
            RunLogEntry::new(process::ETL_RUN, RunStatus::Failed, now)
                .details(format!("stage '{}' failed", stage)),
        )
        .await;
    }

    StarloadError::in_stage(stage, error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value::Value;
    use crate::infrastructure::adapters::duckdb::DuckDBConnector;
    use crate::ports::clock::FixedClock;
    use crate::ports::connector::{ColumnSchema, SqlStatement};
    use anyhow::Result;
    use async_trait::async_trait;
    use tempfile::tempdir;

    // --- MOCK CONNECTOR ---
    // A source that has nothing: every query fails.
    struct UnreachableSource;

    #[async_trait]
    impl Connector for UnreachableSource {
        async fn execute(&self, _query: &str) -> Result<(), StarloadError> {
            Err(StarloadError::InternalError("unreachable".to_string()))
        }
        async fn query(&self, _query: &str, _params: &[Value]) -> Result<Table, StarloadError> {
            Err(StarloadError::InternalError("unreachable".to_string()))
        }
        async fn table_exists(&self, _table_name: &str) -> Result<bool, StarloadError> {
            Ok(false)
        }
        async fn fetch_columns(&self, _table_name: &str) -> Result<Vec<ColumnSchema>, StarloadError> {
            Ok(vec![])
        }
        async fn execute_atomic(&self, _statements: &[SqlStatement]) -> Result<usize, StarloadError> {
            Ok(0)
        }
        fn engine_name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_extract_failure_aborts_and_is_logged() -> Result<()> {
        let dir = tempdir()?;
        let warehouse = DuckDBConnector::new(":memory:")?;
        let clock = FixedClock::on(2024, 1, 15).unwrap();
        let ctx = RefreshContext {
            source: &UnreachableSource,
            warehouse: &warehouse,
            clock: &clock,
        };
        let config = ProjectConfig::named("broken");

        let result = run_refresh(ctx, &config, dir.path()).await;
        assert!(matches!(result, Err(StarloadError::Stage { ref stage, .. }) if stage == "dimensions"));

        let log = run_log::recent(&warehouse, 10).await?;
        let statuses: Vec<(String, String)> = log
            .records()
            .map(|r| (r.text("process_name"), r.text("status")))
            .collect();
        assert!(statuses.contains(&("dimensions".to_string(), "failed".to_string())));
        assert!(statuses.contains(&("etl_run".to_string(), "failed".to_string())));

        // No report for a failed run
        assert!(!dir.path().join("target").join(RUN_RESULTS_FILE).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_strict_freshness_stops_before_loading() -> Result<()> {
        let dir = tempdir()?;
        let warehouse = DuckDBConnector::new(":memory:")?;
        let clock = FixedClock::on(2024, 1, 15).unwrap();
        let ctx = RefreshContext {
            source: &UnreachableSource,
            warehouse: &warehouse,
            clock: &clock,
        };
        bootstrap::bootstrap_warehouse(&warehouse).await?;
        warehouse
            .execute(
                "INSERT INTO fact_reseller_sales (sales_order_id, sales_order_detail_id, order_date)
                 VALUES (43659, 1, DATE '2013-06-30')",
            )
            .await?;
        let mut config = ProjectConfig::named("strict");
        config.etl.on_freshness_error = crate::domain::project::FreshnessErrorPolicy::Fail;

        let result = run_refresh(ctx, &config, dir.path()).await;
        assert!(matches!(result, Err(StarloadError::Stage { ref stage, .. }) if stage == "freshness"));

        // Only the seeded line: no dimension or fact was touched
        let status = warehouse_status(&warehouse).await?;
        assert_eq!(status.total(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected_up_front() -> Result<()> {
        let dir = tempdir()?;
        let warehouse = DuckDBConnector::new(":memory:")?;
        let clock = FixedClock::on(2024, 1, 15).unwrap();
        let mut config = ProjectConfig::named("bad");
        config.etl.max_concurrency = 0;

        let result = run_refresh(
            RefreshContext {
                source: &UnreachableSource,
                warehouse: &warehouse,
                clock: &clock,
            },
            &config,
            dir.path(),
        )
        .await;
        assert!(matches!(result, Err(StarloadError::Domain(_))));
        Ok(())
    }
}
