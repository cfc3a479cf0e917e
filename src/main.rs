use clap::Parser;
use sku_mapper::config::toml_config::TomlConfig;
use sku_mapper::core::{ImportReport, MappingEvent, Storage};
use sku_mapper::utils::error::ErrorSeverity;
use sku_mapper::utils::{logger, validation, validation::Validate};
use sku_mapper::{CliConfig, FileImportJob, ImportConfig, ImportEngine, LocalStorage, MappingRegistry};

const PREVIEW_ROWS: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting sku-mapper");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> sku_mapper::Result<()> {
    // 載入 TOML 配置，命令列旗標優先
    let mut toml_config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };

    if let Some(path) = &cli.output_path {
        toml_config.output.path = path.clone();
    }
    if let Some(format) = &cli.export_format {
        toml_config.output.format = format.clone();
    }

    let input = cli
        .input
        .clone()
        .or_else(|| toml_config.source_path().map(str::to_string));
    let input = validation::validate_required_field("input", &input)?.clone();

    let mut import_config = cli.apply_to(toml_config.import.clone())?;
    if cli.delimiter.is_none()
        && import_config.delimiter == ','
        && input.to_ascii_lowercase().ends_with(".tsv")
    {
        import_config.delimiter = '\t';
    }
    toml_config.import = import_config.clone();
    toml_config.validate()?;

    let export_format = toml_config.output.export_format()?;
    let existing = cli
        .existing
        .clone()
        .or_else(|| toml_config.existing_path().map(str::to_string));

    let mut registry = MappingRegistry::new();
    registry.subscribe(|event: &MappingEvent| {
        tracing::debug!("{}: {}", event.name(), event.payload().sku);
    });

    if let Some(existing) = existing {
        preload(&mut registry, &existing).await?;
    }

    let job = FileImportJob::new(LocalStorage::new("."), input.clone(), import_config);
    let engine = ImportEngine::new(job);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - registry will not be modified");
        let (parsed, batch) = engine.preview().await?;
        println!("📋 Preview of {}:", input);
        println!(
            "  Rows: {} total, {} accepted, {} skipped",
            parsed.total_rows, parsed.processed_rows, parsed.skipped_rows
        );
        for row in parsed.data.iter().take(PREVIEW_ROWS) {
            let fields: Vec<String> = row.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            println!("  {}", fields.join(", "));
        }
        for error in &parsed.errors {
            println!("  ⚠️ Row {}: {}", error.row, error.message);
        }
        for error in &batch.errors {
            println!("  ⚠️ {}", error);
        }
        println!("  Mappings ready to import: {}", batch.mappings.len());
        return Ok(());
    }

    let report = engine.run(&mut registry).await?;
    print_report(&input, &report);

    let storage = LocalStorage::new(toml_config.output.path.clone());
    let file_name = toml_config.output.file_name()?;
    let data = export_format.render(&registry.export_mappings())?;
    storage.write_file(&file_name, &data).await?;

    tracing::info!(
        "📁 Exported {} mappings to {}/{}",
        registry.len(),
        toml_config.output.path,
        file_name
    );
    println!(
        "📁 Exported {} mappings to {}/{}",
        registry.len(),
        toml_config.output.path,
        file_name
    );

    Ok(())
}

/// 先把既有的匯出檔載入註冊表，格式由副檔名判斷
async fn preload(registry: &mut MappingRegistry, path: &str) -> sku_mapper::Result<()> {
    tracing::info!("Loading existing mappings from {}", path);

    let job = FileImportJob::new(LocalStorage::new("."), path, ImportConfig::default());
    let report = ImportEngine::new(job).run(registry).await?;

    if !report.success() {
        tracing::warn!(
            "Existing mappings loaded with problems: {} parse errors, {} rejected",
            report.parse.errors.len(),
            report.summary.failed
        );
    }
    Ok(())
}

fn print_report(input: &str, report: &ImportReport) {
    let parse = &report.parse;
    let status = if report.success() { "✅" } else { "⚠️" };

    println!("{} Import of {} finished", status, input);
    println!(
        "  Rows: {} total, {} accepted, {} skipped ({} empty, {} invalid)",
        parse.total_rows,
        parse.processed_rows,
        parse.skipped_rows,
        parse.empty_rows(),
        parse.errors.len()
    );
    for error in &parse.errors {
        println!("  Row {}: {}", error.row, error.message);
    }
    for error in &report.conversion_errors {
        println!("  {}", error);
    }
    println!("  {}", report.summary.message());
    for error in &report.summary.errors {
        println!("  {}", error);
    }
}
