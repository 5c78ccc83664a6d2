use anonym_eval::cli::{Cli, Command, OutputFormat, PopulationArgs};
use anonym_eval::compare::ComparisonBattery;
use anonym_eval::config::{EvalConfig, SeedPolicy};
use anonym_eval::loader;
use anonym_eval::pipeline;
use anonym_eval::record::{MultivariateRecord, Origin};
use anonym_eval::setting::ParameterSetting;
use anonym_eval::writer;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber on stderr
///
/// `--debug` forces TRACE; otherwise `RUST_LOG` applies, falling back to info.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the config file (if any) with command-line overrides
fn build_config(args: &Cli) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EvalConfig::default(),
    };

    if let Some(k) = args.sample_size {
        config.sample_size = k;
    }
    if let Some(seed) = args.seed {
        config.seed = SeedPolicy::Fixed(seed);
    }
    if args.no_parallel {
        config.parallel = false;
    }
    if let Command::Compare { channels, .. } = &args.command {
        if !channels.is_empty() {
            config.channels = channels.clone();
        }
    }

    config.validate().context("Invalid configuration")?;

    // Resolve once so every stage of a run shares the logged seed
    let seed = config.seed.resolve();
    tracing::info!(seed, "reference sampling seed");
    config.seed = SeedPolicy::Fixed(seed);

    Ok(config)
}

struct Populations {
    real: Vec<MultivariateRecord>,
    anonymized: Vec<MultivariateRecord>,
}

fn load_populations(args: &PopulationArgs) -> Result<Populations> {
    let real = loader::load_population(&args.real, Origin::Real)
        .with_context(|| format!("Failed to load real records from {}", args.real.display()))?;
    let anonymized = loader::load_population(&args.anonym, Origin::Anonymized).with_context(|| {
        format!(
            "Failed to load anonymized records from {}",
            args.anonym.display()
        )
    })?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;

    Ok(Populations { real, anonymized })
}

fn run_dissim(
    populations: &Populations,
    config: &EvalConfig,
    out: &Path,
    setting: Option<&ParameterSetting>,
) -> Result<()> {
    let report = pipeline::score_population(&populations.real, &populations.anonymized, config)
        .context("Dissimilarity scoring failed")?;

    let file_name = match setting {
        Some(setting) => writer::dissimilarity_file_name(setting),
        None => "distri_dissim_norm_meth1.csv".to_string(),
    };
    let path = out.join(file_name);
    writer::write_dissimilarities(&path, &report.dissimilarities)?;

    print!("{}", report.to_report_string());
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_describe(
    populations: &Populations,
    config: &EvalConfig,
    out: &Path,
    setting: &ParameterSetting,
) -> Result<()> {
    let table = pipeline::describe_populations(&populations.real, &populations.anonymized, config)
        .context("Summary metric extraction failed")?;

    for (channel, metric, sample) in table.iter() {
        let path = out.join(writer::metric_sample_file_name(channel, metric, setting));
        writer::write_metric_sample(&path, metric, sample)?;
    }

    println!("Wrote {} summary metric files to {}", table.len(), out.display());
    Ok(())
}

fn run_compare(
    populations: &Populations,
    config: &EvalConfig,
    out: &Path,
    setting: &ParameterSetting,
    format: OutputFormat,
) -> Result<ComparisonBattery> {
    let battery = pipeline::compare_populations(
        &populations.real,
        &populations.anonymized,
        setting,
        config,
    )
    .context("Distribution comparison failed")?;

    match format {
        OutputFormat::Text => print!("{}", battery.to_report_string()),
        OutputFormat::Json => println!("{}", battery.to_json()?),
        OutputFormat::Csv => {
            let written = writer::write_battery(out, &battery)?;
            println!("Wrote {} comparison files to {}", written.len(), out.display());
        }
    }

    Ok(battery)
}

/// Fail the process once every tuple has been reported
fn check_battery(battery: &ComparisonBattery) -> Result<()> {
    let failed = battery.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} comparisons failed for {}",
            failed,
            battery.len(),
            battery.setting
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = build_config(&args)?;
    let populations = load_populations(args.command.populations())?;
    let out = &args.command.populations().out;

    match &args.command {
        Command::Dissim { prop, perturb, .. } => {
            let setting = match (prop, perturb) {
                (Some(p), Some(q)) => Some(ParameterSetting::new(p, q)),
                _ => None,
            };
            run_dissim(&populations, &config, out, setting.as_ref())?;
        }
        Command::Describe { setting, .. } => {
            run_describe(&populations, &config, out, &setting.to_setting())?;
        }
        Command::Compare {
            setting, format, ..
        } => {
            let battery = run_compare(&populations, &config, out, &setting.to_setting(), *format)?;
            check_battery(&battery)?;
        }
        Command::Run { setting, .. } => {
            let setting = setting.to_setting();
            run_dissim(&populations, &config, out, Some(&setting))?;
            run_describe(&populations, &config, out, &setting)?;
            let battery = run_compare(&populations, &config, out, &setting, OutputFormat::Csv)?;
            writer::write_battery_json(&out.join(writer::battery_json_file_name(&setting)), &battery)?;
            print!("{}", battery.to_report_string());
            check_battery(&battery)?;
        }
    }

    Ok(())
}
