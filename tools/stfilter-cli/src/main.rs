//! stfilter CLI: spatiotemporal motion energy from a video clip.
//!
//! Usage:
//!   stfilter [INPUT]    Write gabor-energy-x-t.avi and 9-Tap-x-t.avi
//!
//! INPUT defaults to the configured `default_input` (pen.mp4). Other
//! settings come from `$XDG_CONFIG_HOME/stfilter/config.json`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stfilter_common::config::AppConfig;
use stfilter_common::error::{StfilterError, StfilterResult};
use stfilter_core::{Axis, Pipeline, PipelineConfig};
use stfilter_video::{FfmpegSink, FfmpegSource};

#[derive(Parser)]
#[command(
    name = "stfilter",
    about = "Spatiotemporal Gabor energy and 9-tap motion filtering",
    version,
    author
)]
struct Cli {
    /// Input video (defaults to the configured default input)
    input: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = load_config(AppConfig::load());
    stfilter_common::logging::init_logging(&config.logging);
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "Using default configuration");
    }

    let input = cli.input.unwrap_or_else(|| config.default_input.clone());
    let pipeline_config = pipeline_config(&config)?;

    let mut source = FfmpegSource::open(&input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let mut sink = FfmpegSink::new(&config.output.dir, config.output.fps);

    let pipeline = Pipeline::new(pipeline_config);
    let summary = pipeline.run(&mut source, &mut sink)?;

    let total_ms: f64 = summary.stages.iter().map(|s| s.elapsed_ms).sum();
    tracing::info!(
        frames = summary.frames,
        width = summary.width,
        height = summary.height,
        total_ms,
        "Done"
    );

    if let Some(report) = &config.output.report {
        std::fs::write(report, summary.to_json()?)
            .with_context(|| format!("Failed to write run report {}", report.display()))?;
        tracing::info!(report = %report.display(), "Wrote run summary");
    }

    Ok(())
}

/// Fall back to defaults on a config failure, keeping the error so it can
/// be logged once the subscriber is installed.
fn load_config(loaded: StfilterResult<AppConfig>) -> (AppConfig, Option<StfilterError>) {
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn pipeline_config(config: &AppConfig) -> anyhow::Result<PipelineConfig> {
    let gabor_axis: Axis = config
        .pipeline
        .gabor_axis
        .parse()
        .context("Invalid pipeline.gabor_axis")?;
    let tap_axis: Axis = config
        .pipeline
        .tap_axis
        .parse()
        .context("Invalid pipeline.tap_axis")?;

    Ok(PipelineConfig {
        gabor_axis,
        tap_axis,
        gabor_output: config.output.gabor_name.clone(),
        tap_output: config.output.tap_name.clone(),
        color_output: config.output.color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn input_is_optional() {
        let cli = Cli::try_parse_from(["stfilter"]).unwrap();
        assert!(cli.input.is_none());
        let cli = Cli::try_parse_from(["stfilter", "clip.mp4"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("clip.mp4")));
    }

    #[test]
    fn default_config_maps_to_default_pipeline() {
        let config = pipeline_config(&AppConfig::default()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn config_failure_falls_back_and_is_kept_for_logging() {
        let (config, err) = load_config(Err(StfilterError::config("Failed to parse config")));
        assert_eq!(config.output.fps, AppConfig::default().output.fps);
        assert!(err.unwrap().to_string().contains("Failed to parse config"));

        let mut custom = AppConfig::default();
        custom.output.fps = 12;
        let (config, err) = load_config(Ok(custom));
        assert_eq!(config.output.fps, 12);
        assert!(err.is_none());
    }

    #[test]
    fn bad_axis_is_rejected() {
        let mut config = AppConfig::default();
        config.pipeline.gabor_axis = "t".to_string();
        assert!(pipeline_config(&config).is_err());
    }
}
