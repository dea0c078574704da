//! Export command handler

use crate::cli::error::CliError;
use crate::config::ExportConfig;
use crate::export::{ArchitectureCanvas, DiagramElement, ExportFacade, JsonExporter};
use crate::models::{ExportFormat, ExportOptions, Orientation, PageSize, Quality, Solution};
use anyhow::{Context, anyhow};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Arguments for the export command
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub format: ExportFormat,
    pub input: PathBuf,
    /// Solutions to export, in order; empty selects all
    pub solution_ids: Vec<String>,
    /// Solution whose diagram image formats capture
    pub diagram: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub force: bool,
    pub page_size: Option<PageSize>,
    pub orientation: Option<Orientation>,
    pub quality: Option<Quality>,
    pub no_details: bool,
    pub no_recommendations: bool,
    pub no_architecture: bool,
    pub no_cost_analysis: bool,
    pub config: Option<PathBuf>,
}

/// Parse solution records from file content
///
/// Accepts a JSON array of stored records, a previous JSON export document,
/// or a YAML list of stored records.
pub fn parse_solutions(content: &str) -> anyhow::Result<Vec<Solution>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let value: Value = serde_json::from_str(content).context("Input is not valid JSON")?;
        match value {
            Value::Object(ref map) if map.contains_key("solutions") => {
                let document = JsonExporter::read_document(content)
                    .context("Input is not a valid export document")?;
                Ok(document.into_solutions()?)
            }
            Value::Array(_) => {
                serde_json::from_value(value).context("Input is not a list of solution records")
            }
            _ => Err(anyhow!(
                "Expected a list of solutions or an export document"
            )),
        }
    } else {
        serde_yaml::from_str(content).context("Input is not a YAML list of solution records")
    }
}

/// Load solution records from a file
pub fn load_solutions(path: &Path) -> Result<Vec<Solution>, CliError> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    let solutions =
        parse_solutions(&content).map_err(|e| CliError::InvalidInput(format!("{:#}", e)))?;
    debug!("Loaded {} solution(s) from {}", solutions.len(), path.display());
    Ok(solutions)
}

/// Pick solutions by id, keeping the requested order
pub fn select_solutions(solutions: &[Solution], ids: &[String]) -> Result<Vec<Solution>, CliError> {
    if ids.is_empty() {
        return Ok(solutions.to_vec());
    }
    ids.iter()
        .map(|id| {
            solutions
                .iter()
                .find(|s| &s.id == id)
                .cloned()
                .ok_or_else(|| CliError::SolutionNotFound(id.clone()))
        })
        .collect()
}

/// Configuration file, env overrides and command-line flags, in that order
pub fn resolve_config(args: &ExportArgs) -> Result<ExportConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ExportConfig::load_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => ExportConfig::load(Path::new("."))?,
    };

    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
    if args.force {
        config.output.overwrite = true;
    }
    if let Some(page_size) = args.page_size {
        config.pdf.page_size = page_size;
    }
    if let Some(orientation) = args.orientation {
        config.pdf.orientation = orientation;
    }
    if let Some(quality) = args.quality {
        config.image.quality = quality;
    }
    if args.no_details {
        config.content.include_details = false;
    }
    if args.no_recommendations {
        config.content.include_recommendations = false;
    }
    if args.no_architecture {
        config.content.include_architecture = false;
    }
    if args.no_cost_analysis {
        config.content.include_cost_analysis = false;
    }
    Ok(config)
}

/// Diagram captured by image exports: `--diagram` or the first selection
fn resolve_diagram(
    all: &[Solution],
    selected: &[Solution],
    diagram_id: Option<&str>,
) -> Result<Option<ArchitectureCanvas>, CliError> {
    let source = match diagram_id {
        Some(id) => Some(
            all.iter()
                .find(|s| s.id == id)
                .ok_or_else(|| CliError::SolutionNotFound(id.to_string()))?,
        ),
        None => selected.first(),
    };
    Ok(source.and_then(ArchitectureCanvas::from_solution))
}

/// Handle the export command, returning the path written
pub fn handle_export(args: &ExportArgs) -> Result<PathBuf, CliError> {
    let config = resolve_config(args)?;
    let options: ExportOptions = config.export_options(args.format);

    let all = load_solutions(&args.input)?;
    let selected = select_solutions(&all, &args.solution_ids)?;

    let canvas = if args.format.is_image() {
        resolve_diagram(&all, &selected, args.diagram.as_deref())?
    } else {
        None
    };

    let facade = ExportFacade::new(config.delivery()).with_terraform(config.terraform_exporter());
    let result = facade.export(
        &selected,
        &options,
        canvas.as_ref().map(|c| c as &dyn DiagramElement),
    );

    match (result.success, result.filename) {
        (true, Some(filename)) => {
            let path = facade.delivery().path_for(&filename);
            info!("Wrote {}", path.display());
            println!("Exported {} to {}", args.format, path.display());
            Ok(path)
        }
        _ => Err(CliError::ExportFailed(
            result.error.unwrap_or_else(|| "unknown error".to_string()),
        )),
    }
}
