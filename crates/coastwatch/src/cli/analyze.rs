//! The `coastwatch analyze` command.
//!
//! Classifies one or more images and extracts their geotags, printing one
//! JSON document per image to stdout.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use coastwatch_core::pipeline::probe_dimensions;
use coastwatch_core::{
    extract_geo, ClassificationResult, ClipMatcher, Config, GeoCoordinate, ImageCheck,
    ImageSource, PollutionClassifier,
};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file(s) to analyze
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// One analysis report, printed as a JSON document.
#[derive(Debug, Serialize)]
struct AnalysisReport {
    file: PathBuf,
    classification: ClassificationResult,
    geotag: GeoCoordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<ImageCheck>,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    if !ClipMatcher::model_exists(&config.model, &config.model_dir()) {
        anyhow::bail!(
            "Model files not found in {:?}.\nRun `coastwatch models download` first.",
            config.model_dir()
        );
    }

    // Fatal on failure: classification must not run without the model.
    let classifier = PollutionClassifier::load(&config)?;

    for path in &args.images {
        let source = ImageSource::from(path.as_path());
        let check = std::fs::read(path)
            .ok()
            .and_then(|bytes| probe_dimensions(&bytes))
            .map(|(w, h)| ImageCheck::evaluate(w, h));

        let classification = classifier.classify(source.clone()).await;
        let geotag = extract_geo(&source);

        let report = AnalysisReport {
            file: path.clone(),
            classification,
            geotag,
            check,
        };

        let json = if args.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{json}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_without_check() {
        let report = AnalysisReport {
            file: PathBuf::from("beach.jpg"),
            classification: ClassificationResult::decode_failure(),
            geotag: GeoCoordinate::absent(),
            check: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"label\":\"other_solid_waste\""));
        assert!(json.contains("\"present\":false"));
        assert!(!json.contains("\"check\""));
    }

    #[test]
    fn test_report_includes_check_when_present() {
        let report = AnalysisReport {
            file: PathBuf::from("beach.jpg"),
            classification: ClassificationResult::enriched(coastwatch_core::Label::NoWaste, 0.9),
            geotag: GeoCoordinate::at(40.4461, -79.9822),
            check: Some(ImageCheck::evaluate(64, 64)),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"suspicious\":true"));
        assert!(json.contains("\"latitude\":40.4461"));
    }
}
