use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_stats::builder::AnnotationBuilder;
use survey_stats::*;

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

mod config_reader;
mod io_annotations;
mod io_common;
mod io_output;
mod io_tsv;

use crate::survey::config_reader::*;
use crate::survey::io_common::{ensure_dir, output_root, resolve_path, simplify_file_name};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("Missing input file {path}"))]
    MissingInput { path: String },
    #[snafu(display("Error reading file {path}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error writing {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error flushing {path}"))]
    Flushing {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading configuration {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Could not create the output directory {path}"))]
    CreatingOutputDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid content in {path}"))]
    InputAnalysis { source: SurveyErrors, path: String },
    #[snafu(display("Analysis failed"))]
    Analysis { source: SurveyErrors },
    #[snafu(display(
        "Unsupported configuration version {version} (only version {expected} is supported)"
    ))]
    UnsupportedConfigVersion { version: u32, expected: u32 },
    #[snafu(display("Column {column:?} not found in {path}"))]
    UnknownColumn { column: String, path: String },
    #[snafu(display("Could not parse label {value:?} in line {lineno} of {path}"))]
    LabelParse {
        value: String,
        lineno: usize,
        path: String,
    },
    #[snafu(display("Difference detected between {path} and its reference"))]
    ReferenceMismatch { path: String },
    #[snafu(display("Could not find the parent directory of {path}"))]
    MissingParentDir { path: String },
}

pub type SurveyResult<T> = Result<T, SurveyError>;
pub type BSurveyResult<T> = Result<T, Box<SurveyError>>;

fn parse_selection(variable: &str, statistic: &str) -> SurveyResult<(SurveyVariable, Statistic)> {
    let v = variable.parse::<SurveyVariable>().context(AnalysisSnafu {})?;
    let s = statistic.parse::<Statistic>().context(AnalysisSnafu {})?;
    Ok((v, s))
}

/// Writes the tables of the non system-specific and of the system-specific
/// questions.
pub fn run_statistics(
    filename: &str,
    save: &str,
    variable: &str,
    statistic: &str,
    reference: Option<&str>,
) -> BSurveyResult<()> {
    let (variable, statistic) = parse_selection(variable, statistic)?;
    let table = io_tsv::read_survey(filename)?;

    let nonspecific = nonspecific_table(&table, variable, statistic).context(AnalysisSnafu {})?;
    let specific = specific_table(&table, variable, statistic).context(AnalysisSnafu {})?;

    let root = output_root(save)?;
    let nonspecific_p = root.join(format!("{}_nonspecific_{}.csv", variable, statistic));
    io_output::write_aggregate_table(&nonspecific_p, &nonspecific)?;
    let specific_p = root.join(format!("{}_specific_{}.csv", variable, statistic));
    io_output::write_aggregate_table(&specific_p, &specific)?;

    check_references(reference, &[nonspecific_p, specific_p])
}

/// Writes the table of the complexity ranking.
pub fn run_complexity(
    filename: &str,
    save: &str,
    variable: &str,
    statistic: &str,
    reference: Option<&str>,
) -> BSurveyResult<()> {
    let (variable, statistic) = parse_selection(variable, statistic)?;
    let table = io_tsv::read_survey(filename)?;

    let ranking = ranking_table(&table, variable, statistic).context(AnalysisSnafu {})?;

    let root = output_root(save)?;
    let p = root.join(format!("complexity_{}_{}.csv", variable, statistic));
    io_output::write_aggregate_table(&p, &ranking)?;

    check_references(reference, &[p])
}

/// Merges the annotations listed in the configuration and writes the
/// majority vote of each item and the agreement of the annotators.
pub fn run_majority(
    config_path: &str,
    save: Option<&str>,
    reference: Option<&str>,
) -> BSurveyResult<()> {
    let config = read_annotation_config(config_path)?;
    info!("config: {:?}", config);
    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;

    let mut builder = AnnotationBuilder::new();
    for source in config.annotators.iter() {
        let p = resolve_path(root_p, &source.file_path);
        let lines = io_annotations::read_annotator_lines(&p)?;
        let kept = builder
            .annotator(&source.name, &lines)
            .context(AnalysisSnafu {})?;
        info!(
            "Annotator {}: {} labelled responses in {}",
            source.name,
            kept,
            simplify_file_name(&p)
        );
        if kept < lines.len() {
            debug!(
                "Annotator {}: skipped {} lines without a label",
                source.name,
                lines.len() - kept
            );
        }
    }
    let overrides = config.manual_overrides();
    if !overrides.is_empty() {
        info!("Applying {} manual overrides", overrides.len());
    }
    builder.overrides(&overrides).context(AnalysisSnafu {})?;
    let annotations = builder.build().context(AnalysisSnafu {})?;

    let votes = annotations.majority_votes().context(AnalysisSnafu {})?;
    let kappa = annotations
        .fleiss_kappa(config.categories.as_deref())
        .context(AnalysisSnafu {})?;
    info!("fleiss kappa: {}", kappa);

    // Only the path given on the command line loses its extension.
    let root: PathBuf = match (save, config.output_settings.output_directory.as_deref()) {
        (Some(s), _) => output_root(s)?,
        (None, Some(d)) => ensure_dir(&resolve_path(root_p, d))?,
        (None, None) => ensure_dir(root_p)?,
    };
    let majority_p = root.join(io_output::MAJORITY_FILE);
    io_output::write_majority_votes(&majority_p, &annotations, &votes)?;
    let agreement_p = root.join(io_output::AGREEMENT_FILE);
    io_output::write_agreement(&agreement_p, &annotations, kappa)?;

    check_references(reference, &[majority_p, agreement_p])
}

/// Writes the agreement of the annotators of a merged (and possibly
/// corrected) table.
pub fn run_agreement(
    input: &str,
    annotators: Option<&[String]>,
    save: &str,
    reference: Option<&str>,
) -> BSurveyResult<()> {
    let annotations = io_annotations::read_merged_table(input, annotators)?;
    let kappa = annotations.fleiss_kappa(None).context(AnalysisSnafu {})?;
    info!("fleiss kappa: {}", kappa);

    let root = output_root(save)?;
    let agreement_p = root.join(io_output::AGREEMENT_FILE);
    io_output::write_agreement(&agreement_p, &annotations, kappa)?;

    check_references(reference, &[agreement_p])
}

/// Compares each output with the file of the same name in the reference
/// directory, if provided.
fn check_references(reference: Option<&str>, written: &[PathBuf]) -> BSurveyResult<()> {
    if let Some(ref_dir) = reference {
        for p in written.iter() {
            let ref_p = Path::new(ref_dir).join(simplify_file_name(p));
            let ref_s = ref_p.display().to_string();
            let expected =
                fs::read_to_string(&ref_p).context(OpeningInputSnafu { path: ref_s.clone() })?;
            let produced = fs::read_to_string(p).context(OpeningInputSnafu {
                path: p.display().to_string(),
            })?;
            if expected != produced {
                warn!("Found differences with the reference file {}", ref_s);
                print_diff(expected.as_str(), produced.as_str(), "\n");
                return Err(Box::new(SurveyError::ReferenceMismatch {
                    path: p.display().to_string(),
                }));
            }
            info!("{} matches the reference", simplify_file_name(p));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SYSTEMS: [&str; 6] = [
        "mlt",
        "cg",
        "spamfilter",
        "searchengines",
        "weatherforecasts",
        "chatbots",
    ];
    const CANONICAL: [&str; 6] = [
        "machinetranslation",
        "games",
        "spamfilter",
        "searchengines",
        "weatherforecasts",
        "chatbots",
    ];

    /// A small export: 4 respondents, with the legacy column names, the
    /// platform markers and a column with a missing value.
    fn write_survey(dir: &Path) -> String {
        let mut header: Vec<String> = vec!["INPUT:Input".to_string(), "OUTPUT:orderQ".to_string()];
        for s in SYSTEMS.iter() {
            header.push(format!("OUTPUT:{}familiarity", s));
        }
        for g in 1..=4 {
            for s in CANONICAL.iter() {
                header.push(format!("OUTPUT:nonspecificQ{}{}", g, s));
            }
        }
        header.push("OUTPUT:specificQ1chatbots".to_string());
        header.push("OUTPUT:specificQ1games".to_string());
        header.push("OUTPUT:comment".to_string());

        let data = [
            ("[1,2,3,4,5,6]", "1", "2", "ok"),
            ("[6,5,4,3,2,1]", "1", "4", ""),
            ("[2,1,3,4,5,6]", "3", "5", "fine"),
            ("[1,2,3,4,6,5]", "5", "1", "good"),
        ];
        let mut lines: Vec<String> = vec![header.join("\t")];
        for (idx, (ranking, fam, metric, comment)) in data.iter().enumerate() {
            let mut row: Vec<String> = vec![format!("task{}", idx), ranking.to_string()];
            row.extend((0..6).map(|_| fam.to_string()));
            row.extend((0..26).map(|_| metric.to_string()));
            row.push(comment.to_string());
            lines.push(row.join("\t"));
        }
        let p = dir.join("results.tsv");
        fs::write(&p, lines.join("\n") + "\n").unwrap();
        p.display().to_string()
    }

    fn read_lines(p: &Path) -> Vec<String> {
        fs::read_to_string(p)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn complexity_mean() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = write_survey(&dir);
        let out = dir.join("out");
        run_complexity(&input, out.to_str().unwrap(), "familiarity", "mean", None).unwrap();
        let lines = read_lines(&out.join("complexity_familiarity_mean.csv"));
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "entity,1,3,5");
        assert_eq!(lines[1], "machinetranslation,3.500,2.000,1.000");
        assert_eq!(lines[2], "games,3.500,1.000,2.000");
        assert_eq!(lines[6], "chatbots,3.500,6.000,5.000");
    }

    #[test]
    fn complexity_std_keeps_empty_cells() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = write_survey(&dir);
        let out = dir.join("out");
        run_complexity(&input, out.to_str().unwrap(), "familiarity", "std", None).unwrap();
        let lines = read_lines(&out.join("complexity_familiarity_std.csv"));
        assert_eq!(lines[6], "chatbots,3.536,,");
    }

    #[test]
    fn complexity_unknown_variable_columns() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = write_survey(&dir);
        let out = dir.join("out");
        let e = run_complexity(&input, out.to_str().unwrap(), "inAIdomain", "mean", None)
            .unwrap_err();
        assert!(matches!(
            *e,
            SurveyError::Analysis {
                source: SurveyErrors::NoMatchingColumns { .. }
            }
        ));
    }

    #[test]
    fn statistics_count() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = write_survey(&dir);
        let out = dir.join("out");
        run_statistics(&input, out.to_str().unwrap(), "familiarity", "count", None).unwrap();

        let ns = read_lines(&out.join("familiarity_nonspecific_count.csv"));
        assert_eq!(ns.len(), 25);
        assert_eq!(ns[0], "question,entity,1,3,5");
        assert_eq!(ns[1], "Q1,machinetranslation,2,1,1");
        assert_eq!(ns[24], "Q4,chatbots,2,1,1");

        let sp = read_lines(&out.join("familiarity_specific_count.csv"));
        assert_eq!(
            sp,
            vec![
                "question,entity,1,3,5",
                "Q1,games,2,1,1",
                "Q1,chatbots,2,1,1"
            ]
        );
    }

    #[test]
    fn statistics_reference_check() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = write_survey(&dir);
        let out = dir.join("out");
        let out_s = out.to_str().unwrap();
        run_statistics(&input, out_s, "familiarity", "mean", None).unwrap();

        // The outputs of the first run are a valid reference.
        let reference = dir.join("reference");
        fs::create_dir_all(&reference).unwrap();
        for name in [
            "familiarity_nonspecific_mean.csv",
            "familiarity_specific_mean.csv",
        ] {
            fs::copy(out.join(name), reference.join(name)).unwrap();
        }
        let ref_s = reference.to_str().unwrap();
        run_statistics(&input, out_s, "familiarity", "mean", Some(ref_s)).unwrap();

        fs::write(
            reference.join("familiarity_specific_mean.csv"),
            "question,entity,1,3,5\n",
        )
        .unwrap();
        let e = run_statistics(&input, out_s, "familiarity", "mean", Some(ref_s)).unwrap_err();
        assert!(matches!(*e, SurveyError::ReferenceMismatch { .. }));
    }

    #[test]
    fn missing_survey_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = dir.join("nope.tsv");
        let e = run_statistics(
            input.to_str().unwrap(),
            dir.to_str().unwrap(),
            "familiarity",
            "mean",
            None,
        )
        .unwrap_err();
        assert!(matches!(*e, SurveyError::MissingInput { .. }));
    }

    #[test]
    fn invalid_statistic() {
        let e = run_complexity("unused.tsv", "unused", "familiarity", "mode", None).unwrap_err();
        assert!(matches!(
            *e,
            SurveyError::Analysis {
                source: SurveyErrors::InvalidStatistic(_)
            }
        ));
    }

    fn write_annotations(dir: &Path, output_directory: Option<&str>) -> String {
        fs::write(
            dir.join("annotations_A.csv"),
            "artificialintelligence\tannotation\nx\t1\ny\t2\nz\t0\n",
        )
        .unwrap();
        fs::write(dir.join("annotations_B.csv"), "x\t1\ny\t0\nz\t0\n").unwrap();
        // The last response of C could not be parsed.
        fs::write(dir.join("annotations_C.csv"), "x\t2\ny\t1\nz 3 words\t\n").unwrap();
        let mut config = serde_json::json!({
            "version": 1,
            "annotators": [
                { "name": "A", "filePath": "annotations_A.csv" },
                { "name": "B", "filePath": "annotations_B.csv" },
                { "name": "C", "filePath": "annotations_C.csv" }
            ],
            "categories": [0, 1, 2],
            "overrides": [
                { "annotator": "C", "item": "z", "label": 0, "note": "lost by the parser" }
            ]
        });
        if let Some(d) = output_directory {
            config["outputSettings"] = serde_json::json!({ "outputDirectory": d });
        }
        let p = dir.join("annotations.json");
        fs::write(&p, config.to_string()).unwrap();
        p.display().to_string()
    }

    #[test]
    fn majority_and_agreement() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let config = write_annotations(dir, Some("results"));
        run_majority(&config, None, None).unwrap();

        let out = dir.join("results");
        assert_eq!(
            read_lines(&out.join("majority_voting.csv")),
            vec![
                "Question,A,B,C,Majority Voting",
                "x,1,1,2,1",
                "y,2,0,1,2",
                "z,0,0,0,0"
            ]
        );
        // kappa = 7 / 52
        assert_eq!(
            read_lines(&out.join("agreement.csv")),
            vec!["measure,annotators,items,value", "fleiss_kappa,3,3,0.135"]
        );
    }

    #[test]
    fn majority_save_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let config = write_annotations(dir, Some("results"));
        let out = dir.join("elsewhere");
        run_majority(&config, Some(out.to_str().unwrap()), None).unwrap();
        assert!(out.join("majority_voting.csv").exists());
        assert!(!dir.join("results").exists());
    }

    #[test]
    fn majority_defaults_to_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("study.2024");
        fs::create_dir_all(&dir).unwrap();
        let config = write_annotations(&dir, None);
        run_majority(&config, None, None).unwrap();
        assert!(dir.join("majority_voting.csv").exists());
        assert!(dir.join("agreement.csv").exists());
        assert!(!temp_dir.path().join("study").exists());
    }

    #[test]
    fn majority_config_dir_keeps_extension() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let config = write_annotations(dir, Some("results.v2"));
        run_majority(&config, None, None).unwrap();
        assert!(dir.join("results.v2").join("majority_voting.csv").exists());
        assert!(!dir.join("results").exists());
    }

    #[test]
    fn agreement_of_merged_table() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = dir.join("final_majority_voting.csv");
        fs::write(
            &input,
            "Question,A,B,C,Majority Voting\nx,2,2,2,2\ny,2,2,2,2\nz,1,1,1,1\nw,2,2,2,2\n",
        )
        .unwrap();
        let out = dir.join("out");
        run_agreement(input.to_str().unwrap(), None, out.to_str().unwrap(), None).unwrap();
        assert_eq!(
            read_lines(&out.join("agreement.csv")),
            vec!["measure,annotators,items,value", "fleiss_kappa,3,4,1.000"]
        );
    }

    #[test]
    fn agreement_unknown_annotator() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let input = dir.join("merged.csv");
        fs::write(&input, "Question,A,B\nx,1,1\ny,0,1\n").unwrap();
        let annotators = vec!["A".to_string(), "Z".to_string()];
        let e = run_agreement(
            input.to_str().unwrap(),
            Some(&annotators),
            dir.to_str().unwrap(),
            None,
        )
        .unwrap_err();
        assert!(matches!(*e, SurveyError::UnknownColumn { .. }));
    }
}
