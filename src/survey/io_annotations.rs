// Reading the files of the annotators and the merged tables.

use crate::survey::{io_common::ensure_exists, io_output::MAJORITY_COLUMN, *};

/// The raw lines of one annotator file.
pub fn read_annotator_lines(path: &Path) -> BSurveyResult<Vec<String>> {
    let path_s = path.display().to_string();
    ensure_exists(&path_s)?;
    debug!("read_annotator_lines: {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningInputSnafu { path: path_s })?;
    Ok(contents.lines().map(|l| l.to_string()).collect())
}

/// Reads a merged table: the items in the first column, then one column per
/// annotator.
///
/// Unless a list of annotators is given, all the columns but the first one
/// and the majority vote are annotators.
pub fn read_merged_table(
    path: &str,
    annotators: Option<&[String]>,
) -> BSurveyResult<AnnotationTable> {
    ensure_exists(path)?;
    info!("Attempting to read merged annotations {:?}", path);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let names: Vec<String> = match annotators {
        Some(names) => names.to_vec(),
        None => header
            .iter()
            .skip(1)
            .filter(|h| h.as_str() != MAJORITY_COLUMN)
            .cloned()
            .collect(),
    };
    let mut indexes: Vec<usize> = Vec::new();
    for name in names.iter() {
        let idx = header
            .iter()
            .position(|h| h == name)
            .context(UnknownColumnSnafu {
                column: name.as_str(),
                path,
            })?;
        indexes.push(idx);
    }
    debug!("read_merged_table: annotators: {:?} {:?}", names, indexes);

    let mut records: Vec<Vec<AnnotationRecord>> = vec![Vec::new(); names.len()];
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let item = line.get(0).unwrap_or_default().to_string();
        for (col_idx, r) in indexes.iter().zip(records.iter_mut()) {
            let value = line.get(*col_idx).unwrap_or_default();
            let label = parse_label(value).context(LabelParseSnafu {
                value,
                lineno,
                path,
            })?;
            r.push(AnnotationRecord {
                item: item.clone(),
                label,
            });
        }
    }

    let mut builder = AnnotationBuilder::new();
    for (name, r) in names.iter().zip(records.into_iter()) {
        builder
            .add_records(name, r)
            .context(InputAnalysisSnafu { path })?;
    }
    let table = builder.build().context(InputAnalysisSnafu { path })?;
    info!(
        "Read {} items labelled by {} annotators",
        table.num_items(),
        table.annotators.len()
    );
    Ok(table)
}

// Labels may have been saved as floats by a spreadsheet.
fn parse_label(value: &str) -> Option<Label> {
    parse_rating(value, "label")
        .ok()
        .and_then(|x| Label::try_from(x).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, contents: &str) -> String {
        let p = dir.path().join("merged.csv");
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn merged_table_default_annotators() {
        let dir = TempDir::new().unwrap();
        let p = write_csv(
            &dir,
            "Question,A,B,Majority Voting\nx,1,2.0,1\ny,0,0,0\n",
        );
        let t = read_merged_table(&p, None).unwrap();
        assert_eq!(t.annotators, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(t.items, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(t.labels, vec![vec![1, 0], vec![2, 0]]);
    }

    #[test]
    fn merged_table_selected_annotators() {
        let dir = TempDir::new().unwrap();
        let p = write_csv(&dir, "Question,A,B,C\nx,1,2,0\ny,0,0,1\n");
        let t = read_merged_table(&p, Some(&["C".to_string(), "A".to_string()])).unwrap();
        assert_eq!(t.labels, vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn merged_table_bad_label() {
        let dir = TempDir::new().unwrap();
        let p = write_csv(&dir, "Question,A,B\nx,1,2\ny,0,maybe\n");
        let e = read_merged_table(&p, None).unwrap_err();
        assert!(matches!(
            *e,
            SurveyError::LabelParse { lineno: 3, .. }
        ));
    }

    #[test]
    fn labels_from_spreadsheets() {
        assert_eq!(parse_label("2"), Some(2));
        assert_eq!(parse_label("2.0"), Some(2));
        assert_eq!(parse_label("2.5"), None);
        assert_eq!(parse_label("300"), None);
        assert_eq!(parse_label(""), None);
    }
}
