// Reading the survey results exported by the crowdsourcing platform.

use crate::survey::{io_common::ensure_exists, *};

/// The cell contents read as missing values, compared exactly (no trimming).
/// These are the markers spreadsheet and dataframe tools write for a blank.
pub const MISSING_VALUE_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads a tab-separated export. Empty cells and the
/// [MISSING_VALUE_TOKENS] are missing values; the columns holding any of
/// them are dropped.
pub fn read_survey(path: &str) -> BSurveyResult<SurveyTable> {
    ensure_exists(path)?;
    info!("Attempting to read survey results {:?}", path);
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        debug!("read_survey: lineno: {:?} cells: {:?}", lineno, line.len());
        rows.push(line.iter().map(read_cell).collect());
    }
    info!(
        "Read {} responses with {} columns from {}",
        rows.len(),
        header.len(),
        simplify_file_name(Path::new(path))
    );
    let table = SurveyTable::from_export(header, rows).context(InputAnalysisSnafu { path })?;
    Ok(table)
}

fn read_cell(s: &str) -> Option<String> {
    if MISSING_VALUE_TOKENS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}
