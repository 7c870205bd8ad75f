// Writing the tables in CSV format.

use crate::survey::*;

use csv::Writer;

pub const ITEM_COLUMN: &str = "Question";
pub const MAJORITY_COLUMN: &str = "Majority Voting";
pub const MAJORITY_FILE: &str = "majority_voting.csv";
pub const AGREEMENT_FILE: &str = "agreement.csv";

/// Counts are integers, the other statistics have three decimals. An
/// undefined cell is left empty.
pub fn format_cell(value: Option<f64>, statistic: Statistic) -> String {
    match (value, statistic) {
        (None, _) => String::new(),
        (Some(x), Statistic::Count) => format!("{}", x.round() as u64),
        (Some(x), _) => format!("{:.3}", x),
    }
}

fn open_writer(path: &Path) -> BSurveyResult<Writer<fs::File>> {
    let w = Writer::from_path(path).context(CsvWriteSnafu {
        path: path.display().to_string(),
    })?;
    Ok(w)
}

fn write_line(w: &mut Writer<fs::File>, path: &Path, line: &[String]) -> BSurveyResult<()> {
    w.write_record(line).context(CsvWriteSnafu {
        path: path.display().to_string(),
    })?;
    Ok(())
}

fn close_writer(mut w: Writer<fs::File>, path: &Path) -> BSurveyResult<()> {
    w.flush().context(FlushingSnafu {
        path: path.display().to_string(),
    })?;
    info!("Wrote {}", simplify_file_name(path));
    Ok(())
}

pub fn write_aggregate_table(path: &Path, table: &AggregateTable) -> BSurveyResult<()> {
    let with_questions = table.rows.iter().any(|r| r.question.is_some());
    let mut w = open_writer(path)?;

    let mut header: Vec<String> = Vec::new();
    if with_questions {
        header.push("question".to_string());
    }
    header.push("entity".to_string());
    header.extend(table.ratings.iter().map(|r| r.to_string()));
    write_line(&mut w, path, &header)?;

    for row in table.rows.iter() {
        let mut line: Vec<String> = Vec::new();
        if with_questions {
            line.push(row.question.clone().unwrap_or_default());
        }
        line.push(row.entity.clone());
        line.extend(row.cells.iter().map(|c| format_cell(*c, table.statistic)));
        write_line(&mut w, path, &line)?;
    }
    close_writer(w, path)
}

/// One row per item: the label of each annotator, then the majority vote.
pub fn write_majority_votes(
    path: &Path,
    table: &AnnotationTable,
    votes: &[Label],
) -> BSurveyResult<()> {
    let mut w = open_writer(path)?;
    let mut header: Vec<String> = vec![ITEM_COLUMN.to_string()];
    header.extend(table.annotators.iter().cloned());
    header.push(MAJORITY_COLUMN.to_string());
    write_line(&mut w, path, &header)?;

    for (idx, (item, vote)) in table.items.iter().zip(votes.iter()).enumerate() {
        let mut line: Vec<String> = vec![item.clone()];
        line.extend(table.item_labels(idx).iter().map(|l| l.to_string()));
        line.push(vote.to_string());
        write_line(&mut w, path, &line)?;
    }
    close_writer(w, path)
}

pub fn write_agreement(path: &Path, table: &AnnotationTable, kappa: f64) -> BSurveyResult<()> {
    let mut w = open_writer(path)?;
    let header: Vec<String> = ["measure", "annotators", "items", "value"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    write_line(&mut w, path, &header)?;
    let line: Vec<String> = vec![
        "fleiss_kappa".to_string(),
        table.annotators.len().to_string(),
        table.num_items().to_string(),
        format!("{:.3}", kappa),
    ];
    write_line(&mut w, path, &line)?;
    close_writer(w, path)
}
