use log::{debug, info};

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::reshape::*;

/// Computes the statistic over the values of one group.
///
/// Returns None when the statistic is undefined (the standard deviation of a
/// single value, or any statistic of an empty group).
pub fn compute_statistic(values: &[f64], statistic: Statistic) -> Option<f64> {
    if values.is_empty() {
        return match statistic {
            Statistic::Count => Some(0.0),
            _ => None,
        };
    }
    let n = values.len() as f64;
    match statistic {
        Statistic::Count => Some(n),
        Statistic::Mean => Some(values.iter().sum::<f64>() / n),
        Statistic::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                Some((sorted[mid - 1] + sorted[mid]) / 2.0)
            } else {
                Some(sorted[mid])
            }
        }
        Statistic::Std if values.len() < 2 => None,
        Statistic::Std => {
            let m = values.iter().sum::<f64>() / n;
            let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
            Some((ss / (n - 1.0)).sqrt())
        }
    }
}

/// Groups the observations of every series by rating and computes the
/// statistic of each group.
///
/// The rows follow the order of the series. The columns are all the rating
/// values observed in any series; a rating that an entity never received
/// has no cell (None), it is not a zero.
pub fn aggregate_series(series: &[EntitySeries], statistic: Statistic) -> AggregateTable {
    let ratings: BTreeSet<u32> = series
        .iter()
        .flat_map(|s| s.observations.iter().map(|o| o.rating))
        .collect();
    let ratings: Vec<u32> = ratings.into_iter().collect();

    let mut rows: Vec<AggregateRow> = Vec::new();
    for s in series.iter() {
        let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for o in s.observations.iter() {
            groups.entry(o.rating).or_default().push(o.value);
        }
        let cells: Vec<Option<f64>> = ratings
            .iter()
            .map(|r| {
                groups
                    .get(r)
                    .and_then(|values| compute_statistic(values, statistic))
            })
            .collect();
        debug!(
            "aggregate_series: {:?} {} groups: {:?}",
            s.question,
            s.entity,
            groups.keys().collect::<Vec<_>>()
        );
        rows.push(AggregateRow {
            question: s.question.clone(),
            entity: s.entity.clone(),
            cells,
        });
    }
    AggregateTable {
        statistic,
        ratings,
        rows,
    }
}

/// The statistic of the rank of each system in the complexity ranking,
/// grouped by the rating each respondent gave to the variable of this system.
///
/// One row per system, in the order of [AiSystem::ALL].
pub fn ranking_table(
    table: &SurveyTable,
    variable: SurveyVariable,
    statistic: Statistic,
) -> Result<AggregateTable, SurveyErrors> {
    info!(
        "ranking_table: variable: {} statistic: {}",
        variable, statistic
    );
    let series = reshape_rankings(table, variable)?;
    Ok(aggregate_series(&series, statistic))
}

/// The statistic of the non system-specific questions, grouped by the
/// rating given to the variable.
///
/// For each question group, one row per system: the metric is the column
/// `nonspecificQ<group><system>`, paired by row with the column of the
/// variable for the same system.
pub fn nonspecific_table(
    table: &SurveyTable,
    variable: SurveyVariable,
    statistic: Statistic,
) -> Result<AggregateTable, SurveyErrors> {
    info!(
        "nonspecific_table: variable: {} statistic: {}",
        variable, statistic
    );
    let schema = VariableSchema::for_variable(variable);
    let var_indexes = schema.validate(table)?;

    let mut series: Vec<EntitySeries> = Vec::new();
    for group in NONSPECIFIC_QUESTION_GROUPS.iter() {
        for ((system, rating_col), rating_idx) in schema.entries.iter().zip(var_indexes.iter()) {
            let metric_col = format!("{}{}{}", NONSPECIFIC_MARKER, group, system.prefix());
            let observations = pair_columns(table, *rating_idx, rating_col, &metric_col)?;
            series.push(EntitySeries {
                question: Some(format!("Q{}", group)),
                entity: system.prefix().to_string(),
                observations,
            });
        }
    }
    Ok(aggregate_series(&series, statistic))
}

/// The columns of the system-specific questions, for one system.
fn specific_columns<'a>(table: &'a SurveyTable, system: AiSystem) -> Vec<&'a str> {
    table
        .columns()
        .iter()
        .filter(|c| {
            c.contains(SPECIFIC_MARKER)
                && !c.contains(NONSPECIFIC_MARKER)
                && !c.contains(QUALITY_MARKER)
                && c.contains(system.prefix())
        })
        .map(|c| c.as_str())
        .collect()
}

/// The question tag of a system-specific column: its name without the
/// system and without the `specific` marker.
fn specific_question_tag(column: &str, system: AiSystem) -> String {
    column
        .replacen(system.prefix(), "", 1)
        .replacen("specific", "", 1)
}

/// The statistic of the system-specific questions, grouped by the rating
/// given to the variable for the same system.
///
/// For each system (in the order of [AiSystem::ALL]), one row per question
/// column mentioning this system, in header order.
pub fn specific_table(
    table: &SurveyTable,
    variable: SurveyVariable,
    statistic: Statistic,
) -> Result<AggregateTable, SurveyErrors> {
    info!(
        "specific_table: variable: {} statistic: {}",
        variable, statistic
    );
    let schema = VariableSchema::for_variable(variable);
    let var_indexes = schema.validate(table)?;

    let mut series: Vec<EntitySeries> = Vec::new();
    for ((system, rating_col), rating_idx) in schema.entries.iter().zip(var_indexes.iter()) {
        for metric_col in specific_columns(table, *system) {
            let observations = pair_columns(table, *rating_idx, rating_col, metric_col)?;
            series.push(EntitySeries {
                question: Some(specific_question_tag(metric_col, *system)),
                entity: system.prefix().to_string(),
                observations,
            });
        }
    }
    if series.is_empty() {
        return Err(SurveyErrors::NoMatchingColumns {
            variable: SPECIFIC_MARKER.to_string(),
        });
    }
    Ok(aggregate_series(&series, statistic))
}
