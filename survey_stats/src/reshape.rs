use log::{debug, info, warn};

use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use crate::config::*;

impl SurveyTable {
    /// Builds a table out of clean data.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<SurveyTable, SurveyErrors> {
        let mut seen: HashSet<&str> = HashSet::new();
        for c in columns.iter() {
            if !seen.insert(c.as_str()) {
                return Err(SurveyErrors::DuplicateColumn { column: c.clone() });
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SurveyErrors::RaggedRow {
                    row: idx + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(SurveyTable { columns, rows })
    }

    /// Builds a table out of the raw export of the crowdsourcing platform.
    ///
    /// - the `OUTPUT:` marker is removed from the column names
    /// - any column with a missing value is dropped entirely
    /// - the legacy column names are renamed (see [LEGACY_COLUMN_RENAMES])
    pub fn from_export(
        columns: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
    ) -> Result<SurveyTable, SurveyErrors> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SurveyErrors::RaggedRow {
                    row: idx + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }

        let complete: Vec<usize> = (0..columns.len())
            .filter(|idx| rows.iter().all(|row| row[*idx].is_some()))
            .collect();
        if complete.len() < columns.len() {
            let dropped: Vec<&String> = (0..columns.len())
                .filter(|idx| !complete.contains(idx))
                .map(|idx| &columns[idx])
                .collect();
            info!(
                "from_export: dropping {} columns with missing values",
                dropped.len()
            );
            debug!("from_export: dropped columns: {:?}", dropped);
        }

        let clean_columns: Vec<String> = complete
            .iter()
            .map(|idx| normalize_column_name(&columns[*idx]))
            .collect();
        let clean_rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| {
                complete
                    .iter()
                    .map(|idx| row[*idx].clone().unwrap_or_default())
                    .collect()
            })
            .collect();
        SurveyTable::new(clean_columns, clean_rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// The values of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// The columns whose name ends with the given suffix, in header order.
    pub fn columns_with_suffix(&self, suffix: &str) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.ends_with(suffix))
            .map(|c| c.as_str())
            .collect()
    }
}

/// Removes the platform marker and applies the legacy renames.
pub fn normalize_column_name(name: &str) -> String {
    let stripped = name.replace(OUTPUT_PREFIX, "");
    match LEGACY_COLUMN_RENAMES
        .iter()
        .find(|(legacy, _)| *legacy == stripped)
    {
        Some((_, canonical)) => canonical.to_string(),
        None => stripped,
    }
}

/// The ranks given by one respondent to all the systems.
///
/// Invariant: exactly one rank per known system, each between 1 and the
/// number of systems. The rank at position `k` (1-based) is the rank of
/// the system with code `k`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct OrderRanking(Vec<u32>);

impl OrderRanking {
    /// Parses a bracketed list such as `[3,1,2,6,5,4]`.
    pub fn parse(s: &str) -> Result<OrderRanking, SurveyErrors> {
        let parse_error = |context: &str| SurveyErrors::ParseError {
            context: context.to_string(),
            value: s.to_string(),
        };
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|x| x.strip_suffix(']'))
            .ok_or_else(|| parse_error("ranking is not a bracketed list"))?;

        let mut ranks: Vec<u32> = Vec::new();
        for token in inner.split(',') {
            let rank = token
                .trim()
                .parse::<u32>()
                .map_err(|_| parse_error("ranking contains a non-integer rank"))?;
            ranks.push(rank);
        }

        let num_systems = AiSystem::ALL.len();
        if ranks.len() != num_systems {
            return Err(parse_error("ranking does not have one rank per system"));
        }
        if ranks.iter().any(|r| *r == 0 || *r as usize > num_systems) {
            return Err(parse_error("ranks must be between 1 and the number of systems"));
        }
        Ok(OrderRanking(ranks))
    }

    pub fn rank_of(&self, system: AiSystem) -> u32 {
        self.0[(system.code() - 1) as usize]
    }

    pub fn ranks(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for OrderRanking {
    type Err = SurveyErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderRanking::parse(s)
    }
}

impl Display for OrderRanking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|r| r.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// Where to find the columns measuring a variable for each system.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VariableSchema {
    pub variable: SurveyVariable,
    pub entries: Vec<(AiSystem, String)>,
}

impl VariableSchema {
    pub fn for_variable(variable: SurveyVariable) -> VariableSchema {
        VariableSchema {
            variable,
            entries: AiSystem::ALL
                .iter()
                .map(|s| (*s, format!("{}{}", s.prefix(), variable.suffix())))
                .collect(),
        }
    }

    /// Checks the schema against the header of the table and returns the
    /// index of each column, in schema order.
    ///
    /// Fails with NoMatchingColumns if no column of the schema is present and
    /// with MissingColumn if only some of them are.
    pub fn validate(&self, table: &SurveyTable) -> Result<Vec<usize>, SurveyErrors> {
        let indexes: Vec<Option<usize>> = self
            .entries
            .iter()
            .map(|(_, col)| table.column_index(col))
            .collect();
        if indexes.iter().all(|x| x.is_none()) {
            return Err(SurveyErrors::NoMatchingColumns {
                variable: self.variable.suffix().to_string(),
            });
        }
        let mut res: Vec<usize> = Vec::new();
        for ((_, col), idx) in self.entries.iter().zip(indexes) {
            match idx {
                Some(i) => res.push(i),
                None => {
                    return Err(SurveyErrors::MissingColumn {
                        column: col.clone(),
                    })
                }
            }
        }

        let extra: Vec<&str> = table
            .columns_with_suffix(self.variable.suffix())
            .into_iter()
            .filter(|c| !self.entries.iter().any(|(_, col)| col == c))
            .collect();
        if !extra.is_empty() {
            warn!(
                "validate: columns {:?} end with {:?} but do not belong to a known system",
                extra,
                self.variable.suffix()
            );
        }
        Ok(res)
    }
}

/// One respondent's answer, grouped under a rating.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Observation {
    pub rating: u32,
    pub value: f64,
}

/// All the observations for one entity (one row of the final table).
#[derive(PartialEq, Debug, Clone)]
pub struct EntitySeries {
    pub question: Option<String>,
    pub entity: String,
    pub observations: Vec<Observation>,
}

/// Parses a rating (a non-negative integer, possibly written as a float by
/// the export, such as `3.0`).
pub fn parse_rating(s: &str, context: &str) -> Result<u32, SurveyErrors> {
    let t = s.trim();
    if let Ok(x) = t.parse::<u32>() {
        return Ok(x);
    }
    match t.parse::<f64>() {
        Ok(x) if x >= 0.0 && x.fract() == 0.0 && x <= u32::MAX as f64 => Ok(x as u32),
        _ => Err(SurveyErrors::ParseError {
            context: context.to_string(),
            value: s.to_string(),
        }),
    }
}

pub(crate) fn parse_metric(s: &str, context: &str) -> Result<f64, SurveyErrors> {
    match s.trim().parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(SurveyErrors::ParseError {
            context: context.to_string(),
            value: s.to_string(),
        }),
    }
}

/// For each system, the rank the respondents gave to this system, grouped
/// by the rating they gave for the variable.
///
/// The series are returned in the order of [AiSystem::ALL].
pub fn reshape_rankings(
    table: &SurveyTable,
    variable: SurveyVariable,
) -> Result<Vec<EntitySeries>, SurveyErrors> {
    let schema = VariableSchema::for_variable(variable);
    let var_indexes = schema.validate(table)?;
    let ranking_idx = table
        .column_index(RANKING_COLUMN)
        .ok_or_else(|| SurveyErrors::MissingColumn {
            column: RANKING_COLUMN.to_string(),
        })?;

    let mut rankings: Vec<OrderRanking> = Vec::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let ranking = OrderRanking::parse(&row[ranking_idx]).map_err(|e| match e {
            SurveyErrors::ParseError { context, value } => SurveyErrors::ParseError {
                context: format!("{}, column {}, row {}", context, RANKING_COLUMN, row_idx + 1),
                value,
            },
            e => e,
        })?;
        rankings.push(ranking);
    }
    debug!("reshape_rankings: parsed {} rankings", rankings.len());

    let mut res: Vec<EntitySeries> = Vec::new();
    for ((system, col), var_idx) in schema.entries.iter().zip(var_indexes) {
        let mut observations: Vec<Observation> = Vec::new();
        for (row_idx, (row, ranking)) in table.rows.iter().zip(rankings.iter()).enumerate() {
            let rating = parse_rating(
                &row[var_idx],
                &format!("rating in column {}, row {}", col, row_idx + 1),
            )?;
            observations.push(Observation {
                rating,
                value: ranking.rank_of(*system) as f64,
            });
        }
        res.push(EntitySeries {
            question: None,
            entity: system.prefix().to_string(),
            observations,
        });
    }
    Ok(res)
}

/// Pairs the rating column of each system with a metric column, by row
/// position.
pub(crate) fn pair_columns(
    table: &SurveyTable,
    rating_idx: usize,
    rating_col: &str,
    metric_col: &str,
) -> Result<Vec<Observation>, SurveyErrors> {
    let metric_idx = table
        .column_index(metric_col)
        .ok_or_else(|| SurveyErrors::MissingColumn {
            column: metric_col.to_string(),
        })?;
    let mut observations: Vec<Observation> = Vec::new();
    for (row_idx, row) in table.rows.iter().enumerate() {
        let rating = parse_rating(
            &row[rating_idx],
            &format!("rating in column {}, row {}", rating_col, row_idx + 1),
        )?;
        let value = parse_metric(
            &row[metric_idx],
            &format!("value in column {}, row {}", metric_col, row_idx + 1),
        )?;
        observations.push(Observation { rating, value });
    }
    Ok(observations)
}
