// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// Marker prepended by the crowdsourcing platform to every answer column.
pub const OUTPUT_PREFIX: &str = "OUTPUT:";

/// The column holding the ranking question (systems ordered by complexity).
pub const RANKING_COLUMN: &str = "orderQ";

/// Tag shared by all the columns of the questions asked once overall.
pub const NONSPECIFIC_MARKER: &str = "nonspecificQ";

/// Tag shared by all the columns of the questions asked once per system.
pub const SPECIFIC_MARKER: &str = "specificQ";

/// Columns carrying this tag are quality-control answers and never analysed.
pub const QUALITY_MARKER: &str = "quality";

/// The question groups of the non system-specific part of the survey.
pub const NONSPECIFIC_QUESTION_GROUPS: [u32; 4] = [1, 2, 3, 4];

/// The export abbreviates the prefix of two systems for two variables.
/// This is an upstream quirk and not a general rule: exactly these four
/// columns are renamed.
pub const LEGACY_COLUMN_RENAMES: [(&str, &str); 4] = [
    ("cgfamiliarity", "gamesfamiliarity"),
    ("mltfamiliarity", "machinetranslationfamiliarity"),
    ("cginAIdomain", "gamesinAIdomain"),
    ("mltinAIdomain", "machinetranslationinAIdomain"),
];

/// The AI systems covered by the survey.
///
/// The numeric code of a system is fixed by the survey form: it is the
/// 1-based position of the rank of this system in the ranking question.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum AiSystem {
    MachineTranslation,
    Games,
    SpamFilter,
    SearchEngines,
    WeatherForecasts,
    Chatbots,
}

impl AiSystem {
    /// All the systems, in the order of their codes.
    pub const ALL: [AiSystem; 6] = [
        AiSystem::MachineTranslation,
        AiSystem::Games,
        AiSystem::SpamFilter,
        AiSystem::SearchEngines,
        AiSystem::WeatherForecasts,
        AiSystem::Chatbots,
    ];

    pub fn code(&self) -> u32 {
        match self {
            AiSystem::MachineTranslation => 1,
            AiSystem::Games => 2,
            AiSystem::SpamFilter => 3,
            AiSystem::SearchEngines => 4,
            AiSystem::WeatherForecasts => 5,
            AiSystem::Chatbots => 6,
        }
    }

    /// The prefix used for this system in the column names.
    pub fn prefix(&self) -> &'static str {
        match self {
            AiSystem::MachineTranslation => "machinetranslation",
            AiSystem::Games => "games",
            AiSystem::SpamFilter => "spamfilter",
            AiSystem::SearchEngines => "searchengines",
            AiSystem::WeatherForecasts => "weatherforecasts",
            AiSystem::Chatbots => "chatbots",
        }
    }
}

/// The categorical variables the ratings can be grouped by.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SurveyVariable {
    /// Self-reported familiarity with the system (Likert 1-5).
    Familiarity,
    /// Whether the respondent considers the system to be in the AI domain.
    InAiDomain,
}

impl SurveyVariable {
    /// The suffix of the columns measuring this variable.
    pub fn suffix(&self) -> &'static str {
        match self {
            SurveyVariable::Familiarity => "familiarity",
            SurveyVariable::InAiDomain => "inAIdomain",
        }
    }
}

impl FromStr for SurveyVariable {
    type Err = SurveyErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "familiarity" => Ok(SurveyVariable::Familiarity),
            "inAIdomain" => Ok(SurveyVariable::InAiDomain),
            x => Err(SurveyErrors::InvalidVariable(x.to_string())),
        }
    }
}

impl Display for SurveyVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// The statistic computed for each group.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Statistic {
    Mean,
    Median,
    /// Sample standard deviation. Undefined for groups of one element.
    Std,
    /// Number of members of the group.
    Count,
}

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Std => "std",
            Statistic::Count => "count",
        }
    }
}

impl FromStr for Statistic {
    type Err = SurveyErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Statistic::Mean),
            "median" => Ok(Statistic::Median),
            "std" => Ok(Statistic::Std),
            "count" => Ok(Statistic::Count),
            x => Err(SurveyErrors::InvalidStatistic(x.to_string())),
        }
    }
}

impl Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The responses of the survey, one row per respondent.
///
/// Invariants: the column names are unique and every row has exactly one
/// cell per column. There are no missing values: see [SurveyTable::from_export].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyTable {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<String>>,
}

/// A label given by an annotator. The annotation files only hold single digits.
pub type Label = u8;

/// One line of an annotator file, once parsed.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct AnnotationRecord {
    pub item: String,
    pub label: Label,
}

/// A correction to the labels of one annotator, applied when merging.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ManualOverride {
    pub annotator: String,
    pub item: String,
    pub label: Label,
}

// ******** Output data structures *********

/// The merged labels of all the annotators, aligned by item position.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnnotationTable {
    pub items: Vec<String>,
    pub annotators: Vec<String>,
    /// One list per annotator, each with one label per item.
    pub labels: Vec<Vec<Label>>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AggregateRow {
    /// The question tag, for the tables spanning several questions.
    pub question: Option<String>,
    pub entity: String,
    /// Aligned with [AggregateTable::ratings]. None if undefined or if no
    /// respondent gave this rating.
    pub cells: Vec<Option<f64>>,
}

/// Statistic of a metric for each entity, grouped by rating value.
#[derive(PartialEq, Debug, Clone)]
pub struct AggregateTable {
    pub statistic: Statistic,
    /// The distinct rating values observed, in increasing order.
    pub ratings: Vec<u32>,
    pub rows: Vec<AggregateRow>,
}

/// Errors that prevent an analysis from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyErrors {
    /// A value that cannot be understood (ranking string, rating, label).
    ParseError { context: String, value: String },
    /// No column measures the requested variable.
    NoMatchingColumns { variable: String },
    /// The schema expects a column that the input does not have.
    MissingColumn { column: String },
    DuplicateColumn { column: String },
    RaggedRow { row: usize, expected: usize, found: usize },
    InvalidStatistic(String),
    InvalidVariable(String),
    MismatchedAnnotators { annotator: String, expected: usize, found: usize },
    UnknownAnnotator(String),
    DuplicateAnnotator(String),
    NotEnoughRaters,
    EmptyAnnotations,
    /// A declared category is never used by any annotator.
    AbsentCategory(String),
    /// All the labels fall in one category: chance agreement is total.
    DegenerateAgreement,
}

impl Error for SurveyErrors {}

impl Display for SurveyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyErrors::ParseError { context, value } => {
                write!(f, "could not parse {:?} ({})", value, context)
            }
            SurveyErrors::NoMatchingColumns { variable } => {
                write!(f, "no column matches {:?}", variable)
            }
            SurveyErrors::MissingColumn { column } => write!(f, "missing column {:?}", column),
            SurveyErrors::DuplicateColumn { column } => {
                write!(f, "column {:?} appears more than once", column)
            }
            SurveyErrors::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {} has {} cells, expected {}", row, found, expected),
            SurveyErrors::InvalidStatistic(s) => write!(f, "unsupported statistic {:?}", s),
            SurveyErrors::InvalidVariable(s) => write!(f, "unsupported variable {:?}", s),
            SurveyErrors::MismatchedAnnotators {
                annotator,
                expected,
                found,
            } => write!(
                f,
                "annotator {} labelled {} items, expected {}",
                annotator, found, expected
            ),
            SurveyErrors::UnknownAnnotator(name) => write!(f, "unknown annotator {:?}", name),
            SurveyErrors::DuplicateAnnotator(name) => {
                write!(f, "annotator {:?} is declared twice", name)
            }
            SurveyErrors::NotEnoughRaters => write!(f, "agreement needs at least two annotators"),
            SurveyErrors::EmptyAnnotations => write!(f, "no annotated item"),
            SurveyErrors::AbsentCategory(c) => {
                write!(f, "category {} is never used by any annotator", c)
            }
            SurveyErrors::DegenerateAgreement => {
                write!(f, "all the labels are identical, agreement is undefined")
            }
        }
    }
}
