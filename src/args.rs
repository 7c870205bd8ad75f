use clap::{Parser, Subcommand};

/// Statistics tables and annotator agreement for the survey about AI systems.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, global = true, takes_value = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Tables of the non system-specific and of the system-specific questions, grouped by a variable.
    Statistics(TableArgs),
    /// Table of the complexity ranking of the systems, grouped by a variable.
    Complexity(TableArgs),
    /// Majority voting and agreement of the annotators.
    Majority {
        /// (file path) The JSON configuration listing the annotation files and the manual overrides.
        /// For more information about the file format, read the manual of the survey_stats crate.
        #[clap(short, long, value_parser)]
        config: String,

        /// (directory path, optional) Where to write the results. Setting this option overrides the
        /// directory that may be specified in the configuration.
        #[clap(short, long, value_parser)]
        save: Option<String>,

        /// (directory path, optional) A directory containing reference outputs. If provided, each
        /// output is checked against the file with the same name.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Agreement of the annotators in an already merged table.
    Agreement {
        /// (file path) The merged annotations in CSV format, with the items in the first column.
        #[clap(short, long, value_parser)]
        input: String,

        /// (list of comma-separated names or not specified) The columns to treat as annotators. By
        /// default, all the columns except the first one and 'Majority Voting'.
        #[clap(long, value_parser, value_delimiter = ',')]
        annotators: Option<Vec<String>>,

        /// (directory path) Where to write the results.
        #[clap(short, long, value_parser)]
        save: String,

        /// (directory path, optional) A directory containing reference outputs. If provided, each
        /// output is checked against the file with the same name.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct TableArgs {
    /// (file path) The results of the survey, in the tab-separated format of the crowdsourcing platform.
    #[clap(short, long, value_parser)]
    pub filename: String,

    /// (directory path) Where to write the tables. The directory is created if needed.
    #[clap(short, long, value_parser)]
    pub save: String,

    /// The variable to group the answers by.
    #[clap(short, long, value_parser = ["familiarity", "inAIdomain"], default_value = "familiarity")]
    pub variable: String,

    /// The statistic to compute for each group.
    #[clap(long, value_parser = ["mean", "median", "std", "count"], default_value = "mean")]
    pub statistic: String,

    /// (directory path, optional) A directory containing reference tables. If provided, each
    /// table is checked against the file with the same name.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,
}
