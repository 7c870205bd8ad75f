pub use crate::config::*;

use log::{debug, warn};

/// Parses one line of an annotator file.
///
/// A line is `<text><label digit>`, with no explicit separator. The line is
/// kept only if its last non-whitespace character is a digit; other lines
/// (headers, responses left without a label) are skipped and None is
/// returned. The whitespace between the text and the label is not part of
/// the item.
pub fn parse_annotation_line(line: &str) -> Option<AnnotationRecord> {
    let trimmed = line.trim_end();
    let last = trimmed.chars().last()?;
    let label = last.to_digit(10)? as Label;
    let item = trimmed[..trimmed.len() - last.len_utf8()].trim_end();
    Some(AnnotationRecord {
        item: item.to_string(),
        label,
    })
}

/// A builder for merging the annotations of several annotators.
///
/// ```
/// use survey_stats::builder::AnnotationBuilder;
/// use survey_stats::{ManualOverride, SurveyErrors};
///
/// let mut builder = AnnotationBuilder::new();
/// builder.annotator("Ann", &["A program that learns\t2", "No idea\t0"])?;
/// builder.annotator("Bob", &["A program that learns\t2"])?;
/// builder.overrides(&[ManualOverride {
///     annotator: "Bob".to_string(),
///     item: "No idea".to_string(),
///     label: 1,
/// }])?;
/// let table = builder.build()?;
/// assert_eq!(table.labels, vec![vec![2, 0], vec![2, 1]]);
///
/// # Ok::<(), SurveyErrors>(())
/// ```
#[derive(Default)]
pub struct AnnotationBuilder {
    pub(crate) _annotators: Vec<(String, Vec<AnnotationRecord>)>,
}

impl AnnotationBuilder {
    pub fn new() -> AnnotationBuilder {
        AnnotationBuilder {
            _annotators: Vec::new(),
        }
    }

    /// Adds an annotator out of the raw lines of their file.
    ///
    /// Returns the number of records kept.
    pub fn annotator<S: AsRef<str>>(
        &mut self,
        name: &str,
        lines: &[S],
    ) -> Result<usize, SurveyErrors> {
        let records: Vec<AnnotationRecord> = lines
            .iter()
            .filter_map(|l| parse_annotation_line(l.as_ref()))
            .collect();
        debug!(
            "annotator: {}: kept {} of {} lines",
            name,
            records.len(),
            lines.len()
        );
        let num_records = records.len();
        self.add_records(name, records)?;
        Ok(num_records)
    }

    /// Adds an annotator with records that are already parsed.
    pub fn add_records(
        &mut self,
        name: &str,
        records: Vec<AnnotationRecord>,
    ) -> Result<(), SurveyErrors> {
        if self._annotators.iter().any(|(n, _)| n == name) {
            return Err(SurveyErrors::DuplicateAnnotator(name.to_string()));
        }
        self._annotators.push((name.to_string(), records));
        Ok(())
    }

    /// Applies manual corrections.
    ///
    /// If the annotator already has a record for the item, its label is
    /// replaced. Otherwise the record is appended to the annotator's list.
    pub fn overrides(&mut self, overrides: &[ManualOverride]) -> Result<(), SurveyErrors> {
        for o in overrides.iter() {
            let (_, records) = self
                ._annotators
                .iter_mut()
                .find(|(n, _)| *n == o.annotator)
                .ok_or_else(|| SurveyErrors::UnknownAnnotator(o.annotator.clone()))?;
            match records.iter_mut().find(|r| r.item == o.item) {
                Some(r) => {
                    debug!(
                        "overrides: {}: {:?}: {} -> {}",
                        o.annotator, o.item, r.label, o.label
                    );
                    r.label = o.label;
                }
                None => {
                    debug!("overrides: {}: appending {:?}", o.annotator, o.item);
                    records.push(AnnotationRecord {
                        item: o.item.clone(),
                        label: o.label,
                    });
                }
            }
        }
        Ok(())
    }

    /// Aligns the annotators by position. The items are named after the
    /// records of the first annotator.
    pub fn build(self) -> Result<AnnotationTable, SurveyErrors> {
        let (_, first) = self
            ._annotators
            .first()
            .ok_or(SurveyErrors::NotEnoughRaters)?;
        let items: Vec<String> = first.iter().map(|r| r.item.clone()).collect();
        if items.is_empty() {
            return Err(SurveyErrors::EmptyAnnotations);
        }

        let mut annotators: Vec<String> = Vec::new();
        let mut labels: Vec<Vec<Label>> = Vec::new();
        for (name, records) in self._annotators.iter() {
            if records.len() != items.len() {
                return Err(SurveyErrors::MismatchedAnnotators {
                    annotator: name.clone(),
                    expected: items.len(),
                    found: records.len(),
                });
            }
            for (idx, (r, item)) in records.iter().zip(items.iter()).enumerate() {
                if r.item != *item {
                    warn!(
                        "build: item {} of {} differs from the first annotator: {:?} vs {:?}",
                        idx + 1,
                        name,
                        r.item,
                        item
                    );
                }
            }
            annotators.push(name.clone());
            labels.push(records.iter().map(|r| r.label).collect());
        }
        Ok(AnnotationTable {
            items,
            annotators,
            labels,
        })
    }
}
