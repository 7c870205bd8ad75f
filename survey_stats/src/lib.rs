mod aggregate;
pub mod builder;
mod config;
pub mod manual;
pub mod quick_start;
mod reshape;
use log::{debug, info};

use std::{collections::HashMap, fmt::Debug, hash::Hash};

pub use crate::aggregate::*;
pub use crate::config::*;
pub use crate::reshape::*;

// **** Private structures ****

/// The number of raters who chose each category, for each item.
///
/// This is the form Fleiss' kappa works on: the identity of the raters does
/// not matter, only how many of them agreed on each item.
#[derive(Eq, PartialEq, Debug, Clone)]
struct CategoryCounts<L> {
    // In order of first appearance, unless declared.
    categories: Vec<L>,
    // One row per item, one column per category
    counts: Vec<Vec<u32>>,
    num_raters: usize,
}

/// The label chosen most often.
///
/// Ties are broken by the order of the input: among the most frequent
/// labels, the one that appears first wins. The result is thus stable with
/// respect to the order of the annotators.
///
/// Returns None if there is no label at all.
pub fn majority_vote<L: Eq + Hash + Clone>(labels: &[L]) -> Option<L> {
    let mut counts: HashMap<&L, usize> = HashMap::new();
    for l in labels.iter() {
        *counts.entry(l).or_insert(0) += 1;
    }
    let max_count = counts.values().copied().max()?;
    labels
        .iter()
        .find(|l| counts.get(l) == Some(&max_count))
        .cloned()
}

/// The majority vote for each item.
///
/// Arguments:
/// * `ratings` one list of labels per annotator, all aligned by item position.
pub fn majority_votes<L: Eq + Hash + Clone>(
    ratings: &[Vec<L>],
) -> Result<Vec<L>, SurveyErrors> {
    let num_items = check_aligned(ratings)?;
    let mut res: Vec<L> = Vec::with_capacity(num_items);
    for item_idx in 0..num_items {
        let item_labels: Vec<L> = ratings.iter().map(|r| r[item_idx].clone()).collect();
        // Not empty: there is at least one annotator.
        if let Some(l) = majority_vote(&item_labels) {
            res.push(l);
        }
    }
    Ok(res)
}

/// Fleiss' kappa of the annotations.
///
/// Each (annotator, item) pair is one observation. The value is between -1
/// and 1, 1 meaning perfect agreement and 0 the agreement expected by chance.
///
/// Arguments:
/// * `ratings` one list of labels per annotator, all aligned by item position.
/// * `categories` the categories that the annotators could choose from. If
/// provided, each of them must be used at least once. If not provided, the
/// categories are inferred from the labels.
pub fn fleiss_kappa<L: Eq + Hash + Clone + Debug>(
    ratings: &[Vec<L>],
    categories: Option<&[L]>,
) -> Result<f64, SurveyErrors> {
    if ratings.len() < 2 {
        return Err(SurveyErrors::NotEnoughRaters);
    }
    let cc = category_counts(ratings, categories)?;
    info!(
        "fleiss_kappa: {} items, {} raters, {} categories",
        cc.counts.len(),
        cc.num_raters,
        cc.categories.len()
    );

    let num_items = cc.counts.len() as f64;
    let n = cc.num_raters as f64;

    // Proportion of all the assignments which were made to each category.
    let mut p_cat: Vec<f64> = vec![0.0; cc.categories.len()];
    for row in cc.counts.iter() {
        for (j, c) in row.iter().enumerate() {
            p_cat[j] += *c as f64;
        }
    }
    for (j, p) in p_cat.iter_mut().enumerate() {
        if *p == 0.0 {
            return Err(SurveyErrors::AbsentCategory(format!(
                "{:?}",
                cc.categories[j]
            )));
        }
        *p /= num_items * n;
    }

    // Extent to which the raters agree on each item.
    let p_items: Vec<f64> = cc
        .counts
        .iter()
        .map(|row| {
            let sq: f64 = row.iter().map(|c| (*c as f64) * (*c as f64)).sum();
            (sq - n) / (n * (n - 1.0))
        })
        .collect();

    let p_bar = p_items.iter().sum::<f64>() / num_items;
    let p_e: f64 = p_cat.iter().map(|p| p * p).sum();
    debug!("fleiss_kappa: p_bar: {} p_e: {}", p_bar, p_e);
    if (1.0 - p_e).abs() < f64::EPSILON {
        return Err(SurveyErrors::DegenerateAgreement);
    }
    Ok((p_bar - p_e) / (1.0 - p_e))
}

impl AnnotationTable {
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// The labels given to one item, in annotator order.
    pub fn item_labels(&self, item_idx: usize) -> Vec<Label> {
        self.labels.iter().map(|l| l[item_idx]).collect()
    }

    pub fn majority_votes(&self) -> Result<Vec<Label>, SurveyErrors> {
        majority_votes(&self.labels)
    }

    pub fn fleiss_kappa(&self, categories: Option<&[Label]>) -> Result<f64, SurveyErrors> {
        fleiss_kappa(&self.labels, categories)
    }
}

// Returns the number of items.
fn check_aligned<L>(ratings: &[Vec<L>]) -> Result<usize, SurveyErrors> {
    let first = ratings.first().ok_or(SurveyErrors::NotEnoughRaters)?;
    let num_items = first.len();
    if num_items == 0 {
        return Err(SurveyErrors::EmptyAnnotations);
    }
    for (idx, r) in ratings.iter().enumerate() {
        if r.len() != num_items {
            return Err(SurveyErrors::MismatchedAnnotators {
                annotator: format!("#{}", idx + 1),
                expected: num_items,
                found: r.len(),
            });
        }
    }
    Ok(num_items)
}

fn category_counts<L: Eq + Hash + Clone + Debug>(
    ratings: &[Vec<L>],
    declared: Option<&[L]>,
) -> Result<CategoryCounts<L>, SurveyErrors> {
    let num_items = check_aligned(ratings)?;

    let mut categories: Vec<L> = declared.map(|c| c.to_vec()).unwrap_or_default();
    let mut index: HashMap<L, usize> = categories
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.clone(), idx))
        .collect();

    let mut counts: Vec<Vec<u32>> = vec![vec![0; categories.len()]; num_items];
    for item_idx in 0..num_items {
        for r in ratings.iter() {
            let label = &r[item_idx];
            let cat_idx = match index.get(label) {
                Some(idx) => *idx,
                None => {
                    if declared.is_some() {
                        return Err(SurveyErrors::ParseError {
                            context: format!(
                                "label of item {} is not a declared category",
                                item_idx + 1
                            ),
                            value: format!("{:?}", label),
                        });
                    }
                    categories.push(label.clone());
                    index.insert(label.clone(), categories.len() - 1);
                    for row in counts.iter_mut() {
                        row.push(0);
                    }
                    categories.len() - 1
                }
            };
            counts[item_idx][cat_idx] += 1;
        }
    }
    Ok(CategoryCounts {
        categories,
        counts,
        num_raters: ratings.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // A small deterministic generator, enough to simulate independent raters.
    struct XorShift(u64);

    impl XorShift {
        fn next_label(&mut self, num_categories: u64) -> u8 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            (self.0 % num_categories) as u8
        }
    }

    #[test]
    fn majority_simple() {
        assert_eq!(majority_vote(&[1, 1, 2]), Some(1));
        assert_eq!(majority_vote(&[2, 1, 1]), Some(1));
        assert_eq!(majority_vote::<u8>(&[]), None);
    }

    #[test]
    fn majority_tie_first_seen() {
        assert_eq!(majority_vote(&[1, 2, 3]), Some(1));
        assert_eq!(majority_vote(&[3, 2, 1]), Some(3));
        assert_eq!(majority_vote(&[2, 0, 0, 2]), Some(2));
        assert_eq!(majority_vote(&["b", "a"]), Some("b"));
    }

    #[test]
    fn majority_per_item() {
        let ratings = vec![vec![1, 0, 2], vec![1, 2, 0], vec![2, 2, 1]];
        assert_eq!(majority_votes(&ratings), Ok(vec![1, 2, 2]));
    }

    #[test]
    fn majority_misaligned() {
        let ratings = vec![vec![1, 0, 2], vec![1, 2]];
        assert_eq!(
            majority_votes(&ratings),
            Err(SurveyErrors::MismatchedAnnotators {
                annotator: "#2".to_string(),
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn kappa_perfect_agreement() {
        let r = vec![2u8, 2, 2, 1];
        let k = fleiss_kappa(&[r.clone(), r.clone(), r], None).unwrap();
        assert!((k - 1.0).abs() < 1e-12, "{}", k);
    }

    #[test]
    fn kappa_reference_value() {
        init_logger();
        // Two raters, four items, disagreeing on one item:
        // P_bar = 0.75, p = (3/8, 5/8), P_e = 34/64, kappa = (0.75 - 0.53125) / 0.46875
        let k = fleiss_kappa(&[vec![0u8, 1, 1, 0], vec![0u8, 1, 1, 1]], None).unwrap();
        assert!((k - 0.21875 / 0.46875).abs() < 1e-12, "{}", k);
    }

    #[test]
    fn kappa_independent_raters() {
        init_logger();
        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
        let ratings: Vec<Vec<u8>> = (0..3)
            .map(|_| (0..5000).map(|_| rng.next_label(3)).collect())
            .collect();
        let k = fleiss_kappa(&ratings, Some(&[0, 1, 2])).unwrap();
        assert!(k.abs() < 0.05, "{}", k);
    }

    #[test]
    fn kappa_systematic_disagreement_is_negative() {
        let k = fleiss_kappa(&[vec![0u8, 1, 0, 1], vec![1u8, 0, 1, 0]], None).unwrap();
        assert!((k + 1.0).abs() < 1e-12, "{}", k);
    }

    #[test]
    fn kappa_absent_category() {
        let r = vec![0u8, 1, 1, 0];
        assert_eq!(
            fleiss_kappa(&[r.clone(), r], Some(&[0, 1, 2])),
            Err(SurveyErrors::AbsentCategory("2".to_string()))
        );
    }

    #[test]
    fn kappa_single_category() {
        let r = vec![1u8, 1, 1];
        assert_eq!(
            fleiss_kappa(&[r.clone(), r], None),
            Err(SurveyErrors::DegenerateAgreement)
        );
    }

    #[test]
    fn kappa_undeclared_label() {
        let r = vec![0u8, 1, 3];
        assert!(matches!(
            fleiss_kappa(&[r.clone(), r], Some(&[0, 1, 2])),
            Err(SurveyErrors::ParseError { .. })
        ));
    }

    #[test]
    fn kappa_needs_two_raters() {
        assert_eq!(
            fleiss_kappa(&[vec![0u8, 1]], None),
            Err(SurveyErrors::NotEnoughRaters)
        );
        assert_eq!(
            fleiss_kappa::<u8>(&[vec![], vec![]], None),
            Err(SurveyErrors::EmptyAnnotations)
        );
    }
}
