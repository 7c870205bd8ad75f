/*!

# Quick start

This example goes from the raw export of the survey to the tables of the
report.

**Statistics of the questions** Download the results of the survey in the
tab-separated format and run:

```bash
aisurvey statistics -f results.tsv -s output --variable familiarity --statistic mean
```

This writes `output/familiarity_nonspecific_mean.csv` and
`output/familiarity_specific_mean.csv`. Use `--statistic count` to check how
many respondents fall in each group before looking at the means.

**Complexity ranking** The ranking question is summarized separately:

```bash
aisurvey complexity -f results.tsv -s output --variable inAIdomain --statistic median
```

This writes `output/complexity_inAIdomain_median.csv`: for each system, the
median rank given to it by the respondents, grouped by whether they consider
this system to be AI.

**Annotations** Each annotator labels the open responses in their own file.
List the files in a configuration (see the [manual](crate::manual)) and run:

```bash
aisurvey majority -c annotations.json
```

This writes `majority_voting.csv` and `agreement.csv`. After resolving the
disagreements by hand in `majority_voting.csv`, the agreement of the final
table is computed with:

```bash
aisurvey agreement -i majority_voting.csv -s output
```

Pass `--verbose` to any command to see the details of the processing.

 */
