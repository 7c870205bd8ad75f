/*!

This is the long-form manual for `survey_stats` and `aisurvey`.

## Input formats

### Survey results

The results of the survey, as exported by the crowdsourcing platform: a
tab-separated file in UTF-8, with one header row and one row per respondent.
The answer columns carry the `OUTPUT:` marker, which is removed before any
processing. Any column with a missing value, even in a single row, is dropped
entirely.

The columns that matter are named `<prefix><variable>`:

| system              | code | prefix               |
|---------------------|------|----------------------|
| machine translation | 1    | `machinetranslation` |
| games               | 2    | `games`              |
| spam filters        | 3    | `spamfilter`         |
| search engines      | 4    | `searchengines`      |
| weather forecasts   | 5    | `weatherforecasts`   |
| chatbots            | 6    | `chatbots`           |

and the variables are `familiarity` and `inAIdomain`. The export uses the
prefixes `cg` and `mlt` for games and machine translation in the
familiarity and in-AI-domain columns. These four columns are renamed, and
only these four.

The other columns:
- `orderQ`: the complexity ranking, such as `[3,1,2,6,5,4]`. The number at
  position `k` is the rank of the system with code `k`.
- `nonspecificQ<g><prefix>` for the question groups `g` from 1 to 4: the
  questions asked once overall.
- any other column containing `specificQ` and a system prefix: the questions
  asked once per system. Columns containing `quality` are ignored.

### Annotations

One text file per annotator. Each line is the text of a response directly
followed by the label, a single digit (`0`: non-informative, `1`: neutral,
`2`: informative). Lines which do not end with a digit are skipped: they are
headers or responses that were not annotated yet.

### Merged annotations

A CSV file with the header `Question,<annotator 1>,...,<annotator n>` and
optionally a final `Majority Voting` column, as written by the `majority`
command. This is the file to edit by hand before running the `agreement`
command.

## Outputs

All the outputs are CSV files with a header row. The statistics tables have
one row per entity (with the question tag in a `question` column when the
table covers several questions) and one column per rating value. Floating
values are written with 3 decimals, counts as integers. Empty cells mean
that no respondent gave this rating, or that the statistic is undefined (the
standard deviation of a single value).

## Configuration

The `majority` command reads a JSON configuration:

```json
{
  "version": 1,
  "outputSettings": { "outputDirectory": "output" },
  "annotators": [
    { "name": "Ann", "filePath": "annotations_Ann.csv" },
    { "name": "Bob", "filePath": "annotations_Bob.csv" },
    { "name": "Eve", "filePath": "annotations_Eve.csv" }
  ],
  "categories": [0, 1, 2],
  "overrides": [
    { "annotator": "Ann", "item": "Anything that can do tasks artificially.", "label": 2,
      "note": "the response contains a digit" }
  ]
}
```

- `version` (number): must be 1.
- `outputSettings.outputDirectory` (optional): where to write the results.
  The `--save` option takes precedence.
- `annotators`: the files, relative to the configuration file.
- `categories` (optional): the labels that the annotators could choose from.
  Each of them must be used at least once for the agreement to be computed.
- `overrides` (optional): manual corrections, applied after reading the
  files. If the annotator already labelled the item, the label is replaced.
  Otherwise the item is appended to the labels of this annotator.

 */
