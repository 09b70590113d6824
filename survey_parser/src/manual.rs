/*!

This is the long-form manual for `survey_parser` and `fb360`.

## Input format

A survey workbook contains one sheet per leader. The name of the sheet is the name
of the leader. The first row of each sheet holds the questions, and each following
row holds the answers of one respondent:

| Timestamp | Name  | Relationship with the Leader | [Listens actively] Communication | What should this leader START doing? |
|-----------|-------|------------------------------|----------------------------------|--------------------------------------|
| 45000.5   | Bob   | Peer                         | Demonstrated                     | Delegate more                        |
| 45001.2   | Carol | Direct report                | Excellent                        |                                      |
|           |       |                              | Highly demonstrated              |                                      |

The answer of the leader about themselves is recognized as the last row that
contains a rating and leaves all the respondent columns empty (columns with
`name`, `email`, `timestamp`, `relationship`, `group` or `division` in their
header). All the rows before it are peer responses. If no row qualifies, all the
rows are peer responses and the self-assessment is empty.

Ratings are read from text cells, regardless of case and surrounding spaces:

| label                  | value |
|------------------------|-------|
| Not demonstrated       | 1     |
| Partially demonstrated | 2     |
| Demonstrated           | 3     |
| Highly demonstrated    | 4     |
| Excellent              | 5     |

Any other content is ignored when computing averages (it does not count as 0).

A question belongs to a category when its header contains one of the keywords of
the category. A question may belong to several categories.

The supported file types are `xlsx` (and `xlsm`), `xls`, `ods` and `csv`. A CSV file
holds a single sheet named after the file.

## Output format

The output is a JSON array, with one object per non-empty sheet:

```text
{
  "leader": "Alice",
  "peerResponseCount": 2,
  "averageScores": { "Self Awareness": null, "Communication": 4.0, ... },
  "selfAssessment": { "Self Awareness": null, "Communication": 4.0, ... },
  "questions": [
    {
      "fullQuestion": "[Listens actively] Communication",
      "shortQuestion": "Listens actively",
      "peerRatings": [3, 5],
      "peerAverage": 4.0,
      "selfRating": 4
    }
  ],
  "comments": {
    "start": "Delegate more",
    "stop": "No comments",
    "continue": "No comments",
    "general": "No comments"
  },
  "relationshipBreakdown": [
    { "relationship": "Peer", "count": 1 },
    { "relationship": "Direct report", "count": 1 }
  ]
}
```

Averages are rounded to 2 decimals.

## Configuration

The vocabulary of the survey can be replaced with a JSON file (`--config`). All the
keys are optional; a missing key keeps the default table.

```text
{
  "ratingScale": [
    { "label": "Not demonstrated", "value": 1 },
    { "label": "Excellent", "value": 5 }
  ],
  "categories": [
    { "name": "Teamwork", "keywords": ["teamwork", "collaboration"] }
  ],
  "commentColumns": {
    "start": ["START doing"],
    "stop": ["STOP doing"],
    "continue": ["CONTINUE doing"],
    "general": ["comments you would like to share"]
  },
  "metadataKeywords": ["name", "email", "timestamp"],
  "relationshipKeywords": ["relationship"],
  "noCommentsLabel": "No comments"
}
```

## Validation

With `--validate`, `fb360` lists what is missing for each leader: peer averages,
self-assessment, questions, peer responses and comments.

 */
