//! Per-unit usage, efficiency and rating statistics.

use std::path::Path;

use super::*;

/// Decimal places kept for kill efficiency
const EFFICIENCY_PLACES: i32 = 4;
/// Decimal places kept for average and median rating
const RATING_PLACES: i32 = 2;

impl UnitQuery {
    /// Group battle records by `unit_id`, most used units first.
    ///
    /// Records without a `unit_id` form their own group (`unit_id: None`) so
    /// every record is counted once. Ties on `count` are ordered by `unit_id`,
    /// the id-less group last, so output is stable between runs. `limit`
    /// truncates after ordering.
    pub async fn unit_stats(&self, limit: Option<usize>) -> Result<Vec<AggregateRow>> {
        let limit = limit.map(|n| format!("LIMIT {n}")).unwrap_or_default();

        // Cast once in the inner select so inferred CSV types (int vs float
        // ratings) don't change the result schema
        let batches = self
            .sql(&format!(
                r#"
            SELECT unit_id,
                   COUNT(*) AS "count",
                   CAST(COALESCE(SUM(killed_count), 0) AS DOUBLE) / COUNT(*) AS efficiency,
                   AVG(player_rating) AS average_rating,
                   MEDIAN(player_rating) AS median_rating,
                   COALESCE(SUM(killed_count), 0) AS total_kills,
                   MIN(player_rating) AS min_rating,
                   MAX(player_rating) AS max_rating
            FROM (
                SELECT CAST(unit_id AS BIGINT) AS unit_id,
                       CAST(killed_count AS BIGINT) AS killed_count,
                       CAST(player_rating AS DOUBLE) AS player_rating
                FROM {BATTLES_TABLE}
            )
            GROUP BY unit_id
            ORDER BY "count" DESC, unit_id ASC NULLS LAST
            {limit}
        "#
            ))
            .await?;

        let mut results = Vec::new();
        for batch in &batches {
            let ids = col_opt_i64(batch, 0)?;
            let counts = col_i64(batch, 1)?;
            let efficiencies = col_f64(batch, 2)?;
            let averages = col_f64(batch, 3)?;
            let medians = col_f64(batch, 4)?;
            let kills = col_i64(batch, 5)?;
            let mins = col_f64(batch, 6)?;
            let maxes = col_f64(batch, 7)?;

            for i in 0..batch.num_rows() {
                results.push(AggregateRow {
                    unit_id: ids[i],
                    count: counts[i],
                    efficiency: round_to(efficiencies[i], EFFICIENCY_PLACES),
                    average_rating: round_to(averages[i], RATING_PLACES),
                    median_rating: round_to(medians[i], RATING_PLACES),
                    total_kills: kills[i],
                    min_rating: mins[i],
                    max_rating: maxes[i],
                });
            }
        }
        Ok(results)
    }
}

/// Run the unit statistics query against a Parquet file.
///
/// The session is created for this call only and dropped before returning,
/// whether the query succeeds or not.
pub async fn analyze_units(parquet_path: &Path, limit: Option<usize>) -> Result<Vec<AggregateRow>> {
    let query = UnitQuery::new();
    query.register_parquet(parquet_path).await?;
    let rows = query.unit_stats(limit).await?;
    tracing::info!(
        path = %parquet_path.display(),
        units = rows.len(),
        "Unit statistics computed"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::datatypes::{DataType, Field, Schema};

    use super::*;

    /// (unit_id, killed_count, player_rating)
    fn battles(rows: &[(i64, Option<i64>, f64)]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("unit_id", DataType::Int64, false),
            Field::new("killed_count", DataType::Int64, true),
            Field::new("player_rating", DataType::Float64, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.0))),
                Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.1))),
                Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))),
            ],
        )
        .unwrap()
    }

    async fn stats(rows: &[(i64, Option<i64>, f64)], limit: Option<usize>) -> Vec<AggregateRow> {
        let query = UnitQuery::new();
        query.register_batch(battles(rows)).unwrap();
        query.unit_stats(limit).await.unwrap()
    }

    fn sample() -> Vec<(i64, Option<i64>, f64)> {
        vec![
            (1, Some(2), 10.0),
            (1, Some(0), 20.0),
            (1, Some(1), 30.0),
            (1, Some(4), 40.0),
            (2, Some(3), 5.0),
            (2, None, 15.0),
            (2, Some(1), 25.0),
            (3, Some(1), 1500.0),
        ]
    }

    #[tokio::test]
    async fn test_median_even_and_odd_groups() {
        let rows = stats(&sample(), None).await;
        let unit1 = rows.iter().find(|r| r.unit_id == Some(1)).unwrap();
        let unit2 = rows.iter().find(|r| r.unit_id == Some(2)).unwrap();
        assert_eq!(unit1.median_rating, 25.0);
        assert_eq!(unit2.median_rating, 15.0);
    }

    #[tokio::test]
    async fn test_aggregate_values() {
        let rows = stats(&sample(), None).await;
        let unit1 = &rows[0];
        assert_eq!(unit1.unit_id, Some(1));
        assert_eq!(unit1.count, 4);
        assert_eq!(unit1.total_kills, 7);
        assert_eq!(unit1.efficiency, 1.75);
        assert_eq!(unit1.average_rating, 25.0);
        assert_eq!(unit1.min_rating, 10.0);
        assert_eq!(unit1.max_rating, 40.0);

        // Missing kills don't count toward the total but the record still counts
        let unit2 = &rows[1];
        assert_eq!(unit2.count, 3);
        assert_eq!(unit2.total_kills, 4);
        assert_eq!(unit2.efficiency, 1.3333);
    }

    #[tokio::test]
    async fn test_counts_cover_every_record() {
        let input = sample();
        let rows = stats(&input, None).await;
        let total: i64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, input.len() as i64);
        assert!(rows.iter().all(|r| r.count > 0));
    }

    #[tokio::test]
    async fn test_efficiency_consistent_with_kills() {
        let rows = stats(&sample(), None).await;
        for row in &rows {
            assert!(row.efficiency >= 0.0);
            let implied = row.efficiency * row.count as f64;
            assert!((implied - row.total_kills as f64).abs() <= 0.5e-4 * row.count as f64);
        }
    }

    #[tokio::test]
    async fn test_ordered_by_count_desc() {
        let rows = stats(&sample(), None).await;
        assert_eq!(rows.iter().map(|r| r.unit_id).collect::<Vec<_>>(), vec![Some(1), Some(2), Some(3)]);
        assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[tokio::test]
    async fn test_ties_ordered_by_id() {
        let rows = stats(&[(9, Some(0), 1.0), (4, Some(0), 1.0), (6, Some(0), 1.0)], None).await;
        assert_eq!(rows.iter().map(|r| r.unit_id).collect::<Vec<_>>(), vec![Some(4), Some(6), Some(9)]);
    }

    #[tokio::test]
    async fn test_limit() {
        let rows = stats(&sample(), Some(2)).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].unit_id, Some(1));
    }

    #[tokio::test]
    async fn test_rounding_is_applied() {
        let rows = stats(&[(5, Some(1), 1000.123), (5, Some(1), 1000.456), (5, Some(0), 1000.0)], None).await;
        assert_eq!(rows[0].efficiency, 0.6667);
        assert_eq!(rows[0].average_rating, 1000.19);
        assert_eq!(rows[0].median_rating, 1000.12);
        // Min/max are reported as stored
        assert_eq!(rows[0].max_rating, 1000.456);
    }

    #[tokio::test]
    async fn test_records_without_id_are_grouped() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("unit_id", DataType::Int64, true),
            Field::new("killed_count", DataType::Int64, false),
            Field::new("player_rating", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(1), None, Some(1), None, Some(0)])),
                Arc::new(Int64Array::from(vec![1, 2, 0, 4, 1])),
                Arc::new(Float64Array::from(vec![10.0, 20.0, 30.0, 40.0, 50.0])),
            ],
        )
        .unwrap();
        let query = UnitQuery::new();
        query.register_batch(batch).unwrap();

        let rows = query.unit_stats(None).await.unwrap();

        assert_eq!(rows.iter().map(|r| r.count).sum::<i64>(), 5);
        // Equal counts: real ids first, the id-less group last
        assert_eq!(
            rows.iter().map(|r| r.unit_id).collect::<Vec<_>>(),
            vec![Some(1), None, Some(0)]
        );
        let missing = &rows[1];
        assert_eq!(missing.count, 2);
        assert_eq!(missing.total_kills, 6);
        assert_eq!(missing.median_rating, 30.0);
        // Id 0 is a real unit, not the id-less group
        assert_eq!(rows[2].unit_id, Some(0));
        assert_eq!(rows[2].count, 1);
    }

    #[tokio::test]
    async fn test_converted_csv_with_blank_id_keeps_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("battles.csv");
        std::fs::write(
            &csv,
            "unit_id,killed_count,player_rating\n1,1,10\n,2,20\n1,0,30\n",
        )
        .unwrap();

        let conversion = crate::convert::convert_csv_to_parquet(&csv).await.unwrap();
        let rows = analyze_units(&conversion.output_path, None).await.unwrap();

        assert_eq!(conversion.rows, 3);
        assert_eq!(rows.iter().map(|r| r.count).sum::<i64>(), 3);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].unit_id, rows[0].count), (Some(1), 2));
        assert_eq!((rows[1].unit_id, rows[1].count), (None, 1));
        assert_eq!(rows[1].total_kills, 2);
    }

    #[tokio::test]
    async fn test_missing_column_is_query_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("unit_id", DataType::Int64, false)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1, 2]))]).unwrap();
        let query = UnitQuery::new();
        query.register_batch(batch).unwrap();

        let err = query.unit_stats(None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Query(_)));
    }

    #[tokio::test]
    async fn test_analyze_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze_units(&dir.path().join("missing.parquet"), None).await;
        assert!(result.is_err());
    }
}
