//! Date-bucketed tips storage: one collection per publication day.

use chrono::NaiveDate;
use tracing::{info, warn};

use ct_core::dates::DateBucket;
use ct_core::{DocumentStore, Result, TipsRecord};

/// Store tips records into `<prefix>_<YYYY_MM_DD>` collections keyed by
/// article id. Each touched bucket is cleared first, so re-running the same
/// import never duplicates documents. Records whose date string does not
/// parse land in the generation-date bucket.
pub async fn store_tips_by_date(
    store: &dyn DocumentStore,
    records: &[TipsRecord],
    prefix: &str,
    generation_date: NaiveDate,
) -> Result<usize> {
    // group records by bucket, preserving first-seen bucket order
    let mut buckets: Vec<(String, Vec<&TipsRecord>)> = Vec::new();
    for record in records {
        let bucket = DateBucket::assign(&record.date, generation_date);
        if bucket.fell_back {
            warn!(
                article = %record.article_id,
                date = %record.date,
                "could not parse article date, using generation date"
            );
        }
        let collection = bucket.collection_name(prefix);
        match buckets.iter_mut().find(|(name, _)| *name == collection) {
            Some((_, members)) => members.push(record),
            None => buckets.push((collection, vec![record])),
        }
    }

    let mut stored = 0;
    for (collection, members) in buckets {
        let cleared = store.delete(&collection, None).await?;
        if cleared > 0 {
            info!(collection = %collection, count = cleared, "cleared existing documents");
        }
        for record in members {
            store.insert_one(&collection, record.to_document()).await?;
            stored += 1;
        }
        info!(collection = %collection, "stored tips bucket");
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::Tips;
    use ct_storage::MemoryStore;

    fn record(id: &str, date: &str) -> TipsRecord {
        TipsRecord {
            article_id: id.to_string(),
            title: format!("Article {}", id),
            tips: Tips {
                summary: "Issue.".to_string(),
                dos: vec!["Patch".to_string()],
                donts: vec!["Don't delay".to_string()],
            },
            source: "Unknown".to_string(),
            source_type: "unknown".to_string(),
            date: date.to_string(),
            generated_at: "2025-03-20".to_string(),
        }
    }

    fn generation_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    #[tokio::test]
    async fn test_records_land_in_date_buckets() {
        let store = MemoryStore::new();
        let records = vec![
            record("a", "20 March 2025"),
            record("b", "21 March 2025"),
            record("c", "garbled"),
        ];

        let stored = store_tips_by_date(&store, &records, "tips", generation_date())
            .await
            .unwrap();
        assert_eq!(stored, 3);

        let march_20 = store.find("tips_2025_03_20", None, None, None).await.unwrap();
        // "a" parsed, "c" fell back to the generation date
        assert_eq!(march_20.len(), 2);
        let march_21 = store.find("tips_2025_03_21", None, None, None).await.unwrap();
        assert_eq!(march_21.len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_does_not_duplicate() {
        let store = MemoryStore::new();
        let records = vec![record("a", "20 March 2025")];

        store_tips_by_date(&store, &records, "tips", generation_date())
            .await
            .unwrap();
        store_tips_by_date(&store, &records, "tips", generation_date())
            .await
            .unwrap();

        let docs = store.find("tips_2025_03_20", None, None, None).await.unwrap();
        assert_eq!(docs.len(), 1);
    }
}
