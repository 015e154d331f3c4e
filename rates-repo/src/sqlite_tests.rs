//! SQLite store integration tests.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    use rates_types::{CurrencyCode, RateSnapshot, RateStore};

    use crate::SqliteStore;

    async fn setup_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn snapshot(rates: &[(&str, Decimal)]) -> RateSnapshot {
        let mut snapshot = RateSnapshot::new(day(), code("EUR")).with_fetched_at(Utc::now());
        for (target, rate) in rates {
            snapshot.insert_rate(code(target), *rate).unwrap();
        }
        snapshot
    }

    #[tokio::test]
    async fn test_save_and_find_round_trip() {
        let store = setup_store().await;
        let original = snapshot(&[("USD", dec!(1.0876)), ("GBP", dec!(0.8551))]);

        store.save(&original).await.unwrap();
        let found = store.find(day(), code("EUR")).await.unwrap().unwrap();

        assert_eq!(found.date(), day());
        assert_eq!(found.base(), code("EUR"));
        assert_eq!(found.len(), 2);
        assert_eq!(found.rate(code("USD")), Some(dec!(1.0876)));
        assert_eq!(found.rate(code("GBP")), Some(dec!(0.8551)));
        assert!(found.fetched_at().is_some());
    }

    #[tokio::test]
    async fn test_find_missing_key_is_none() {
        let store = setup_store().await;

        let found = store.find(day(), code("USD")).await.unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_exists() {
        let store = setup_store().await;
        store.save(&snapshot(&[("USD", dec!(1.0876))])).await.unwrap();

        assert!(store.exists(day(), code("EUR")).await.unwrap());
        assert!(!store.exists(day(), code("USD")).await.unwrap());
        let other_day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        assert!(!store.exists(other_day, code("EUR")).await.unwrap());
    }

    #[tokio::test]
    async fn test_incremental_save_keeps_existing_entries() {
        let store = setup_store().await;
        store
            .save(&snapshot(&[("USD", dec!(1.0876)), ("GBP", dec!(0.8551))]))
            .await
            .unwrap();

        // A later gap-fill merge writes the combined snapshot.
        let mut merged = store.find(day(), code("EUR")).await.unwrap().unwrap();
        merged.insert_rate(code("JPY"), dec!(161.23)).unwrap();
        store.save(&merged).await.unwrap();

        let found = store.find(day(), code("EUR")).await.unwrap().unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found.rate(code("USD")), Some(dec!(1.0876)));
        assert_eq!(found.rate(code("JPY")), Some(dec!(161.23)));
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_entry() {
        // Pins last-write-wins on a shared (date, base, target) identity.
        let store = setup_store().await;
        store.save(&snapshot(&[("USD", dec!(1.0876))])).await.unwrap();

        store.save(&snapshot(&[("USD", dec!(1.0912))])).await.unwrap();

        let found = store.find(day(), code("EUR")).await.unwrap().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.rate(code("USD")), Some(dec!(1.0912)));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_entries() {
        let store = setup_store().await;
        store
            .save(&snapshot(&[("USD", dec!(1.0876)), ("GBP", dec!(0.8551))]))
            .await
            .unwrap();

        let removed = store.delete(day(), code("EUR")).await.unwrap();

        assert!(removed);
        assert!(store.find(day(), code("EUR")).await.unwrap().is_none());
        assert_eq!(store.count_entries(day(), code("EUR")).await.unwrap(), 0);
        assert!(store.find_rate(day(), code("EUR"), code("USD")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_reports_false() {
        let store = setup_store().await;

        assert!(!store.delete(day(), code("EUR")).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_rate_single_entry() {
        let store = setup_store().await;
        store
            .save(&snapshot(&[("USD", dec!(1.0876)), ("GBP", dec!(0.8551))]))
            .await
            .unwrap();

        let rate = store.find_rate(day(), code("EUR"), code("GBP")).await.unwrap();
        assert_eq!(rate, Some(dec!(0.8551)));

        let missing = store.find_rate(day(), code("EUR"), code("JPY")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_count_entries() {
        let store = setup_store().await;
        store
            .save(&snapshot(&[
                ("USD", dec!(1.0876)),
                ("GBP", dec!(0.8551)),
                ("CAD", dec!(1.4712)),
            ]))
            .await
            .unwrap();

        assert_eq!(store.count_entries(day(), code("EUR")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_high_precision_rate_round_trips_exactly() {
        let store = setup_store().await;
        let precise = Decimal::from_str("1.087654321987654321").unwrap();

        let mut original = RateSnapshot::new(day(), code("EUR"));
        original.insert_rate(code("USD"), precise).unwrap();
        store.save(&original).await.unwrap();

        let found = store.find(day(), code("EUR")).await.unwrap().unwrap();
        assert_eq!(found.rate(code("USD")), Some(precise));
    }

    #[tokio::test]
    async fn test_snapshots_are_keyed_per_base_currency() {
        let store = setup_store().await;
        store.save(&snapshot(&[("USD", dec!(1.0876))])).await.unwrap();

        let mut usd_based = RateSnapshot::new(day(), code("USD"));
        usd_based.insert_rate(code("EUR"), dec!(0.9195)).unwrap();
        store.save(&usd_based).await.unwrap();

        let eur = store.find(day(), code("EUR")).await.unwrap().unwrap();
        let usd = store.find(day(), code("USD")).await.unwrap().unwrap();
        assert_eq!(eur.rate(code("USD")), Some(dec!(1.0876)));
        assert_eq!(usd.rate(code("EUR")), Some(dec!(0.9195)));
    }
}
