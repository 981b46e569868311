use std::collections::HashMap;

use tempfile::TempDir;

use catalogdb_core::error::Error;
use catalogdb_core::fixtures;
use catalogdb_core::traits::{ItemRepository, ItemSearch};
use catalogdb_core::types::Item;
use catalogdb_index::ItemIndex;

fn seeded() -> (TempDir, ItemIndex) {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("items");
    let store = ItemIndex::create(&dir).expect("create index");
    store
        .save_all(&fixtures::reference_catalog())
        .expect("seed catalog");
    (tmp, store)
}

#[test]
fn create_on_existing_index_fails() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("items");
    let _store = ItemIndex::create(&dir).expect("create index");

    let err = ItemIndex::create(&dir).expect_err("second create must fail");
    assert!(matches!(err, Error::IndexAlreadyExists(_)));
    assert!(!err.is_transient());
}

#[test]
fn drop_then_open_fails_with_not_found() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("items");
    let _store = ItemIndex::create(&dir).expect("create index");

    ItemIndex::drop_index(&dir).expect("drop index");
    let err = ItemIndex::open(&dir).expect_err("open after drop must fail");
    assert!(matches!(err, Error::IndexNotFound(_)));

    let err = ItemIndex::drop_index(&dir).expect_err("double drop must fail");
    assert!(matches!(err, Error::IndexNotFound(_)));
}

#[test]
fn open_before_create_fails_with_not_found() {
    let tmp = TempDir::new().expect("tempdir");
    let err = ItemIndex::open(&tmp.path().join("nowhere")).expect_err("open must fail");
    assert!(matches!(err, Error::IndexNotFound(_)));
}

#[test]
fn fresh_index_is_empty() {
    let tmp = TempDir::new().expect("tempdir");
    let store = ItemIndex::create(&tmp.path().join("items")).expect("create index");
    assert!(store.find_all().expect("find_all").is_empty());
    assert!(store.find_by_id(1).expect("find_by_id").is_none());
}

#[test]
fn save_round_trips_every_field() {
    let (_tmp, store) = seeded();
    let expected = fixtures::reference_catalog().remove(0);

    let got = store
        .find_by_id(1)
        .expect("find_by_id")
        .expect("item 1 present");
    // The non-indexed images field still comes back from stored source.
    assert_eq!(got, expected);
}

#[test]
fn resaving_the_same_item_keeps_one_document() {
    let (_tmp, store) = seeded();
    let first = fixtures::reference_catalog().remove(0);

    store.save(&first).expect("resave");
    let all = store.find_all().expect("find_all");
    assert_eq!(all.len(), 8);
    assert_eq!(all.iter().filter(|i| i.id == first.id).count(), 1);
}

#[test]
fn update_is_a_full_overwrite() {
    let (_tmp, store) = seeded();

    store.save(&fixtures::renamed_iphone()).expect("update");
    let got = store
        .find_by_id(4)
        .expect("find_by_id")
        .expect("item 4 present");
    assert_eq!(got.title, "苹果手机");
    assert_eq!(got.price, 8999.00);
    assert_eq!(store.find_all().expect("find_all").len(), 8);
}

#[test]
fn duplicate_ids_in_a_batch_collapse_to_last_write() {
    let tmp = TempDir::new().expect("tempdir");
    let store = ItemIndex::create(&tmp.path().join("items")).expect("create index");

    let early = Item::new(1, "华为手机", "手机", "华为", 4999.00, fixtures::IMAGE_URL);
    let late = Item::new(1, "华为Mate40", "手机", "华为", 6999.00, fixtures::IMAGE_URL);
    store.save_all(&[early, late.clone()]).expect("bulk save");

    let all = store.find_all().expect("find_all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], late);
}

#[test]
fn match_query_returns_only_titles_containing_the_term() {
    let (_tmp, store) = seeded();

    let hits = store.match_title("华为手机", 10).expect("match");
    let ids: Vec<u64> = hits.iter().map(|h| h.item.id).collect();
    assert_eq!(ids, vec![1]);
    assert!(hits[0].score > 0.0);
}

#[test]
fn stored_only_images_never_drive_matches() {
    let (_tmp, store) = seeded();

    // Every document carries "13123" in its image URL; none has it in the title.
    assert!(store.match_title("13123", 10).expect("match").is_empty());
    assert!(store.match_title("13123.jpg", 10).expect("match").is_empty());
}

#[test]
fn price_between_is_inclusive_on_both_bounds() {
    let (_tmp, store) = seeded();
    store
        .save_all(&[
            Item::new(101, "edge under", "手机", "edge", 999.99, fixtures::IMAGE_URL),
            Item::new(102, "edge low", "手机", "edge", 1000.00, fixtures::IMAGE_URL),
            Item::new(103, "edge high", "手机", "edge", 4000.00, fixtures::IMAGE_URL),
            Item::new(104, "edge over", "手机", "edge", 4000.01, fixtures::IMAGE_URL),
        ])
        .expect("edge docs");

    let mut ids: Vec<u64> = store
        .find_by_price_between(1000.00, 4000.00)
        .expect("range")
        .iter()
        .map(|i| i.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![2, 3, 5, 6, 7, 102, 103]);
}

#[test]
fn inverted_price_range_matches_nothing() {
    let (_tmp, store) = seeded();
    assert!(store
        .find_by_price_between(4000.00, 1000.00)
        .expect("range")
        .is_empty());
}

#[test]
fn negative_price_is_rejected_before_the_engine() {
    let (_tmp, store) = seeded();

    let bad = Item::new(200, "negative", "手机", "edge", -1.0, fixtures::IMAGE_URL);
    let err = store.save(&bad).expect_err("negative price must be rejected");
    assert!(matches!(err, Error::InvalidDocument(_)));

    // A rejected document aborts the whole batch before commit.
    let good = Item::new(201, "positive", "手机", "edge", 1.0, fixtures::IMAGE_URL);
    let err = store
        .save_all(&[good, bad])
        .expect_err("batch with bad document must fail");
    assert!(matches!(err, Error::InvalidDocument(_)));
    assert_eq!(store.find_all().expect("find_all").len(), 8);
}

#[test]
fn brand_buckets_count_every_brand() {
    let (_tmp, store) = seeded();

    let buckets = store.brand_buckets().expect("aggregation");
    let by_brand: HashMap<String, u64> =
        buckets.iter().map(|b| (b.brand.clone(), b.count)).collect();

    let expected: HashMap<String, u64> = [
        ("华为".to_string(), 3),
        ("小米".to_string(), 2),
        ("Apple".to_string(), 2),
        ("锤子".to_string(), 1),
    ]
    .into_iter()
    .collect();
    assert_eq!(by_brand, expected);
    assert!(buckets.iter().all(|b| b.avg_price.is_none()));
}

#[test]
fn nested_avg_price_equals_the_arithmetic_mean_per_bucket() {
    let (_tmp, store) = seeded();

    let buckets = store.brand_buckets_with_avg_price().expect("aggregation");
    let by_brand: HashMap<String, f64> = buckets
        .iter()
        .map(|b| (b.brand.clone(), b.avg_price.expect("avg requested")))
        .collect();

    let expected = [
        ("华为", (4999.00 + 3999.00 + 2999.00) / 3.0),
        ("小米", 1999.00),
        ("Apple", (8999.00 + 5999.00) / 2.0),
        ("锤子", 3999.00),
    ];
    assert_eq!(by_brand.len(), expected.len());
    for (brand, avg) in expected {
        let got = by_brand[brand];
        assert!((got - avg).abs() < 1e-6, "{brand}: {got} != {avg}");
    }
}
