//! Query and aggregation shapes over the item index.
//!
//! Every call is stateless request/response: a fresh searcher is taken per
//! call, the engine executes the query, and results are deserialized back
//! into `Item`s. Ranking, range matching, pagination, ordering, and the
//! aggregation tree are all the engine's work.

use std::ops::Bound;

use tantivy::aggregation::agg_req::Aggregations;
use tantivy::aggregation::AggregationCollector;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, Query, QueryParser, RangeQuery, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{DocAddress, Order, Searcher, TantivyDocument, Term};
use tracing::debug;

use catalogdb_core::error::{Error, Result};
use catalogdb_core::traits::ItemSearch;
use catalogdb_core::types::{
    BrandBucket, Item, ItemId, ItemPage, PageRequest, ScoredItem, SortDirection, SortField,
};

use crate::index::{engine_err, ItemIndex};

/// Terms-aggregation bucket ceiling, far above any realistic brand count.
const MAX_BRAND_BUCKETS: u32 = 65_000;

impl ItemIndex {
    fn searcher(&self) -> Result<Searcher> {
        let reader = self.index.reader().map_err(engine_err)?;
        Ok(reader.searcher())
    }

    fn title_query(&self, phrase: &str) -> Result<Box<dyn Query>> {
        let parser = QueryParser::for_index(&self.index, vec![self.f_title]);
        parser
            .parse_query(phrase)
            .map_err(|e| Error::MalformedQuery(e.to_string()))
    }

    fn item_at(&self, searcher: &Searcher, addr: DocAddress) -> Result<Item> {
        let doc: TantivyDocument = searcher.doc(addr).map_err(engine_err)?;
        let id = doc
            .get_first(self.f_id)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| Error::Engine("stored document is missing its id".to_string()))?;
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let price = doc
            .get_first(self.f_price)
            .and_then(|v| v.as_f64())
            .unwrap_or_default();
        Ok(Item {
            id,
            title: text(self.f_title),
            category: text(self.f_category),
            brand: text(self.f_brand),
            price,
            images: text(self.f_images),
        })
    }

    fn items_at(&self, searcher: &Searcher, addrs: Vec<DocAddress>) -> Result<Vec<Item>> {
        addrs
            .into_iter()
            .map(|addr| self.item_at(searcher, addr))
            .collect()
    }

    pub(crate) fn get_by_id(&self, id: ItemId) -> Result<Option<Item>> {
        let searcher = self.searcher()?;
        let query = TermQuery::new(
            Term::from_field_u64(self.f_id, id),
            IndexRecordOption::Basic,
        );
        let top = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(engine_err)?;
        match top.into_iter().next() {
            Some((_score, addr)) => Ok(Some(self.item_at(&searcher, addr)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn all_items(&self) -> Result<Vec<Item>> {
        let searcher = self.searcher()?;
        let limit = searcher.num_docs().max(1) as usize;
        let top = searcher
            .search(&AllQuery, &TopDocs::with_limit(limit))
            .map_err(engine_err)?;
        self.items_at(&searcher, top.into_iter().map(|(_s, a)| a).collect())
    }

    /// Inclusive on both bounds. An inverted range matches nothing, the
    /// same as an empty value range; non-finite bounds are rejected.
    pub(crate) fn price_between_inclusive(&self, low: f64, high: f64) -> Result<Vec<Item>> {
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::MalformedQuery(format!(
                "non-finite price range {low}..{high}"
            )));
        }
        if low > high {
            return Ok(Vec::new());
        }
        let query = RangeQuery::new(
            Bound::Included(Term::from_field_f64(self.f_price, low)),
            Bound::Included(Term::from_field_f64(self.f_price, high)),
        );
        let searcher = self.searcher()?;
        let limit = searcher.num_docs().max(1) as usize;
        let top = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(engine_err)?;
        self.items_at(&searcher, top.into_iter().map(|(_s, a)| a).collect())
    }

    fn brand_terms_request(with_avg: bool) -> serde_json::Value {
        let mut terms = serde_json::json!({
            "terms": { "field": "brand", "size": MAX_BRAND_BUCKETS }
        });
        if with_avg {
            terms["aggs"] = serde_json::json!({
                "avg_price": { "avg": { "field": "price" } }
            });
        }
        serde_json::json!({ "brands": terms })
    }

    /// Run the brand terms aggregation (optionally with the nested avg
    /// metric) and flatten the engine's result tree into buckets.
    fn run_brand_aggregation(&self, with_avg: bool) -> Result<Vec<BrandBucket>> {
        let request: Aggregations =
            serde_json::from_value(Self::brand_terms_request(with_avg))
                .map_err(|e| Error::MalformedQuery(e.to_string()))?;
        let searcher = self.searcher()?;
        let collector = AggregationCollector::from_aggs(request, Default::default());
        let result = searcher.search(&AllQuery, &collector).map_err(engine_err)?;
        let tree = serde_json::to_value(result).map_err(engine_err)?;
        debug!(with_avg, "brand aggregation executed");

        let buckets = tree["brands"]["buckets"]
            .as_array()
            .ok_or_else(|| Error::Engine("aggregation result is missing brand buckets".to_string()))?;
        buckets
            .iter()
            .map(|bucket| {
                let brand = bucket["key"]
                    .as_str()
                    .ok_or_else(|| Error::Engine("bucket key is not a string".to_string()))?
                    .to_string();
                let count = bucket["doc_count"].as_u64().unwrap_or_default();
                let avg_price = bucket["avg_price"]["value"].as_f64();
                Ok(BrandBucket {
                    brand,
                    count,
                    avg_price,
                })
            })
            .collect()
    }
}

impl ItemSearch for ItemIndex {
    fn match_title(&self, phrase: &str, limit: usize) -> Result<Vec<ScoredItem>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let searcher = self.searcher()?;
        let query = self.title_query(phrase)?;
        let top = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(engine_err)?;
        top.into_iter()
            .map(|(score, addr)| {
                Ok(ScoredItem {
                    score,
                    item: self.item_at(&searcher, addr)?,
                })
            })
            .collect()
    }

    fn match_title_page(&self, phrase: &str, page: PageRequest) -> Result<ItemPage> {
        if page.size == 0 {
            return Err(Error::MalformedQuery("page size must be positive".to_string()));
        }
        let searcher = self.searcher()?;
        let query = self.title_query(phrase)?;
        let collector = (
            Count,
            TopDocs::with_limit(page.size).and_offset(page.offset()),
        );
        let (total, top) = searcher.search(&query, &collector).map_err(engine_err)?;
        let items = self.items_at(&searcher, top.into_iter().map(|(_s, a)| a).collect())?;
        Ok(ItemPage {
            total: total as u64,
            items,
        })
    }

    fn match_title_sorted(
        &self,
        phrase: &str,
        field: SortField,
        direction: SortDirection,
        limit: usize,
    ) -> Result<Vec<Item>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let searcher = self.searcher()?;
        let query = self.title_query(phrase)?;
        match field {
            SortField::Price => {
                let order = match direction {
                    SortDirection::Asc => Order::Asc,
                    SortDirection::Desc => Order::Desc,
                };
                let collector =
                    TopDocs::with_limit(limit).order_by_fast_field::<f64>("price", order);
                let top = searcher.search(&query, &collector).map_err(engine_err)?;
                self.items_at(&searcher, top.into_iter().map(|(_p, a)| a).collect())
            }
            // The engine's ordering collector covers numeric fast fields;
            // keyword fields are ordered by their stored value.
            SortField::Brand | SortField::Category => {
                let top = searcher
                    .search(&query, &TopDocs::with_limit(limit))
                    .map_err(engine_err)?;
                let mut items =
                    self.items_at(&searcher, top.into_iter().map(|(_s, a)| a).collect())?;
                items.sort_by(|a, b| {
                    let ord = match field {
                        SortField::Brand => a.brand.cmp(&b.brand),
                        _ => a.category.cmp(&b.category),
                    };
                    match direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                });
                Ok(items)
            }
        }
    }

    fn brand_buckets(&self) -> Result<Vec<BrandBucket>> {
        self.run_brand_aggregation(false)
    }

    fn brand_buckets_with_avg_price(&self) -> Result<Vec<BrandBucket>> {
        self.run_brand_aggregation(true)
    }
}
