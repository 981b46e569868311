use crate::error::Result;
use crate::types::{
    BrandBucket, Item, ItemId, ItemPage, PageRequest, ScoredItem, SortDirection, SortField,
};

pub trait ItemRepository: Send + Sync {
    fn save(&self, item: &Item) -> Result<()>;
    fn save_all(&self, items: &[Item]) -> Result<()>;
    fn find_by_id(&self, id: ItemId) -> Result<Option<Item>>;
    fn find_all(&self) -> Result<Vec<Item>>;
    fn find_by_price_between(&self, low: f64, high: f64) -> Result<Vec<Item>>;
}

pub trait ItemSearch: Send + Sync {
    fn match_title(&self, phrase: &str, limit: usize) -> Result<Vec<ScoredItem>>;
    fn match_title_page(&self, phrase: &str, page: PageRequest) -> Result<ItemPage>;
    fn match_title_sorted(
        &self,
        phrase: &str,
        field: SortField,
        direction: SortDirection,
        limit: usize,
    ) -> Result<Vec<Item>>;
    fn brand_buckets(&self) -> Result<Vec<BrandBucket>>;
    fn brand_buckets_with_avg_price(&self) -> Result<Vec<BrandBucket>>;
}
