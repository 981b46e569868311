//! Domain types shared by the index binding and its callers.

use serde::{Deserialize, Serialize};

pub type ItemId = u64;

/// A catalog entry as stored in the search index.
///
/// - `id`: unique document identifier, the upsert key
/// - `title`: full-text analyzed product title
/// - `category`/`brand`: exact-match keyword facets
/// - `price`: sortable, rangeable, aggregatable; must be non-negative
/// - `images`: stored verbatim, never indexed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub images: String,
}

impl Item {
    pub fn new(
        id: ItemId,
        title: &str,
        category: &str,
        brand: &str,
        price: f64,
        images: &str,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            category: category.to_string(),
            brand: brand.to_string(),
            price,
            images: images.to_string(),
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn of(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> usize {
        self.page * self.size
    }
}

/// One page of matches plus the total-hit count across all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPage {
    pub total: u64,
    pub items: Vec<Item>,
}

/// A match with the engine's relevance score. Higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem {
    pub score: f32,
    pub item: Item,
}

/// Fields carrying a sortable (non-analyzed) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Price,
    Brand,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One terms-aggregation bucket over `brand`. `avg_price` is populated
/// only when the nested metric was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandBucket {
    pub brand: String,
    pub count: u64,
    pub avg_price: Option<f64>,
}
