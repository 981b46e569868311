//! Field mapping for the item index and the title analyzer.
//!
//! The mapping is deterministic and side-effect-free; it is applied when an
//! index is provisioned. `title` is the only analyzed field. `category` and
//! `brand` are raw keywords (fast, so they can drive aggregations and
//! exact-match terms). `images` is stored but never indexed.

use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

pub const TITLE_ANALYZER: &str = "title_text";

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_u64_field("id", INDEXED | STORED | FAST);

    let title_indexing = TextFieldIndexing::default()
        .set_tokenizer(TITLE_ANALYZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let title_options = TextOptions::default()
        .set_indexing_options(title_indexing)
        .set_stored();
    schema_builder.add_text_field("title", title_options);

    schema_builder.add_text_field("category", STRING | STORED | FAST);
    schema_builder.add_text_field("brand", STRING | STORED | FAST);
    schema_builder.add_f64_field("price", INDEXED | STORED | FAST);
    schema_builder.add_text_field("images", STORED);
    schema_builder.build()
}

/// Register the title analyzer on an opened index. Lowercased word
/// segmentation; contiguous CJK runs stay whole tokens.
pub fn register_title_analyzer(index: &Index) {
    let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .build();
    index.tokenizers().register(TITLE_ANALYZER, analyzer);
}
