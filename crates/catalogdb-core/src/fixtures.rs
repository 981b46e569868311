//! The reference catalog used by the CLI seed command and scenario tests.

use crate::types::Item;

pub const IMAGE_URL: &str = "http://image.badcode.icu/13123.jpg";

/// Eight phones across four brands, prices 1999.00 to 8999.00.
pub fn reference_catalog() -> Vec<Item> {
    vec![
        Item::new(1, "华为手机", "手机", "华为", 4999.00, IMAGE_URL),
        Item::new(2, "坚果手机R1", "手机", "锤子", 3999.00, IMAGE_URL),
        Item::new(3, "小米手机", "手机", "小米", 1999.00, IMAGE_URL),
        Item::new(4, "iphone手机", "手机", "Apple", 8999.00, IMAGE_URL),
        Item::new(5, "华为V30", "手机", "华为", 3999.00, IMAGE_URL),
        Item::new(6, "华为P10", "手机", "华为", 2999.00, IMAGE_URL),
        Item::new(7, "小米X5", "手机", "小米", 1999.00, IMAGE_URL),
        Item::new(8, "iphone11", "手机", "Apple", 5999.00, IMAGE_URL),
    ]
}

/// The overwrite scenario: id 4 re-saved under a new title.
pub fn renamed_iphone() -> Item {
    Item::new(4, "苹果手机", "手机", "Apple", 8999.00, IMAGE_URL)
}
