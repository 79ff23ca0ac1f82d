//! Built-in rule tables for the known pages
//!
//! | Page                    | Driver             | Explicit rule         |
//! |-------------------------|--------------------|-----------------------|
//! | `accounts`              | `filter-field`     | `role`                |
//! | `categories`            | `filter-field`     | `category`            |
//! | `movements`             | `transaction-type` | `inflow`, `in`        |
//! | `movements-with-amount` | `transaction-type` | `inflow`, `in`        |
//! | `products`              | `type`             | `food`                |

use crate::error::RuleError;
use crate::rules::{Effect, ExclusivityGroup, Page, PageSet, RuleTable};

pub const FILTER_FIELD: &str = "filter-field";
pub const FILTER_VALUE_NAME: &str = "value";
pub const VALUE_TEXT: &str = "value-text";
pub const VALUE_ROLE: &str = "value-role";
pub const VALUE_CATEGORY: &str = "value-category";

pub const TRANSACTION_TYPE: &str = "transaction-type";
pub const INGREDIENT_SELECT: &str = "ingredient-select";
pub const PRODUCT_SELECT: &str = "product-select";
pub const PRODUCT_AMOUNT: &str = "product-amount";

pub const PRODUCT_TYPE: &str = "type";
pub const INGREDIENTS: &str = "ingredients";
pub const QUANTITY: &str = "quantity";

/// Every built-in page
pub fn builtin() -> Result<PageSet, RuleError> {
    Ok(PageSet::new(vec![
        accounts()?,
        categories()?,
        movements()?,
        movements_with_amount()?,
        products()?,
    ]))
}

/// Account list filter: the role select replaces the free-text input
pub fn accounts() -> Result<Page, RuleError> {
    filter_page("accounts", "role", VALUE_ROLE)
}

/// Category list filter: the category select replaces the free-text input
pub fn categories() -> Result<Page, RuleError> {
    filter_page("categories", "category", VALUE_CATEGORY)
}

/// Filter forms submit one `value`: either typed text or a picked option.
fn filter_page(page: &str, select_value: &str, select: &str) -> Result<Page, RuleError> {
    let group = ExclusivityGroup::new(FILTER_VALUE_NAME, [VALUE_TEXT, select])?;

    let pick = Effect::builder()
        .show(select)
        .hide(VALUE_TEXT)
        .activate(group.activate(select)?)
        .build()?;
    let typed = Effect::builder()
        .show(VALUE_TEXT)
        .hide(select)
        .activate(group.activate(VALUE_TEXT)?)
        .build()?;

    let rules = RuleTable::new(typed).with_rule(select_value, pick)?;
    Ok(Page::new(page, FILTER_FIELD, rules))
}

/// Movement form: inflows pick ingredients, outflows pick products
pub fn movements() -> Result<Page, RuleError> {
    movement_page("movements", &[PRODUCT_SELECT])
}

/// Movement form variant where the product amount toggles with the product
pub fn movements_with_amount() -> Result<Page, RuleError> {
    movement_page("movements-with-amount", &[PRODUCT_SELECT, PRODUCT_AMOUNT])
}

fn movement_page(page: &str, product_controls: &[&str]) -> Result<Page, RuleError> {
    let inflow = Effect::builder()
        .show(INGREDIENT_SELECT)
        .hide_all(product_controls.iter().copied())
        .build()?;
    let outflow = Effect::builder()
        .show_all(product_controls.iter().copied())
        .hide(INGREDIENT_SELECT)
        .build()?;

    let rules = RuleTable::new(outflow).with_rule_for(["inflow", "in"], inflow)?;
    Ok(Page::new(page, TRANSACTION_TYPE, rules))
}

/// Product form: food is made from ingredients, anything else has a quantity
pub fn products() -> Result<Page, RuleError> {
    let food = Effect::builder()
        .show(INGREDIENTS)
        .hide(QUANTITY)
        .build()?;
    let other = Effect::builder()
        .show(QUANTITY)
        .hide(INGREDIENTS)
        .build()?;

    let rules = RuleTable::new(other).with_rule("food", food)?;
    Ok(Page::new("products", PRODUCT_TYPE, rules))
}
