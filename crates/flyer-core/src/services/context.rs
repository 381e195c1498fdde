//! Render context derivation
//!
//! Maps one resolved `ProductRecord` into the flat field set the renderer
//! consumes. All long-text fields leave here already cut to budget.

use crate::config::ContentConfig;
use crate::content::{balance_content, truncate_markup};
use crate::error::{FlyerError, Result};
use chrono::{Datelike, NaiveDate, Utc};
use flyer_types::{ContentBudget, ProductRecord, RenderContext, VariantLine};

/// Build the render context for one record. Fails only for a record with
/// no SKU; every field derivation below falls back instead of erroring.
pub fn build_context(record: &ProductRecord, content: &ContentConfig) -> Result<RenderContext> {
    if record.sku.is_empty() {
        return Err(FlyerError::Input("product record has no SKU".to_string()));
    }

    let budget = ContentBudget::new(content.total_chars, content.min_ratio)
        .map_err(FlyerError::Config)?;

    let (book_desc, about_author) = balance_content(
        record.metafield("custom_about_the_book"),
        record.metafield("custom_about_the_author"),
        &budget,
    );

    let toc = truncate_markup(record.metafield("custom_table_of_contents"), content.toc_chars);

    let variants = record
        .variants
        .iter()
        .map(|v| VariantLine {
            isbn: v.sku.clone(),
            title: v.title.clone(),
            price: v.price.clone(),
            edition: v.edition.clone(),
        })
        .collect();

    Ok(RenderContext {
        product_title: if record.title.is_empty() {
            "Untitled Product".to_string()
        } else {
            record.title.clone()
        },
        product_image: record.image_url.clone(),
        product_category: record.product_type.clone(),
        subject: clean_subject(record.metafield("custom_subject")),
        publisher: record.metafield("custom_publisher").to_string(),
        publisher_imprint: record.metafield("custom_imprint").to_string(),
        publishing_date: format_long_date(record.metafield("custom_publication_date")),
        pages: record.metafield("custom_pages").to_string(),
        volume: record.metafield("custom_volume").to_string(),
        author: join_authors(record),
        isbn: record.sku.clone(),
        price: record.price.clone(),
        edition: record.edition.clone().unwrap_or_default(),
        variants,
        book_desc,
        about_author,
        toc,
        current_year: Utc::now().year(),
    })
}

/// Strip list-literal decoration from the subject metafield and re-join
/// the comma-separated tokens: `["History", "Asia"]` becomes
/// `History, Asia`.
fn clean_subject(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();

    stripped
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join up to three author metafield slots, skipping blanks
fn join_authors(record: &ProductRecord) -> String {
    ["custom_author", "custom_author_2", "custom_author_3"]
        .iter()
        .map(|key| record.metafield(key))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reformat a `YYYY-MM-DD` date to long form, e.g. `March 5, 2024`.
/// Anything unparseable passes through unchanged.
fn format_long_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
