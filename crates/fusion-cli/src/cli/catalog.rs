//! Catalog commands: product list, product detail, categories, reviews.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use fusion_types::catalog::{NewReview, Product, ProductId, Review};

use crate::cli::output::{
    format_time, notice, page_request_error, paginate, print_json, print_page_footer, spinner, success,
};
use crate::state::AppState;

fn stock_cell(quantity: u32) -> Cell {
    match quantity {
        0 => Cell::new("out of stock").fg(Color::Red),
        1..=5 => Cell::new(format!("{quantity} left")).fg(Color::Yellow),
        _ => Cell::new(quantity),
    }
}

fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Category").fg(Color::Cyan),
            Cell::new("Price").fg(Color::Cyan),
            Cell::new("Stock").fg(Color::Cyan),
        ]);
    for product in products {
        table.add_row(vec![
            Cell::new(product.id),
            Cell::new(&product.name),
            Cell::new(&product.category),
            Cell::new(format!("${}", product.price)),
            stock_cell(product.quantity),
        ]);
    }
    table
}

/// List one page of the catalog.
pub async fn list_products(state: &AppState, page: u32, json: bool) -> Result<()> {
    let spinner = spinner("Loading products...");
    let result = state.api.list_products(page).await;
    spinner.finish_and_clear();
    let products = result.map_err(|e| page_request_error(e, page))?;

    if json {
        return print_json(&products);
    }
    if products.is_empty() {
        notice("No products found.");
        return Ok(());
    }

    let paginator = paginate(products.count, state.config.page_size, page)?;
    println!();
    println!("{}", product_table(&products.results));
    println!();
    print_page_footer(&paginator, "fusion products");
    Ok(())
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn print_reviews(reviews: &[Review]) {
    println!("  {}", style("Reviews").bold().underlined());
    if reviews.is_empty() {
        println!("  {}", style("No reviews yet. Be the first!").dim());
        println!();
        return;
    }
    for review in reviews {
        let author = if review.user.first_name.is_empty() {
            &review.user.email
        } else {
            &review.user.first_name
        };
        println!(
            "  {} {}  {}",
            style(stars(review.rating)).yellow(),
            style(author).cyan(),
            style(format_time(&review.created_at)).dim()
        );
        println!("    {}", review.text);
    }
    println!();
}

/// Product detail with reviews and recommendations.
///
/// Reviews and recommendations are secondary: if either request fails the
/// product is still shown.
pub async fn show_product(state: &AppState, id: i64, json: bool) -> Result<()> {
    let id = ProductId(id);
    let spinner = spinner("Loading product...");
    let (product, reviews, recommended) = tokio::join!(
        state.api.get_product(id),
        state.api.list_reviews(id),
        state.api.recommendations(id),
    );
    spinner.finish_and_clear();
    let product = product?;

    let reviews = reviews.map(|page| page.results).unwrap_or_else(|e| {
        tracing::warn!(product = %id, error = %e, "could not load reviews");
        Vec::new()
    });
    let recommended = recommended.unwrap_or_else(|e| {
        tracing::debug!(product = %id, error = %e, "no recommendations");
        Vec::new()
    });

    if json {
        return print_json(&serde_json::json!({
            "product": product,
            "reviews": reviews,
            "recommendations": recommended,
        }));
    }

    println!();
    println!("  {}", style(&product.name).cyan().bold());
    println!("  {}", style(&product.category).dim());
    println!();
    println!("  {}  ${}", style("Price:").bold(), product.price);
    println!(
        "  {}  {}",
        style("Stock:").bold(),
        if product.quantity == 0 {
            style("out of stock".to_string()).red()
        } else {
            style(product.quantity.to_string())
        }
    );
    if !product.description.is_empty() {
        println!();
        for line in product.description.lines() {
            println!("  {line}");
        }
    }
    println!();
    print_reviews(&reviews);

    if !recommended.is_empty() {
        println!("  {}", style("You might also like").bold().underlined());
        println!("{}", product_table(&recommended));
        println!();
    }
    println!(
        "  {}",
        style(format!("Add to cart with: fusion cart add {}", product.id)).dim()
    );
    println!();
    Ok(())
}

pub async fn list_categories(state: &AppState, json: bool) -> Result<()> {
    let categories = state.api.list_categories().await?;

    if json {
        return print_json(&categories.results);
    }
    if categories.is_empty() {
        notice("No categories defined.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Slug").fg(Color::Cyan),
        ]);
    for category in &categories.results {
        table.add_row(vec![
            Cell::new(category.id),
            Cell::new(&category.name),
            Cell::new(&category.slug).fg(Color::DarkGrey),
        ]);
    }
    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn add_review(state: &AppState, product: i64, rating: u8, text: String, json: bool) -> Result<()> {
    state.require_login()?;
    let review = state
        .api
        .add_review(ProductId(product), &NewReview { rating, text })
        .await?;

    if json {
        return print_json(&review);
    }
    success(format!("Review posted ({})", style(stars(review.rating)).yellow()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_are_clamped() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
        assert_eq!(stars(0), "☆☆☆☆☆");
    }
}
