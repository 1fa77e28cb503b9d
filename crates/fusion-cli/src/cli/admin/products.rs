//! Product management: create, update, delete, AI copy generation.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use console::style;
use dialoguer::Confirm;

use fusion_types::catalog::{GenerateContentRequest, GeneratedContent, Product, ProductForm, ProductId};
use fusion_types::money::Price;

use crate::cli::output::{print_json, read_upload, spinner, success};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum ProductCommand {
    /// Create a product.
    Create {
        #[arg(long)]
        name: String,

        /// Category name.
        #[arg(long)]
        category: String,

        /// Unit price, e.g. 19.99.
        #[arg(long)]
        price: String,

        /// Units in stock.
        #[arg(long, default_value = "0")]
        quantity: u32,

        #[arg(long, default_value = "")]
        description: String,

        /// Path to the product image.
        #[arg(long)]
        image: Option<String>,

        /// Fill description and SEO fields with generated copy (needs --image).
        #[arg(long, requires = "image")]
        generate: bool,

        #[command(flatten)]
        seo: SeoArgs,
    },

    /// Update a product. Omitted fields keep their current value.
    Update {
        /// Product id.
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        quantity: Option<u32>,

        #[arg(long)]
        description: Option<String>,

        /// Replace the product image.
        #[arg(long)]
        image: Option<String>,

        #[command(flatten)]
        seo: SeoArgs,
    },

    /// Delete a product.
    #[command(alias = "rm")]
    Delete {
        /// Product id.
        id: i64,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

/// Optional SEO fields shared by create and update.
#[derive(Args, Default)]
pub struct SeoArgs {
    #[arg(long)]
    pub meta_title: Option<String>,

    #[arg(long)]
    pub meta_description: Option<String>,

    /// Comma-separated keywords.
    #[arg(long)]
    pub keywords: Option<String>,

    /// Comma-separated tags.
    #[arg(long)]
    pub tags: Option<String>,
}

impl SeoArgs {
    fn apply(self, form: &mut ProductForm) {
        if self.meta_title.is_some() {
            form.ai_meta_title = self.meta_title;
        }
        if self.meta_description.is_some() {
            form.ai_meta_description = self.meta_description;
        }
        if self.keywords.is_some() {
            form.ai_keywords = self.keywords;
        }
        if self.tags.is_some() {
            form.ai_tags = self.tags;
        }
    }
}

pub async fn handle_product_command(cmd: ProductCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        ProductCommand::Create {
            name,
            category,
            price,
            quantity,
            description,
            image,
            generate,
            seo,
        } => {
            let mut form = ProductForm {
                name,
                category,
                price: validated_price(&price)?,
                quantity,
                description,
                ..ProductForm::default()
            };
            if let Some(path) = image.as_deref() {
                form.image = Some(read_upload(path).await?);
            }
            if generate {
                let content = generate_copy(state, &form).await?;
                apply_generated(&mut form, content);
            }
            seo.apply(&mut form);
            create_product(state, &form, json).await
        }
        ProductCommand::Update {
            id,
            name,
            category,
            price,
            quantity,
            description,
            image,
            seo,
        } => {
            let id = ProductId(id);
            let current = state
                .api
                .get_product(id)
                .await
                .with_context(|| format!("Product {id} not found"))?;
            let mut form = form_from_product(&current);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(category) = category {
                form.category = category;
            }
            if let Some(price) = price {
                form.price = validated_price(&price)?;
            }
            if let Some(quantity) = quantity {
                form.quantity = quantity;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(path) = image.as_deref() {
                form.image = Some(read_upload(path).await?);
            }
            seo.apply(&mut form);
            update_product(state, id, &form, json).await
        }
        ProductCommand::Delete { id, force } => delete_product(state, ProductId(id), force, json).await,
    }
}

/// Normalized price text; rejects anything that is not a plain amount.
fn validated_price(raw: &str) -> Result<String> {
    let price: Price = raw
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid price '{raw}': {e}"))?;
    Ok(price.to_string())
}

/// Editable form pre-filled from a product. The image is left out so an
/// update keeps the stored one.
fn form_from_product(product: &Product) -> ProductForm {
    ProductForm {
        name: product.name.clone(),
        category: product.category.clone(),
        price: product.price.to_string(),
        quantity: product.quantity,
        description: product.description.clone(),
        image: None,
        ai_meta_title: product.ai_meta_title.clone(),
        ai_meta_description: product.ai_meta_description.clone(),
        ai_keywords: product.ai_keywords.clone(),
        ai_tags: product.ai_tags.clone(),
    }
}

fn apply_generated(form: &mut ProductForm, content: GeneratedContent) {
    form.description = content.description;
    form.ai_meta_title = Some(content.meta_title);
    form.ai_meta_description = Some(content.meta_description);
    form.ai_keywords = Some(content.keywords);
    form.ai_tags = Some(content.tags);
}

async fn generate_copy(state: &AppState, form: &ProductForm) -> Result<GeneratedContent> {
    let image = form
        .image
        .clone()
        .context("An image is required to generate content")?;
    let spinner = spinner("Generating product copy...");
    let result = state
        .api
        .generate_content(&GenerateContentRequest {
            name: form.name.clone(),
            category: form.category.clone(),
            image,
        })
        .await;
    spinner.finish_and_clear();
    Ok(result?)
}

fn print_saved(verb: &str, product: &Product) {
    success(format!(
        "{verb} product #{} {} (${}, {} in stock)",
        product.id,
        style(&product.name).cyan(),
        product.price,
        product.quantity
    ));
}

async fn create_product(state: &AppState, form: &ProductForm, json: bool) -> Result<()> {
    let spinner = spinner("Creating product...");
    let result = state.api.create_product(form).await;
    spinner.finish_and_clear();
    let product = result?;

    if json {
        return print_json(&product);
    }
    print_saved("Created", &product);
    Ok(())
}

async fn update_product(state: &AppState, id: ProductId, form: &ProductForm, json: bool) -> Result<()> {
    let spinner = spinner("Saving product...");
    let result = state.api.update_product(id, form).await;
    spinner.finish_and_clear();
    let product = result?;

    if json {
        return print_json(&product);
    }
    print_saved("Updated", &product);
    Ok(())
}

async fn delete_product(state: &AppState, id: ProductId, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete product {id}? This cannot be undone"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.api.delete_product(id).await?;

    if json {
        return print_json(&serde_json::json!({ "deleted": true, "id": id }));
    }
    success(format!("Deleted product {id}"));
    Ok(())
}

/// Standalone copy generation; prints the draft without saving anything.
pub async fn generate_content(
    state: &AppState,
    name: String,
    category: String,
    image: &str,
    json: bool,
) -> Result<()> {
    let form = ProductForm {
        name,
        category,
        image: Some(read_upload(image).await?),
        ..ProductForm::default()
    };
    let content = generate_copy(state, &form).await?;

    if json {
        return print_json(&content);
    }
    println!();
    println!("  {}", style("Generated content").bold().underlined());
    println!();
    println!("  {}  {}", style("Meta title:").bold(), content.meta_title);
    println!("  {}  {}", style("Meta description:").bold(), content.meta_description);
    println!("  {}  {}", style("Keywords:").bold(), content.keywords);
    println!("  {}  {}", style("Tags:").bold(), content.tags);
    println!();
    for line in content.description.lines() {
        println!("  {line}");
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        serde_json::from_str(
            r#"{"id":4,"category":"Kitchen","name":"Mug","description":"Blue","price":"19.99",
                "quantity":3,"image":"http://x/mug.png","ai_tags":"mug,blue"}"#,
        )
        .unwrap()
    }

    #[test]
    fn price_is_normalized() {
        assert_eq!(validated_price("5").unwrap(), "5.00");
        assert_eq!(validated_price("19.9").unwrap(), "19.90");
        assert!(validated_price("abc").is_err());
    }

    #[test]
    fn form_keeps_fields_and_drops_image() {
        let form = form_from_product(&product());
        assert_eq!(form.name, "Mug");
        assert_eq!(form.price, "19.99");
        assert_eq!(form.ai_tags.as_deref(), Some("mug,blue"));
        assert!(form.image.is_none());
    }

    #[test]
    fn seo_args_override_only_given_fields() {
        let mut form = form_from_product(&product());
        SeoArgs {
            meta_title: Some("Blue Mug".to_string()),
            ..SeoArgs::default()
        }
        .apply(&mut form);
        assert_eq!(form.ai_meta_title.as_deref(), Some("Blue Mug"));
        assert_eq!(form.ai_tags.as_deref(), Some("mug,blue"));
    }

    #[test]
    fn generated_content_fills_form() {
        let mut form = ProductForm::default();
        apply_generated(
            &mut form,
            GeneratedContent {
                description: "A sturdy mug.".to_string(),
                meta_title: "Mug".to_string(),
                meta_description: "Sturdy mug".to_string(),
                keywords: "mug".to_string(),
                tags: "kitchen".to_string(),
            },
        );
        assert_eq!(form.description, "A sturdy mug.");
        assert_eq!(form.ai_keywords.as_deref(), Some("mug"));
    }
}
