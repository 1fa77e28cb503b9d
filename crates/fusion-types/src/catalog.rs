//! Product catalog types: products, categories, reviews, admin forms.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::money::Price;
use crate::upload::FileUpload;

/// Product primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product as served by the public catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Category name (the backend accepts and returns names, not ids).
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Units in stock.
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ai_meta_title: Option<String>,
    #[serde(default)]
    pub ai_meta_description: Option<String>,
    #[serde(default)]
    pub ai_keywords: Option<String>,
    #[serde(default)]
    pub ai_tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Reviewer summary nested inside a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user: ReviewAuthor,
    pub rating: u8,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /products/{id}/reviews/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    pub text: String,
}

/// Admin product create/update form, sent as multipart.
///
/// `image` is optional on update; when absent the field is omitted so the
/// existing image is kept.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub quantity: u32,
    pub description: String,
    pub image: Option<FileUpload>,
    pub ai_meta_title: Option<String>,
    pub ai_meta_description: Option<String>,
    pub ai_keywords: Option<String>,
    pub ai_tags: Option<String>,
}

/// Input for AI content generation.
#[derive(Debug, Clone)]
pub struct GenerateContentRequest {
    pub name: String,
    pub category: String,
    pub image: FileUpload,
}

/// AI-generated product copy returned by the back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub description: String,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: String,
    pub tags: String,
}
