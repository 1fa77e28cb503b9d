//! Typed bindings for the backend REST endpoints.

use fusion_types::auth::{Credentials, Identity, Registration, ThirdPartyLogin, TokenPair, User, UserId};
use fusion_types::cart::CartItem;
use fusion_types::catalog::{
    Category, GenerateContentRequest, GeneratedContent, NewReview, Product, ProductForm,
    ProductId, Review,
};
use fusion_types::chat::ChatMessage;
use fusion_types::document::Document;
use fusion_types::error::ApiError;
use fusion_types::inventory::InventoryInsight;
use fusion_types::order::{Order, PaymentIntent, PaymentIntentRequest};
use fusion_types::page::Page;
use fusion_types::upload::FileUpload;
use serde::Serialize;

use super::client::ApiClient;
use super::transport::{ApiRequest, FormPart, HttpTransport, Method};

fn json_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("could not encode request: {e}")))
}

fn product_parts(form: &ProductForm) -> Vec<FormPart> {
    let mut parts = vec![
        FormPart::text("name", &form.name),
        FormPart::text("category", &form.category),
        FormPart::text("price", &form.price),
        FormPart::text("quantity", form.quantity.to_string()),
        FormPart::text("description", &form.description),
    ];
    let optional = [
        ("ai_meta_title", &form.ai_meta_title),
        ("ai_meta_description", &form.ai_meta_description),
        ("ai_keywords", &form.ai_keywords),
        ("ai_tags", &form.ai_tags),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            parts.push(FormPart::text(name, value));
        }
    }
    if let Some(image) = &form.image {
        parts.push(FormPart::file("image", image.clone()));
    }
    parts
}

impl<T: HttpTransport> ApiClient<T> {
    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Password login. On success the session holds the new tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        let request = ApiRequest::new(Method::Post, "/auth/token/").json(json_body(credentials)?);
        let tokens: TokenPair = self.call(&request).await?;
        self.install(tokens)
    }

    /// Exchange a third-party identity token for a session.
    pub async fn login_third_party(&self, login: &ThirdPartyLogin) -> Result<Identity, ApiError> {
        let request = ApiRequest::new(Method::Post, "/auth/google/").json(json_body(login)?);
        let tokens: TokenPair = self.call(&request).await?;
        self.install(tokens)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User, ApiError> {
        let request =
            ApiRequest::new(Method::Post, "/auth/register/").json(json_body(registration)?);
        self.call(&request).await
    }

    fn install(&self, tokens: TokenPair) -> Result<Identity, ApiError> {
        self.session()
            .set_tokens(&tokens.access, Some(&tokens.refresh))
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub async fn list_products(&self, page: u32) -> Result<Page<Product>, ApiError> {
        self.call(&ApiRequest::get("/products/").query("page", page))
            .await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.call(&ApiRequest::get(format!("/products/{id}/"))).await
    }

    pub async fn list_categories(&self) -> Result<Page<Category>, ApiError> {
        self.call(&ApiRequest::get("/products/categories/")).await
    }

    pub async fn recommendations(&self, id: ProductId) -> Result<Vec<Product>, ApiError> {
        self.call(&ApiRequest::get(format!("/products/{id}/recommendations/")))
            .await
    }

    pub async fn list_reviews(&self, id: ProductId) -> Result<Page<Review>, ApiError> {
        self.call(&ApiRequest::get(format!("/products/{id}/reviews/")))
            .await
    }

    pub async fn add_review(&self, id: ProductId, review: &NewReview) -> Result<Review, ApiError> {
        let request = ApiRequest::new(Method::Post, format!("/products/{id}/reviews/"))
            .json(json_body(review)?);
        self.call(&request).await
    }

    // ------------------------------------------------------------------
    // Orders and payment
    // ------------------------------------------------------------------

    pub async fn list_orders(&self, page: u32) -> Result<Page<Order>, ApiError> {
        self.call(&ApiRequest::get("/orders/").query("page", page))
            .await
    }

    /// Ask the backend for a payment handle covering `items`.
    pub async fn create_payment_intent(&self, items: &[CartItem]) -> Result<PaymentIntent, ApiError> {
        let request = ApiRequest::new(Method::Post, "/orders/create-payment-intent/")
            .json(json_body(&PaymentIntentRequest { items })?);
        self.call(&request).await
    }

    // ------------------------------------------------------------------
    // Admin back-office
    // ------------------------------------------------------------------

    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, ApiError> {
        let request = ApiRequest::new(Method::Post, "/products/admin/manage/")
            .multipart(product_parts(form));
        self.call(&request).await
    }

    /// Partial update; the image part is omitted when `form.image` is `None`.
    pub async fn update_product(&self, id: ProductId, form: &ProductForm) -> Result<Product, ApiError> {
        let request = ApiRequest::new(Method::Patch, format!("/products/admin/manage/{id}/"))
            .multipart(product_parts(form));
        self.call(&request).await
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.call_empty(&ApiRequest::new(
            Method::Delete,
            format!("/products/admin/manage/{id}/"),
        ))
        .await
    }

    pub async fn generate_content(
        &self,
        input: &GenerateContentRequest,
    ) -> Result<GeneratedContent, ApiError> {
        let request = ApiRequest::new(Method::Post, "/products/admin/generate-content/").multipart(vec![
            FormPart::text("name", &input.name),
            FormPart::text("category", &input.category),
            FormPart::file("image", input.image.clone()),
        ]);
        self.call(&request).await
    }

    pub async fn inventory_insights(&self) -> Result<Vec<InventoryInsight>, ApiError> {
        self.call(&ApiRequest::get("/products/admin/inventory-insights/"))
            .await
    }

    pub async fn list_documents(&self) -> Result<Page<Document>, ApiError> {
        self.call(&ApiRequest::get("/qa/documents/")).await
    }

    pub async fn upload_document(&self, file: FileUpload) -> Result<Document, ApiError> {
        let request = ApiRequest::new(Method::Post, "/qa/documents/")
            .multipart(vec![FormPart::file("file", file)]);
        self.call(&request).await
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), ApiError> {
        self.call_empty(&ApiRequest::new(Method::Delete, format!("/qa/documents/{id}/")))
            .await
    }

    pub async fn chat_history(&self, customer_id: UserId) -> Result<Page<ChatMessage>, ApiError> {
        self.call(&ApiRequest::get(format!("/chat/history/{customer_id}/")))
            .await
    }
}
