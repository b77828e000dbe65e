//! The product catalog and the providers it is loaded from.
//!
//! A [`Catalog`] is loaded once at start-up from a [`CatalogProvider`] and is
//! never mutated afterwards. Filtering is a pure function of the catalog and
//! a [`CatalogFilter`].

use std::collections::BTreeSet;
use std::path::PathBuf;

use reqwest::Client as ReqwestClient;

use crate::error::{Error, Result};
use crate::types::{CatalogDocument, Product, ProductId};

/// A source of catalog products.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch every product. Any failure is reported as `CatalogUnavailable`.
    async fn fetch(&self) -> Result<Vec<Product>>;
}

/// Reads the catalog document from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    /// Creates a provider reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for FileCatalog {
    async fn fetch(&self) -> Result<Vec<Product>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::catalog_unavailable(
                format!("failed to read {}: {e}", self.path.display()),
                Some(Box::new(e)),
            )
        })?;
        parse_document(&content)
    }
}

/// Fetches the catalog document with a GET request.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: ReqwestClient,
    url: url::Url,
}

impl HttpCatalog {
    /// Creates a provider fetching from `url`.
    pub fn new(url: &str) -> Result<Self> {
        let url = url::Url::parse(url)?;
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::catalog_unavailable(
                format!("failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self { client, url })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for HttpCatalog {
    async fn fetch(&self) -> Result<Vec<Product>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| {
                Error::catalog_unavailable(format!("request failed: {e}"), Some(Box::new(e)))
            })?;
        if !response.status().is_success() {
            return Err(Error::catalog_unavailable(
                format!("catalog returned {}", response.status()),
                None,
            ));
        }
        let content = response.text().await.map_err(|e| {
            Error::catalog_unavailable(format!("failed to read body: {e}"), Some(Box::new(e)))
        })?;
        parse_document(&content)
    }
}

fn parse_document(content: &str) -> Result<Vec<Product>> {
    serde_json::from_str::<CatalogDocument>(content)
        .map(|doc| doc.products)
        .map_err(|e| {
            Error::catalog_unavailable(format!("malformed catalog: {e}"), Some(Box::new(e)))
        })
}

/// The loaded product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates a catalog from an already-loaded product list.
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Loads the catalog from a provider.
    pub async fn load(provider: &dyn CatalogProvider) -> Result<Self> {
        let products = provider.fetch().await?;
        tracing::debug!(count = products.len(), "catalog loaded");
        Ok(Self::new(products))
    }

    /// Every product, in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Returns true if `id` names a catalog product.
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Returns true if the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Sorted, de-duplicated categories for the category filter.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Products matching `filter`, in catalog order.
    ///
    /// The returned iterator is lazy and can be cloned to restart it.
    pub fn filter(&self, filter: &CatalogFilter) -> Filtered<'_> {
        Filtered {
            products: self.products.iter(),
            category: filter.category().map(str::to_string),
            search: filter.search().map(str::to_lowercase),
        }
    }
}

/// Category and search-term constraints over the catalog.
///
/// Both are trimmed; an empty value is the same as no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    category: Option<String>,
    search: Option<String>,
}

impl CatalogFilter {
    /// Creates a filter from optional category and search term.
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        Self {
            category: normalize(category),
            search: normalize(search),
        }
    }

    /// Sets the exact category to match.
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = normalize(category);
        self
    }

    /// Sets the search term.
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = normalize(search);
        self
    }

    /// The active category, if any.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The active search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns true if `product` satisfies both constraints.
    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.as_deref().map(str::to_lowercase);
        matches(product, self.category.as_deref(), search.as_deref())
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn matches(product: &Product, category: Option<&str>, lowered_search: Option<&str>) -> bool {
    let category_ok = category.is_none_or(|c| product.category == c);
    let search_ok = lowered_search.is_none_or(|term| {
        format!("{} {}", product.brand, product.name)
            .to_lowercase()
            .contains(term)
    });
    category_ok && search_ok
}

/// Iterator over the products matching a [`CatalogFilter`].
#[derive(Debug, Clone)]
pub struct Filtered<'a> {
    products: std::slice::Iter<'a, Product>,
    category: Option<String>,
    search: Option<String>,
}

impl<'a> Iterator for Filtered<'a> {
    type Item = &'a Product;

    fn next(&mut self) -> Option<Self::Item> {
        let category = self.category.as_deref();
        let search = self.search.as_deref();
        self.products.find(|p| matches(p, category, search))
    }
}

/// Title-cases each space-separated word of a category for display.
pub fn format_category(category: &str) -> String {
    category
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: ProductId, brand: &str, name: &str, category: &str) -> Product {
        Product {
            id,
            brand: brand.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            description: format!("{name} description"),
            image: format!("https://example.com/{id}.png"),
        }
    }

    pub(crate) fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            product(1, "CeraVe", "Foaming Facial Cleanser", "cleanser"),
            product(2, "La Roche-Posay", "Anthelios Sunscreen", "suncare"),
            product(3, "Lancôme", "Advanced Génifique Serum", "skincare"),
            product(4, "CeraVe", "Moisturizing Cream", "moisturizer"),
            product(5, "Garnier", "Micellar Cleansing Water", "cleanser"),
        ])
    }

    fn ids(filtered: Filtered<'_>) -> Vec<ProductId> {
        filtered.map(|p| p.id).collect()
    }

    #[test]
    fn no_filter_yields_everything() {
        let catalog = sample_catalog();
        assert_eq!(
            ids(catalog.filter(&CatalogFilter::default())),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn category_is_exact() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new(Some("cleanser"), None);
        assert_eq!(ids(catalog.filter(&filter)), vec![1, 5]);
        let filter = CatalogFilter::new(Some("clean"), None);
        assert!(ids(catalog.filter(&filter)).is_empty());
    }

    #[test]
    fn search_spans_brand_and_name_case_insensitively() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new(None, Some("cerave moist"));
        assert_eq!(ids(catalog.filter(&filter)), vec![4]);
        let filter = CatalogFilter::new(None, Some("CLEANS"));
        assert_eq!(ids(catalog.filter(&filter)), vec![1, 5]);
    }

    #[test]
    fn category_and_search_combine() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new(Some("cleanser"), Some("garnier"));
        assert_eq!(ids(catalog.filter(&filter)), vec![5]);
        assert!(filter.matches(catalog.get(5).unwrap()));
        assert!(!filter.matches(catalog.get(1).unwrap()));
    }

    #[test]
    fn blank_filters_are_ignored() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new(Some("  "), Some("\t"));
        assert_eq!(filter, CatalogFilter::default());
        assert_eq!(ids(catalog.filter(&filter)).len(), 5);
    }

    #[test]
    fn filtered_iterator_restarts_by_clone() {
        let catalog = sample_catalog();
        let filter = CatalogFilter::new(None, Some("cerave"));
        let first = catalog.filter(&filter);
        let again = first.clone();
        assert_eq!(ids(first), ids(again));
    }

    #[test]
    fn categories_sorted_unique() {
        assert_eq!(
            sample_catalog().categories(),
            vec!["cleanser", "moisturizer", "skincare", "suncare"]
        );
    }

    #[test]
    fn format_category_title_cases_words() {
        assert_eq!(format_category("hair care"), "Hair Care");
        assert_eq!(format_category("suncare"), "Suncare");
        assert_eq!(format_category(""), "");
    }

    #[tokio::test]
    async fn file_catalog_reports_unavailable() {
        let missing = FileCatalog::new("/nonexistent/routine-builder/products.json");
        let err = Catalog::load(&missing).await.unwrap_err();
        assert!(err.is_catalog_unavailable());
    }

    #[tokio::test]
    async fn http_catalog_reports_unreachable_host() {
        assert!(HttpCatalog::new("not a url").is_err());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = HttpCatalog::new(&format!("http://{addr}/products.json")).unwrap();
        let err = Catalog::load(&provider).await.unwrap_err();
        assert!(err.is_catalog_unavailable());
    }

    #[tokio::test]
    async fn file_catalog_rejects_malformed_payload() {
        let path = std::env::temp_dir().join(format!(
            "routine-builder-catalog-{}.json",
            std::process::id()
        ));
        tokio::fs::write(&path, r#"{"items": []}"#).await.unwrap();
        let err = Catalog::load(&FileCatalog::new(&path)).await.unwrap_err();
        assert!(err.is_catalog_unavailable());

        tokio::fs::write(
            &path,
            r#"{"products": [{"id": 9, "brand": "B", "name": "N", "category": "c", "description": "d", "image": "i"}]}"#,
        )
        .await
        .unwrap();
        let catalog = Catalog::load(&FileCatalog::new(&path)).await.unwrap();
        assert!(catalog.contains(9));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
