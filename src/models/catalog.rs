//! Catalog entities: service → category → subcategory → product.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// A relation the backend sends either as a bare id or as an embedded
/// document. Compare through [`EntityRef::id`], never the raw shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Embedded(EmbeddedRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Id(id) => id,
            EntityRef::Embedded(embedded) => &embedded.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            EntityRef::Id(_) => None,
            EntityRef::Embedded(embedded) => embedded.name.as_deref(),
        }
    }
}

impl From<&str> for EntityRef {
    fn from(id: &str) -> Self {
        EntityRef::Id(id.to_string())
    }
}

impl From<String> for EntityRef {
    fn from(id: String) -> Self {
        EntityRef::Id(id)
    }
}

/// Deserialize a relation field straight to its bare id.
pub(crate) fn ref_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    EntityRef::deserialize(deserializer).map(|r| r.id().to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, alias = "service", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<EntityRef>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// One service with its categories and their subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullTree {
    pub service: Service,
    #[serde(default)]
    pub categories: Vec<CategoryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub category: Category,
    #[serde(default)]
    pub subcategories: Vec<SubcategoryNode>,
}

/// Subcategories arrive wrapped (`{ subcategory: {...} }`) or flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubcategoryNode {
    Wrapped { subcategory: Subcategory },
    Flat(Subcategory),
}

impl SubcategoryNode {
    pub fn subcategory(&self) -> &Subcategory {
        match self {
            SubcategoryNode::Wrapped { subcategory } => subcategory,
            SubcategoryNode::Flat(subcategory) => subcategory,
        }
    }
}

// Admin payloads. Fields left `None` are not sent, so the same type serves
// create and partial update.

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubcategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_ref_accepts_both_shapes() {
        let bare: EntityRef = serde_json::from_value(json!("c1")).unwrap();
        let embedded: EntityRef =
            serde_json::from_value(json!({"_id": "c1", "name": "Groceries"})).unwrap();
        assert_eq!(bare.id(), "c1");
        assert_eq!(embedded.id(), "c1");
        assert_eq!(embedded.name(), Some("Groceries"));
        assert_eq!(bare.name(), None);
    }

    #[test]
    fn test_product_tolerates_embedded_relations() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Basmati Rice",
            "price": 120.5,
            "stock": 4,
            "serviceId": "svc1",
            "category": {"_id": "c1", "name": "Grains", "createdAt": "2024-01-01"},
            "subcategory": "s1"
        }))
        .unwrap();

        assert_eq!(product.service_id.as_ref().map(EntityRef::id), Some("svc1"));
        assert_eq!(product.category.as_ref().map(EntityRef::id), Some("c1"));
        assert_eq!(product.subcategory.as_ref().map(EntityRef::id), Some("s1"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_full_tree_accepts_flat_and_wrapped_subcategories() {
        let tree: FullTree = serde_json::from_value(json!({
            "service": {"_id": "svc1", "name": "Grocery"},
            "categories": [{
                "category": {"_id": "c1", "name": "Grains"},
                "subcategories": [
                    {"subcategory": {"_id": "s1", "name": "Rice"}},
                    {"_id": "s2", "name": "Lentils"}
                ]
            }]
        }))
        .unwrap();

        let names: Vec<&str> = tree.categories[0]
            .subcategories
            .iter()
            .map(|n| n.subcategory().name.as_str())
            .collect();
        assert_eq!(names, vec!["Rice", "Lentils"]);
    }

    #[test]
    fn test_partial_update_skips_unset_fields() {
        let input = ProductInput {
            price: Some(99.0),
            ..ProductInput::default()
        };
        assert_eq!(serde_json::to_value(input).unwrap(), json!({"price": 99.0}));
    }
}
