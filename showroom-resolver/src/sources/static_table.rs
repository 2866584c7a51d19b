use std::collections::HashMap;

use async_trait::async_trait;
use showroom_core::{Category, Entity, SourceError, Specification};

use super::{Candidate, SourceAdapter, SourceKind};

/// Fixed map from known ids to fully formed entities.
#[derive(Debug, Clone, Default)]
pub struct StaticTableSource {
    entries: HashMap<String, Entity>,
}

impl StaticTableSource {
    pub const LABEL: &'static str = "static-table";

    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            entries: entities.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Table holding the demo catalogue.
    pub fn seeded() -> Self {
        Self::new(seed_entities())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entries.get(id)
    }
}

#[async_trait]
impl SourceAdapter for StaticTableSource {
    fn label(&self) -> &str {
        Self::LABEL
    }

    fn kind(&self) -> SourceKind {
        SourceKind::StaticTable
    }

    async fn fetch(&self, id: &str) -> Result<Option<Candidate>, SourceError> {
        Ok(self.entries.get(id).cloned().map(Candidate::Entity))
    }
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: f64,
    discount_price: Option<f64>,
    stock: u32,
    category: (&'static str, &'static str),
    rating: f64,
    review_count: u32,
    specifications: &'static [(&'static str, &'static str)],
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "680c9f52ab11e96a288ef710",
        name: "Elegant Wooden Sofa",
        description: "Three-seat sofa with a solid beech frame that folds out into a double bed.",
        price: 1299.0,
        discount_price: Some(1099.0),
        stock: 8,
        category: ("680c9481ab11e96a288ef6d2", "Sofa Beds"),
        rating: 4.6,
        review_count: 24,
        specifications: &[("Material", "Beech, linen"), ("Seats", "3")],
    },
    Seed {
        id: "680c9f58ab11e96a288ef714",
        name: "Oak Dining Table",
        description: "Extendable dining table in oiled oak, seats six to eight.",
        price: 899.0,
        discount_price: None,
        stock: 5,
        category: ("680c9484ab11e96a288ef6da", "Tables"),
        rating: 4.8,
        review_count: 17,
        specifications: &[("Material", "Solid oak"), ("Length", "180-240 cm")],
    },
    Seed {
        id: "680c9f5dab11e96a288ef718",
        name: "Modern Accent Chair",
        description: "Upholstered lounge chair with walnut legs.",
        price: 349.0,
        discount_price: Some(299.0),
        stock: 14,
        category: ("680c9486ab11e96a288ef6de", "Chairs"),
        rating: 4.3,
        review_count: 31,
        specifications: &[("Material", "Walnut, boucle"), ("Seat height", "42 cm")],
    },
    Seed {
        id: "680c9f63ab11e96a288ef71c",
        name: "Two-Door Wardrobe",
        description: "Wardrobe with hanging rail and four internal shelves.",
        price: 749.0,
        discount_price: None,
        stock: 3,
        category: ("680c9489ab11e96a288ef6e2", "Wardrobes"),
        rating: 4.1,
        review_count: 9,
        specifications: &[("Material", "Ash veneer"), ("Height", "200 cm")],
    },
    Seed {
        id: "680c9f69ab11e96a288ef720",
        name: "Queen Platform Bed",
        description: "Low platform bed with a slatted base, no box spring needed.",
        price: 999.0,
        discount_price: Some(899.0),
        stock: 6,
        category: ("680c948bab11e96a288ef6e6", "Beds"),
        rating: 4.7,
        review_count: 42,
        specifications: &[("Material", "Pine"), ("Mattress size", "160 x 200 cm")],
    },
];

/// The demo catalogue served when every live source is down.
pub fn seed_entities() -> Vec<Entity> {
    SEEDS
        .iter()
        .map(|seed| Entity {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            price: seed.price,
            discount_price: seed.discount_price,
            stock: seed.stock,
            images: vec![format!("/images/products/{}.jpg", seed.id)],
            category: Category::new(seed.category.0, seed.category.1),
            ratings_average: seed.rating,
            review_count: seed.review_count,
            specifications: seed
                .specifications
                .iter()
                .map(|(name, value)| Specification::new(*name, *value))
                .collect(),
            reviews: Vec::new(),
        })
        .collect()
}
