//! Demo catalog and accounts for local development.
//!
//! Every insert is guarded by an existence check, so running the seed again
//! leaves the database unchanged.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    models::Role,
    services::auth_service::create_user,
};

pub const DESIGNER_EMAIL: &str = "designer@example.com";
pub const DESIGNER_PASSWORD: &str = "Designer123!";
pub const CLIENT_EMAIL: &str = "client@example.com";
pub const CLIENT_PASSWORD: &str = "Client123!";

const CATEGORIES: [(&str, &str); 3] = [
    ("Website templates", "Ready-made site layouts"),
    ("Logo design", "Brand marks and identity kits"),
    ("Consultations", "Sessions with a designer"),
];

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    category: &'static str,
    is_service: bool,
}

const PRODUCTS: [DemoProduct; 3] = [
    DemoProduct {
        name: "Portfolio landing page",
        description: "Single-page portfolio template with contact form",
        price: 490_000,
        category: "Website templates",
        is_service: false,
    },
    DemoProduct {
        name: "Minimal logo pack",
        description: "Three logo concepts with source files",
        price: 1_250_000,
        category: "Logo design",
        is_service: false,
    },
    DemoProduct {
        name: "Design consultation",
        description: "One-hour session reviewing your brand or site",
        price: 300_000,
        category: "Consultations",
        is_service: true,
    },
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub categories_created: usize,
    pub products_created: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.users_created == 0 && self.categories_created == 0 && self.products_created == 0
    }
}

/// Insert demo accounts, categories and products that are not present yet.
/// Reference data (roles, order statuses) comes from migrations.
pub async fn seed_demo_data<C: ConnectionTrait>(db: &C) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    for (email, password, name, role) in [
        (DESIGNER_EMAIL, DESIGNER_PASSWORD, "Studio Designer", Role::Designer),
        (CLIENT_EMAIL, CLIENT_PASSWORD, "Demo Client", Role::Client),
    ] {
        let exists = Users::find()
            .filter(UserCol::Email.eq(email))
            .one(db)
            .await?
            .is_some();
        if !exists {
            create_user(db, name, email, password, role).await?;
            tracing::info!(email, role = role.as_str(), "seeded user");
            report.users_created += 1;
        }
    }

    for (name, description) in CATEGORIES {
        let exists = Categories::find()
            .filter(CategoryCol::Name.eq(name))
            .one(db)
            .await?
            .is_some();
        if !exists {
            CategoryActive {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
                created_at: Set(Utc::now()),
            }
            .insert(db)
            .await?;
            tracing::info!(name, "seeded category");
            report.categories_created += 1;
        }
    }

    for product in &PRODUCTS {
        let exists = Products::find()
            .filter(ProdCol::Name.eq(product.name))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let category_id = Categories::find()
            .filter(CategoryCol::Name.eq(product.category))
            .one(db)
            .await?
            .map(|c| c.id);

        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(product.name.to_string()),
            description: Set(Some(product.description.to_string())),
            price: Set(product.price),
            category_id: Set(category_id),
            is_service: Set(product.is_service),
            is_active: Set(true),
            image_url: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
        tracing::info!(name = product.name, "seeded product");
        report.products_created += 1;
    }

    Ok(report)
}
