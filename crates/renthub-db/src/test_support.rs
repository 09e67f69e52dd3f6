//! Shared fixtures for the async repository and lifecycle tests.

use renthub_core::{CallerIdentity, NewListing};

use crate::pool::{Database, DbConfig};

pub const OWNER: &str = "owner-1";
pub const RENTER: &str = "renter-1";
pub const OTHER: &str = "renter-2";

const PROFILES: &[(&str, &str, &str, &str, &str)] = &[
    (OWNER, "Olive Owner", "olive@example.com", "555-0100", "Karachi"),
    (RENTER, "Rafi Renter", "rafi@example.com", "555-0101", "Lahore"),
    (OTHER, "Tara Tenant", "tara@example.com", "555-0102", "Islamabad"),
];

/// Fresh in-memory database with the three test users registered.
pub async fn database() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    register_users(&db).await;
    db
}

pub async fn register_users(db: &Database) {
    for (id, name, email, phone, city) in PROFILES {
        db.users()
            .register(id, name, email, phone, city)
            .await
            .unwrap();
    }
}

pub fn identity(user_id: &str) -> CallerIdentity {
    let (id, name, email, phone, city) = PROFILES
        .iter()
        .find(|p| p.0 == user_id)
        .copied()
        .unwrap();
    CallerIdentity {
        user_id: id.to_string(),
        fullname: name.to_string(),
        email: Some(email.to_string()),
        phone: phone.to_string(),
        city: city.to_string(),
    }
}

pub fn tent() -> NewListing {
    NewListing {
        title: "Camping Tent".to_string(),
        category: "Outdoor".to_string(),
        description: "Four-person dome tent".to_string(),
        price_per_hour_cents: Some(300),
        price_per_day_cents: Some(2500),
        deposit_cents: Some(5000),
        images: vec!["/uploads/tent-1.jpg".to_string()],
        ..NewListing::default()
    }
}
