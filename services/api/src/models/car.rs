//! Car listing models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Visibility of a listing; only active cars reach the public catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    #[default]
    Active,
    Inactive,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Active => "active",
            CarStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(CarStatus::Active),
            "inactive" => Some(CarStatus::Inactive),
            _ => None,
        }
    }
}

/// A vehicle listing as held by the domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    pub id: i64,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub series: String,
    pub mileage: i32,
    pub location_city: String,
    pub location_branch: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sale_price: Decimal,
    pub stock_number: String,
    pub vin: String,
    pub transmission: String,
    pub fuel_type: String,
    pub cylinders: i32,
    pub photos: Vec<String>,
    pub status: CarStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Car as returned to clients, with the `price` and `fuelType` aliases
#[derive(Debug, Clone, Serialize)]
pub struct CarResponse {
    #[serde(flatten)]
    pub car: Car,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "fuelType")]
    pub fuel_type_alias: String,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            price: car.sale_price,
            fuel_type_alias: car.fuel_type.clone(),
            car,
        }
    }
}

/// Validated fields written on create and update
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub series: String,
    pub mileage: i32,
    pub location_city: String,
    pub location_branch: String,
    pub sale_price: Decimal,
    pub stock_number: String,
    pub vin: String,
    pub transmission: String,
    pub fuel_type: String,
    pub cylinders: i32,
    pub photos: Vec<String>,
}
