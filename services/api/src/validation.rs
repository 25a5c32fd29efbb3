//! Validation of car payloads
//!
//! Request bodies arrive as loose JSON. Every field is checked and every
//! violation is reported, so a client can fix a form in one round trip.

use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::models::{CarStatus, NewCar};

/// First production automobile
pub const MIN_YEAR: i64 = 1886;

/// NUMERIC(10, 2) upper bound
fn max_sale_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Latest accepted model year: next year
pub fn max_year() -> i64 {
    Utc::now().year() as i64 + 1
}

/// Validate the body of a create request
pub fn validate_new_car(body: &Value) -> Result<NewCar, Vec<String>> {
    let object = as_object(body)?;
    let mut fields = Fields::new(object);
    let car = fields.car(max_year());
    fields.finish(car)
}

/// Validate the body of an update request: all create fields plus an
/// optional `status` defaulting to active
pub fn validate_car_update(body: &Value) -> Result<(NewCar, CarStatus), Vec<String>> {
    let object = as_object(body)?;
    let mut fields = Fields::new(object);
    let car = fields.car(max_year());
    let status = fields.status();
    fields.finish((car, status))
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, Vec<String>> {
    body.as_object()
        .ok_or_else(|| vec!["Request body must be a JSON object".to_string()])
}

/// Accepts integers, including floats with no fractional part (`2022.0`)
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Accepts a JSON number or a numeric string
fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<String>,
}

impl<'a> Fields<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            errors: Vec::new(),
        }
    }

    fn car(&mut self, max_year: i64) -> NewCar {
        NewCar {
            year: self.integer(
                "year",
                MIN_YEAR..=max_year,
                &format!("Invalid year (expected {} to {})", MIN_YEAR, max_year),
            ),
            make: self.text("make", "Make", 100),
            model: self.text("model", "Model", 100),
            series: self.text("series", "Series", 100),
            mileage: self.integer("mileage", 0..=i32::MAX as i64, "Invalid mileage"),
            location_city: self.text("location_city", "City", 100),
            location_branch: self.text("location_branch", "Branch", 100),
            sale_price: self.sale_price(),
            stock_number: self.text("stock_number", "Stock number", 50),
            vin: self.text("vin", "VIN", 17),
            transmission: self.text("transmission", "Transmission", 50),
            fuel_type: self.text("fuel_type", "Fuel type", 50),
            cylinders: self.integer("cylinders", 1..=i32::MAX as i64, "Invalid number of cylinders"),
            photos: self.photos(),
        }
    }

    fn text(&mut self, key: &str, label: &str, max_len: usize) -> String {
        match self.object.get(key).and_then(Value::as_str).map(str::trim) {
            Some(value) if !value.is_empty() => {
                if value.chars().count() > max_len {
                    self.errors
                        .push(format!("{} must be at most {} characters", label, max_len));
                }
                value.to_string()
            }
            _ => {
                self.errors.push(format!("{} is required", label));
                String::new()
            }
        }
    }

    fn integer(&mut self, key: &str, range: RangeInclusive<i64>, message: &str) -> i32 {
        match self.object.get(key).and_then(as_integer) {
            Some(value) if range.contains(&value) => value as i32,
            _ => {
                self.errors.push(message.to_string());
                0
            }
        }
    }

    fn sale_price(&mut self) -> Decimal {
        match self.object.get("sale_price").and_then(as_decimal) {
            Some(price) if !price.is_sign_negative() && price <= max_sale_price() => {
                price.round_dp(2)
            }
            _ => {
                self.errors.push("Invalid sale price".to_string());
                Decimal::ZERO
            }
        }
    }

    /// An empty list is allowed; each entry must be a non-empty string
    fn photos(&mut self) -> Vec<String> {
        let object = self.object;
        let Some(items) = object.get("photos").and_then(Value::as_array) else {
            self.errors.push("Photos must be an array".to_string());
            return Vec::new();
        };

        let photos: Option<Vec<String>> = items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
            })
            .collect();

        photos.unwrap_or_else(|| {
            self.errors
                .push("Each photo must be a non-empty URL".to_string());
            Vec::new()
        })
    }

    fn status(&mut self) -> CarStatus {
        match self.object.get("status") {
            None | Some(Value::Null) => CarStatus::default(),
            Some(value) => match value.as_str().and_then(CarStatus::parse) {
                Some(status) => status,
                None => {
                    self.errors
                        .push("Invalid status (expected active or inactive)".to_string());
                    CarStatus::default()
                }
            },
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<String>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
