//! Car repository: listing queries and writes against the `cars` table
//!
//! Photos live in a single text column as a JSON array. Encoding and
//! decoding stay in this module; the rest of the service only sees
//! `Vec<String>`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, warn};

use super::StoreResult;
use crate::models::{Car, CarFilters, CarPage, CarStatus, NewCar, PageRequest};

const CAR_COLUMNS: &str = "id, year, make, model, series, mileage, location_city, \
    location_branch, sale_price, stock_number, vin, transmission, fuel_type, cylinders, \
    photos, status, created_at, updated_at";

/// Raw `cars` row
#[derive(Debug, FromRow)]
struct CarRow {
    id: i64,
    year: i32,
    make: String,
    model: String,
    series: String,
    mileage: i32,
    location_city: String,
    location_branch: String,
    sale_price: Decimal,
    stock_number: String,
    vin: String,
    transmission: String,
    fuel_type: String,
    cylinders: i32,
    photos: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        let photos = decode_photos(row.id, row.photos.as_deref());
        let status = CarStatus::parse(&row.status).unwrap_or_else(|| {
            warn!(car_id = row.id, status = %row.status, "Unknown car status, treating as inactive");
            CarStatus::Inactive
        });

        Car {
            id: row.id,
            year: row.year,
            make: row.make,
            model: row.model,
            series: row.series,
            mileage: row.mileage,
            location_city: row.location_city,
            location_branch: row.location_branch,
            sale_price: row.sale_price,
            stock_number: row.stock_number,
            vin: row.vin,
            transmission: row.transmission,
            fuel_type: row.fuel_type,
            cylinders: row.cylinders,
            photos,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Decode the stored photos column.
///
/// NULL, empty and `null` read as no photos. A malformed payload is logged
/// and also reads as no photos so one bad row cannot fail a whole listing.
pub fn decode_photos(car_id: i64, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Option<Vec<String>>>(raw) {
        Ok(photos) => photos.unwrap_or_default(),
        Err(e) => {
            warn!(car_id, "Discarding malformed photos payload: {}", e);
            Vec::new()
        }
    }
}

/// Encode photos for the text column
pub fn encode_photos(photos: &[String]) -> String {
    serde_json::to_string(photos).unwrap_or_else(|_| "[]".to_string())
}

/// Escape LIKE metacharacters and wrap the lowercased fragment in wildcards
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append the WHERE clause for the given filters.
///
/// Only supplied filters produce a predicate; with nothing supplied and
/// inactive cars included, no WHERE clause is emitted at all.
pub fn push_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filters: &CarFilters,
    include_inactive: bool,
) {
    let mut keyword = " WHERE ";

    if let Some(name) = &filters.name {
        builder
            .push(keyword)
            .push("LOWER(CONCAT(year, ' ', make, ' ', model, ' ', series)) LIKE ")
            .push_bind(contains_pattern(name));
        keyword = " AND ";
    }

    if let Some(vin) = &filters.vin {
        builder
            .push(keyword)
            .push("LOWER(vin) = ")
            .push_bind(vin.to_lowercase());
        keyword = " AND ";
    }

    if let Some(location) = &filters.location {
        let pattern = contains_pattern(location);
        builder
            .push(keyword)
            .push("(LOWER(location_city) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(location_branch) LIKE ")
            .push_bind(pattern)
            .push(")");
        keyword = " AND ";
    }

    if !include_inactive {
        builder
            .push(keyword)
            .push("status = ")
            .push_bind(CarStatus::Active.as_str());
    }
}

/// Car repository for database operations
#[derive(Clone)]
pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    /// Create a new car repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List cars matching `filters`, newest first.
    ///
    /// The count and the page are read inside one REPEATABLE READ
    /// transaction, so the total always describes the returned snapshot.
    pub async fn list(
        &self,
        filters: &CarFilters,
        include_inactive: bool,
        page: PageRequest,
    ) -> StoreResult<CarPage> {
        debug!(
            ?filters,
            include_inactive,
            page = page.page,
            limit = page.limit,
            "Listing cars"
        );

        self.list_in_snapshot(filters, include_inactive, page)
            .await
            .inspect_err(|e| error!("Failed to list cars: {}", e))
    }

    async fn list_in_snapshot(
        &self,
        filters: &CarFilters,
        include_inactive: bool,
        page: PageRequest,
    ) -> StoreResult<CarPage> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cars");
        push_filters(&mut count_query, filters, include_inactive);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;

        let mut page_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM cars", CAR_COLUMNS));
        push_filters(&mut page_query, filters, include_inactive);
        page_query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = page_query
            .build_query_as::<CarRow>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CarPage {
            items: rows.into_iter().map(Car::from).collect(),
            total,
            total_pages: page.total_pages(total),
            page,
        })
    }

    /// Get a car by ID
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Car>> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            "SELECT {} FROM cars WHERE id = $1",
            CAR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Car::from))
    }

    /// Insert a car; the status takes the column default (active)
    pub async fn create(&self, car: &NewCar) -> StoreResult<Car> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            r#"
            INSERT INTO cars
                (year, make, model, series, mileage, location_city, location_branch,
                 sale_price, stock_number, vin, transmission, fuel_type, cylinders, photos)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            CAR_COLUMNS
        ))
        .bind(car.year)
        .bind(&car.make)
        .bind(&car.model)
        .bind(&car.series)
        .bind(car.mileage)
        .bind(&car.location_city)
        .bind(&car.location_branch)
        .bind(car.sale_price)
        .bind(&car.stock_number)
        .bind(&car.vin)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(car.cylinders)
        .bind(encode_photos(&car.photos))
        .fetch_one(&self.pool)
        .await?;

        Ok(Car::from(row))
    }

    /// Overwrite every field of a car. Returns `None` when no row has `id`.
    pub async fn update(
        &self,
        id: i64,
        car: &NewCar,
        status: CarStatus,
    ) -> StoreResult<Option<Car>> {
        let row = sqlx::query_as::<_, CarRow>(&format!(
            r#"
            UPDATE cars SET
                year = $1, make = $2, model = $3, series = $4, mileage = $5,
                location_city = $6, location_branch = $7, sale_price = $8,
                stock_number = $9, vin = $10, transmission = $11, fuel_type = $12,
                cylinders = $13, photos = $14, status = $15, updated_at = NOW()
            WHERE id = $16
            RETURNING {}
            "#,
            CAR_COLUMNS
        ))
        .bind(car.year)
        .bind(&car.make)
        .bind(&car.model)
        .bind(&car.series)
        .bind(car.mileage)
        .bind(&car.location_city)
        .bind(&car.location_branch)
        .bind(car.sale_price)
        .bind(&car.stock_number)
        .bind(&car.vin)
        .bind(&car.transmission)
        .bind(&car.fuel_type)
        .bind(car.cylinders)
        .bind(encode_photos(&car.photos))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Car::from))
    }

    /// Hard-delete a car. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_clause(filters: &CarFilters, include_inactive: bool) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cars");
        push_filters(&mut builder, filters, include_inactive);
        builder.sql().trim_start_matches("SELECT COUNT(*) FROM cars").to_string()
    }

    #[test]
    fn test_no_filters_no_where_clause() {
        assert_eq!(where_clause(&CarFilters::default(), true), "");
    }

    #[test]
    fn test_active_only_by_default() {
        assert_eq!(
            where_clause(&CarFilters::default(), false),
            " WHERE status = $1"
        );
    }

    #[test]
    fn test_blank_filter_produces_no_predicate() {
        let filters = CarFilters::new(Some("  "), None, Some(""));
        assert_eq!(where_clause(&filters, true), "");
    }

    #[test]
    fn test_all_filters_are_conjunctive() {
        let filters = CarFilters::new(Some("civic"), Some("ABC"), Some("quebec"));
        assert_eq!(
            where_clause(&filters, false),
            " WHERE LOWER(CONCAT(year, ' ', make, ' ', model, ' ', series)) LIKE $1 \
             AND LOWER(vin) = $2 \
             AND (LOWER(location_city) LIKE $3 OR LOWER(location_branch) LIKE $4) \
             AND status = $5"
        );
    }

    #[test]
    fn test_single_location_filter() {
        let filters = CarFilters::new(None, None, Some("downtown"));
        assert_eq!(
            where_clause(&filters, true),
            " WHERE (LOWER(location_city) LIKE $1 OR LOWER(location_branch) LIKE $2)"
        );
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Civic"), "%civic%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }

    #[test]
    fn test_decode_photos() {
        assert_eq!(
            decode_photos(1, Some(r#"["a","b"]"#)),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(decode_photos(1, None).is_empty());
        assert!(decode_photos(1, Some("")).is_empty());
        assert!(decode_photos(1, Some("null")).is_empty());
        assert!(decode_photos(1, Some("[]")).is_empty());
    }

    #[test]
    fn test_decode_malformed_photos_is_isolated() {
        assert!(decode_photos(1, Some("not json")).is_empty());
        assert!(decode_photos(1, Some("[1, 2]")).is_empty());
        assert!(decode_photos(1, Some(r#"{"url":"a"}"#)).is_empty());
    }

    #[test]
    fn test_encode_photos() {
        assert_eq!(encode_photos(&[]), "[]");
        assert_eq!(
            encode_photos(&["https://x/a.jpg".to_string()]),
            r#"["https://x/a.jpg"]"#
        );
    }
}
