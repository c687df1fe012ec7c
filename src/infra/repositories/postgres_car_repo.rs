use crate::domain::models::car::Car;
use crate::domain::ports::CarRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCarRepo {
    pool: PgPool,
}

impl PostgresCarRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CarRepository for PostgresCarRepo {
    async fn create(&self, car: &Car) -> Result<Car, AppError> {
        sqlx::query_as::<_, Car>(
            "INSERT INTO cars (id, host_id, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&car.id)
        .bind(&car.host_id)
        .bind(car.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Car>, AppError> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
