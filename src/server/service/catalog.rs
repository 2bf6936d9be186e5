use log::info;
use crate::server::database::store::Store;
use crate::server::model::meal::{Category, Meal, NewMeal, PostAdditionalMealRequest, PostMealRequest};
use crate::server::service::ServiceError;

fn validate(name: String, category: Category, price: f64) -> Result<NewMeal, ServiceError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::Invalid("meal name must not be empty".to_string()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ServiceError::Invalid(format!("invalid meal price: {price}")));
    }
    Ok(NewMeal { name, category, price })
}

pub(crate) async fn list_meals(store: &impl Store) -> Result<Vec<Meal>, ServiceError> {
    Ok(store.list_meals().await?)
}

pub(crate) async fn add_meal(store: &impl Store, req: PostMealRequest) -> Result<i64, ServiceError> {
    let category = req.category.parse::<Category>().map_err(ServiceError::Invalid)?;
    let meal = validate(req.name, category, req.price)?;
    let id = store.insert_meal(&meal).await?;
    info!("meal id={} added, {:?}", id, meal);
    Ok(id)
}

/// Adds a meal to the additional menu; any other explicit `type` is rejected.
pub(crate) async fn add_additional_meal(store: &impl Store, req: PostAdditionalMealRequest) -> Result<i64, ServiceError> {
    if let Some(category) = req.category.as_deref() {
        match category.parse::<Category>() {
            Ok(Category::Additional) => {}
            Ok(other) => {
                return Err(ServiceError::Invalid(format!(
                    "additional meals cannot have type {other}"
                )))
            }
            Err(e) => return Err(ServiceError::Invalid(e)),
        }
    }
    let meal = validate(req.name, Category::Additional, req.price)?;
    let id = store.insert_meal(&meal).await?;
    info!("additional meal id={} added, {:?}", id, meal);
    Ok(id)
}

/// Rows removed, 0 when the meal does not exist.
pub(crate) async fn delete_meal(store: &impl Store, id: i64) -> Result<u64, ServiceError> {
    let deleted = store.delete_meal(id, None).await?;
    info!("meal id={} delete removed {} rows", id, deleted);
    Ok(deleted)
}

pub(crate) async fn delete_additional_meal(store: &impl Store, id: i64) -> Result<u64, ServiceError> {
    let deleted = store.delete_meal(id, Some(Category::Additional)).await?;
    info!("additional meal id={} delete removed {} rows", id, deleted);
    Ok(deleted)
}
