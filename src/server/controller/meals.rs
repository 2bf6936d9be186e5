use actix_web::{web, HttpResponse};
use crate::server::controller::error::CustomError;
use crate::server::controller::with_timeout;
use crate::server::database::store::Store;
use crate::server::model::meal::{DeleteMealResponse, PostAdditionalMealRequest, PostMealRequest, PostMealResponse};
use crate::server::service::catalog;
use crate::server::state::AppState;

/// list the whole catalog, grouping is left to clients
pub(super) async fn get_meals<S: Store>(data: web::Data<AppState<S>>) -> Result<HttpResponse, CustomError> {
    let meals = with_timeout(data.db_timeout(), catalog::list_meals(data.store())).await?;
    Ok(HttpResponse::Ok().json(meals))
}

pub(super) async fn post_meal<S: Store>(
    body: web::Json<PostMealRequest>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let id = with_timeout(data.db_timeout(), catalog::add_meal(data.store(), body.into_inner())).await?;
    Ok(HttpResponse::Created().json(PostMealResponse { id }))
}

pub(super) async fn delete_meal<S: Store>(
    id: web::Path<i64>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let deleted = with_timeout(data.db_timeout(), catalog::delete_meal(data.store(), id.into_inner())).await?;
    Ok(HttpResponse::Ok().json(DeleteMealResponse { deleted }))
}

pub(super) async fn post_additional_meal<S: Store>(
    body: web::Json<PostAdditionalMealRequest>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let id = with_timeout(
        data.db_timeout(),
        catalog::add_additional_meal(data.store(), body.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Created().json(PostMealResponse { id }))
}

pub(super) async fn delete_additional_meal<S: Store>(
    id: web::Path<i64>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let deleted = with_timeout(
        data.db_timeout(),
        catalog::delete_additional_meal(data.store(), id.into_inner()),
    )
    .await?;
    Ok(HttpResponse::Ok().json(DeleteMealResponse { deleted }))
}
