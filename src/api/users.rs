//! Users with their books endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::request::{UserBookRequest, UserBookResponse},
};

/// Create a user together with their books
#[utoipa::path(
    post,
    path = "/user/create",
    tag = "users",
    request_body = UserBookRequest,
    responses(
        (status = 201, description = "User and books created", body = UserBookResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user_with_books(
    State(state): State<crate::AppState>,
    Json(request): Json<UserBookRequest>,
) -> AppResult<(StatusCode, Json<UserBookResponse>)> {
    request.validate_all()?;

    let response = state.services.user_data.create_user_with_books(request).await?;
    tracing::info!("Response with created user with books: {:?}", response);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a user and replace their books
#[utoipa::path(
    put,
    path = "/user/update",
    tag = "users",
    request_body = UserBookRequest,
    responses(
        (status = 200, description = "User and books updated", body = UserBookResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "User or book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user_with_books(
    State(state): State<crate::AppState>,
    Json(request): Json<UserBookRequest>,
) -> AppResult<Json<UserBookResponse>> {
    request.validate_all()?;

    let response = state.services.user_data.update_user_with_books(request).await?;
    tracing::info!("Response with updated user with books: {:?}", response);
    Ok(Json(response))
}

/// Get a user id with the ids of their books
#[utoipa::path(
    get,
    path = "/user/get/{user_id}",
    tag = "users",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User with book ids", body = UserBookResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user_with_books(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserBookResponse>> {
    let response = state.services.user_data.get_user_with_books(user_id).await?;
    tracing::info!("Response with user with books: {:?}", response);
    Ok(Json(response))
}

/// Delete a user and all of their books
#[utoipa::path(
    delete,
    path = "/user/delete/{user_id}",
    tag = "users",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User and books deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user_with_books(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    tracing::info!("Delete user with books: user_id {}", user_id);
    state.services.user_data.delete_user_with_books(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
