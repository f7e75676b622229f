use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Movie, RecordId, Schedule},
};

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/movies", get(list_movies_first))
        .route("/movies/{page}", get(list_movies))
        .route("/movie", axum::routing::post(create_movie).put(modify_movie))
        .route("/movie/{id}", get(find_movie).delete(kill_movie))
        .route("/schedules/{movie_id}", get(list_schedules_first))
        .route("/schedules/{movie_id}/{page}", get(list_schedules))
        .route("/schedule", axum::routing::post(create_schedule).put(modify_schedule))
        .route("/schedule/{id}", get(find_schedule).delete(kill_schedule));

    Router::new().nest("/api2", api).with_state(state).layer(TraceLayer::new_for_http())
}

fn checked_page(page: i64) -> AppResult<u64> {
    if page < 1 {
        return Err(AppError::BadRequest(format!("page must be at least 1, got {page}")));
    }
    Ok(page as u64)
}

async fn list_movies_first(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    list_movies(State(state), Path(1)).await
}

async fn list_movies(
    State(state): State<Arc<AppState>>,
    Path(page): Path<i64>,
) -> AppResult<Json<Vec<Movie>>> {
    let page = checked_page(page)?;
    Ok(Json(state.movies.list(page, state.config.page_size).await?))
}

async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(mut movie): Json<Movie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    movie.id = RecordId::UNSAVED;
    state.movies.save(&mut movie).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn find_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Movie>> {
    state.movies.find(id).await?.map(Json).ok_or(AppError::NotFound("movie"))
}

async fn modify_movie(
    State(state): State<Arc<AppState>>,
    Json(mut movie): Json<Movie>,
) -> AppResult<Json<Movie>> {
    if !movie.id.is_saved() || !state.movies.exists(movie.id.get()).await? {
        return Err(AppError::NotFound("movie"));
    }
    state.movies.save(&mut movie).await?;
    Ok(Json(movie))
}

async fn kill_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.movies.kill(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_schedules_first(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
) -> AppResult<Json<Vec<Schedule>>> {
    list_schedules(State(state), Path((movie_id, 1))).await
}

async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Path((movie_id, page)): Path<(i32, i64)>,
) -> AppResult<Json<Vec<Schedule>>> {
    let page = checked_page(page)?;
    if !state.movies.exists(movie_id).await? {
        return Err(AppError::NotFound("movie"));
    }
    Ok(Json(state.schedules.list(movie_id, page, state.config.page_size).await?))
}

async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(mut schedule): Json<Schedule>,
) -> AppResult<(StatusCode, Json<Schedule>)> {
    if !state.movies.exists(schedule.movie_id).await? {
        return Err(AppError::NotFound("movie"));
    }
    schedule.id = RecordId::UNSAVED;
    state.schedules.save(&mut schedule).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn find_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Schedule>> {
    state.schedules.find(id).await?.map(Json).ok_or(AppError::NotFound("schedule"))
}

async fn modify_schedule(
    State(state): State<Arc<AppState>>,
    Json(mut schedule): Json<Schedule>,
) -> AppResult<Json<Schedule>> {
    if !schedule.id.is_saved() || !state.schedules.exists(schedule.id.get()).await? {
        return Err(AppError::NotFound("schedule"));
    }
    if !state.movies.exists(schedule.movie_id).await? {
        return Err(AppError::NotFound("movie"));
    }
    state.schedules.save(&mut schedule).await?;
    Ok(Json(schedule))
}

async fn kill_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.schedules.kill(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
