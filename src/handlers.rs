use crate::dialog::{DialogHabit, RecommendationDialog};
use crate::errors::{AppError, ValidationError};
use crate::models::{
    AppData, HabitKind, HabitResponse, HabitsResponse, NewHabitRequest, PartitionsResponse,
    RecommendationsResponse, SettingName, Settings, SettingsPatch,
};
use crate::state::AppState;
use crate::store::{progress, Action};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub error: Option<String>,
}

const EMPTY_NAME_CODE: &str = "empty-name";

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let data = state.store.snapshot().await;
    let dialog = state.dialog_snapshot().await;
    let error = query
        .error
        .filter(|code| code == EMPTY_NAME_CODE)
        .map(|_| ValidationError::EmptyName.to_string());
    Html(render_index(state.store.today(), &data, &dialog, error.as_deref()))
}

pub async fn get_habits(State(state): State<AppState>) -> Json<HabitsResponse> {
    let data = state.store.snapshot().await;
    Json(to_response(&state, &data))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), AppError> {
    let habit = add_habit(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(HabitKind, u64)>,
) -> Result<Json<HabitResponse>, AppError> {
    let data = state.store.dispatch(Action::Toggle { id, kind }).await?;
    Ok(Json(find_habit(&data, id, kind)?))
}

pub async fn undo_habit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(HabitKind, u64)>,
) -> Result<Json<HabitResponse>, AppError> {
    let data = state.store.dispatch(Action::UndoToday { id, kind }).await?;
    Ok(Json(find_habit(&data, id, kind)?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(HabitKind, u64)>,
) -> Result<StatusCode, AppError> {
    state.store.dispatch(Action::DeleteHabit { id, kind }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.snapshot().await.settings)
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, AppError> {
    Ok(Json(state.update_settings(patch).await?))
}

/// Passthrough: the request body is sent to the model as the user turn.
pub async fn generate(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<RecommendationsResponse>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::bad_request("request body must not be empty"));
    }
    let recommendations = state.gateway.generate(&body).await;
    Ok(Json(RecommendationsResponse { recommendations }))
}

pub async fn get_recommendations(State(state): State<AppState>) -> Json<RecommendationDialog> {
    Json(state.dialog_snapshot().await)
}

pub async fn open_recommendations(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<RecommendationDialog>, AppError> {
    let habit = bad_habit(&state, id).await?;
    Ok(Json(state.open_recommendations(habit).await))
}

pub async fn refresh_recommendations(State(state): State<AppState>) -> Json<RecommendationDialog> {
    Json(state.refresh_recommendations().await)
}

pub async fn close_recommendations(State(state): State<AppState>) -> Json<RecommendationDialog> {
    Json(state.close_recommendations().await)
}

pub async fn form_add_habit(
    State(state): State<AppState>,
    Form(payload): Form<NewHabitRequest>,
) -> Redirect {
    match add_habit(&state, payload).await {
        Ok(_) => Redirect::to("/"),
        Err(_) => Redirect::to(&format!("/?error={EMPTY_NAME_CODE}")),
    }
}

pub async fn form_toggle_habit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(HabitKind, u64)>,
) -> Result<Redirect, AppError> {
    state.store.dispatch(Action::Toggle { id, kind }).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_undo_habit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(HabitKind, u64)>,
) -> Result<Redirect, AppError> {
    state.store.dispatch(Action::UndoToday { id, kind }).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_delete_habit(
    State(state): State<AppState>,
    Path((kind, id)): Path<(HabitKind, u64)>,
) -> Result<Redirect, AppError> {
    state.store.dispatch(Action::DeleteHabit { id, kind }).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_toggle_setting(
    State(state): State<AppState>,
    Path(name): Path<SettingName>,
) -> Result<Redirect, AppError> {
    let current = state.store.snapshot().await.settings;
    state
        .update_settings(SettingsPatch::toggle(name, &current))
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn form_open_recommendations(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Redirect, AppError> {
    let habit = bad_habit(&state, id).await?;
    state.open_recommendations(habit).await;
    Ok(Redirect::to("/"))
}

pub async fn form_refresh_recommendations(State(state): State<AppState>) -> Redirect {
    state.refresh_recommendations().await;
    Redirect::to("/")
}

pub async fn form_close_recommendations(State(state): State<AppState>) -> Redirect {
    state.close_recommendations().await;
    Redirect::to("/")
}

async fn add_habit(state: &AppState, payload: NewHabitRequest) -> Result<HabitResponse, AppError> {
    let kind = payload.kind;
    let data = state
        .store
        .dispatch(Action::AddHabit {
            name: payload.name,
            kind,
        })
        .await?;
    let habit = data
        .habits
        .partition(kind)
        .last()
        .ok_or_else(|| AppError::not_found("habit vanished after insert"))?;
    info!(id = habit.id, %kind, name = %habit.name, "habit added");
    Ok(HabitResponse::from(habit))
}

async fn bad_habit(state: &AppState, id: u64) -> Result<DialogHabit, AppError> {
    let data = state.store.snapshot().await;
    let habit = data
        .habits
        .find(id, HabitKind::Bad)
        .ok_or_else(|| AppError::not_found(format!("no bad habit with id {id}")))?;
    Ok(DialogHabit {
        id: habit.id,
        name: habit.name.clone(),
    })
}

fn find_habit(data: &AppData, id: u64, kind: HabitKind) -> Result<HabitResponse, AppError> {
    data.habits
        .find(id, kind)
        .map(HabitResponse::from)
        .ok_or_else(|| AppError::not_found(format!("no {kind} habit with id {id}")))
}

fn to_response(state: &AppState, data: &AppData) -> HabitsResponse {
    HabitsResponse {
        today: state.store.today(),
        habits: PartitionsResponse {
            good: data.habits.good.iter().map(HabitResponse::from).collect(),
            bad: data.habits.bad.iter().map(HabitResponse::from).collect(),
        },
        settings: data.settings,
        progress: progress(&data.habits),
    }
}
