//! Review session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use review_core::{
    AnswerOutcome, CommandOutcome, Quality, ReviewCommand, ReviewController, SessionPhase, Sm2,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::sessions::SessionSlot;
use crate::AppState;

fn session_view(
    session_id: Option<Uuid>,
    controller: &mut ReviewController,
    now: DateTime<Utc>,
) -> SessionView {
    let summary = controller.summary(now);
    let session = controller.session();
    let revealed = session.phase() == SessionPhase::Revealed;
    let (position, length) = session.position();

    let card = session.current_card().map(|card| SessionCardView {
        id: card.id,
        front: card.front.clone(),
        back: revealed.then(|| card.back.clone()),
    });
    let intervals = match session.current_card() {
        Some(card) if revealed => Sm2::default().preview(&card.repetition, now),
        _ => Vec::new(),
    };

    SessionView {
        session_id,
        deck_id: controller.deck_id(),
        phase: session.phase(),
        position,
        length,
        remaining: session.remaining(),
        card,
        intervals,
        stats: *session.stats(),
        elapsed_secs: session.elapsed(now).num_seconds(),
        summary,
    }
}

async fn slot(state: &AppState, session_id: Uuid) -> Result<SessionSlot> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))
}

/// Run a command and drop the session once it is over.
async fn dispatch(
    state: &AppState,
    session_id: Uuid,
    command: ReviewCommand,
) -> Result<Json<CommandResponse>> {
    let slot = slot(state, session_id).await?;
    let mut controller = slot.controller.lock().await;

    let now = Utc::now();
    let outcome = controller.handle(command, now).await?;
    let session = session_view(Some(session_id), &mut controller, now);

    let finished = matches!(
        outcome,
        CommandOutcome::Aborted { .. }
            | CommandOutcome::Answered {
                outcome: AnswerOutcome::Completed { .. } | AnswerOutcome::Aborted { .. }
            }
    );
    if finished {
        state.sessions.remove(session_id).await;
        tracing::info!(session_id = %session_id, "Session finished");
    }

    Ok(Json(CommandResponse { outcome, session }))
}

/// POST /api/sessions
pub async fn start(
    State(state): State<AppState>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let now = Utc::now();
    let mut controller =
        ReviewController::start(state.store.clone(), payload.deck_id, &state.selector, &now)
            .await?;

    if controller.is_complete() {
        // Nothing due: report the empty session without keeping it around.
        let view = session_view(None, &mut controller, now);
        return Ok((StatusCode::OK, Json(view)));
    }

    let cards_due = controller.session().cards().len();
    let session_id = state.sessions.insert(controller).await;
    let slot = slot(&state, session_id).await?;
    let mut controller = slot.controller.lock().await;

    tracing::info!(session_id = %session_id, deck_id = %payload.deck_id, cards_due, "Started session");
    Ok((StatusCode::CREATED, Json(session_view(Some(session_id), &mut controller, now))))
}

/// GET /api/sessions/:id
pub async fn show(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>> {
    let slot = slot(&state, session_id).await?;
    let mut controller = slot.controller.lock().await;
    Ok(Json(session_view(Some(session_id), &mut controller, Utc::now())))
}

/// POST /api/sessions/:id/flip
pub async fn flip(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CommandResponse>> {
    dispatch(&state, session_id, ReviewCommand::Flip).await
}

/// POST /api/sessions/:id/answer
pub async fn answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<CommandResponse>> {
    let quality = Quality::new(payload.quality)?;
    dispatch(&state, session_id, ReviewCommand::Rate(quality)).await
}

/// POST /api/sessions/:id/abort
///
/// Signals the abort before taking the session lock, so it does not wait for
/// an answer that is still being saved.
pub async fn abort(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AbortResponse>> {
    let slot = state
        .sessions
        .remove(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))?;
    slot.abort.abort();

    let summary = match slot.controller.try_lock() {
        Ok(mut controller) => Some(controller.abort(Utc::now())),
        Err(_) => None,
    };

    tracing::info!(session_id = %session_id, "Session aborted");
    Ok(Json(AbortResponse {
        session_id,
        aborted: true,
        summary,
    }))
}
