//! Axum router: HTML form, JSON API, WebSocket progress stream.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::model::{ErrorResponse, PlanForm, PlanResponse, WsMessage};
use super::page::{Outcome, render_page};
use crate::error::PlanError;
use crate::presentation::StatusBoard;
use crate::profile::UserProfile;
use crate::service::PlanService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlanService>,
}

/// Build the Axum router for the planner UI.
pub fn planner_routes(service: Arc<PlanService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/", get(index))
        .route("/plan", post(submit_form))
        .route("/api/plan", post(api_plan))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sustainable-planner"
    }))
}

// ── HTML form ───────────────────────────────────────────────────────────

async fn index() -> Html<String> {
    Html(render_page(
        &UserProfile::example(),
        &StatusBoard::new(),
        Outcome::Pending,
    ))
}

async fn submit_form(State(state): State<AppState>, Form(form): Form<PlanForm>) -> Html<String> {
    let profile = UserProfile::from(form);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = state.service.generate(&profile, Some(&tx)).await;
    drop(tx);

    let mut board = StatusBoard::new();
    while let Ok(event) = rx.try_recv() {
        board.apply(event);
    }

    let html = match &outcome {
        Ok(plan) => render_page(&profile, &board, Outcome::Success(plan)),
        Err(err) => {
            warn!(error = %err, "Plan request failed");
            render_page(&profile, &board, Outcome::Failure(err))
        }
    };
    Html(html)
}

// ── JSON API ────────────────────────────────────────────────────────────

async fn api_plan(State(state): State<AppState>, Json(profile): Json<UserProfile>) -> Response {
    match state.service.generate(&profile, None).await {
        Ok(plan) => Json(PlanResponse::from(plan)).into_response(),
        Err(err) => {
            warn!(error = %err, "Plan request failed");
            let status = match err {
                PlanError::MissingCredential { .. } => StatusCode::PRECONDITION_FAILED,
                PlanError::Knowledge(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PlanError::Pipeline(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(ErrorResponse {
                    error: err.user_message(),
                }),
            )
                .into_response()
        }
    }
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.service))
}

/// One plan per connection: read a profile, stream progress, send the result.
async fn handle_socket(mut socket: WebSocket, service: Arc<PlanService>) {
    let profile = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<UserProfile>(&text) {
                Ok(profile) => break profile,
                Err(e) => {
                    debug!(error = %e, "Unrecognized WS message from client");
                    let msg = WsMessage::PlanError {
                        message: format!("Invalid profile: {e}"),
                    };
                    let _ = send_json(&mut socket, &msg).await;
                    return;
                }
            },
            Some(Ok(Message::Ping(data))) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    return;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                info!("WebSocket client disconnected before submitting");
                return;
            }
            Some(Err(e)) => {
                warn!(error = %e, "WebSocket error");
                return;
            }
            _ => {}
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let run = tokio::spawn(async move { service.generate(&profile, Some(&tx)).await });

    // The sender lives in the spawned task, so this ends when the run does.
    while let Some(event) = rx.recv().await {
        if send_json(&mut socket, &WsMessage::from(event)).await.is_err() {
            debug!("Client disconnected during progress stream");
        }
    }

    let final_msg = match run.await {
        Ok(Ok(plan)) => WsMessage::PlanComplete {
            plan: plan.final_output,
            usage: plan.usage,
            estimated_cost_usd: plan.estimated_cost_usd,
        },
        Ok(Err(err)) => {
            warn!(error = %err, "Plan request failed");
            WsMessage::PlanError {
                message: err.user_message(),
            }
        }
        Err(e) => {
            warn!(error = %e, "Plan task panicked");
            WsMessage::PlanError {
                message: format!("❌ Error: {e}"),
            }
        }
    };

    if send_json(&mut socket, &final_msg).await.is_ok() {
        let _ = socket.send(Message::Close(None)).await;
    }
    info!("WebSocket connection closed");
}

async fn send_json(socket: &mut WebSocket, msg: &WsMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize WS message");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::PlannerConfig;
    use crate::llm::LlmProvider;
    use crate::pipeline::orchestrator::tests::ScriptedLlm;

    fn router(llm: Option<Arc<ScriptedLlm>>) -> Router {
        router_with_knowledge(llm, "/nonexistent/knowledge_base")
    }

    fn router_with_knowledge(llm: Option<Arc<ScriptedLlm>>, knowledge_dir: &str) -> Router {
        let config = PlannerConfig {
            knowledge_dir: std::path::PathBuf::from(knowledge_dir),
            ..PlannerConfig::default()
        };
        let llm = llm.map(|l| l as Arc<dyn LlmProvider>);
        planner_routes(Arc::new(PlanService::new(llm, &config)))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Inner HTML of the server-rendered result section.
    fn result_section(html: &str) -> &str {
        let open = "<section class=\"result\" id=\"result\">";
        let start = html.find(open).unwrap() + open.len();
        let end = start + html[start..].find("</section>").unwrap();
        &html[start..end]
    }

    #[tokio::test]
    async fn index_renders_form() {
        let response = router(None)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<form id=\"profile_form\""));
    }

    #[tokio::test]
    async fn form_submit_without_credential_shows_specific_error() {
        let response = router(None)
            .oneshot(
                Request::post("/plan")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("transportation=bus&diet=vegan&energy_usage=solar&goals=zero"))
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_string(response).await;
        assert!(html.contains("Please set OPENAI_API_KEY in .env file"));
        assert!(html.contains("value=\"bus\""));
        assert_eq!(html.matches("data-status=\"idle\"").count(), 4);
    }

    #[tokio::test]
    async fn form_submit_renders_plan_and_completed_board() {
        let llm = Arc::new(ScriptedLlm::new());
        let response = router(Some(Arc::clone(&llm)))
            .oneshot(
                Request::post("/plan")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("transportation=bus&diet=&energy_usage=&goals="))
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_string(response).await;
        assert!(html.contains("<textarea readonly>OUTPUT-4</textarea>"));
        assert_eq!(html.matches("data-status=\"complete\"").count(), 4);
        assert_eq!(llm.calls(), 4);
        assert!(llm.user_prompts()[0].contains("- Diet: mixed"));
    }

    #[tokio::test]
    async fn form_submit_failure_shows_generic_error_without_result() {
        let llm = Arc::new(ScriptedLlm::failing_on(0));
        let response = router(Some(llm))
            .oneshot(
                Request::post("/plan")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("transportation=car"))
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_string(response).await;
        let section = result_section(&html);
        assert!(section.starts_with("<p class=\"error\">❌ Error: "));
        assert!(!section.contains("Plan generated successfully"));
        assert!(!section.contains("<textarea"));
        assert!(html.contains("data-status=\"active\""));
    }

    #[tokio::test]
    async fn api_without_credential_is_precondition_failed() {
        let response = router(None)
            .oneshot(
                Request::post("/api/plan")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        let body: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body.error.contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn api_failure_is_bad_gateway() {
        let response = router(Some(Arc::new(ScriptedLlm::failing_on(2))))
            .oneshot(
                Request::post("/api/plan")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"goals": "fly less"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn api_knowledge_failure_is_internal_error() {
        let llm = Arc::new(ScriptedLlm::new());
        let response = router_with_knowledge(Some(Arc::clone(&llm)), "knowledge\0base")
            .oneshot(
                Request::post("/api/plan")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(body.error.starts_with("❌ Error: "));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn api_returns_plan_and_steps() {
        let response = router(Some(Arc::new(ScriptedLlm::new())))
            .oneshot(
                Request::post("/api/plan")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"diet": "vegan"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: PlanResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.plan, "OUTPUT-4");
        assert_eq!(body.steps.len(), 4);
        assert_eq!(body.model, "scripted");
    }
}
