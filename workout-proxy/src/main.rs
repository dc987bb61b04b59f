use std::{env, io, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use workout_parser::{
    file_name, google_calendar_link, IcsConfig, IcsSerializer, ParserConfig, ScheduleParser,
    Selection, Vocabulary, WorkoutEvent, EXAMPLE_SCHEDULE,
};

mod cli;

const USAGE: &str = "POST a schedule to /events, /calendar, /blocks or /links";

struct AppState {
    parser: ScheduleParser,
    serializer: IcsSerializer,
}

type SharedState = Arc<AppState>;

impl AppState {
    fn new(args: &cli::Args) -> Self {
        let parser = ScheduleParser::new(
            Vocabulary::russian(),
            Default::default(),
            ParserConfig {
                link_lookahead: args.link_lookahead,
            },
        );

        let serializer = IcsSerializer::new(
            Default::default(),
            IcsConfig {
                duration: chrono::Duration::minutes(args.duration_minutes),
                uid_domain: args.uid_domain.clone(),
                ..IcsConfig::default()
            },
        );

        Self { parser, serializer }
    }
}

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "workout_proxy=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

#[tokio::main]
async fn main() -> io::Result<()> {
    setup_logging();

    let args = cli::parse(env::args().skip(1).collect());
    let router = router(AppState::new(&args));

    let listener = TcpListener::bind(args.address).await?;
    info!("Listening at http://{}", args.address);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {err}");
        return;
    }

    info!("Shutting down");
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", post(handle_events))
        .route("/calendar", post(handle_calendar))
        .route("/blocks", post(handle_blocks))
        .route("/links", post(handle_links))
        .fallback(|| async { (StatusCode::NOT_FOUND, USAGE) })
        .with_state(Arc::new(state))
}

#[derive(Deserialize)]
struct ExportQuery {
    /// Comma separated indices of events to leave out.
    #[serde(default)]
    skip: String,
    #[serde(default)]
    json: bool,
}

#[derive(Serialize)]
struct Block {
    file_name: String,
    content: String,
}

fn nothing_found() -> Response {
    warn!("Rejecting schedule without workouts");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("No workouts found. Try a schedule like:\n\n{EXAMPLE_SCHEDULE}\n"),
    )
        .into_response()
}

/// Parses the body and applies `skip`, failing with a ready response.
fn select(state: &AppState, body: &str, skip: &str) -> Result<Vec<WorkoutEvent>, Response> {
    let mut events = state.parser.parse(body);
    if events.is_empty() {
        return Err(nothing_found());
    }

    for raw in skip.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
        let toggled = raw
            .parse::<usize>()
            .map(|index| events[..].toggle(index))
            .unwrap_or(false);

        if !toggled {
            warn!("Rejecting invalid event index {raw:?}");
            let message = format!("Invalid event index `{raw}`");
            return Err((StatusCode::BAD_REQUEST, message).into_response());
        }
    }

    if events.selected().is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "No workouts selected").into_response());
    }

    Ok(events)
}

async fn handle_events(State(state): State<SharedState>, body: String) -> Response {
    let events = state.parser.parse(&body);
    info!("Parsed {} workouts", events.len());

    if events.is_empty() {
        return nothing_found();
    }

    Json(events).into_response()
}

async fn handle_calendar(
    State(state): State<SharedState>,
    Query(query): Query<ExportQuery>,
    body: String,
) -> Response {
    let events = match select(&state, &body, &query.skip) {
        Ok(events) => events,
        Err(response) => return response,
    };

    let selected = events.selected();
    info!("Exporting {} workouts", selected.len());

    if query.json {
        return Json(selected).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "text/calendar"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"workouts.ics\"",
            ),
        ],
        state.serializer.calendar(selected).to_string(),
    )
        .into_response()
}

async fn handle_blocks(
    State(state): State<SharedState>,
    Query(query): Query<ExportQuery>,
    body: String,
) -> Response {
    let events = match select(&state, &body, &query.skip) {
        Ok(events) => events,
        Err(response) => return response,
    };

    let blocks = events
        .selected()
        .into_iter()
        .map(|event| Block {
            file_name: file_name(event),
            content: state.serializer.calendar_block(event),
        })
        .collect::<Vec<_>>();

    info!("Exporting {} calendar blocks", blocks.len());
    Json(blocks).into_response()
}

async fn handle_links(
    State(state): State<SharedState>,
    Query(query): Query<ExportQuery>,
    body: String,
) -> Response {
    let events = match select(&state, &body, &query.skip) {
        Ok(events) => events,
        Err(response) => return response,
    };

    let duration = state.serializer.config().duration;
    let links = events
        .selected()
        .into_iter()
        .map(|event| google_calendar_link(event, duration).map(String::from))
        .collect::<Result<Vec<_>, _>>();

    match links {
        Ok(links) => Json(links).into_response(),
        Err(err) => {
            warn!("Failed to build calendar links: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build calendar links").into_response()
        }
    }
}
