// Typed request/response contract over the duel engine.
//
// Every request maps to exactly one `Response` variant; failures are always
// `Response::Rejected` carrying one error kind.

use serde::{Deserialize, Serialize};

use crate::duel::{DuelEngine, DuelState, DuelStats, DuelSummary, MoveReport, StartDuel};
use crate::error::{DuelError, ErrorBody};
use crate::hint::HintResponse;

/// Code used when a request cannot be decoded at all.
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    StartDuel(StartDuel),
    SubmitMove {
        match_id: String,
        user_id: String,
        word: String,
    },
    RequestHint {
        match_id: String,
        user_id: String,
        #[serde(default)]
        limit: usize,
    },
    GetMatchState {
        match_id: String,
    },
    DeleteMatch {
        match_id: String,
    },
    ForceConclude {
        match_id: String,
    },
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Response {
    Started {
        state: DuelState,
    },
    MoveAccepted(MoveReport),
    Hint(HintResponse),
    State {
        state: DuelState,
    },
    Deleted {
        match_id: String,
    },
    Concluded {
        state: DuelState,
        summary: DuelSummary,
    },
    Stats(DuelStats),
    Rejected {
        error: ErrorBody,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        state: Option<DuelState>,
    },
}

impl Response {
    pub fn rejected(error: &DuelError, state: Option<DuelState>) -> Self {
        Response::Rejected {
            error: error.body(),
            state,
        }
    }

    /// Rejection for input that never reached the engine.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Response::Rejected {
            error: ErrorBody {
                code: INVALID_REQUEST.to_string(),
                message: message.into(),
            },
            state: None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Response::Rejected { .. })
    }
}

/// Run one request against `engine`.
pub async fn dispatch(engine: &DuelEngine, request: Request) -> Response {
    match request {
        Request::StartDuel(start) => match engine.start_duel(start).await {
            Ok(state) => Response::Started { state },
            Err(e) => Response::rejected(&e, None),
        },
        Request::SubmitMove {
            match_id,
            user_id,
            word,
        } => match engine.submit_move(&match_id, &user_id, &word).await {
            Ok(report) => Response::MoveAccepted(report),
            Err(rejection) => Response::rejected(&rejection.error, rejection.state),
        },
        Request::RequestHint {
            match_id,
            user_id,
            limit,
        } => match engine.request_hint(&match_id, &user_id, limit).await {
            Ok(hints) => Response::Hint(hints),
            Err(e) => Response::rejected(&e, engine.match_state(&match_id).await.ok()),
        },
        Request::GetMatchState { match_id } => match engine.match_state(&match_id).await {
            Ok(state) => Response::State { state },
            Err(e) => Response::rejected(&e, None),
        },
        Request::DeleteMatch { match_id } => match engine.delete_match(&match_id).await {
            Ok(()) => Response::Deleted { match_id },
            Err(e) => Response::rejected(&e, None),
        },
        Request::ForceConclude { match_id } => match engine.force_conclude(&match_id).await {
            Ok((state, summary)) => Response::Concluded { state, summary },
            Err(e) => Response::rejected(&e, engine.match_state(&match_id).await.ok()),
        },
        Request::Stats => Response::Stats(engine.stats().await),
    }
}
