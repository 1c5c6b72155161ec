/// Site statistics
///
/// ```text
/// GET /v1/stats            (action=getStats)
/// ```
///
/// ```json
/// { "success": true, "stats": { "users": 12, "notes": 40, "comments": 97 } }
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    response::{Envelope, StatsPayload},
};
use axum::extract::State;
use pcpp_shared::models::stats::Stats;

pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Envelope<StatsPayload>> {
    let stats = Stats::collect(&state.db).await?;

    Ok(Envelope::ok(StatsPayload { stats }))
}
