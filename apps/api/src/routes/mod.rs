pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::briefs::handlers as briefs;
use crate::captures::handlers as captures;
use crate::cohorts::handlers as cohorts;
use crate::projects::handlers as projects;
use crate::signals::handlers as signals;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Projects
        .route(
            "/api/projects",
            get(projects::handle_list_projects).post(projects::handle_create_project),
        )
        .route(
            "/api/projects/:id",
            get(projects::handle_get_project)
                .patch(projects::handle_update_project)
                .delete(projects::handle_delete_project),
        )
        // Captures: static segments before `:id`
        .route(
            "/api/captures",
            get(captures::handle_list_captures).post(captures::handle_create_capture),
        )
        .route("/api/captures/recent", get(captures::handle_recent_captures))
        .route("/api/captures/bulk-update", post(captures::handle_bulk_update))
        .route("/api/captures/analyze-batch", post(captures::handle_analyze_batch))
        .route(
            "/api/captures/process-pending",
            post(captures::handle_process_pending),
        )
        .route(
            "/api/captures/:id",
            get(captures::handle_get_capture).patch(captures::handle_update_capture),
        )
        .route("/api/captures/:id/tags/:tag", put(captures::handle_set_tag))
        .route("/api/captures/:id/section", put(captures::handle_assign_section))
        .route(
            "/api/captures/:id/ai-suggest-tags",
            post(captures::handle_suggest_tags),
        )
        .route("/api/captures/:id/analyze", post(captures::handle_analyze_capture))
        // Briefs
        .route(
            "/api/briefs",
            get(briefs::handle_list_briefs).post(briefs::handle_create_brief),
        )
        .route("/api/briefs/templates", get(briefs::handle_list_templates))
        .route("/api/briefs/generate", post(briefs::handle_generate))
        .route("/api/briefs/export", post(briefs::handle_export))
        .route(
            "/api/briefs/:id",
            get(briefs::handle_get_brief).patch(briefs::handle_update_brief),
        )
        .route(
            "/api/briefs/:id/sections/:section/captures",
            post(briefs::handle_attach_capture),
        )
        .route(
            "/api/briefs/:id/sections/:section/captures/:capture_id",
            delete(briefs::handle_detach_capture),
        )
        .route(
            "/api/briefs/:id/sections/:section/content",
            put(briefs::handle_update_section_content),
        )
        .route(
            "/api/briefs/:id/sections/:section/order",
            put(briefs::handle_reorder_section),
        )
        .route("/api/briefs/:id/available", get(briefs::handle_available_captures))
        .route("/api/briefs/:id/generate", post(briefs::handle_generate_for_brief))
        .route("/api/briefs/:id/export", post(briefs::handle_export_brief))
        .route("/api/briefs/:id/exports", get(briefs::handle_list_exports))
        // Cohort Builder
        .route("/api/cohorts/pillars", get(cohorts::handle_list_pillars))
        .route(
            "/api/cohorts/sessions/:session_id",
            get(cohorts::handle_list_cohorts).post(cohorts::handle_add_cohort),
        )
        .route(
            "/api/cohorts/sessions/:session_id/report",
            get(cohorts::handle_cohort_report),
        )
        .route(
            "/api/cohorts/sessions/:session_id/:cohort_id",
            delete(cohorts::handle_remove_cohort),
        )
        // Secondary resources
        .route(
            "/api/sources",
            get(signals::handle_list_sources).post(signals::handle_create_source),
        )
        .route("/api/sources/:id", patch(signals::handle_update_source))
        .route(
            "/api/signals",
            get(signals::handle_list_signals).post(signals::handle_create_signal),
        )
        .route("/api/signals/:id", patch(signals::handle_update_signal))
        .route(
            "/api/hypothesis-validations",
            get(signals::handle_list_validations).post(signals::handle_create_validation),
        )
        .route(
            "/api/hypothesis-validations/:id",
            patch(signals::handle_update_validation),
        )
        .route(
            "/api/cultural-moments",
            get(signals::handle_list_moments).post(signals::handle_create_moment),
        )
        .route(
            "/api/cultural-moments/:id",
            patch(signals::handle_update_moment),
        )
        .with_state(state)
}
