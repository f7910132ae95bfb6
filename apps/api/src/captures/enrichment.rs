//! Truth Analysis enrichment. Runs on demand, never on a schedule.
//!
//! The analyzer is a trait so the orchestration can be exercised without a model.
//! `AppState` holds an `Arc<dyn CaptureAnalyzer>`.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::captures::models::{Capture, CaptureStatus, DsdSection, TruthAnalysis};
use crate::captures::prompts::{TRUTH_ANALYSIS_PROMPT, TRUTH_ANALYSIS_SYSTEM};
use crate::captures::store::CaptureStore;
use crate::errors::AppError;
use crate::llm_client::LlmClient;

const MAX_VIRAL_SCORE: f64 = 100.0;
const MAX_CULTURAL_RELEVANCE: f64 = 10.0;

/// What the external analyzer returns for one capture.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOutcome {
    pub truth_analysis: TruthAnalysis,
    pub summary: String,
    pub viral_score: f64,
    pub cultural_relevance: f64,
    /// Free text from the model; anything other than a DSD section is ignored.
    pub suggested_section: Option<String>,
}

#[async_trait]
pub trait CaptureAnalyzer: Send + Sync {
    async fn analyze(&self, capture: &Capture) -> Result<AnalysisOutcome, AppError>;
}

pub struct LlmCaptureAnalyzer(pub LlmClient);

#[async_trait]
impl CaptureAnalyzer for LlmCaptureAnalyzer {
    async fn analyze(&self, capture: &Capture) -> Result<AnalysisOutcome, AppError> {
        let prompt = TRUTH_ANALYSIS_PROMPT
            .replace("{title}", &capture.title)
            .replace("{platform}", &capture.platform)
            .replace("{content}", &capture.content);
        self.0
            .call_json::<AnalysisOutcome>(&prompt, TRUTH_ANALYSIS_SYSTEM)
            .await
            .map_err(|e| AppError::from_llm("Truth analysis failed", e))
    }
}

/// Copies an analysis onto a capture. Scores are clamped to their ranges and a
/// suggested section only fills an empty one. Returns the parsed suggestion.
pub fn apply_analysis(capture: &mut Capture, outcome: AnalysisOutcome) -> Option<DsdSection> {
    let summary = outcome.summary.trim();
    if !summary.is_empty() {
        capture.summary = Some(summary.to_string());
    }
    capture.truth_analysis = Some(outcome.truth_analysis);
    capture.viral_score = Some(outcome.viral_score.clamp(0.0, MAX_VIRAL_SCORE));
    capture.cultural_relevance = Some(outcome.cultural_relevance.clamp(0.0, MAX_CULTURAL_RELEVANCE));

    let suggested = outcome
        .suggested_section
        .as_deref()
        .and_then(|s| s.trim().to_lowercase().parse::<DsdSection>().ok());
    if capture.dsd_section.is_none() {
        capture.dsd_section = suggested;
    }
    capture.status = CaptureStatus::Analyzed;
    suggested
}

/// Runs the analyzer for one capture: pending/analyzed → processing → analyzed | error.
pub async fn analyze_capture(
    store: &dyn CaptureStore,
    analyzer: &dyn CaptureAnalyzer,
    mut capture: Capture,
) -> Result<Capture, AppError> {
    store.set_status(capture.id, CaptureStatus::Processing).await?;

    let saved = match analyzer.analyze(&capture).await {
        Ok(outcome) => {
            let suggested = apply_analysis(&mut capture, outcome);
            store.save_analysis(&capture, suggested).await
        }
        Err(e) => Err(e),
    };

    match saved {
        Ok(section) => {
            // A section assigned while the model was running wins over the suggestion.
            capture.dsd_section = section;
            info!("Truth analysis completed for capture {}", capture.id);
            Ok(capture)
        }
        Err(e) => {
            warn!("Truth analysis failed for capture {}: {e}", capture.id);
            if let Err(status_err) = store.set_status(capture.id, CaptureStatus::Error).await {
                warn!(
                    "Could not mark capture {} as errored: {status_err}",
                    capture.id
                );
            }
            Err(e)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub processed: usize,
    pub successful: usize,
}

/// Analyzes each owned capture in turn. Failures are logged and counted, never retried.
pub async fn analyze_batch(
    store: &dyn CaptureStore,
    analyzer: &dyn CaptureAnalyzer,
    capture_ids: &[Uuid],
    owned_projects: &HashSet<Uuid>,
) -> BatchReport {
    let mut report = BatchReport::default();

    for &id in capture_ids {
        report.processed += 1;
        let capture = match store.find(id).await {
            Ok(Some(c)) if owned_projects.contains(&c.project_id) => c,
            Ok(_) => {
                warn!("Batch analysis skipped capture {id}: not found or not owned");
                continue;
            }
            Err(e) => {
                warn!("Batch analysis failed to load capture {id}: {e}");
                continue;
            }
        };
        if analyze_capture(store, analyzer, capture).await.is_ok() {
            report.successful += 1;
        }
    }

    info!(
        "Batch analysis: {}/{} captures analyzed",
        report.successful, report.processed
    );
    report
}

/// Analyzes every pending capture in the list, oldest first as given.
pub async fn analyze_pending(
    store: &dyn CaptureStore,
    analyzer: &dyn CaptureAnalyzer,
    captures: Vec<Capture>,
) -> BatchReport {
    let mut report = BatchReport::default();

    for capture in captures {
        if capture.status != CaptureStatus::Pending {
            continue;
        }
        report.processed += 1;
        if analyze_capture(store, analyzer, capture).await.is_ok() {
            report.successful += 1;
        }
    }

    info!(
        "Pending analysis: {}/{} captures analyzed",
        report.successful, report.processed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::models::fixtures::capture;
    use crate::captures::store::testing::MemoryCaptureStore;

    struct FixedAnalyzer;

    #[async_trait]
    impl CaptureAnalyzer for FixedAnalyzer {
        async fn analyze(&self, capture: &Capture) -> Result<AnalysisOutcome, AppError> {
            if capture.title == "broken" {
                return Err(AppError::Llm("model unavailable".to_string()));
            }
            let mut truth = TruthAnalysis::default();
            truth.human_truth.core = "Belonging beats novelty".to_string();
            Ok(AnalysisOutcome {
                truth_analysis: truth,
                summary: " A summary ".to_string(),
                viral_score: 140.0,
                cultural_relevance: 7.5,
                suggested_section: Some("Shift".to_string()),
            })
        }
    }

    #[test]
    fn test_apply_analysis_clamps_scores() {
        let mut c = capture("X", "...");
        let outcome = AnalysisOutcome {
            viral_score: -5.0,
            cultural_relevance: 42.0,
            ..Default::default()
        };
        apply_analysis(&mut c, outcome);
        assert_eq!(c.viral_score, Some(0.0));
        assert_eq!(c.cultural_relevance, Some(10.0));
        assert_eq!(c.status, CaptureStatus::Analyzed);
        assert_eq!(c.summary, None);
    }

    #[test]
    fn test_suggested_section_does_not_override_existing() {
        let mut c = capture("X", "...");
        c.dsd_section = Some(DsdSection::Define);
        let outcome = AnalysisOutcome {
            suggested_section: Some("deliver".to_string()),
            ..Default::default()
        };
        apply_analysis(&mut c, outcome);
        assert_eq!(c.dsd_section, Some(DsdSection::Define));
    }

    #[test]
    fn test_unknown_suggested_section_is_ignored() {
        let mut c = capture("X", "...");
        let outcome = AnalysisOutcome {
            suggested_section: Some("performance".to_string()),
            ..Default::default()
        };
        apply_analysis(&mut c, outcome);
        assert_eq!(c.dsd_section, None);
    }

    #[test]
    fn test_outcome_parses_model_reply() {
        let outcome: AnalysisOutcome = crate::llm_client::parse_json_reply(
            r#"```json
            {"truthAnalysis": {"fact": {"claims": ["Sales up"], "metrics": {"growth": 12.5}}},
             "summary": "s", "viralScore": 61, "culturalRelevance": 6, "suggestedSection": "deliver"}
            ```"#,
        )
        .unwrap();
        assert_eq!(outcome.truth_analysis.fact.metrics["growth"], 12.5);
        assert_eq!(outcome.viral_score, 61.0);
    }

    #[tokio::test]
    async fn test_analyze_capture_stores_result() {
        let c = capture("Trend", "content");
        let id = c.id;
        let store = MemoryCaptureStore::with(vec![c.clone()]);

        let analyzed = analyze_capture(&store, &FixedAnalyzer, c).await.unwrap();

        assert_eq!(analyzed.status, CaptureStatus::Analyzed);
        assert_eq!(analyzed.viral_score, Some(100.0));
        assert_eq!(analyzed.summary.as_deref(), Some("A summary"));
        assert_eq!(store.get(id).dsd_section, Some(DsdSection::Shift));
        assert_eq!(
            store.get(id).truth_analysis.unwrap().excerpt(),
            Some("Belonging beats novelty")
        );
    }

    #[tokio::test]
    async fn test_analyze_capture_failure_marks_error() {
        let c = capture("broken", "content");
        let id = c.id;
        let store = MemoryCaptureStore::with(vec![c.clone()]);

        let result = analyze_capture(&store, &FixedAnalyzer, c).await;

        assert!(matches!(result, Err(AppError::Llm(_))));
        assert_eq!(store.get(id).status, CaptureStatus::Error);
        assert!(store.get(id).truth_analysis.is_none());
    }

    #[tokio::test]
    async fn test_batch_counts_successes() {
        let good = capture("Trend", "content");
        let bad = capture("broken", "content");
        let ids = vec![good.id, bad.id, Uuid::new_v4()];
        let store = MemoryCaptureStore::with(vec![good, bad]);
        let owned: HashSet<Uuid> = [Uuid::nil()].into_iter().collect();

        let report = analyze_batch(&store, &FixedAnalyzer, &ids, &owned).await;

        assert_eq!(
            report,
            BatchReport {
                processed: 3,
                successful: 1
            }
        );
    }

    #[tokio::test]
    async fn test_failed_save_marks_error() {
        let c = capture("Trend", "content");
        let id = c.id;
        let mut store = MemoryCaptureStore::with(vec![c.clone()]);
        store.failing.insert(id);

        let result = analyze_capture(&store, &FixedAnalyzer, c).await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(store.get(id).status, CaptureStatus::Error);
    }

    /// Files the capture under Deliver while the model is still running.
    struct ReassigningAnalyzer<'a> {
        store: &'a MemoryCaptureStore,
    }

    #[async_trait]
    impl CaptureAnalyzer for ReassigningAnalyzer<'_> {
        async fn analyze(&self, capture: &Capture) -> Result<AnalysisOutcome, AppError> {
            {
                let mut map = self.store.captures.lock().unwrap();
                if let Some(stored) = map.get_mut(&capture.id) {
                    stored.dsd_section = Some(DsdSection::Deliver);
                }
            }
            FixedAnalyzer.analyze(capture).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_section_survives_analysis() {
        let c = capture("Trend", "content");
        let id = c.id;
        let store = MemoryCaptureStore::with(vec![c.clone()]);
        let analyzer = ReassigningAnalyzer { store: &store };

        let analyzed = analyze_capture(&store, &analyzer, c).await.unwrap();

        assert_eq!(analyzed.dsd_section, Some(DsdSection::Deliver));
        assert_eq!(store.get(id).dsd_section, Some(DsdSection::Deliver));
        assert_eq!(store.get(id).status, CaptureStatus::Analyzed);
        assert_eq!(store.get(id).viral_score, Some(100.0));
    }

    #[tokio::test]
    async fn test_analyze_pending_skips_other_statuses() {
        let pending = capture("Trend", "content");
        let broken = capture("broken", "content");
        let mut done = capture("Done", "content");
        done.status = CaptureStatus::Analyzed;
        done.summary = Some("kept".to_string());
        let done_id = done.id;
        let store = MemoryCaptureStore::with(vec![pending.clone(), broken.clone(), done.clone()]);

        let report = analyze_pending(&store, &FixedAnalyzer, vec![pending, broken, done]).await;

        assert_eq!(
            report,
            BatchReport {
                processed: 2,
                successful: 1
            }
        );
        assert_eq!(store.get(done_id).summary.as_deref(), Some("kept"));
    }
}
