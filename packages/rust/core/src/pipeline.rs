//! The resolve → fetch → summarize pipeline.
//!
//! Strict total order, single logical task: one resolution call, one GET
//! per resolved PEP number in order, then one summarization call. An empty
//! resolution short-circuits the run with zero fetches and zero summarize
//! calls. No shared state survives the run.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use pepsum_fetch::PepFetcher;
use pepsum_llm::{ChatClient, generate_summaries, resolve_related_peps};
use pepsum_shared::{AppConfig, OperatorList, PepNumber, Result, SummaryMap};

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// The parsed input operators, in input order.
    pub operators: OperatorList,
    /// PEP numbers the resolver returned, in resolver order.
    pub pep_numbers: Vec<PepNumber>,
    /// Per-operator summaries; `None` when no related PEPs were found.
    pub summaries: Option<SummaryMap>,
    /// Total wall-clock duration of the run.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callbacks for long-running pipeline phases.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each PEP page fetch completes.
    fn pep_fetched(&self, number: PepNumber, current: usize, total: usize);
    /// Called once with the final result.
    fn done(&self, result: &PipelineResult);
}

/// No-op progress reporter.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn pep_fetched(&self, _number: PepNumber, _current: usize, _total: usize) {}
    fn done(&self, _result: &PipelineResult) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full pipeline for one operator list.
#[instrument(skip_all, fields(operators = %operators))]
pub async fn run(
    config: &AppConfig,
    api_key: &str,
    operators: OperatorList,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineResult> {
    let start = Instant::now();

    let chat = ChatClient::new(&config.openai, api_key.to_string())?;
    let fetcher = PepFetcher::new(&config.fetch)?;

    // Phase 1: resolve related PEPs
    reporter.phase("Looking up related PEPs");
    let pep_numbers = resolve_related_peps(&chat, &operators).await?;

    if pep_numbers.is_empty() {
        info!("no related PEPs found, skipping fetch and summarize");
        let result = PipelineResult {
            operators,
            pep_numbers,
            summaries: None,
            elapsed: start.elapsed(),
        };
        reporter.done(&result);
        return Ok(result);
    }

    info!(count = pep_numbers.len(), "resolved related PEPs");

    // Phase 2: fetch each PEP page, one at a time, in resolver order.
    // Soft-failed pages contribute empty strings but keep their slot so the
    // joined context preserves ordering.
    reporter.phase("Fetching PEP pages");
    let mut pep_contents: Vec<String> = Vec::with_capacity(pep_numbers.len());
    for (i, number) in pep_numbers.iter().enumerate() {
        let content = fetcher.fetch_pep(*number).await?;
        reporter.pep_fetched(*number, i + 1, pep_numbers.len());
        pep_contents.push(content);
    }

    // Phase 3: summarize
    reporter.phase("Generating summaries");
    let summaries = generate_summaries(
        &chat,
        &operators,
        &pep_contents,
        config.summarize.max_context_chars,
    )
    .await?;

    let result = PipelineResult {
        operators,
        pep_numbers,
        summaries: Some(summaries),
        elapsed: start.elapsed(),
    };

    info!(
        peps = result.pep_numbers.len(),
        summaries = result.summaries.as_ref().map_or(0, SummaryMap::len),
        elapsed_ms = result.elapsed.as_millis(),
        "pipeline completed"
    );

    reporter.done(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepsum_shared::PepsumError;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(llm: &MockServer, peps: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.openai.base_url = llm.uri();
        config.fetch.base_url = peps.uri();
        config
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    #[tokio::test]
    async fn end_to_end_map_filter() {
        let llm = MockServer::start().await;
        let peps = MockServer::start().await;

        // First completion resolves PEPs, second summarizes. Mount order
        // matters: the resolver mock is exhausted after one request.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("[3099]"))
            .up_to_n_times(1)
            .mount(&llm)
            .await;

        let summary = json!({
            "map": {"General description": "Applies a function to each item."},
            "filter": {"General description": "Selects items matching a predicate."}
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(&summary.to_string()))
            .mount(&llm)
            .await;

        Mock::given(method("GET"))
            .and(path("/pep-3099/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><p>PEP 3099 content...</p></body></html>",
            ))
            .mount(&peps)
            .await;

        let operators = OperatorList::parse("map, filter").unwrap();
        let result = run(&test_config(&llm, &peps), "test-key", operators, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.pep_numbers.len(), 1);
        assert_eq!(result.pep_numbers[0].get(), 3099);

        let summaries = result.summaries.unwrap();
        let map_sections = summaries.sections("map").unwrap();
        assert_eq!(
            map_sections,
            vec![(
                "General description".to_string(),
                "Applies a function to each item.".to_string()
            )]
        );
        let filter_sections = summaries.sections("filter").unwrap();
        assert_eq!(filter_sections[0].1, "Selects items matching a predicate.");
    }

    #[tokio::test]
    async fn empty_resolution_skips_fetch_and_summarize() {
        let llm = MockServer::start().await;
        let peps = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("[]"))
            .expect(1)
            .mount(&llm)
            .await;

        let operators = OperatorList::parse("map").unwrap();
        let result = run(&test_config(&llm, &peps), "test-key", operators, &SilentProgress)
            .await
            .unwrap();

        assert!(result.pep_numbers.is_empty());
        assert!(result.summaries.is_none());

        // No PEP page was fetched and no second completion was made.
        assert!(peps.received_requests().await.unwrap().is_empty());
        assert_eq!(llm.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn soft_failed_fetch_keeps_its_slot() {
        let llm = MockServer::start().await;
        let peps = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("[8, 99999]"))
            .up_to_n_times(1)
            .mount(&llm)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(r#"{"map": {"General description": "x"}}"#))
            .mount(&llm)
            .await;

        Mock::given(method("GET"))
            .and(path("/pep-8/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>PEP 8 text</p></body></html>"),
            )
            .mount(&peps)
            .await;

        // pep-99999 is not mocked: wiremock answers 404, which is the soft
        // failure path, not an error.
        let operators = OperatorList::parse("map").unwrap();
        let result = run(&test_config(&llm, &peps), "test-key", operators, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.pep_numbers.len(), 2);
        assert!(result.summaries.is_some());
    }

    #[tokio::test]
    async fn malformed_resolver_output_is_fatal() {
        let llm = MockServer::start().await;
        let peps = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("not json"))
            .mount(&llm)
            .await;

        let operators = OperatorList::parse("map").unwrap();
        let err = run(&test_config(&llm, &peps), "test-key", operators, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, PepsumError::Parse { .. }));
        assert!(peps.received_requests().await.unwrap().is_empty());
    }
}
