//! Drives one scrape session: analyze once, extract, then alternate
//! pagination steps with extraction passes until every budget is spent.

use crate::analyzer::{AnalysisReport, StructureAnalyzer};
use crate::browser::Page;
use crate::config::{PaginationKind, ScrapeConfig};
use crate::extractors::ExtractionEnsemble;
use crate::pagination::{
    ClickStrategy, PaginationStrategy, ScrollStrategy, UrlParameterStrategy, UrlPathStrategy,
};
use crate::results::PageDocument;
use serde::Serialize;

/// What one pagination stage contributed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub strategy: String,
    /// Successful `advance` steps
    pub rounds: usize,
    pub new_fragments: usize,
}

/// The finished document together with how it was produced
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub document: PageDocument,
    pub analysis: AnalysisReport,
    pub stages: Vec<StageReport>,
}

/// Fallback stages, in their default order
#[derive(Debug, Clone, PartialEq)]
enum Stage {
    UrlPath,
    Scroll,
    Click(String),
    ClickCatalog,
}

pub struct Orchestrator {
    config: ScrapeConfig,
    analyzer: StructureAnalyzer,
    ensemble: ExtractionEnsemble,
}

impl Orchestrator {
    pub fn new(config: ScrapeConfig) -> Self {
        Self {
            analyzer: StructureAnalyzer::from_config(&config),
            ensemble: ExtractionEnsemble::new(),
            config,
        }
    }

    /// Replaces the analyzer, e.g. to shorten its settle delay
    pub fn with_analyzer(mut self, analyzer: StructureAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_ensemble(mut self, ensemble: ExtractionEnsemble) -> Self {
        self.ensemble = ensemble;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Runs the session. Never fails; whatever was surfaced is returned.
    pub async fn run(&mut self, page: &dyn Page) -> ScrapeOutcome {
        if let Some(selector) = &self.config.wait_for_selector {
            match page
                .wait_for_selector(selector, self.config.selector_timeout())
                .await
            {
                Ok(true) => ::log::debug!("Selector {} is present", selector),
                Ok(false) => ::log::warn!("Timed out waiting for {}, continuing", selector),
                Err(e) => ::log::warn!("Waiting for {} failed: {}", selector, e),
            }
        }

        let analysis = self.analyzer.analyze(page).await;
        self.ensemble.set_plan(
            analysis
                .recommendation
                .extraction_plan(self.config.early_exit_threshold),
        );

        let url = if analysis.url.is_empty() {
            page.url().await.unwrap_or_default()
        } else {
            analysis.url.clone()
        };
        let mut document = PageDocument::new(url);
        let mut stages = Vec::new();

        let initial = self.ensemble.extract(page, &mut document).await;
        stages.push(StageReport {
            strategy: "initial".to_string(),
            rounds: 1,
            new_fragments: initial,
        });

        if analysis.recommendation.simple_page && self.config.pagination_strategy.is_none() {
            ::log::info!("Simple page, skipping pagination");
        } else {
            self.paginate(page, &analysis, &mut document, &mut stages).await;
        }

        ::log::info!(
            "Scrape of {} finished: {} fragments, {} images, {} stages",
            document.url,
            document.content.len(),
            document.images.len(),
            stages.len()
        );

        ScrapeOutcome {
            document,
            analysis,
            stages,
        }
    }

    /// Detected URL parameter first, then a forced strategy, then the fallback pipeline
    async fn paginate(
        &self,
        page: &dyn Page,
        analysis: &AnalysisReport,
        document: &mut PageDocument,
        stages: &mut Vec<StageReport>,
    ) {
        let mut parameter = self.parameter_strategy();
        let detected = analysis
            .pagination
            .as_ref()
            .and_then(|p| p.url_parameter.as_ref())
            .is_some_and(|p| p.name == self.config.page_parameter)
            || parameter.is_applicable(page).await;

        if detected {
            ::log::info!("URL parameter pagination detected on {}", document.url);
            stages.push(self.run_strategy(&mut parameter, page, document).await);
            return;
        }

        if let Some(kind) = self.config.pagination_strategy {
            ::log::info!("Using forced pagination strategy {:?}", kind);
            match kind {
                PaginationKind::Parameter => {
                    stages.push(self.run_strategy(&mut parameter, page, document).await)
                }
                PaginationKind::Url => {
                    self.run_stage(&Stage::UrlPath, analysis, page, document, stages)
                        .await;
                }
                PaginationKind::Infinite => {
                    self.run_stage(&Stage::Scroll, analysis, page, document, stages)
                        .await;
                }
                PaginationKind::Click => {
                    let stage = match self.click_selector(analysis) {
                        Some(selector) => Stage::Click(selector),
                        None => Stage::ClickCatalog,
                    };
                    self.run_stage(&stage, analysis, page, document, stages).await;
                }
            }
            return;
        }

        let pipeline = self.fallback_pipeline(analysis);
        ::log::info!(
            "Running {} fallback stages ({})",
            pipeline.len(),
            if self.config.brute_force { "brute force" } else { "prioritized" }
        );
        for stage in &pipeline {
            let added = self.run_stage(stage, analysis, page, document, stages).await;
            if !self.config.brute_force && added > 0 {
                ::log::info!("Stage {:?} surfaced {} fragments, stopping", stage, added);
                break;
            }
        }
    }

    /// URL path, scroll, then the click catalog. In prioritized mode the
    /// analyzer's recommended stage moves to the front.
    fn fallback_pipeline(&self, analysis: &AnalysisReport) -> Vec<Stage> {
        let mut pipeline = vec![Stage::UrlPath, Stage::Scroll, Stage::ClickCatalog];
        if self.config.brute_force {
            return pipeline;
        }

        let recommended = match analysis.recommendation.pagination_strategy {
            Some(PaginationKind::Url) => Some(Stage::UrlPath),
            Some(PaginationKind::Infinite) => Some(Stage::Scroll),
            Some(PaginationKind::Click) => self.click_selector(analysis).map(Stage::Click),
            _ => None,
        };
        if let Some(stage) = recommended {
            pipeline.retain(|s| *s != stage);
            pipeline.insert(0, stage);
        }
        pipeline
    }

    fn click_selector(&self, analysis: &AnalysisReport) -> Option<String> {
        self.config
            .click_selector
            .clone()
            .or_else(|| analysis.recommendation.click_selector.clone())
    }

    /// Runs one stage, records its report(s) and returns the new fragments
    async fn run_stage(
        &self,
        stage: &Stage,
        analysis: &AnalysisReport,
        page: &dyn Page,
        document: &mut PageDocument,
        stages: &mut Vec<StageReport>,
    ) -> usize {
        match stage {
            Stage::UrlPath => {
                let mut strategy = UrlPathStrategy::new(
                    self.config.url_pattern.clone(),
                    self.config.max_pages,
                    self.config.selector_timeout(),
                );
                let report = self.run_strategy(&mut strategy, page, document).await;
                let added = report.new_fragments;
                stages.push(report);
                added
            }
            Stage::Scroll => {
                let (max_scrolls, delay) = self.scroll_budget(analysis);
                let mut strategy = ScrollStrategy::new(max_scrolls, delay);
                let report = self.run_strategy(&mut strategy, page, document).await;
                let added = report.new_fragments;
                stages.push(report);
                added
            }
            Stage::Click(selector) => {
                let mut strategy = ClickStrategy::new(
                    selector.clone(),
                    self.config.max_clicks,
                    self.config.click_delay_ms,
                );
                let mut report = self.run_strategy(&mut strategy, page, document).await;
                report.strategy = format!("click:{}", selector);
                let added = report.new_fragments;
                stages.push(report);
                added
            }
            Stage::ClickCatalog => {
                let mut total = StageReport {
                    strategy: "click_catalog".to_string(),
                    rounds: 0,
                    new_fragments: 0,
                };
                for selector in &self.config.click_selectors {
                    let mut strategy = ClickStrategy::new(
                        selector.clone(),
                        self.config.max_clicks,
                        self.config.click_delay_ms,
                    );
                    let report = self.run_strategy(&mut strategy, page, document).await;
                    total.rounds += report.rounds;
                    total.new_fragments += report.new_fragments;
                    if !self.config.brute_force && report.new_fragments > 0 {
                        break;
                    }
                }
                let added = total.new_fragments;
                stages.push(total);
                added
            }
        }
    }

    /// The analyzer's budget, capped by the configured one; the configured
    /// budget alone when analysis was incomplete
    fn scroll_budget(&self, analysis: &AnalysisReport) -> (usize, u64) {
        let recommendation = &analysis.recommendation;
        if analysis.partial_results || recommendation.max_scrolls == 0 {
            return (self.config.max_scrolls, self.config.scroll_delay_ms);
        }
        (
            recommendation.max_scrolls.min(self.config.max_scrolls),
            recommendation.scroll_delay_ms.min(self.config.scroll_delay_ms),
        )
    }

    /// Initializes a strategy and alternates steps with extraction passes
    async fn run_strategy(
        &self,
        strategy: &mut dyn PaginationStrategy,
        page: &dyn Page,
        document: &mut PageDocument,
    ) -> StageReport {
        let mut report = StageReport {
            strategy: strategy.name().to_string(),
            rounds: 0,
            new_fragments: 0,
        };

        if !strategy.initialize(page).await {
            ::log::debug!("Strategy {} not applicable", report.strategy);
            return report;
        }

        while strategy.advance(page).await {
            report.rounds += 1;
            report.new_fragments += self.ensemble.extract(page, document).await;
        }
        if report.rounds > 0 {
            // The last step may have surfaced content before the strategy stopped
            report.new_fragments += self.ensemble.extract(page, document).await;
        }

        ::log::info!(
            "Strategy {} ran {} rounds, {} new fragments",
            report.strategy,
            report.rounds,
            report.new_fragments
        );
        report
    }

    fn parameter_strategy(&self) -> UrlParameterStrategy {
        UrlParameterStrategy::new(self.config.page_parameter.clone(), self.config.max_pages)
            .with_verification(self.config.content_verification_selector.clone())
            .with_scrolling(self.config.max_scrolls, self.config.scroll_delay_ms)
            .with_idle_timeout(self.config.selector_timeout())
    }
}
