//! Run statistics for the KYC fraud pipeline.

use crate::types::ProcessedRecord;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// Number of fraud probability buckets (0.0-0.1 ... 0.9-1.0)
const PROBABILITY_BUCKETS: usize = 10;

/// Reasons shown in the summary
const TOP_REASONS: usize = 8;

/// Counts and timings collected over one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Records that survived cleaning
    pub total_records: u64,
    pub suspicious_records: u64,
    /// Occurrences of each rule reason
    reason_counts: BTreeMap<String, u64>,
    /// Records the classifier scored
    pub predicted_records: u64,
    pub predicted_fraud: u64,
    /// Records where the classifier label equals the rule flag
    pub rule_agreement: u64,
    probability_buckets: [u64; PROBABILITY_BUCKETS],
    /// Wall time per stage, in run order
    stage_timings: Vec<(String, Duration)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally verdicts and predictions, replacing any earlier tally
    pub fn record_batch(&mut self, records: &[ProcessedRecord]) {
        self.total_records = records.len() as u64;
        self.suspicious_records = 0;
        self.reason_counts.clear();
        self.predicted_records = 0;
        self.predicted_fraud = 0;
        self.rule_agreement = 0;
        self.probability_buckets = [0; PROBABILITY_BUCKETS];

        for record in records {
            let suspicious = record.verdict.is_suspicious();
            if suspicious {
                self.suspicious_records += 1;
            }
            for reason in record.verdict.reasons() {
                *self.reason_counts.entry(reason.clone()).or_insert(0) += 1;
            }

            if let Some(prediction) = record.prediction {
                self.predicted_records += 1;
                if prediction.label.is_fraud() {
                    self.predicted_fraud += 1;
                }
                if prediction.label.is_fraud() == suspicious {
                    self.rule_agreement += 1;
                }
                let bucket = (prediction.fraud_probability.clamp(0.0, 1.0)
                    * PROBABILITY_BUCKETS as f64)
                    .min((PROBABILITY_BUCKETS - 1) as f64) as usize;
                self.probability_buckets[bucket] += 1;
            }
        }
    }

    /// Record how long a stage took
    pub fn record_stage(&mut self, stage: &str, elapsed: Duration) {
        self.stage_timings.push((stage.to_string(), elapsed));
    }

    pub fn valid_records(&self) -> u64 {
        self.total_records - self.suspicious_records
    }

    pub fn reason_count(&self, reason: &str) -> u64 {
        self.reason_counts.get(reason).copied().unwrap_or(0)
    }

    /// Reasons ordered by descending count, ties by name
    pub fn top_reasons(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut reasons: Vec<(&str, u64)> = self
            .reason_counts
            .iter()
            .map(|(reason, &count)| (reason.as_str(), count))
            .collect();
        reasons.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        reasons.truncate(limit);
        reasons
    }

    /// Share of predicted records whose label agrees with the rule flag
    pub fn agreement_rate(&self) -> f64 {
        if self.predicted_records == 0 {
            0.0
        } else {
            self.rule_agreement as f64 / self.predicted_records as f64
        }
    }

    pub fn probability_distribution(&self) -> [u64; PROBABILITY_BUCKETS] {
        self.probability_buckets
    }

    pub fn stage_timings(&self) -> &[(String, Duration)] {
        &self.stage_timings
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let suspicious_rate = percent(self.suspicious_records, self.total_records);
        let fraud_rate = percent(self.predicted_fraud, self.predicted_records);

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             KYC FRAUD PIPELINE - RUN SUMMARY                 ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Records: {:>8}  │  Suspicious: {:>6} ({:>5.1}%)  Valid: {:>6} ║",
            self.total_records,
            self.suspicious_records,
            suspicious_rate,
            self.valid_records()
        );
        info!(
            "║ ML Fraud: {:>7} ({:>5.1}%)  │  Agreement with rules: {:>5.1}%  ║",
            self.predicted_fraud,
            fraud_rate,
            self.agreement_rate() * 100.0
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Top Reasons:                                                 ║");
        for (reason, count) in self.top_reasons(TOP_REASONS) {
            info!(
                "║   {:32}: {:>6} ({:>5.1}%)                ║",
                reason,
                count,
                percent(count, self.total_records)
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        for (i, &count) in self.probability_buckets.iter().enumerate() {
            let pct = percent(count, self.predicted_records);
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");

        if !self.stage_timings.is_empty() {
            info!("Stage Timings (ms):");
            for (stage, elapsed) in &self.stage_timings {
                info!("  {}: {}", stage, elapsed.as_millis());
            }
        }
    }
}

fn percent(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
