//! End-to-end pipeline runs against a temporary workspace

use kyc_fraud_pipeline::config::AppConfig;
use kyc_fraud_pipeline::models::ModelLoader;
use kyc_fraud_pipeline::types::{
    ExtractedFields, PredictionLabel, RawRecord, RuleFlag, VerificationResult,
};
use kyc_fraud_pipeline::{storage, Pipeline};
use std::path::Path;

fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::load_from_path("config/config.toml").unwrap();
    config.paths.data_dir = dir.join("data");
    config.paths.models_dir = dir.join("models");
    config.generator.seed = Some(2024);
    config.verification.seed = Some(7);
    config
}

#[test]
fn full_run_flags_every_high_transaction() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    assert_eq!(config.generator.records, 500);
    config.model.n_estimators = 25;
    let paths = config.paths.clone();

    let outcome = Pipeline::new(config).unwrap().run().unwrap();

    assert!(!outcome.records.is_empty());
    for r in &outcome.records {
        if r.record.txn_amount > 50_000.0 || r.record.txn_count > 30 {
            assert_eq!(r.verdict.flag(), RuleFlag::Suspicious, "{}", r.record.customer_id);
        }
        assert_eq!(r.verdict.is_suspicious(), !r.verdict.reasons().is_empty());
        let p = r.prediction.unwrap();
        assert!((0.0..=1.0).contains(&p.fraud_probability));
    }

    let raw = storage::read_rows(paths.raw_path()).unwrap();
    assert_eq!(raw.len(), 500);

    let written = storage::read_records(paths.final_path()).unwrap();
    assert_eq!(written, outcome.records);

    let classifier = ModelLoader::new().load(paths.model_path()).unwrap();
    let records: Vec<_> = outcome.records.iter().map(|r| r.record.clone()).collect();
    let reloaded = classifier.predict(&records).unwrap();
    for (p, r) in reloaded.iter().zip(&outcome.records) {
        assert_eq!(Some(*p), r.prediction);
    }
}

fn write_upload(path: &Path, rows: &[RawRecord]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for row in rows {
        writer.serialize(row).unwrap();
    }
    writer.flush().unwrap();
}

#[test]
fn non_finite_amount_is_dropped_and_amount_still_drives_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("upload.csv");
    let rows: Vec<RawRecord> = (0..60)
        .map(|i| RawRecord {
            customer_id: Some(format!("r{i}")),
            name: Some("Asha Rao".into()),
            dob: Some("1990-01-01".into()),
            pan: Some("KLMNO4321Z".into()),
            aadhaar: Some("4321 8765 2109".into()),
            email: Some("asha@example.com".into()),
            mobile: Some("9876543210".into()),
            address: Some("1 Main Road, Pune".into()),
            txn_count: Some(3),
            txn_amount: Some(match i {
                0 => f64::NAN,
                i if i % 2 == 0 => 90_000.0,
                _ => 100.0,
            }),
        })
        .collect();
    write_upload(&input, &rows);

    let mut config = config_in(dir.path());
    config.paths.input_file = Some(input);
    config.model.n_estimators = 10;

    let mut fields = ExtractedFields::not_available();
    fields.name = "Asha Rao".into();
    fields.dob = "1990-01-01".into();
    let passing = VerificationResult {
        authenticity_score: 0.9,
        liveness_score: 0.9,
        face_match_confidence: 0.9,
        extracted_fields: Some(fields),
    };

    let outcome = Pipeline::new(config)
        .unwrap()
        .with_verification_result(passing)
        .run()
        .unwrap();

    assert_eq!(outcome.records.len(), 59);
    assert!(outcome.records.iter().all(|r| r.record.customer_id != "r0"));
    for r in &outcome.records {
        let high = r.record.txn_amount > 50_000.0;
        assert_eq!(r.verdict.is_suspicious(), high, "{}", r.record.customer_id);
        let p = r.prediction.unwrap();
        let expected = if high {
            PredictionLabel::Fraud
        } else {
            PredictionLabel::Valid
        };
        assert_eq!(p.label, expected, "{}", r.record.customer_id);
    }
}

#[test]
fn uploaded_file_is_cleaned_before_rules() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("upload.csv");
    let rows = vec![
        RawRecord {
            customer_id: Some("a".into()),
            name: Some("Asha Rao".into()),
            dob: Some("1990-01-01".into()),
            pan: Some("klmno4321z".into()),
            aadhaar: Some("4321-8765-2109".into()),
            email: Some("asha@example.com".into()),
            mobile: Some("+919876543210".into()),
            address: None,
            txn_count: Some(2),
            txn_amount: Some(900.0),
        },
        RawRecord {
            customer_id: Some("b".into()),
            name: Some("Ravi Kumar".into()),
            dob: Some("1980-05-05".into()),
            pan: Some("ABCDE1234F".into()),
            aadhaar: Some("4321 8765 2109".into()),
            email: Some("ravi@example.com".into()),
            mobile: Some("9123456789".into()),
            address: Some("1 Hill Road, Pune".into()),
            txn_count: Some(45),
            txn_amount: Some(50_000.01),
        },
    ];
    write_upload(&input, &rows);

    let mut config = config_in(dir.path());
    config.paths.input_file = Some(input);
    config.model.n_estimators = 10;

    let outcome = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(outcome.records.len(), 2);

    let asha = &outcome.records[0];
    assert_eq!(asha.record.pan, "KLMNO4321Z");
    assert_eq!(asha.record.mobile, "9876543210");
    // Dashes are stripped, leaving an invalid Aadhaar
    assert_eq!(asha.record.aadhaar, "432187652109");
    assert_eq!(asha.verdict.reasons()[0], "Invalid Aadhaar format");

    let ravi = &outcome.records[1];
    let reasons = ravi.verdict.reasons();
    assert_eq!(
        &reasons[..3],
        &[
            "Blacklisted PAN".to_string(),
            "High transaction amount".to_string(),
            "High transaction count".to_string(),
        ]
    );
}
