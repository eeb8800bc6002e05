//! Minimal example: score a small attendance snapshot and print the report.

use shiftlens::model::ModelBundle;
use shiftlens::pipeline::PerformanceAnalyzer;
use shiftlens::report::ReportBuilder;
use shiftlens::source::SnapshotSource;
use shiftlens::{AnalysisError, AnalysisWindow};

fn main() {
    match run() {
        Ok(json) => print!("{json}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}

fn run() -> Result<String, AnalysisError> {
    let snapshot = r#"{
        "users": [
            { "userId": "u1", "name": "Asha Rahman", "email": "asha@example.com", "workerId": "W-01", "role": "worker" },
            { "userId": "u2", "name": "Ben Okafor", "email": "ben@example.com", "workerId": "W-02", "role": "worker" }
        ],
        "attendance": [
            { "attendanceId": "a1", "userId": "u1", "date": "2024-01-02", "clockInTime": "2024-01-02T06:30:00Z", "workMinutes": 480, "status": "approved" },
            { "attendanceId": "a2", "userId": "u1", "date": "2024-01-03", "clockInTime": "2024-01-03T06:25:00Z", "workMinutes": 480, "status": "approved" },
            { "attendanceId": "a3", "userId": "u2", "date": "2024-01-03", "clockInTime": "2024-01-03T09:10:00Z", "workMinutes": 240, "status": "approved" }
        ]
    }"#;

    let window = AnalysisWindow::parse("2024-01-01", "2024-01-31")?;
    let source = SnapshotSource::from_json(snapshot)?;

    let analyzer = PerformanceAnalyzer::from_bundle(&ModelBundle::bundled())?;
    let results = analyzer.analyze_source(&source, &window)?;

    ReportBuilder::new()
        .build_json(results, &window)
        .map_err(Into::into)
}
