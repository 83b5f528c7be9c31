//! Whole-worker flows driven against scripted fakes: no browser, no
//! network, no store. Virtual time makes the settle delays and bounded
//! waits instant.

use hearth_browser::testing::FakeSurface;
use hearth_core::AppConfig;
use hearth_enrich::testing::{FakeSessionFactory, InMemoryArtifacts, InMemoryRecordStore};
use hearth_enrich::{
    ClimateRiskTask, EnrichmentTask, RetryPolicy, SchoolDistrictTask, TaskContext,
    ValuationReportTask,
};
use hearth_extract::FixedRecognizer;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const ADDRESS: &str = "123 Main Street, Springfield, IL 62704";
const STORED_ADDRESS: &str = "123 Main St, Springfield, IL 62704";

struct Fixture {
    surface: FakeSurface,
    store: Arc<InMemoryRecordStore>,
    artifacts: Arc<InMemoryArtifacts>,
    ctx: TaskContext,
    _work_dir: TempDir,
}

fn fixture(recognized: &str, rows: &[(&str, &str)]) -> Fixture {
    let surface = FakeSurface::new();
    let store = Arc::new(InMemoryRecordStore::with_rows(rows));
    let artifacts = Arc::new(InMemoryArtifacts::new());
    let work_dir = TempDir::new().expect("temp work dir");

    let mut config = AppConfig::default();
    config.portals.offender_map.url = "https://registry.example.com".to_string();
    config.portals.school_district.url = "https://districts.example.com".to_string();
    config.portals.climate_risk.url = "https://risk.example.com".to_string();
    config.portals.valuation.url = "https://valuation.example.com".to_string();
    config.portals.valuation.email = "agent@example.com".to_string();
    config.portals.valuation.password = "secret".to_string();
    config.browser.step_timeout_secs = 2;

    let ctx = TaskContext {
        sessions: Arc::new(FakeSessionFactory::new(surface.clone())),
        store: store.clone(),
        artifacts: artifacts.clone(),
        recognizer: Arc::new(FixedRecognizer::new(recognized)),
        config: Arc::new(config),
        work_dir: work_dir.path().to_path_buf(),
    };

    Fixture {
        surface,
        store,
        artifacts,
        ctx,
        _work_dir: work_dir,
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy::new(1, Duration::from_millis(1))
}

#[tokio::test(start_paused = true)]
async fn climate_risk_flow_extracts_and_updates_all_factor_columns() {
    let fx = fixture(
        "4/10 Flood Factor\n2/10 Fire Factor",
        &[("7", STORED_ADDRESS)],
    );
    fx.surface.add_element("input[placeholder*='address' i]", "");

    let task = ClimateRiskTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;

    assert!(report.success, "unexpected failure: {}", report.message);
    let payload = report.payload.expect("payload present");
    assert_eq!(payload["scores"]["flood"], json!("4/10"));
    assert_eq!(payload["scores"]["fire"], json!("2/10"));
    assert_eq!(payload["scores"]["wind"], json!(null));

    let updates = fx.store.updates();
    assert_eq!(updates.len(), 1);
    let (row_id, fields) = &updates[0];
    assert_eq!(row_id, "7");
    assert_eq!(fields.get("flood_factor_data"), Some(&json!("4/10")));
    assert_eq!(fields.get("fire_factor_data"), Some(&json!("2/10")));
    // Unextracted factors are written as null but still marked complete.
    assert_eq!(fields.get("wind_factor_data"), Some(&json!(null)));
    assert_eq!(
        fields.get("wind_factor_collection_status"),
        Some(&json!("complete"))
    );

    assert!(fx.surface.is_closed(), "session must be released");
}

#[tokio::test(start_paused = true)]
async fn climate_risk_no_match_is_reported_not_thrown() {
    let fx = fixture("4/10 Flood Factor", &[]);
    fx.surface.add_element("input[placeholder*='address' i]", "");

    let task = ClimateRiskTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;

    assert!(!report.success);
    assert!(report.message.contains("no record matched"));
    assert!(fx.surface.is_closed(), "session released on failure too");
}

#[tokio::test(start_paused = true)]
async fn school_district_flow_uploads_map_and_records_url() {
    let fx = fixture("", &[("1", STORED_ADDRESS), ("2", STORED_ADDRESS)]);
    fx.surface.add_element("input[placeholder*='address' i]", "");

    let task = SchoolDistrictTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;

    assert!(report.success, "unexpected failure: {}", report.message);
    let url = report.artifact_url.expect("artifact url present");
    assert!(url.starts_with("memory://school-district-maps/school_district_"));

    let uploaded = fx.artifacts.uploaded_names();
    assert_eq!(uploaded.len(), 1);
    assert!(uploaded[0].starts_with("school-district-maps/school_district_"));
    assert!(uploaded[0].ends_with(".png"));

    // Both duplicate rows receive the identical update.
    let updates = fx.store.updates();
    assert_eq!(updates.len(), 2);
    for (_, fields) in &updates {
        assert_eq!(fields.get("school_district_data"), Some(&json!([url])));
        assert_eq!(
            fields.get("school_district_collection_status"),
            Some(&json!("complete"))
        );
    }
}

#[tokio::test(start_paused = true)]
async fn school_district_typing_clears_then_sets_with_input_event() {
    let fx = fixture("", &[("1", STORED_ADDRESS)]);
    fx.surface
        .add_element("input[placeholder*='address' i]", "previous query");

    let task = SchoolDistrictTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;
    assert!(report.success, "unexpected failure: {}", report.message);

    assert_eq!(
        fx.surface
            .value_of("input[placeholder*='address' i]")
            .as_deref(),
        Some(ADDRESS)
    );
    assert!(fx
        .surface
        .input_event_fired("input[placeholder*='address' i]"));
}

#[tokio::test(start_paused = true)]
async fn valuation_flow_detects_download_and_records_report() {
    let fx = fixture("", &[("9", STORED_ADDRESS)]);

    // Login page, wizard, and upload widgets.
    fx.surface.add_button("a, button", "Log In");
    fx.surface.add_element("input[type='email']", "");
    fx.surface.add_element("input[type='password']", "");
    fx.surface.add_button(
        "button[type='submit'], input[type='submit'], button",
        "Log In",
    );
    fx.surface.add_button("button, a", "Launch Explorer");
    fx.surface
        .add_element("input[type='checkbox'][name*='value' i]", "");
    fx.surface.add_button("button", "Next");
    fx.surface.add_button("button", "Continue to Upload");
    fx.surface.add_element("input[type='file']", "");
    fx.surface.add_button("button", "Generate Analysis");

    // The portal "produces" the download shortly after the generate click.
    let surface = fx.surface.clone();
    let download_dir = fx.ctx.download_dir();
    tokio::spawn(async move {
        loop {
            if surface
                .clicked_texts()
                .contains(&"Generate Analysis".to_string())
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::fs::write(download_dir.join("Report-generated.xlsx"), b"workbook")
            .await
            .expect("write download");
    });

    let task = ValuationReportTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;

    assert!(report.success, "unexpected failure: {}", report.message);
    let payload = report.payload.expect("payload present");
    assert_eq!(payload["detected_file"], json!("Report-generated.xlsx"));

    let uploaded = fx.artifacts.uploaded_names();
    assert_eq!(uploaded.len(), 1);
    assert!(uploaded[0].starts_with("valuation-reports/valuation_report_"));

    // The staged download is consumed after upload.
    assert!(!fx.ctx.download_dir().join("Report-generated.xlsx").exists());

    let updates = fx.store.updates();
    assert_eq!(updates.len(), 1);
    let url = report.artifact_url.expect("artifact url");
    assert_eq!(
        updates[0].1.get("valuation_report_data"),
        Some(&json!([url]))
    );
}

#[tokio::test(start_paused = true)]
async fn engine_failure_becomes_structured_failure_report() {
    let fx = fixture("", &[("1", STORED_ADDRESS)]);
    fx.surface.fail_navigation("browser crashed");
    fx.surface.add_element("input[placeholder*='address' i]", "");

    let task = SchoolDistrictTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;

    assert!(!report.success);
    assert!(report.message.contains("school-district failure"));
    assert!(report.message.contains("browser crashed"));
    assert!(fx.surface.is_closed(), "session released after engine error");
    assert!(fx.store.updates().is_empty(), "no writes on failed flow");
}

#[tokio::test(start_paused = true)]
async fn valuation_without_credentials_fails_before_driving() {
    let mut fx = fixture("", &[("1", STORED_ADDRESS)]);
    let mut config = (*fx.ctx.config).clone();
    config.portals.valuation.email = String::new();
    fx.ctx.config = Arc::new(config);

    let task = ValuationReportTask::new(fx.ctx.clone(), policy());
    let report = task.run(ADDRESS).await;

    assert!(!report.success);
    assert!(report.message.contains("missing required setting"));
    assert!(fx.surface.log().is_empty(), "no session activity expected");
}
