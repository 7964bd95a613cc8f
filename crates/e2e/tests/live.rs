//! Scenarios against a real browser and a running card delivery app
//!
//! Run with `cargo test -p card-delivery-e2e --test live -- --ignored`.
//! Endpoints come from `CARD_E2E_*` variables; see `SuiteConfig::load`.

use std::path::Path;

use card_delivery_e2e::app::AppHandle;
use card_delivery_e2e::booking::messages;
use card_delivery_e2e::config::SuiteConfig;
use card_delivery_e2e::fixtures::FixtureSet;
use card_delivery_e2e::runner::{RunnerConfig, SuiteRunner};
use card_delivery_e2e::scenarios::{self, catalogue};
use card_delivery_e2e::webdriver::WebDriverPage;
use card_delivery_e2e::{BookingRequest, CardForm, DateGenerator, Field, Page};

async fn session() -> (SuiteConfig, AppHandle, WebDriverPage) {
    let config = SuiteConfig::load(None).unwrap();
    let app = AppHandle::start(&config.app).await.unwrap();
    let page = WebDriverPage::connect(&config.browser, config.timeouts.action())
        .await
        .unwrap();
    (config, app, page)
}

#[tokio::test]
#[ignore = "requires WebDriver and the card delivery app"]
async fn live_valid_form_is_booked() {
    let (config, _app, mut page) = session().await;
    let dates = DateGenerator::today();

    {
        let mut form =
            CardForm::new(&mut page, dates).with_timeouts(config.timeouts.clone().into());
        form.open(&config.app.base_url).await.unwrap();
        let date = form
            .fill_and_submit(&BookingRequest::new(
                scenarios::DEFAULT_CITY,
                4,
                scenarios::DEFAULT_NAME,
                scenarios::DEFAULT_PHONE,
            ))
            .await
            .unwrap();
        form.expect_success(&date).await.unwrap();
    }

    page.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires WebDriver and the card delivery app"]
async fn live_invalid_phone_is_rejected() {
    let (config, _app, mut page) = session().await;
    let dates = DateGenerator::today();

    {
        let mut form =
            CardForm::new(&mut page, dates).with_timeouts(config.timeouts.clone().into());
        form.open(&config.app.base_url).await.unwrap();
        form.fill_and_submit(&BookingRequest::new(
            scenarios::DEFAULT_CITY,
            3,
            scenarios::DEFAULT_NAME,
            "89114359999",
        ))
        .await
        .unwrap();
        form.expect_field_error(Field::Phone, messages::PHONE_INVALID)
            .await
            .unwrap();
    }

    page.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires WebDriver and the card delivery app"]
async fn live_catalogue() {
    let (config, _app, page) = session().await;
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    let fixtures = FixtureSet::load(&fixtures_dir).unwrap();
    let output = tempfile::tempdir().unwrap();

    let mut runner = SuiteRunner::new(
        page,
        RunnerConfig {
            base_url: config.app.base_url.clone(),
            timeouts: config.timeouts.clone().into(),
            output_dir: output.path().to_path_buf(),
            capture_screenshots: true,
            today: None,
        },
    );

    let result = runner.run_scenarios(&catalogue(&fixtures)).await;
    runner.close().await.unwrap();

    let failed: Vec<_> = result.results.iter().filter(|r| !r.success).collect();
    assert!(failed.is_empty(), "{:#?}", failed);
}
