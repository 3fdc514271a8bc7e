//! GFM provider tests against a scripted service

use eofloods_core::models::{BoundingBox, TimeWindow};
use eofloods_core::{FloodError, Result};
use eofloods_gfm::{
    CredentialPrompt, CredentialSource, Credentials, GfmProvider, GfmState, MemoryGfmApi,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn pakistan() -> BoundingBox {
    BoundingBox::new(67.740187, 27.712453, 68.104933, 28.000935).unwrap()
}

fn october() -> TimeWindow {
    TimeWindow::parse("2022-10-01", "2022-10-15").unwrap()
}

fn account() -> Credentials {
    Credentials::new("user@example.org", "hunter2")
}

fn five_products() -> MemoryGfmApi {
    MemoryGfmApi::new()
        .with_account(account())
        .with_product("p1", "2022-10-01T01:25:51")
        .with_product("p2", "2022-10-03T13:10:02")
        .with_product("p3", "2022-10-06T01:25:49")
        .with_product("p4", "2022-10-09T13:10:05")
        .with_product("p5", "2022-10-12T01:25:50")
}

/// Prompt answering with a fixed sequence of credentials
struct ScriptedPrompt {
    answers: Mutex<Vec<Credentials>>,
    asked: Arc<AtomicUsize>,
}

impl ScriptedPrompt {
    fn new(mut answers: Vec<Credentials>, asked: Arc<AtomicUsize>) -> Self {
        answers.reverse();
        Self { answers: Mutex::new(answers), asked }
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn prompt(&self) -> Result<Credentials> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| FloodError::MissingCredentials { reason: "prompt closed".into() })
    }
}

#[test]
fn test_construction_lists_products() {
    let api = Arc::new(five_products());
    let provider =
        GfmProvider::new(api.clone(), &CredentialSource::Explicit(account()), pakistan(), october()).unwrap();

    assert_eq!(provider.state(), GfmState::ProductsListed);
    assert_eq!(provider.products().len(), 5);
    assert_eq!(provider.aoi_id(), Some("aoi-1"));
    assert_eq!(provider.user().unwrap().client_id, "memory-client");
    assert_eq!(api.registered_areas(), vec![pakistan().to_geojson()]);
}

#[test]
fn test_select_data_by_product_time() {
    let mut provider =
        GfmProvider::new(Arc::new(five_products()), &CredentialSource::Explicit(account()), pakistan(), october())
            .unwrap();

    let dates = provider.available_data();
    provider.select_data(&dates[..2]).unwrap();
    assert_eq!(provider.products().len(), 2);
    assert_eq!(provider.state(), GfmState::ProductsFiltered);

    let err = provider.select_data(&["03-04-1995"]).unwrap_err();
    assert_eq!(err.to_string(), "No data found for given date(s): 03-04-1995");
    assert_eq!(provider.products().len(), 2);
}

#[test]
fn test_export_returns_one_link_per_product() {
    let mut provider =
        GfmProvider::new(Arc::new(five_products()), &CredentialSource::Explicit(account()), pakistan(), october())
            .unwrap();
    provider.select_data(&["2022-10-06T01:25:49"]).unwrap();

    let links = provider.export_data().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].product_id, "p3");
    assert_eq!(links[0].link, "memory://download/product/p3/memory-client");
}

#[test]
fn test_view_data_is_wms_map() {
    let provider =
        GfmProvider::new(Arc::new(five_products()), &CredentialSource::Explicit(account()), pakistan(), october())
            .unwrap();
    let map = provider.view_data(None).unwrap();
    assert_eq!(map.layer_names(), vec!["observed_flood_extent"]);
    assert_eq!(map.time_options.len(), 15);
}

#[test]
fn test_wrong_explicit_credentials_fail_without_retry() {
    let api = Arc::new(five_products());
    let source = CredentialSource::Explicit(Credentials::new("user@example.org", "wrong"));

    let err = GfmProvider::new(api.clone(), &source, pakistan(), october()).unwrap_err();
    assert!(matches!(err, FloodError::AuthenticationFailed { .. }));
    assert_eq!(api.login_attempts(), 1);
}

#[test]
fn test_interactive_login_retried_once() {
    let api = Arc::new(five_products());
    let asked = Arc::new(AtomicUsize::new(0));
    let prompt = ScriptedPrompt::new(vec![Credentials::new("user@example.org", "typo"), account()], asked.clone());

    let provider =
        GfmProvider::new(api.clone(), &CredentialSource::Interactive(Box::new(prompt)), pakistan(), october())
            .unwrap();
    assert_eq!(provider.state(), GfmState::ProductsListed);
    assert_eq!(asked.load(Ordering::SeqCst), 2);
    assert_eq!(api.login_attempts(), 2);
}

#[test]
fn test_interactive_login_gives_up_after_retry() {
    let api = Arc::new(five_products());
    let asked = Arc::new(AtomicUsize::new(0));
    let wrong = Credentials::new("user@example.org", "typo");
    let prompt = ScriptedPrompt::new(vec![wrong.clone(), wrong.clone(), wrong], asked.clone());

    let err = GfmProvider::new(api.clone(), &CredentialSource::Interactive(Box::new(prompt)), pakistan(), october())
        .unwrap_err();
    assert!(matches!(err, FloodError::AuthenticationFailed { .. }));
    assert_eq!(asked.load(Ordering::SeqCst), 2);
}
