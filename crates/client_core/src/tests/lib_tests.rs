use super::*;
use shared::domain::{default_slider_values, SLIDER_DEFAULT};

fn client_over(store: Arc<InMemoryValueStore>) -> TallyClient {
    TallyClient::with_store(store, &StoreSettings::default())
}

#[tokio::test]
async fn startup_fetch_and_load_run_side_by_side() {
    let store = Arc::new(
        InMemoryValueStore::new()
            .with_value("global", "clicks", 12)
            .with_value("global", "val0", 2)
            .with_value("global", "val4", 9),
    );
    let client = client_over(store);

    let (count, sliders) = tokio::join!(client.counter().fetch(), client.load_sliders());

    assert_eq!(count.expect("count"), 12);
    let mut values = default_slider_values();
    sliders.expect("sliders").apply_to(&mut values);
    assert_eq!(values.get("val0"), Some(&2));
    assert_eq!(values.get("val1"), Some(&SLIDER_DEFAULT));
    assert_eq!(values.get("val3"), Some(&SLIDER_DEFAULT));
    assert_eq!(values.get("val4"), Some(&9));
}

#[tokio::test]
async fn slider_saves_never_touch_the_counter_row() {
    let store = Arc::new(InMemoryValueStore::new().with_value("global", "clicks", 3));
    let client = client_over(store.clone());

    let report = client.save_sliders(&default_slider_values()).await;

    assert!(report.is_success());
    assert_eq!(store.write_count().await, 4);
    assert_eq!(store.value("global", "clicks").await, Some(3));
    assert_eq!(store.value("global", "val2").await, None);
}

#[test]
fn connect_rejects_malformed_store_url() {
    let settings = StoreSettings {
        store_url: "::not-a-url".to_string(),
        ..StoreSettings::default()
    };
    assert!(matches!(
        TallyClient::connect(&settings),
        Err(StoreError::InvalidUrl(_))
    ));
}
