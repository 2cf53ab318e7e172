//! Lifecycle tests against an in-memory hierarchy
//!
//! Exercises create, get, exists, update and delete together, the way a
//! caller maintaining a dimension would.

mod common;

use common::{InMemoryHierarchy, StubMdxExecutor};
use pretty_assertions::assert_eq;
use tm1_elements::{Element, ElementService, ElementType};
use tm1_transport_traits::RequestOptions;

fn service() -> ElementService {
    ElementService::new(InMemoryHierarchy::new(), StubMdxExecutor::new())
}

#[tokio::test]
async fn test_create_then_get_round_trips_the_name() {
    let elements = service();
    let options = RequestOptions::default();

    for name in ["Europe", "North America", "Kid's Bikes", "50% off", "Zürich", "a/b"] {
        let element = Element::new(name, ElementType::Numeric);
        elements
            .create("Dim", "Dim", &element, &options)
            .await
            .unwrap();

        let fetched = elements.get("Dim", "Dim", name, &options).await.unwrap();
        assert_eq!(fetched.name, name);
        assert_eq!(fetched.element_type, ElementType::Numeric);
    }
}

#[tokio::test]
async fn test_exists_before_and_after_create() {
    let elements = service();
    let options = RequestOptions::default();

    assert!(!elements.exists("Dim", "Dim", "Q1", &options).await.unwrap());

    elements
        .create("Dim", "Dim", &Element::new("Q1", ElementType::Consolidated), &options)
        .await
        .unwrap();
    assert!(elements.exists("Dim", "Dim", "Q1", &options).await.unwrap());

    elements.delete("Dim", "Dim", "Q1", &options).await.unwrap();
    assert!(!elements.exists("Dim", "Dim", "Q1", &options).await.unwrap());
}

#[tokio::test]
async fn test_update_and_delete_missing_element_fail() {
    let elements = service();
    let options = RequestOptions::default();

    let err = elements
        .update("Dim", "Dim", &Element::new("Ghost", ElementType::Numeric), &options)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = elements
        .delete("Dim", "Dim", "Ghost", &options)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_duplicate_create_is_rejected() {
    let elements = service();
    let options = RequestOptions::default();
    let element = Element::new("Jan", ElementType::Numeric);

    elements.create("Dim", "Dim", &element, &options).await.unwrap();
    let err = elements
        .create("Dim", "Dim", &element, &options)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(400));
}
