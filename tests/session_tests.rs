mod common;

#[cfg(test)]
pub mod session_tests {
    use std::time::Duration;

    use super::common::*;

    use listing_portal::app::{Route, SessionGuard};
    use listing_portal::models::Identity;

    #[tokio::test]
    async fn test_guard_records_signed_in_identity() {
        let mut harness = Harness::signed_in_as(OWNER);
        let guard = SessionGuard::mount(harness.identity.as_ref(), harness.navigator.clone());

        assert_eq!(guard.identity(), Some(Identity::new(OWNER)));
        assert!(harness.drain_routes().is_empty());
    }

    #[tokio::test]
    async fn test_guard_redirects_when_signed_out_at_mount() {
        let mut harness = Harness::signed_out();
        let guard = SessionGuard::mount(harness.identity.as_ref(), harness.navigator.clone());

        assert_eq!(guard.identity(), None);
        assert_eq!(harness.drain_routes(), vec![Route::SignIn]);
    }

    #[tokio::test]
    async fn test_guard_follows_session_changes() {
        let mut harness = Harness::signed_out();
        let guard = SessionGuard::mount(harness.identity.as_ref(), harness.navigator.clone());
        assert_eq!(harness.next_route().await, Some(Route::SignIn));

        harness.identity.sign_in(Identity::new(OWNER));
        tokio::task::yield_now().await;
        assert_eq!(guard.identity(), Some(Identity::new(OWNER)));

        harness.identity.sign_out();
        assert_eq!(harness.next_route().await, Some(Route::SignIn));
        assert_eq!(guard.identity(), None);
    }

    #[tokio::test]
    async fn test_unmounted_guard_stops_listening() {
        let mut harness = Harness::signed_in_as(OWNER);
        let guard = SessionGuard::mount(harness.identity.as_ref(), harness.navigator.clone());
        drop(guard);

        harness.identity.sign_out();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(harness.drain_routes().is_empty());
    }

    #[tokio::test]
    async fn test_page_owner_comes_from_session() {
        let harness = Harness::signed_in_as(OTHER_USER);
        let mut page = harness.create_page();
        fill_valid_form(&mut page);

        let Route::Listing { listing_id, .. } = page.submit().await.unwrap() else {
            panic!("expected listing route");
        };
        let stored = harness.stored(&listing_id).await;
        assert_eq!(stored["userRef"], serde_json::json!(OTHER_USER));
    }
}
