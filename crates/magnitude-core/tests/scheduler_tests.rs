// Render request coalescing.

use magnitude_core::RenderScheduler;

#[test]
fn scheduler_coalesces_requests_into_one_callback() {
    let mut s = RenderScheduler::default();
    assert!(!s.claim_callback());
    for _ in 0..10 {
        s.request_render();
    }
    assert!(s.claim_callback());
    s.request_render();
    assert!(!s.claim_callback(), "second callback scheduled for the same frame");

    assert!(s.begin_frame());
    assert!(!s.is_pending());
    s.end_frame(false);
    assert!(!s.claim_callback());
    assert!(!s.begin_frame());
}

#[test]
fn scheduler_keeps_animations_alive() {
    let mut s = RenderScheduler::default();
    s.request_render();
    assert!(s.claim_callback());
    assert!(s.begin_frame());
    s.end_frame(true);
    assert!(s.is_pending());
    assert!(s.claim_callback());
}
