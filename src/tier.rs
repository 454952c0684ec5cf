use magnitude_core::CapabilityTier;
use web_sys as web;

/// Classify the device from what `navigator` exposes.
pub fn detect(window: &web::Window) -> CapabilityTier {
    let nav = window.navigator();
    let cores = nav.hardware_concurrency() as u32;
    let touch = nav.max_touch_points();
    let mobile = nav
        .user_agent()
        .map(|ua| {
            let ua = ua.to_ascii_lowercase();
            ua.contains("mobi") || ua.contains("android") || ua.contains("iphone")
        })
        .unwrap_or(false);
    let tier = CapabilityTier::classify(cores, touch, mobile);
    log::info!(
        "[tier] cores={} touch={} mobile={} -> {:?}",
        cores,
        touch,
        mobile,
        tier
    );
    tier
}
